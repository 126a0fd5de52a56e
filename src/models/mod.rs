//! Request and Response models for the sandbox API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::{
    validate_identifier, CheckFlagQuery, CreateFlagRequest, LimitRequest, MaxSizeRequest,
    RolloutRequest, SetRequest, WindowRequest,
};
pub use responses::{ClearResponse, DeleteResponse, HealthResponse, MaxSizeResponse};
