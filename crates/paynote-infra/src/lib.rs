//! Paynote Infrastructure Library
//!
//! Shared HTTP plumbing for the Paynote service:
//! - Middleware (request ID, Slack request signature verification)
//! - Telemetry initialization
//! - Error response shape

pub mod error;
pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use error::ErrorResponse;
pub use middleware::{
    get_request_id, request_id_middleware, slack_signature_middleware, RequestId,
    SignatureError, SignatureVerifier,
};
pub use telemetry::{init_telemetry, shutdown_telemetry};
