//! Shared HTTP middleware for Paynote

pub mod request_id;
pub mod slack_signature;

pub use request_id::{get_request_id, request_id_middleware, RequestId};
pub use slack_signature::{slack_signature_middleware, SignatureError, SignatureVerifier};
