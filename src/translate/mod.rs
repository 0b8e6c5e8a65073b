//! Client for the remote transcribe-and-translate endpoint
//!
//! One operation: POST a chunk as a multipart form and decode the JSON
//! response. The endpoint carries no authentication and no versioning; the
//! only failure distinction is request failed vs request succeeded.

mod client;
mod response;

pub use client::{TranslateClient, UPLOAD_FILE_NAME};
pub use response::TranslationResult;
