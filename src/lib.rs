// Public modules
pub mod attachment;
pub mod chat;
pub mod client;
pub mod error;
pub mod render;
pub mod snapshot;
pub mod sse;
pub mod types;
pub mod utils;

mod observability;

// Re-exports
pub use attachment::{Attachment, Capture, MAX_ATTACHMENT_BYTES, capture_attachments};
pub use client::{ChunkStream, ContentStreamer, Gemini};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use snapshot::TextSnapshots;
pub use types::*;
