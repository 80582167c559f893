//! Chat session domain.
//!
//! - [`entities::Message`]: a single message exchanged with the model
//! - [`stream::StreamEvent`]: incremental events of a streamed reply

pub mod entities;
pub mod stream;
