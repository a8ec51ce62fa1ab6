//! chatbridge: drive a chat-completion API from a typed conversation transcript
//!
//! The pipeline converts an ordered [`Transcript`] into wire messages and tool
//! definitions, builds a request shaped by the target model's family
//! (general-purpose chat vs. constrained reasoning), gates every remote call
//! through a requests-per-minute admission window, and folds streaming delta
//! chunks back into discrete transcript entries.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod constraints;
pub mod convert;
pub mod error;
pub mod limiter;
pub mod model;
pub mod provider;
pub mod request;
pub mod streaming;
pub mod transcript;
pub mod transport;
pub mod wire;

// Re-exports for convenience
pub use error::{BridgeError, Result};
pub use model::{ModelDescriptor, ModelFamily};
pub use provider::{ChatProvider, Completion, EntryStream};
pub use request::GenerationOptions;
pub use transcript::{Entry, Segment, Transcript};
