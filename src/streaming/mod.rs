//! Streaming response handling
//!
//! Raw payload bytes from the transport are SSE-framed; the frame parser
//! splits them into events and the aggregator folds the decoded delta chunks
//! into discrete transcript entries.

pub mod aggregator;
pub mod sse;

pub use aggregator::{aggregate, StreamAggregator};
pub use sse::{Frame, FrameParser};
