#![allow(clippy::must_use_candidate)]

//! Streaming relay between clients and upstream providers
//!
//! The relay has two obligations over one upstream byte stream: forward
//! every byte to the client the moment it arrives, and parse the same
//! bytes into SSE frames for usage extraction — without letting a parse
//! failure disturb the forwarding. Cancellation can come from either
//! socket at any time and funnels into a single terminal transition.

mod builder;
mod error;
mod frame;
mod registry;
mod relay;
mod usage;

pub use builder::{ResponseFormat, SamplingParams, UpstreamRequest, WireMessage, build_payload};
pub use error::RelayError;
pub use frame::{FrameParser, SseFrame, WireUsage};
pub use registry::{CleanupLatch, InFlightRegistry};
pub use relay::{RelayOutcome, RelayState, StreamRelay};
pub use usage::{TailBuffer, TokenUsage, UsageMeter};
