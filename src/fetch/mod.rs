//! Product page fetching
//!
//! This module contains the network side of the pipeline:
//! - Randomized request pacing before every attempt
//! - Browser-like request headers and a bounded per-request timeout
//! - A fixed attempt ceiling after which the URL is reported as unfetchable

mod client;
mod pacing;

pub use client::{build_http_client, RequestClient};
pub use pacing::PacingPolicy;
