//! Fetch layer for talking to profile sources
//!
//! This module contains everything a source pipeline needs below the extractor:
//! - HTTP transport with per-request timeouts and error classification
//! - HTML document queries and JSON decoding
//! - The retry executor with per-source backoff

mod document;
mod retry;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use document::{decode_json, Document, Node};
pub use retry::{
    AttemptOutcome, BackoffStrategy, RetryOutcome, RetryPolicy, EXHAUSTED_MESSAGE,
};
pub use transport::{
    build_http_client, HttpRequest, HttpResponse, Method, ReqwestTransport, Transport,
    TransportError,
};
