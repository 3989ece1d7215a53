//! Remote image verification: fetch a URL once, sniff the image format from
//! its header bytes, and report size and dimensions as JSON.

pub mod classify;
pub mod compose;
pub mod config;
pub mod fetch;
pub mod handler;
pub mod logging;
pub mod request;
pub mod sniff;

pub use config::VerifierConfig;
pub use handler::{analyze, handle, HandlerRequest, HandlerResponse};
