//! HTTP client for the record/prescription API
//!
//! Implements the domain's collaborator traits over REST with bearer-token
//! authentication.

pub mod api;
pub mod config;
pub mod error;
pub mod http;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
