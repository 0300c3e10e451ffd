//! Confidential OAuth 2.0 token relay—swap authorization codes and refresh tokens against an
//! upstream provider without ever exposing the client secret to callers.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod relay;
pub mod server;

mod _prelude {
	pub use std::sync::Arc;

	pub use serde::Deserialize;
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(test)] use httpmock as _;
