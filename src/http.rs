//! Transport layer for upstream token exchanges.
//!
//! The relay performs exactly one form-encoded POST per inbound request and never
//! inspects successful payloads; [`TokenPayload`] carries the provider body verbatim
//! so the HTTP surface can relay it byte for byte.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client as ReqwestClient, header::AUTHORIZATION, redirect};
// self
use crate::{_prelude::*, error::UpstreamError, relay::GrantKind};

/// Opaque token payload returned by the provider on success.
///
/// The bytes are passed through unmodified; the relay neither parses nor validates them.
#[derive(Clone, Debug)]
pub struct TokenPayload {
	/// Raw provider response body.
	pub body: Vec<u8>,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Token requests must not follow redirects, matching OAuth 2.0 guidance that token
/// endpoints return results directly instead of delegating to another URI.
#[derive(Clone, Debug)]
pub struct TokenEndpointClient(ReqwestClient);
impl TokenEndpointClient {
	/// Builds the default relay transport with redirect following disabled.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().redirect(redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing [`ReqwestClient`]; callers are responsible for disabling
	/// redirect following on custom clients.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Executes one form-encoded token request against `token_url`.
	///
	/// Success (any 2xx) yields the provider body verbatim. A non-success status is an
	/// [`UpstreamError::Rejected`] carrying the provider payload; a transport failure is
	/// an [`UpstreamError::Network`]. No retries are attempted in either case.
	pub async fn post_form(
		&self,
		token_url: &Url,
		authorization: &str,
		form: &[(&str, &str)],
		grant: GrantKind,
	) -> Result<TokenPayload, UpstreamError> {
		let response = self
			.0
			.post(token_url.clone())
			.header(AUTHORIZATION, authorization)
			.form(form)
			.send()
			.await
			.map_err(|e| UpstreamError::network(grant, e))?;
		let status = response.status();
		let body = response.bytes().await.map_err(|e| UpstreamError::network(grant, e))?.to_vec();

		if status.is_success() {
			Ok(TokenPayload { body })
		} else {
			Err(UpstreamError::Rejected {
				grant,
				status: status.as_u16(),
				details: reject_details(body),
			})
		}
	}
}

/// Builds the HTTP Basic `Authorization` header value from the client credentials.
pub fn basic_credential(client_id: &str, client_secret: &str) -> String {
	format!("Basic {}", STANDARD.encode(format!("{client_id}:{client_secret}")))
}

// Providers answer rejections with JSON error bodies; anything else is relayed as text.
fn reject_details(body: Vec<u8>) -> Option<Value> {
	if body.is_empty() {
		return None;
	}

	match serde_json::from_slice(&body) {
		Ok(details) => Some(details),
		Err(_) => Some(Value::String(String::from_utf8_lossy(&body).into_owned())),
	}
}
