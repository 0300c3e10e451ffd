//! The two token-exchange operations and their inbound payload shapes.
//!
//! [`Relay`] is the service analog of an OAuth broker flow layer: it owns the transport,
//! the provider token endpoint, and the precomputed Basic credential, and translates each
//! inbound request into exactly one upstream `grant_type=...` call. Handlers validate the
//! payload first; a validation failure never reaches the provider.

// self
use crate::{
	_prelude::*,
	config::RelayConfig,
	error::ValidationError,
	http::{TokenEndpointClient, TokenPayload, basic_credential},
};

/// Grant kinds the relay forwards upstream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GrantKind {
	/// One-time authorization code exchange.
	AuthorizationCode,
	/// Refresh token exchange.
	RefreshToken,
}
impl GrantKind {
	/// Wire value sent as `grant_type`.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::AuthorizationCode => "authorization_code",
			Self::RefreshToken => "refresh_token",
		}
	}
}
impl std::fmt::Display for GrantKind {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Forwards token exchanges to the upstream provider with client credentials attached.
///
/// Constructed once at startup from the immutable [`RelayConfig`] and shared across
/// request handlers behind an [`Arc`]. The Basic credential is precomputed so the
/// secret is materialized exactly once.
#[derive(Clone)]
pub struct Relay {
	http: TokenEndpointClient,
	token_url: Url,
	redirect_uri: String,
	authorization: String,
}
impl Relay {
	/// Creates a relay with its own default transport.
	pub fn new(config: &RelayConfig) -> Result<Self> {
		Ok(Self::with_http_client(config, TokenEndpointClient::new()?))
	}

	/// Creates a relay that reuses the caller-provided transport.
	pub fn with_http_client(config: &RelayConfig, http: TokenEndpointClient) -> Self {
		Self {
			http,
			token_url: config.token_url.clone(),
			redirect_uri: config.redirect_uri.clone(),
			authorization: basic_credential(&config.client_id, &config.client_secret),
		}
	}

	/// Exchanges an authorization code for tokens.
	///
	/// Issues one `grant_type=authorization_code` call carrying the code and the
	/// configured redirect URI; the provider body is returned verbatim.
	pub async fn swap_code(&self, code: &str) -> Result<TokenPayload> {
		const GRANT: GrantKind = GrantKind::AuthorizationCode;

		let form = [
			("grant_type", GRANT.as_str()),
			("code", code),
			("redirect_uri", self.redirect_uri.as_str()),
		];

		self.exchange(GRANT, &form).await
	}

	/// Exchanges a refresh token for a new access token.
	///
	/// Issues one `grant_type=refresh_token` call; the provider body is returned verbatim.
	pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPayload> {
		const GRANT: GrantKind = GrantKind::RefreshToken;

		let form = [("grant_type", GRANT.as_str()), ("refresh_token", refresh_token)];

		self.exchange(GRANT, &form).await
	}

	async fn exchange(&self, grant: GrantKind, form: &[(&str, &str)]) -> Result<TokenPayload> {
		tracing::debug!(grant = %grant, "forwarding token exchange upstream");

		let payload = self
			.http
			.post_form(&self.token_url, &self.authorization, form, grant)
			.await
			.inspect_err(|e| {
				tracing::warn!(grant = %grant, details = %e.details(), "token exchange failed");
			})?;

		tracing::info!(grant = %grant, "token exchange succeeded");

		Ok(payload)
	}
}
impl std::fmt::Debug for Relay {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("Relay")
			.field("token_url", &self.token_url.as_str())
			.field("redirect_uri", &self.redirect_uri)
			.finish()
	}
}

/// Inbound payload for `POST /swap`.
#[derive(Debug, Default, Deserialize)]
pub struct SwapRequest {
	/// One-time authorization code issued by the provider.
	#[serde(default)]
	pub code: Option<String>,
}
impl SwapRequest {
	/// Returns the non-empty authorization code or the exact wire validation error.
	pub fn code(&self) -> Result<&str, ValidationError> {
		non_empty(&self.code).ok_or(ValidationError::MissingCode)
	}
}

/// Inbound payload for `POST /refresh`.
///
/// Callers historically sent the token under either `refresh_token` or `refreshToken`.
/// The snake_case field wins when both are present and non-empty; the camelCase alias is
/// a fallback only, keeping precedence deterministic.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
	/// Canonical refresh token field.
	#[serde(default)]
	pub refresh_token: Option<String>,
	/// Legacy camelCase alias accepted for compatibility.
	#[serde(default, rename = "refreshToken")]
	pub refresh_token_alias: Option<String>,
}
impl RefreshRequest {
	/// Returns the non-empty refresh token or the exact wire validation error.
	pub fn token(&self) -> Result<&str, ValidationError> {
		non_empty(&self.refresh_token)
			.or_else(|| non_empty(&self.refresh_token_alias))
			.ok_or(ValidationError::MissingRefreshToken)
	}
}

// Empty strings count as absent, matching the original falsy checks.
fn non_empty(field: &Option<String>) -> Option<&str> {
	field.as_deref().filter(|value| !value.is_empty())
}
