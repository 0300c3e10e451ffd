//! Process configuration loaded once at startup.
//!
//! The relay refuses to start without complete client credentials; there is no partial
//! or lazy mode. [`RelayConfig::from_lookup`] exists so tests can exercise the loader
//! without mutating the process environment.

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError};

/// Port the relay binds when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 1234;
/// Token endpoint used when `TOKEN_URL` is unset.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Immutable process-wide relay configuration.
///
/// Constructed once at startup and shared by reference into request handlers; nothing
/// mutates it afterwards. The client secret is intentionally excluded from [`Debug`]
/// output.
#[derive(Clone)]
pub struct RelayConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret; never logged or echoed back.
	pub client_secret: String,
	/// Redirect URI forwarded verbatim on authorization-code exchanges.
	pub redirect_uri: String,
	/// Upstream provider token endpoint.
	pub token_url: Url,
	/// Port the HTTP surface listens on.
	pub port: u16,
}
impl RelayConfig {
	/// Loads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Loads the configuration through the provided variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let client_id = required(&lookup, "CLIENT_ID")?;
		let client_secret = required(&lookup, "CLIENT_SECRET")?;
		let redirect_uri = required(&lookup, "REDIRECT_URI")?;
		let token_url = match optional(&lookup, "TOKEN_URL") {
			Some(raw) =>
				Url::parse(&raw).map_err(|source| ConfigError::invalid_var("TOKEN_URL", source))?,
			None => Url::parse(DEFAULT_TOKEN_URL)
				.expect("Default token URL is a compile-time constant and must parse."),
		};
		let port = match optional(&lookup, "PORT") {
			Some(raw) =>
				raw.parse().map_err(|source| ConfigError::invalid_var("PORT", source))?,
			None => DEFAULT_PORT,
		};

		Ok(Self { client_id, client_secret, redirect_uri, token_url, port })
	}
}
impl std::fmt::Debug for RelayConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("RelayConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("redirect_uri", &self.redirect_uri)
			.field("token_url", &self.token_url.as_str())
			.field("port", &self.port)
			.finish()
	}
}

/// Loads a `.env` file when one is present; a missing file is not an error.
pub fn load_dotenv() {
	if let Err(e) = dotenvy::dotenv() {
		if !matches!(&e, dotenvy::Error::Io(io) if io.kind() == std::io::ErrorKind::NotFound) {
			eprintln!("Warning: failed to load .env file: {e}");
		}
	}
}

// Empty values count as unset, matching the original deployment's falsy checks.
fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	optional(lookup, name).ok_or(ConfigError::MissingVar { name })
}

fn optional<F>(lookup: &F, name: &'static str) -> Option<String>
where
	F: Fn(&str) -> Option<String>,
{
	lookup(name).filter(|value| !value.is_empty())
}
