//! Relay-level error types shared across configuration, transport, and the HTTP surface.

// self
use crate::{_prelude::*, relay::GrantKind};

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Startup configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Inbound request failed field validation; no upstream call was made.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Upstream token endpoint failed or rejected the exchange.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Listener or server I/O failure.
	#[error("I/O error occurred while serving the relay.")]
	Io(#[from] std::io::Error),
}

/// Configuration failures raised while loading the process environment.
///
/// Every variant is fatal at startup: the process must refuse traffic rather than
/// run with incomplete credentials.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required environment variable is unset or empty.
	#[error("Missing required environment variable `{name}`.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// An environment variable is present but holds an unusable value.
	#[error("Environment variable `{name}` holds an invalid value.")]
	InvalidVar {
		/// Variable name.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: BoxError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a variable parsing failure inside [`ConfigError::InvalidVar`].
	pub fn invalid_var(
		name: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::InvalidVar { name, source: Box::new(src) }
	}

	/// Wraps a transport builder failure inside [`ConfigError::HttpClientBuild`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Inbound request validation failures; mapped to HTTP 400 without touching upstream.
///
/// The display strings for the missing-field variants are wire contract, relayed to
/// callers byte for byte.
#[derive(Debug, ThisError)]
pub enum ValidationError {
	/// Authorization code is absent or empty.
	#[error("Missing code in request body")]
	MissingCode,
	/// Neither accepted refresh token field is present and non-empty.
	#[error("Missing refresh_token in body")]
	MissingRefreshToken,
	/// Request body could not be parsed under its declared content type.
	#[error("Malformed request body")]
	MalformedBody {
		/// Underlying body parsing failure.
		#[source]
		source: BoxError,
	},
}
impl ValidationError {
	/// Wraps a body parsing failure inside [`ValidationError::MalformedBody`].
	pub fn malformed_body(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::MalformedBody { source: Box::new(src) }
	}
}

/// Upstream token endpoint failures; mapped to HTTP 500 with the provider payload relayed.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Provider answered the exchange with a non-success status.
	#[error("Token endpoint rejected the {grant} grant with status {status}.")]
	Rejected {
		/// Grant the relay was forwarding.
		grant: GrantKind,
		/// HTTP status returned by the provider.
		status: u16,
		/// Provider error payload: parsed JSON when possible, else the raw body text.
		details: Option<Value>,
	},
	/// Transport failure before a provider response arrived.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Grant the relay was forwarding.
		grant: GrantKind,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl UpstreamError {
	/// Wraps a transport-specific network error.
	pub fn network(grant: GrantKind, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { grant, source: Box::new(src) }
	}

	/// Grant kind the failed exchange was forwarding.
	pub fn grant(&self) -> GrantKind {
		match self {
			Self::Rejected { grant, .. } | Self::Network { grant, .. } => *grant,
		}
	}

	/// Opaque details relayed to the caller: the provider payload when one was captured,
	/// otherwise a fallback message string.
	pub fn details(&self) -> Value {
		match self {
			Self::Rejected { details: Some(details), .. } => details.clone(),
			Self::Rejected { details: None, .. } => Value::String(self.to_string()),
			Self::Network { source, .. } => Value::String(source.to_string()),
		}
	}
}
