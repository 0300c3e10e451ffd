//! HTTP surface of the relay.
//!
//! Three routes: `GET /health`, `POST /swap`, and `POST /refresh`. Exchange bodies are
//! accepted as JSON or form-encoded; successful provider payloads are relayed byte for
//! byte, validation failures map to 400, and upstream failures map to 500 with the
//! provider's own error payload attached.

// std
use std::net::Ipv4Addr;
// crates.io
use axum::{
	Form, Json, Router,
	extract::{FromRequest, Request, State},
	http::{StatusCode, header::CONTENT_TYPE},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
// self
use crate::{
	_prelude::*,
	config::RelayConfig,
	error::ValidationError,
	http::TokenPayload,
	relay::{GrantKind, RefreshRequest, Relay, SwapRequest},
};

/// Builds the relay, binds `0.0.0.0:<port>`, and serves until shutdown.
///
/// Runs until Ctrl-C; configuration problems surface before the socket is bound.
pub async fn serve(config: RelayConfig) -> Result<()> {
	let relay = Arc::new(Relay::new(&config)?);
	let router = build_router(relay);
	let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port)).await?;

	tracing::info!(port = listener.local_addr()?.port(), "token relay listening");

	axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

	Ok(())
}

/// Assembles the relay router; exposed so tests can drive the surface directly.
pub fn build_router(relay: Arc<Relay>) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/swap", post(swap))
		.route("/refresh", post(refresh))
		.layer(TraceLayer::new_for_http())
		.with_state(relay)
}

async fn shutdown_signal() {
	let _ = tokio::signal::ctrl_c().await;

	tracing::info!("shutdown signal received");
}

async fn health() -> impl IntoResponse {
	let time = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();

	Json(json!({ "status": "ok", "time": time }))
}

async fn swap(
	State(relay): State<Arc<Relay>>,
	JsonOrForm(request): JsonOrForm<SwapRequest>,
) -> Result<TokenJson, ApiError> {
	let code = request.code()?;
	let payload = relay.swap_code(code).await?;

	Ok(TokenJson(payload))
}

async fn refresh(
	State(relay): State<Arc<Relay>>,
	JsonOrForm(request): JsonOrForm<RefreshRequest>,
) -> Result<TokenJson, ApiError> {
	let token = request.token()?;
	let payload = relay.refresh(token).await?;

	Ok(TokenJson(payload))
}

/// Relays an opaque provider payload as `200 application/json` without re-encoding it.
struct TokenJson(TokenPayload);
impl IntoResponse for TokenJson {
	fn into_response(self) -> Response {
		([(CONTENT_TYPE, "application/json")], self.0.body).into_response()
	}
}

/// HTTP mapping of [`Error`]: 400 for validation, 500 for upstream and everything else.
struct ApiError(Error);
impl From<Error> for ApiError {
	fn from(e: Error) -> Self {
		Self(e)
	}
}
impl From<ValidationError> for ApiError {
	fn from(e: ValidationError) -> Self {
		Self(e.into())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		match self.0 {
			Error::Validation(e) => {
				tracing::debug!(error = %e, "request rejected before upstream call");

				(StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
			},
			Error::Upstream(e) => {
				let error = match e.grant() {
					GrantKind::AuthorizationCode => "Token swap failed",
					GrantKind::RefreshToken => "Token refresh failed",
				};

				(
					StatusCode::INTERNAL_SERVER_ERROR,
					Json(json!({ "error": error, "details": e.details() })),
				)
					.into_response()
			},
			e => {
				tracing::error!(error = %e, "unexpected relay error");

				(
					StatusCode::INTERNAL_SERVER_ERROR,
					Json(json!({ "error": "Internal server error" })),
				)
					.into_response()
			},
		}
	}
}

/// Extracts a payload from a JSON or form-encoded body.
///
/// A missing or unrecognized content type yields the payload's default (all fields
/// absent), deferring to field validation for the caller-facing 400. A malformed body of
/// a recognized content type is rejected outright.
struct JsonOrForm<T>(T);
impl<S, T> FromRequest<S> for JsonOrForm<T>
where
	S: Send + Sync,
	T: DeserializeOwned + Default + Send,
{
	type Rejection = ApiError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let content_type = req
			.headers()
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.unwrap_or_default()
			.to_owned();

		if content_type.starts_with("application/json") {
			let Json(payload) = Json::<T>::from_request(req, state)
				.await
				.map_err(|e| ApiError::from(ValidationError::malformed_body(e)))?;

			return Ok(Self(payload));
		}
		if content_type.starts_with("application/x-www-form-urlencoded") {
			let Form(payload) = Form::<T>::from_request(req, state)
				.await
				.map_err(|e| ApiError::from(ValidationError::malformed_body(e)))?;

			return Ok(Self(payload));
		}

		Ok(Self(T::default()))
	}
}
