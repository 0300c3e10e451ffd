// std
use std::{net::SocketAddr, sync::Arc};
// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use url::Url;
// self
use token_relay::{config::RelayConfig, relay::Relay, server::build_router};

fn test_config(token_url: Url) -> RelayConfig {
	RelayConfig {
		client_id: "relay-client".into(),
		client_secret: "relay-secret".into(),
		redirect_uri: "https://app.example/callback".into(),
		token_url,
		port: 0,
	}
}

async fn spawn_relay(upstream: &MockServer) -> SocketAddr {
	let token_url =
		Url::parse(&upstream.url("/api/token")).expect("Mock token endpoint should parse.");
	let relay = Arc::new(
		Relay::new(&test_config(token_url)).expect("Relay should build with a default transport."),
	);
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
		.await
		.expect("Relay listener should bind an ephemeral port.");
	let addr = listener.local_addr().expect("Relay listener should expose its address.");

	tokio::spawn(async move {
		axum::serve(listener, build_router(relay)).await.expect("Relay server should run.");
	});

	addr
}

async fn post_json(addr: SocketAddr, path: &str, body: &str) -> (u16, Value) {
	let response = reqwest::Client::new()
		.post(format!("http://{addr}{path}"))
		.header("content-type", "application/json")
		.body(body.to_owned())
		.send()
		.await
		.expect("Relay request should complete.");
	let status = response.status().as_u16();
	let text = response.text().await.expect("Relay response body should be readable.");

	(status, serde_json::from_str(&text).expect("Relay response should be JSON."))
}

#[tokio::test]
async fn health_reports_ok_with_a_parsable_timestamp() {
	let upstream = MockServer::start_async().await;
	let addr = spawn_relay(&upstream).await;
	let response = reqwest::get(format!("http://{addr}/health"))
		.await
		.expect("Health request should complete.");

	assert_eq!(response.status().as_u16(), 200);

	let body: Value = serde_json::from_str(
		&response.text().await.expect("Health body should be readable."),
	)
	.expect("Health body should be JSON.");

	assert_eq!(body["status"], "ok");

	let time = body["time"].as_str().expect("Health time should be a string.");

	OffsetDateTime::parse(time, &Rfc3339).expect("Health time should be RFC 3339.");
}

#[tokio::test]
async fn swap_missing_code_returns_400_without_calling_upstream() {
	let upstream = MockServer::start_async().await;
	let mock = upstream
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200);
		})
		.await;
	let addr = spawn_relay(&upstream).await;
	let (status, body) = post_json(addr, "/swap", "{}").await;

	assert_eq!(status, 400);
	assert_eq!(body, json!({ "error": "Missing code in request body" }));

	let (status, body) = post_json(addr, "/swap", "{\"code\":\"\"}").await;

	assert_eq!(status, 400);
	assert_eq!(body, json!({ "error": "Missing code in request body" }));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn swap_relays_the_upstream_body_verbatim() {
	let upstream = MockServer::start_async().await;
	let mock = upstream
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/token")
				.body_includes("grant_type=authorization_code")
				.body_includes("code=abc123")
				.body_includes("redirect_uri=https%3A%2F%2Fapp.example%2Fcallback");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"xyz\",\"expires_in\":3600}");
		})
		.await;
	let addr = spawn_relay(&upstream).await;
	let response = reqwest::Client::new()
		.post(format!("http://{addr}/swap"))
		.header("content-type", "application/json")
		.body("{\"code\":\"abc123\"}")
		.send()
		.await
		.expect("Swap request should complete.");

	assert_eq!(response.status().as_u16(), 200);
	assert_eq!(
		response
			.headers()
			.get("content-type")
			.and_then(|value| value.to_str().ok())
			.unwrap_or_default(),
		"application/json"
	);
	assert_eq!(
		response.text().await.expect("Swap body should be readable."),
		"{\"access_token\":\"xyz\",\"expires_in\":3600}"
	);

	mock.assert_async().await;
}

#[tokio::test]
async fn swap_accepts_form_encoded_bodies() {
	let upstream = MockServer::start_async().await;
	let mock = upstream
		.mock_async(|when, then| {
			when.method(POST).path("/api/token").body_includes("code=form-code");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"form\"}");
		})
		.await;
	let addr = spawn_relay(&upstream).await;
	let response = reqwest::Client::new()
		.post(format!("http://{addr}/swap"))
		.form(&[("code", "form-code")])
		.send()
		.await
		.expect("Form-encoded swap request should complete.");

	assert_eq!(response.status().as_u16(), 200);

	mock.assert_async().await;
}

#[tokio::test]
async fn swap_without_a_content_type_fails_field_validation() {
	let upstream = MockServer::start_async().await;
	let addr = spawn_relay(&upstream).await;
	let response = reqwest::Client::new()
		.post(format!("http://{addr}/swap"))
		.send()
		.await
		.expect("Bodyless swap request should complete.");

	assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn refresh_accepts_both_field_spellings() {
	let upstream = MockServer::start_async().await;
	let mock = upstream
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/token")
				.body_includes("grant_type=refresh_token")
				.body_includes("refresh_token=alias-token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"renewed\"}");
		})
		.await;
	let addr = spawn_relay(&upstream).await;
	let (status, _) = post_json(addr, "/refresh", "{\"refreshToken\":\"alias-token\"}").await;

	assert_eq!(status, 200);

	let (status, _) = post_json(addr, "/refresh", "{\"refresh_token\":\"alias-token\"}").await;

	assert_eq!(status, 200);

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn refresh_prefers_the_snake_case_field_when_both_are_present() {
	let upstream = MockServer::start_async().await;
	let mock = upstream
		.mock_async(|when, then| {
			when.method(POST).path("/api/token").body_includes("refresh_token=snake");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"renewed\"}");
		})
		.await;
	let addr = spawn_relay(&upstream).await;
	let (status, _) = post_json(
		addr,
		"/refresh",
		"{\"refresh_token\":\"snake\",\"refreshToken\":\"camel\"}",
	)
	.await;

	assert_eq!(status, 200);

	mock.assert_async().await;
}

#[tokio::test]
async fn refresh_empty_body_returns_400_without_calling_upstream() {
	let upstream = MockServer::start_async().await;
	let mock = upstream
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200);
		})
		.await;
	let addr = spawn_relay(&upstream).await;
	let (status, body) = post_json(addr, "/refresh", "{}").await;

	assert_eq!(status, 400);
	assert_eq!(body, json!({ "error": "Missing refresh_token in body" }));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn upstream_rejection_maps_to_500_with_details() {
	let upstream = MockServer::start_async().await;
	let _mock = upstream
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;
	let addr = spawn_relay(&upstream).await;
	let (status, body) = post_json(addr, "/swap", "{\"code\":\"expired\"}").await;

	assert_eq!(status, 500);
	assert_eq!(
		body,
		json!({ "error": "Token swap failed", "details": { "error": "invalid_grant" } })
	);

	let (status, body) = post_json(addr, "/refresh", "{\"refresh_token\":\"revoked\"}").await;

	assert_eq!(status, 500);
	assert_eq!(
		body,
		json!({ "error": "Token refresh failed", "details": { "error": "invalid_grant" } })
	);
}

#[tokio::test]
async fn malformed_json_body_is_rejected_as_a_client_error() {
	let upstream = MockServer::start_async().await;
	let addr = spawn_relay(&upstream).await;
	let response = reqwest::Client::new()
		.post(format!("http://{addr}/swap"))
		.header("content-type", "application/json")
		.body("{not json")
		.send()
		.await
		.expect("Malformed swap request should complete.");

	assert_eq!(response.status().as_u16(), 400);

	let body: Value = serde_json::from_str(
		&response.text().await.expect("Error body should be readable."),
	)
	.expect("Error body should be JSON.");

	assert_eq!(body, json!({ "error": "Malformed request body" }));
}
