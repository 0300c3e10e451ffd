//! Relay binary entrypoint.

// self
use token_relay::{config::{self, RelayConfig}, obs, server};

#[tokio::main]
async fn main() {
	config::load_dotenv();
	obs::init_tracing();

	let config = match RelayConfig::from_env() {
		Ok(config) => config,
		Err(e) => {
			eprintln!("Configuration error: {e}");
			std::process::exit(2);
		},
	};

	if let Err(e) = server::serve(config).await {
		eprintln!("Server error: {e}");
		std::process::exit(1);
	}
}
