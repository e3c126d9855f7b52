//! # Pi Relay
//!
//! Server-side relay approving and completing Pi payments.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export PI_SERVER_API_KEY=...
//! export ALLOWED_ORIGIN=https://app.example.com
//!
//! # Run the server
//! pi-relay
//! ```

use relay_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so RUST_LOG / LOG_FORMAT can come from it
    dotenvy::dotenv().ok();

    init_logging();

    print_banner();

    let state = AppState::from_env()?;

    let addr = state.config.socket_addr()?;

    info!("Allowed origins: {:?}", state.config.allowed_origins);
    info!("Validation: {}", if state.config.validate { "on" } else { "off" });
    info!(
        "Platform: {} ({})",
        state.platform.platform_name(),
        state.config.pi.api_base_url
    );

    let app = routes::create_router(state);

    info!("Pi relay running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn print_banner() {
    println!(
        r#"
  π Pi Relay
  ━━━━━━━━━━━━━━━━━━━━━━━
  approve / complete relay
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
