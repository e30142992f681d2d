use hatim::app;
use hatim::config::AppConfig;

/// Main entry point for the hatim web application
///
/// Reads the configuration from the environment, sets up logging
/// (`RUST_LOG`, `info` by default) and serves the sign-up page.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    app::run(config).await?;

    Ok(())
}
