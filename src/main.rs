use anyhow::{Context, Result};
use sous_chef::cli::{parse_args, run};
use sous_chef::config::Config;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    Config::load_dotenv();

    let cli_args = parse_args();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().context("Invalid configuration")?;
    run(cli_args, config).await
}
