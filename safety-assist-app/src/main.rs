use anyhow::{bail, Result};
use safety_assist_app::bootstrap::{build_assistant, gemini_provider};
use safety_assist_app::config::{Config, DEFAULT_CONFIG_PATH};
use safety_assist_app::repl::Repl;
use tracing::info;

struct Args {
    config_path: String,
    resume: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut config_path = DEFAULT_CONFIG_PATH.to_string();
    let mut resume = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => match args.next() {
                Some(path) => config_path = path,
                None => bail!("--config requires a path"),
            },
            "--resume" | "-r" => match args.next() {
                Some(id) => resume = Some(id),
                None => bail!("--resume requires a session id"),
            },
            other => bail!("Unknown argument: {}", other),
        }
    }
    Ok(Args {
        config_path,
        resume,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let config = Config::load(&args.config_path)?;
    info!(config = %args.config_path, model = %config.provider.model, "configuration loaded");

    let provider = gemini_provider(&config)?;
    let assistant = build_assistant(&config, provider, args.resume.as_deref()).await?;

    Repl::new(assistant).run().await
}
