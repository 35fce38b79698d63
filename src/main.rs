use anyhow::{Context, Result};
use clap::Parser;
use face_analysis::ai::OpenAiVisionClient;
use face_analysis::config::ProxyConfig;
use face_analysis::proxy::{self, AnalysisProxy};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "face-analysis")]
#[command(about = "Serve the face analysis proxy")]
struct CliArgs {
    /// Address to listen on, overriding BIND_ADDR.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "face_analysis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting face-analysis proxy");

    let args = CliArgs::parse();
    let mut config = ProxyConfig::from_env().context("Failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    if config.api_key.is_none() {
        warn!("XAI_API_KEY not set; analysis requests will fail with a configuration error");
    }
    info!("Upstream: {} (model: {})", config.base_url, config.model);

    let vision = Arc::new(OpenAiVisionClient::new(
        config.base_url.clone(),
        config.model.clone(),
    ));
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    let proxy = Arc::new(AnalysisProxy::new(config, vision));

    if let Err(e) = proxy::serve(listener, proxy).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
