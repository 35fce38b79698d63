//! Submit a front and side photograph to the analysis proxy and print the result.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use face_analysis::ai::mime::load_image_data_uri;
use face_analysis::config::ClientConfig;
use face_analysis::models::{AnalysisRequest, Gender, UserData};
use face_analysis::{AnalysisClient, Error};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Female,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "analyze-face")]
#[command(about = "Run a face analysis against the proxy")]
struct CliArgs {
    /// Front-facing photograph.
    #[arg(value_name = "FRONT")]
    front: PathBuf,

    /// Side profile photograph.
    #[arg(value_name = "SIDE")]
    side: PathBuf,

    #[arg(long)]
    name: Option<String>,

    #[arg(long, value_enum)]
    gender: Option<GenderArg>,

    /// Age bracket, e.g. 25-34.
    #[arg(long)]
    age_range: Option<String>,

    /// Focus area; repeat for several.
    #[arg(long = "focus", value_name = "AREA")]
    focus_areas: Vec<String>,

    /// Proxy base URL, overriding ANALYZE_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Timeout in seconds, overriding ANALYZE_TIMEOUT_SECS.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl CliArgs {
    fn user_data(&self) -> Option<UserData> {
        let user = UserData {
            name: self.name.clone(),
            gender: self.gender.map(Gender::from),
            age_range: self.age_range.clone(),
            focus_areas: (!self.focus_areas.is_empty()).then(|| self.focus_areas.clone()),
        };
        (user != UserData::default()).then_some(user)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "face_analysis=info,analyze_face=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let mut config = ClientConfig::from_env().context("Failed to load configuration")?;
    if let Some(base_url) = args.base_url.clone() {
        config.base_url = base_url;
    }
    if let Some(secs) = args.timeout_secs.filter(|s| *s > 0) {
        config.timeout = Duration::from_secs(secs);
    }

    let front = load_image_data_uri(&args.front)
        .with_context(|| format!("Failed to read {}", args.front.display()))?;
    let side = load_image_data_uri(&args.side)
        .with_context(|| format!("Failed to read {}", args.side.display()))?;

    let mut request = AnalysisRequest::new(front, side);
    if let Some(user) = args.user_data() {
        request = request.with_user_data(user);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let client = AnalysisClient::new(config);
    match client.analyze_face_with_cancel(&request, cancel).await {
        Ok(analysis) => {
            info!(
                "Current {} ({}), potential {} ({})",
                analysis.current_score,
                analysis.current_tier,
                analysis.potential_score,
                analysis.potential_tier
            );
            println!("{}", serde_json::to_string_pretty(&analysis)?);
            Ok(())
        }
        Err(Error::Timeout) => {
            error!("{}", Error::Timeout);
            std::process::exit(2);
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
