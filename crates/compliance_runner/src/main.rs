use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::Context;
use clap::{Parser, Subcommand};
use compliance_context::{load_records, select_relevant, ComplianceRecord, Profile};
use compliance_runner::ask::{ask, AskContext, AskRequest};
use compliance_runner::config::RunnerConfig;
use compliance_runner::llm_client::{LlmClient, OpenAiClient};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "compliance_runner", version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Serve the question-answering HTTP API.
    Serve {
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        profile: Option<Profile>,
    },
    /// Answer one question and print the response as JSON.
    Ask {
        #[arg(long)]
        question: String,
        #[arg(long)]
        profile: Option<Profile>,
        /// Compose the answer from the records without calling the model.
        #[arg(long)]
        offline: bool,
    },
    /// Print the records that would be sent to the model.
    Select {
        #[arg(long)]
        question: String,
        #[arg(long)]
        profile: Option<Profile>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// A missing data file is not fatal: the service runs and answers every
/// question with the fallback.
fn records_or_empty(cfg: &RunnerConfig) -> anyhow::Result<Vec<ComplianceRecord>> {
    if !cfg.data_path.exists() {
        tracing::warn!(
            path = %cfg.data_path.display(),
            "compliance data not found; starting empty"
        );
        return Ok(Vec::new());
    }
    let records = load_records(&cfg.data_path)
        .with_context(|| format!("loading {}", cfg.data_path.display()))?;
    tracing::info!(count = records.len(), "loaded compliance records");
    Ok(records)
}

fn llm_from_config(cfg: &RunnerConfig) -> anyhow::Result<Option<LlmClient>> {
    let Some(key) = cfg.openai_api_key.clone() else {
        tracing::warn!("OPENAI_API_KEY not set; answering offline");
        return Ok(None);
    };
    let client = OpenAiClient::new(key, cfg.openai_model.clone(), cfg.openai_base_url.clone())?;
    Ok(Some(LlmClient::OpenAi(client)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut cfg = RunnerConfig::from_env();

    match cli.cmd {
        Cmd::Serve {
            port,
            host,
            profile,
        } => {
            if let Some(p) = profile {
                cfg.profile = p;
            }
            let host = host.unwrap_or_else(|| cfg.host.clone());
            let ip: IpAddr = host
                .parse()
                .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
            let addr = SocketAddr::new(ip, port.unwrap_or(cfg.port));
            let records = records_or_empty(&cfg)?;
            let ctx = AskContext::from_config(&cfg, records, llm_from_config(&cfg)?);
            compliance_runner::server::serve(addr, ctx)
                .await
                .context("server error")?;
        }
        Cmd::Ask {
            question,
            profile,
            offline,
        } => {
            let llm = if offline { None } else { llm_from_config(&cfg)? };
            let ctx = AskContext::from_config(&cfg, records_or_empty(&cfg)?, llm);
            let req = AskRequest {
                question: Some(question),
                profile,
            };
            let resp = ask(&req, &ctx).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        Cmd::Select {
            question,
            profile,
            limit,
        } => {
            let records = records_or_empty(&cfg)?;
            let mut opts = profile.unwrap_or(cfg.profile).select_options();
            if let Some(limit) = limit {
                opts.limit = limit;
            }
            let selected = select_relevant(&question, &records, &opts);
            println!("{}", serde_json::to_string_pretty(&selected)?);
        }
    }
    Ok(())
}
