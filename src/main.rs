// src/main.rs
// DevBridge - Make command bridge for coding agents

use anyhow::Result;
use clap::{Parser, Subcommand};
use devbridge::ai_service::AiServiceBridge;
use devbridge::config::EnvConfig;
use devbridge::make::{MakeCommandBridge, ServiceKind, TargetCategory};
use devbridge::mcp::DevBridgeServer;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "devbridge")]
#[command(about = "Maps developer intents onto safety-gated make targets")]
#[command(version)]
struct Cli {
    /// Project root where make runs (overrides DEVBRIDGE_PROJECT_ROOT)
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as MCP server over stdio (default)
    Serve,

    /// Analyze a natural-language request
    Analyze {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Rule-based command suggestions
    Suggest { text: Vec<String> },

    /// List annotated Makefile targets
    Targets {
        #[arg(short, long)]
        category: Option<TargetCategory>,
    },

    /// Run a make target through the safety gate
    Run {
        target: String,
        /// Make variables as KEY=VALUE
        #[arg(value_parser = parse_key_value)]
        args: Vec<(String, String)>,
        /// Confirm dangerous targets
        #[arg(long)]
        confirm: bool,
    },

    /// Probe service status
    Status {
        #[arg(short, long)]
        service: Option<ServiceKind>,
    },

    /// Check prerequisites for a target
    Prereqs { target: String },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn joined(words: &[String]) -> Option<String> {
    let text = words.join(" ");
    (!text.trim().is_empty()).then_some(text)
}

async fn run_mcp_server(config: EnvConfig) -> Result<()> {
    let bridge = Arc::new(MakeCommandBridge::from_config(&config));
    let ai_service = config
        .ai_service
        .as_ref()
        .map(|settings| Arc::new(AiServiceBridge::new(settings)));

    info!(project_root = %config.project_root.display(), "Starting MCP server");
    let server = DevBridgeServer::new(bridge, ai_service);

    // Run with stdio transport
    let transport = rmcp::transport::io::stdio();
    let service = rmcp::serve_server(server, transport).await?;
    service.waiting().await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv(); // Load .env from current directory

    let cli = Cli::parse();

    let log_level = match (&cli.command, cli.verbose) {
        (_, true) => Level::DEBUG,
        (Some(Commands::Serve) | None, false) => Level::WARN, // Quiet for MCP stdio
        (_, false) => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = EnvConfig::from_env().with_project_root(cli.project_root);

    let Some(command) = cli.command else {
        return run_mcp_server(config).await;
    };

    let bridge = MakeCommandBridge::from_config(&config);
    match command {
        Commands::Serve => run_mcp_server(config).await?,
        Commands::Analyze { text } => {
            let intent = joined(&text);
            print_json(&bridge.analyze_user_intent(intent.as_deref(), None).await)?;
        }
        Commands::Suggest { text } => {
            let intent = joined(&text);
            print_json(&bridge.get_command_suggestions(intent.as_deref(), None).await)?;
        }
        Commands::Targets { category } => {
            let targets = bridge.list_make_targets(category.map(|c| c.as_str())).await;
            print_json(&targets)?;
        }
        Commands::Run { target, args, confirm } => {
            let args: BTreeMap<String, Value> =
                args.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
            let result = bridge.execute_make_command(&target, &args, confirm).await;
            print_json(&result)?;
            if !result.success {
                std::process::exit(1);
            }
        }
        Commands::Status { service } => {
            print_json(&bridge.get_make_command_status(service).await)?;
        }
        Commands::Prereqs { target } => {
            print_json(&bridge.validate_make_prerequisites(&target).await)?;
        }
    }

    Ok(())
}
