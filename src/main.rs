//! gitops-mcp - An MCP server for monitoring GitOps infrastructure
//!
//! Exposes read-only introspection of Flux, Cluster API, Kommander, and
//! policy engine state as MCP tools over stdio.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use gitops_mcp::mcp::McpServer;
use gitops_mcp::tools::ToolRegistry;

/// An MCP server for monitoring Flux GitOps, Cluster API, and policy engine state
#[derive(Parser, Debug)]
#[command(name = "gitops-mcp")]
#[command(about = "MCP server for GitOps infrastructure monitoring and debugging", long_about = None)]
struct Args {
    /// Path to the kubeconfig file (default: in-cluster config, then $KUBECONFIG, then ~/.kube/config)
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use (default: current context)
    #[arg(long)]
    context: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable debug logging to a file
    #[arg(long, short = 'd')]
    debug: bool,
}

/// Initialize logging based on the debug flag
///
/// stdout carries the MCP protocol, so normal logs go to stderr. With
/// `--debug`, verbose logs are written to a temp file instead so a noisy
/// session can be inspected afterwards.
///
/// Returns the log file path if debug logging is enabled.
fn init_logging(args: &Args) -> Option<PathBuf> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if args.debug {
            "debug".to_string()
        } else {
            args.log_level.clone()
        })
    });

    if args.debug {
        // Use Builder to create a named temp file that persists
        let temp_file = tempfile::Builder::new()
            .prefix("gitops-mcp-")
            .suffix(".log")
            .tempfile()
            .map(|f| {
                let path = f.path().to_path_buf();
                // Keep the file alive by leaking it (it will be cleaned up by the OS)
                std::mem::forget(f);
                path
            })
            .unwrap_or_else(|_| {
                std::env::temp_dir().join(format!("gitops-mcp-{}.log", std::process::id()))
            });

        match std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&temp_file)
        {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_writer(file)
                    .with_env_filter(env_filter)
                    .with_ansi(false)
                    .with_target(true)
                    .init();
                return Some(temp_file);
            }
            Err(_) => {
                // Fall back to stderr if the log file cannot be opened
            }
        }
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();
    None
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = init_logging(&args);
    if let Some(ref log_path) = log_file {
        eprintln!("Debug logging enabled. Logs written to: {}", log_path.display());
    }

    tracing::debug!("Initializing Kubernetes client");
    let client = gitops_mcp::kube::create_client(args.kubeconfig.as_deref(), args.context.as_deref())
        .await
        .context("Failed to create Kubernetes client")?;

    let context = gitops_mcp::kube::current_context_name();
    tracing::info!("Connected to Kubernetes cluster: {}", context);

    let registry = ToolRegistry::new(client);
    let server = McpServer::new(registry);
    server.run().await
}
