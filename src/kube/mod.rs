//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and provides
//! a configured client for use throughout the application.
//!
//! The client is constructed once at startup and passed into every
//! query function - query logic never connects on its own, so the
//! whole layer can be exercised against a fake client in tests.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Maximum time to wait for a TCP connection to the API server.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum time to wait for a single API response.
///
/// Cluster API latency is the only variable cost in this server, so every
/// call gets a bound rather than hanging a tool invocation forever.
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Initialize and return a Kubernetes client
///
/// Uses the default config loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
///
/// An explicit kubeconfig path or context name overrides the inferred
/// configuration.
pub async fn create_client(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Client> {
    let options = KubeConfigOptions {
        context: context.map(String::from),
        ..Default::default()
    };

    let mut config = match kubeconfig {
        Some(path) => {
            let kc = Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig: {}", path.display()))?;
            Config::from_custom_kubeconfig(kc, &options)
                .await
                .context("Failed to build config from kubeconfig")?
        }
        None if context.is_some() => Config::from_kubeconfig(&options)
            .await
            .context("Failed to build config for requested context")?,
        None => Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration")?,
    };

    config.connect_timeout = Some(CONNECT_TIMEOUT);
    config.read_timeout = Some(READ_TIMEOUT);

    let client = Client::try_from(config)?;
    Ok(client)
}

/// Load the merged kubeconfig (KUBECONFIG env var or default location)
pub fn load_kubeconfig() -> Result<Kubeconfig> {
    Kubeconfig::read().context("Failed to load kubeconfig")
}

/// Get the current Kubernetes context name
///
/// Falls back to "default" when no kubeconfig is present (e.g. in-cluster).
pub fn current_context_name() -> String {
    match Kubeconfig::read() {
        Ok(kc) => kc.current_context.unwrap_or_else(|| "default".to_string()),
        Err(_) => "default".to_string(),
    }
}
