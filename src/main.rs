//! steerco — authorization and tenant-routing gateway.

use clap::Parser;
use std::path::PathBuf;
use steerco_core::AppConfig;
use steerco_gateway::AppState;
use steerco_tenancy::TenantRegistry;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "steerco", version, about = "Multi-tenant cutover-management gateway")]
struct Cli {
    /// Bind address.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Bind port.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Tenant registry file (overrides STEERCO_TENANT_REGISTRY).
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Directory for local tenant stores (overrides STEERCO_INSTANCE_DIR).
    #[arg(long)]
    instance_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("steerco=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(dir) = cli.instance_dir {
        config.registry_path = dir.join("tenants.json");
        config.instance_dir = dir;
    }
    if let Some(path) = cli.registry {
        config.registry_path = path;
    }

    if !config.auth_enabled {
        tracing::warn!("authentication is DISABLED, every caller gets the admin role");
    }
    if config.auth_enabled && config.credentials.is_empty() {
        tracing::warn!("no API keys configured, keyed requests will fail with 500");
    }

    let registry = TenantRegistry::load(&config.registry_path)?;
    tracing::info!(
        keys = config.credentials.len(),
        multi_tenant = registry.is_multi_tenant(),
        "configuration loaded"
    );

    steerco_gateway::start(&cli.host, cli.port, AppState::new(config, registry)).await
}
