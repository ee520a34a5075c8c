//! Artifactory CLI
//!
//! Main entry point. Resolves connection settings, builds the reconciler and
//! runs one subcommand.

use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use artifactory_reconciler::{
    cli::Cli,
    commands, metrics, output, Reconciler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.json_logs);

    let config = cli.artifactory_config()?;
    if !config.verify_tls {
        warn!("TLS certificate verification is disabled; pass --verify-tls to enable it");
    }

    let reconciler = Reconciler::from_config(&config)?;
    let result = commands::execute(&reconciler, &cli.command).await;

    if let Some(path) = &cli.metrics_file {
        if let Err(e) = metrics::write_textfile(path) {
            error!(error = %e, path = %path.display(), "Failed to write metrics");
        }
    }

    if let Some(document) = result? {
        println!("{}", output::render(&document, cli.output)?);
    }
    Ok(())
}

/// Initialize tracing subscriber on stderr, leaving stdout for documents
fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
