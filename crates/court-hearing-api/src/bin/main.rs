//! Court Hearing Event Receiver entry point

use clap::{Parser, Subcommand};
use court_hearing_api::build_app;
use court_hearing_api::config::AppConfig;
use court_hearing_api::sns::SnsTransport;
use court_hearing_api::telemetry::ChannelTelemetry;
use court_hearing_core::TopicPublisher;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "court-hearing-event-receiver")]
#[command(about = "Receives court hearing events and relays them to downstream subscribers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Path to a TOML or YAML config file
        #[arg(short, long, env = "CONFIG_FILE")]
        config: Option<PathBuf>,

        /// Host to bind to, overriding the config file
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on, overriding the config file and PORT
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Load and validate configuration, then print it with secrets masked
    CheckConfig {
        #[arg(short, long, env = "CONFIG_FILE")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, host, port } => {
            let mut config = AppConfig::load(config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

            let telemetry = Arc::new(ChannelTelemetry::spawn(&config.telemetry));
            let transport = SnsTransport::from_config(&config.publisher).await;
            let publisher = Arc::new(TopicPublisher::new(
                config.publisher.topic_arn.clone(),
                transport,
            ));
            let topic = publisher.topic().to_string();
            let router = build_app(&config, telemetry, publisher);

            let allow_list = config.relay.allow_list();
            tracing::info!(
                topic = %topic,
                allow_list_enabled = allow_list.is_enabled(),
                included_courts = allow_list.len(),
                "Starting Court Hearing Event Receiver on {}",
                addr
            );

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router).await?;
        }

        Commands::CheckConfig { config } => {
            let config = AppConfig::load(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
    }

    Ok(())
}
