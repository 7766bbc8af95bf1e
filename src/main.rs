use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wap_replay::api::{create_router, AppState};
use wap_replay::config::Config;
use wap_replay::store::{compile_loaded, load_event_dir, write_bundle};

#[derive(Parser)]
#[command(name = "wap-replay", version, about = "Record-to-replay compiler for browser sessions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the event collection server the recorder posts to
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Root folder for recorded events
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Compile a folder of recorded event files into an exact-replay bundle
    Compile {
        /// Folder containing recorded *.json files (searched recursively)
        #[arg(long)]
        data_dir: PathBuf,
        /// Directory to store the result file
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();

    match cli.command {
        Command::Serve {
            host,
            port,
            data_dir,
        } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }
            serve(config).await
        }
        Command::Compile {
            data_dir,
            output_dir,
        } => {
            if let Some(output_dir) = output_dir {
                config.output_dir = output_dir;
            }
            compile_folder(&data_dir, &config)
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(&config));
    let app = create_router(state);

    let addr = config.bind_address();
    tracing::info!("Event collector starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn compile_folder(data_dir: &std::path::Path, config: &Config) -> anyhow::Result<()> {
    let loaded = load_event_dir(data_dir)?;
    let bundle = compile_loaded(&loaded)
        .with_context(|| format!("cannot compile {}", data_dir.display()))?;
    let path = write_bundle(&config.output_dir, &bundle)?;

    tracing::info!(
        "Task {} compiled: {} actions written to {}",
        bundle.task_id,
        bundle.action_list.len(),
        path.display()
    );
    Ok(())
}
