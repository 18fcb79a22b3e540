use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voice_agent_client::{AgentClient, ClientConfig, HttpAgentClient, SessionConfig};

/// Exercise a voice agent backend from the command line
#[derive(Parser)]
#[command(name = "voice-agent-client", version)]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/voice-agent-client")]
    config: String,

    /// Backend base URL (overrides the config file)
    #[arg(long)]
    server_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the client configuration merged over defaults
    Config,
    /// Ask the backend to start an agent and print the room it created
    Connect,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = ClientConfig::load(&cli.config)?;

    let server_url = cli
        .server_url
        .or(cfg.server.url.clone())
        .context("No backend configured (set server.url or --server-url)")?;

    let client = HttpAgentClient::new(&server_url).context("Failed to build HTTP client")?;
    info!("Voice agent client v{}", env!("CARGO_PKG_VERSION"));
    info!("Backend: {}", client.server_url());

    match cli.command {
        Command::Config => {
            let app = client.fetch_config().await;
            let session = SessionConfig::from_app_config(
                &app,
                cfg.room.url.clone(),
                cfg.session.start_audio_off,
            );
            println!("{}", serde_json::to_string_pretty(&app)?);
            info!("Session config: {:?}", session);
        }
        Command::Connect => {
            let data = client
                .start_agent()
                .await
                .context("Agent request failed")?;
            let room = data
                .room()
                .or(cfg.room.url.as_deref())
                .context("Backend did not return a room URL")?;
            println!("room: {}", room);
            println!("credential issued: {}", data.token().is_some());
        }
    }

    Ok(())
}
