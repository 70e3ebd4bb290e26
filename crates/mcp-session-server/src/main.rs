//! MCP session server — entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tokio_util::sync::CancellationToken;

use mcp_session::types::MCP_VERSION;
use mcp_session::StdioTransport;
use mcp_session_server::{build_session, ServerConfig};

#[derive(Parser)]
#[command(
    name = "mcp-session-server",
    about = "MCP server exposing tools, prompts, and resources over stdio",
    version
)]
struct Cli {
    /// Server name advertised during initialize.
    /// Also reads from MCP_SESSION_NAME env var.
    #[arg(long)]
    name: Option<String>,

    /// Maximum number of requests handled concurrently (0 = unbounded).
    /// Also reads from MCP_SESSION_MAX_IN_FLIGHT env var.
    #[arg(long)]
    max_in_flight: Option<usize>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Print server identity and capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   mcp-session-server completions bash > ~/.local/share/bash-completion/completions/mcp-session-server
    ///   mcp-session-server completions zsh > ~/.zfunc/_mcp-session-server
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    // stdout carries the protocol; logs must stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::resolve(cli.name.as_deref(), cli.max_in_flight);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let session = build_session(&config).await?;
            tracing::info!("{} v{} on stdio", config.name, config.version);
            if let Some(limit) = config.max_in_flight {
                tracing::info!("Max in-flight requests: {limit}");
            }

            let shutdown = CancellationToken::new();
            let on_signal = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupt received, shutting down");
                    on_signal.cancel();
                }
            });

            session
                .serve(std::sync::Arc::new(StdioTransport::stdio()), shutdown)
                .await?;
        }

        Commands::Info => {
            let session = build_session(&config).await?;
            let tools = session.tools().list_tools().await;
            let prompts = session.prompts().list_prompts().await;
            let resources = session.resources().list_resources().await;
            let info = serde_json::json!({
                "server": session.identity(),
                "protocol_version": MCP_VERSION,
                "capabilities": session.capabilities(),
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "prompts": prompts.iter().map(|p| &p.name).collect::<Vec<_>>(),
                "resources": resources.iter().map(|r| &r.uri).collect::<Vec<_>>(),
                "max_in_flight": config.max_in_flight,
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(
                shell,
                &mut cmd,
                "mcp-session-server",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
