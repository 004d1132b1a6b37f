use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use chatrelay::{Commands, Container, ContainerConfig, DispatchMode, Router};

#[derive(Parser)]
#[command(name = "chatrelay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model identifier; overrides GENAI_MODEL
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Use the offline echo client instead of the hosted API
    #[arg(long, global = true)]
    mock: bool,

    /// Send turns strictly one at a time so replies arrive in submission order
    #[arg(long, global = true)]
    serialize: bool,

    /// Interval in milliseconds at which finished replies are collected
    #[arg(long, global = true, default_value = "100")]
    poll_ms: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Commands::Tui);

    // Interactive surfaces own the terminal; keep log output to errors there.
    let level = if cli.verbose {
        "debug"
    } else if matches!(command, Commands::Tui | Commands::Chat) {
        "error"
    } else {
        "info"
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = ContainerConfig::from_env(cli.model.clone());
    config.mock = cli.mock;
    config.poll_interval = Duration::from_millis(cli.poll_ms.max(1));
    config.dispatch_mode = if cli.serialize {
        DispatchMode::Serialized
    } else {
        DispatchMode::Concurrent
    };

    let container = match Container::new(config.clone()) {
        Ok(container) => container,
        Err(e) if e.is_configuration_error() => {
            warn!("{e}");
            let stdin = BufReader::new(tokio::io::stdin());
            let Some(api_key) = prompt_api_key(stdin, tokio::io::stdout()).await? else {
                eprintln!("No API key provided. Exiting.");
                std::process::exit(1);
            };
            config.api_key = Some(api_key);
            Container::new(config)?
        }
        Err(e) => return Err(e.into()),
    };

    let router = Router::new(&container);
    let output = router.route(command).await?;
    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}

async fn prompt_api_key<R, W>(mut input: R, mut out: W) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    out.write_all(b"Enter your GenAI API key: ").await?;
    out.flush().await?;

    let mut line = String::new();
    input.read_line(&mut line).await?;
    let key = line.trim();
    Ok((!key.is_empty()).then(|| key.to_string()))
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["chatrelay"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.poll_ms, 100);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["chatrelay", "chat", "--mock", "--serialize"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Chat));
        assert!(cli.mock && cli.serialize);
    }

    #[test]
    fn serve_takes_port() {
        let cli = Cli::try_parse_from(["chatrelay", "serve", "--port", "9000"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve {
                port: 9000,
                public: false
            })
        );
    }

    #[tokio::test]
    async fn api_key_prompt_trims_answer() {
        let mut out = Vec::new();
        let key = prompt_api_key(&b"  secret \n"[..], &mut out).await.unwrap();

        assert_eq!(key.as_deref(), Some("secret"));
        assert_eq!(out, b"Enter your GenAI API key: ");
    }

    #[tokio::test]
    async fn empty_api_key_answer_is_none() {
        assert!(prompt_api_key(&b"\n"[..], Vec::new()).await.unwrap().is_none());
        assert!(prompt_api_key(&b""[..], Vec::new()).await.unwrap().is_none());
    }
}
