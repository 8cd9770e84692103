//! chanop-console - drive the channel operator helper from a terminal.
//!
//! Reads commands from stdin against one simulated channel described by a
//! TOML file. Lines starting with `<` stand in for server notifications.

use chanop::config::{Config, validation};
use chanop::console::{Console, PacedConnection};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "chanop.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {config_path}", errors.len());
    }
    for warning in validation::warnings(&config) {
        warn!("{warning}");
    }

    info!(
        server = %config.console.server,
        channel = %config.console.channel,
        nick = %config.console.nick,
        "Starting chanop console"
    );

    let mut console = Console::from_config(&config);

    // Outbound lines, printed as they come due
    let (mut connection, mut rx) = PacedConnection::spawn();
    let printer = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            println!("{line}");
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if matches!(line.trim(), "quit" | "/quit") {
                            break;
                        }
                        if let Some(reply) = console.handle_line(&line, &mut connection, Instant::now()) {
                            println!("{reply}");
                        }
                    }
                    None => break,
                }
            }
            _ = ticker.tick() => {
                console.tick(&mut connection, Instant::now());
            }
        }
    }

    drop(connection);
    // The writer drains paced lines still pending, then closes the output.
    printer.await?;
    info!("Console closed");
    Ok(())
}
