pub mod commands;
pub mod config;
pub mod host;
pub mod logging;
pub mod placeholders;
pub mod streaming;
pub mod tag;
pub mod text;

use std::sync::Arc;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use crate::config::Config;
use crate::host::{ConsoleHost, HostAction};
use crate::streaming::VisibilityRegistry;
use crate::tag::StreamerTag;

pub use crate::logging::LogLevel;

/// Builds the registry and the integration layer for this process.
pub fn init(config: &Config) -> Arc<StreamerTag> {
    let registry = VisibilityRegistry::new();
    StreamerTag::new(registry, config)
}

/// Runs the console host until stdin closes, `quit` is entered or Ctrl+C is pressed.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let tag = init(&config);
    let (output_tx, mut output_rx) = mpsc::unbounded_channel();
    let mut host = ConsoleHost::new(tag, &config, output_tx)?;

    for line in host.usage() {
        info!("Command: {}", line);
    }

    let printer = tokio::spawn(async move {
        while let Some(text) = output_rx.recv().await {
            println!("{}", text.to_ansi());
        }
    });

    println!("Console host is running. Type 'quit' or press Ctrl+C to exit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if host.handle_line(&line).await == HostAction::Quit {
                            break;
                        }
                    }
                    None => {
                        info!("Input closed, shutting down.");
                        break;
                    }
                }
            }
            _ = &mut ctrl_c => {
                info!("Received Ctrl+C, shutting down.");
                break;
            }
        }
    }

    host.shutdown();
    // Dropping the host closes the output channel so the printer can finish.
    drop(host);
    printer.await?;

    info!("StreamerTag has shut down.");
    Ok(())
}
