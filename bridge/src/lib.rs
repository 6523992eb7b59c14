//! tabdock - stdio bridge
//!
//! Runs one tab strip and connects it to a host process over JSON lines:
//! - stdin carries host commands, UI input and pull replies
//! - stdout carries host requests, pulls, command responses and view changes
//! - logs go to stderr

mod host;
mod protocol;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use host::{PendingPulls, StdioHost};
use protocol::{Inbound, Outbound};
use tabdock_core::{Config, StripHandle, TabStrip};

pub async fn run() -> anyhow::Result<()> {
    let config = Config::locate().context("Failed to load configuration")?;
    tabdock_core::init_logging(&config.log_filter);

    let (out_tx, out_rx) = mpsc::unbounded_channel();

    let host = StdioHost::new(out_tx.clone());
    let pulls = host.pulls();
    let strip = TabStrip::new(config, host.clone()).with_view_sink(host);
    let handle = strip.handle();

    let writer = tokio::spawn(write_lines(out_rx, tokio::io::stdout()));
    let runtime = tokio::spawn(strip.run());

    tracing::info!("tabdock bridge started");

    let stdin = BufReader::new(tokio::io::stdin());
    read_lines(stdin, &handle, &pulls, &out_tx).await?;

    runtime.await.context("Tab strip task failed")?;
    pulls.cancel_all();
    drop(out_tx);
    writer.await.context("Writer task failed")??;

    tracing::info!("tabdock bridge stopped");
    Ok(())
}

/// Dispatch stdin lines until EOF, then shut the strip down.
async fn read_lines<R>(
    reader: R,
    handle: &StripHandle,
    pulls: &PendingPulls,
    out: &mpsc::UnboundedSender<Outbound>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let inbound = match Inbound::parse(&line) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed line");
                continue;
            }
        };

        match inbound {
            Inbound::Command { seq, command } => {
                let result = handle.command(command).await;
                out.send(Outbound::Response {
                    seq,
                    result: result.into(),
                })
                .context("Output closed")?;
            }
            Inbound::Input { event } => {
                handle.input(event)?;
            }
            Inbound::Reply { seq, value } => {
                if !pulls.resolve(seq, value) {
                    tracing::warn!(seq, "Reply to an unknown pull");
                }
            }
        }
    }

    tracing::debug!("stdin closed");
    handle.shutdown();
    Ok(())
}

/// Write one JSON line per outbound message until every sender is gone.
async fn write_lines<W>(
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    mut writer: W,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = outbound.recv().await {
        let line = message.to_line()?;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
