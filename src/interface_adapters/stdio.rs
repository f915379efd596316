// JSON-lines bridge between a byte stream (stdin/stdout, a pipe) and a match task.

use crate::interface_adapters::protocol::{
    ClientMessage, MatchPhaseDto, MatchUpdateDto, ServerMessage,
};
use crate::use_cases::{MatchEvent, MatchPhase, MatchUpdate};
use std::fmt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, warn};

#[derive(Debug)]
pub enum BridgeError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Io(e) => write!(f, "i/o error: {e}"),
            BridgeError::Serialization(e) => write!(f, "serialization error: {e}"),
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<std::io::Error> for BridgeError {
    fn from(e: std::io::Error) -> Self {
        BridgeError::Io(e)
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        BridgeError::Serialization(e)
    }
}

/// Reads one `ClientMessage` per line and forwards it into the match.
///
/// Lines that fail to parse are reported on `error_tx` and skipped. Returns at
/// end of input or once the match stops accepting events.
pub async fn read_client_messages<R>(
    reader: R,
    input_tx: mpsc::Sender<MatchEvent>,
    error_tx: mpsc::Sender<String>,
) -> Result<(), BridgeError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = serde_json::from_str::<ClientMessage>(line)
            .map_err(|e| e.to_string())
            .and_then(|msg| MatchEvent::try_from(msg).map_err(|e| e.to_string()));
        match event {
            Ok(event) => {
                if input_tx.send(event).await.is_err() {
                    debug!("match input closed; reader exiting");
                    break;
                }
            }
            Err(message) => {
                warn!(%message, "rejected client line");
                let _ = error_tx.send(message).await;
            }
        }
    }
    Ok(())
}

/// Serializes match updates, phase changes and input errors as JSON lines.
///
/// Returns after the match-ended phase has been written, or when the match
/// channels close.
pub async fn write_server_messages<W>(
    mut update_rx: broadcast::Receiver<MatchUpdate>,
    mut phase_rx: watch::Receiver<MatchPhase>,
    mut error_rx: mpsc::Receiver<String>,
    mut writer: W,
) -> Result<(), BridgeError>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let msg = tokio::select! {
            // Updates first: the final update is sent before the phase flips to ended.
            biased;
            update = update_rx.recv() => match update {
                Ok(update) => ServerMessage::MatchUpdate(MatchUpdateDto::from(update)),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "update writer lagged; skipping to latest update");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            changed = phase_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let phase = *phase_rx.borrow_and_update();
                let msg = ServerMessage::MatchState(MatchPhaseDto::from(phase));
                write_line(&mut writer, &msg).await?;
                if matches!(phase, MatchPhase::Ended(_)) {
                    break;
                }
                continue;
            }
            Some(message) = error_rx.recv() => ServerMessage::Error { message },
        };

        write_line(&mut writer, &msg).await?;
    }

    writer.flush().await?;
    Ok(())
}

async fn write_line<W>(writer: &mut W, msg: &ServerMessage) -> Result<(), BridgeError>
where
    W: AsyncWrite + Unpin,
{
    let mut txt = serde_json::to_string(msg).inspect_err(|e| {
        error!(error = ?e, "failed to serialize server message");
    })?;
    txt.push('\n');
    writer.write_all(txt.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
