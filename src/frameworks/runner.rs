// Framework bootstrap: tracing, configuration and the stdio match session.

use crate::domain::systems::MatchOutcome;
use crate::domain::tuning::maps;
use crate::frameworks::config;
use crate::interface_adapters::setup::load_setup_file;
use crate::interface_adapters::stdio::{read_client_messages, write_server_messages};
use crate::use_cases::{MatchHandle, MatchSetup, SessionSettings};

use std::io::Result;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Stdout carries the protocol; logs go to stderr.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Runs one match, reading client lines from `reader` and writing server lines to `writer`.
pub async fn run<R, W>(
    setup: MatchSetup,
    settings: SessionSettings,
    reader: R,
    writer: W,
) -> Result<Option<MatchOutcome>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let handle = MatchHandle::spawn(setup, &settings)
        .map_err(|e| std::io::Error::other(format!("invalid match setup: {e}")))?;

    let (error_tx, error_rx) = mpsc::channel(config::ERROR_CHANNEL_CAPACITY);
    let input_tx = handle.input_tx.clone();
    let reader_task = tokio::spawn(async move {
        if let Err(e) = read_client_messages(reader, input_tx, error_tx).await {
            tracing::error!(error = %e, "input reader failed");
        }
    });

    let written = write_server_messages(
        handle.subscribe(),
        handle.phase_rx.clone(),
        error_rx,
        writer,
    )
    .await;

    reader_task.abort();
    handle.shutdown();
    let outcome = handle.finished().await;

    written.map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(outcome)
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let setup = match config::match_config_path() {
        Some(path) => load_setup_file(&path).inspect_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "failed to load match setup");
        }),
        None => {
            let sizes = config::team_sizes();
            tracing::debug!(?sizes, map = %config::map_id(), "match setup from environment");
            Ok(MatchSetup::from_team_sizes(&sizes).with_map(&maps::map_by_id(&config::map_id())))
        }
    }
    .map_err(|e| std::io::Error::other(e.to_string()))?;

    let settings = SessionSettings {
        input_channel_capacity: config::INPUT_CHANNEL_CAPACITY,
        update_broadcast_capacity: config::UPDATE_BROADCAST_CAPACITY,
        tick_interval: config::tick_interval(),
    };

    let outcome = run(
        setup,
        settings,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    match outcome {
        Some(MatchOutcome::Winner(team)) => tracing::info!(team = %team, "match over"),
        Some(MatchOutcome::Draw) => tracing::info!("match over: draw"),
        None => tracing::info!("match stopped before a winner was decided"),
    }
    Ok(())
}
