//! Log writer task: mirrors every bus line to tracing and appends it to the
//! log file.

use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use matterhub_domain::log::LogLine;

/// Spawn the writer. It stops once `cancel` fires and the pending lines
/// are written, or when the bus is dropped.
pub fn spawn(
    rx: broadcast::Receiver<LogLine>,
    path: Option<PathBuf>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run(rx, path, cancel))
}

async fn run(
    mut rx: broadcast::Receiver<LogLine>,
    path: Option<PathBuf>,
    cancel: CancellationToken,
) {
    let mut file = match &path {
        Some(path) => open(path).await,
        None => None,
    };

    loop {
        let received = tokio::select! {
            biased;
            received = rx.recv() => received,
            () = cancel.cancelled() => break,
        };
        match received {
            Ok(line) => write(&mut file, &line).await,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "log writer lagged behind");
            }
            Err(RecvError::Closed) => return,
        }
    }

    while let Ok(line) = rx.try_recv() {
        write(&mut file, &line).await;
    }
    if let Some(file) = file.as_mut() {
        if let Err(err) = file.flush().await {
            tracing::warn!(error = %err, "failed to flush log file");
        }
    }
}

async fn open(path: &Path) -> Option<File> {
    match OpenOptions::new().create(true).append(true).open(path).await {
        Ok(file) => Some(file),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "log file unavailable");
            None
        }
    }
}

async fn write(file: &mut Option<File>, line: &LogLine) {
    tracing::info!(target: "matterhub", source = %line.source, "{}", line.message);

    let Some(handle) = file.as_mut() else {
        return;
    };
    if let Err(err) = handle.write_all(format!("{line}\n").as_bytes()).await {
        tracing::warn!(error = %err, "failed to write log file, disabling it");
        *file = None;
    }
}
