// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background ingestion
//!
//! Ingestion runs on the blocking thread pool and talks to its caller
//! through two channels: an unbounded stream of progress percentages and a
//! oneshot carrying the terminal result. The progress sender is dropped
//! before the result is sent, so a caller that drains progress first sees
//! every event before the outcome.

use alpha_boundary_core::{
    ingest_with_progress, read_entities, CadEntity, Ingested, ProgressObserver, ReaderConfig,
};
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};

/// Handle to a running ingestion task
#[derive(Debug)]
pub struct IngestTask {
    progress: mpsc::UnboundedReceiver<u8>,
    outcome: oneshot::Receiver<Result<Ingested>>,
}

impl IngestTask {
    /// Next progress percentage, or `None` once the worker has finished.
    pub async fn next_progress(&mut self) -> Option<u8> {
        self.progress.recv().await
    }

    /// Wait for the terminal result. Progress not yet received is discarded.
    pub async fn finish(self) -> Result<Ingested> {
        match self.outcome.await {
            Ok(result) => result,
            Err(_) => Err(Error::WorkerFailed("ingestion task was dropped".to_string())),
        }
    }
}

/// Flatten `entities` on the blocking pool.
///
/// Must be called from within a tokio runtime.
pub fn spawn_ingest(entities: Vec<CadEntity>) -> IngestTask {
    spawn_worker(move |observer| Ok(ingest_with_progress(&entities, observer)))
}

/// Read a DXF drawing and flatten it on the blocking pool.
///
/// Must be called from within a tokio runtime.
pub fn spawn_load(path: impl Into<PathBuf>, config: ReaderConfig) -> IngestTask {
    let path = path.into();
    spawn_worker(move |observer| {
        let entities = read_entities(&path, &config)?;
        tracing::debug!(path = %path.display(), entities = entities.len(), "Read drawing");
        Ok(ingest_with_progress(&entities, observer))
    })
}

fn spawn_worker<F>(job: F) -> IngestTask
where
    F: FnOnce(&mut dyn ProgressObserver) -> Result<Ingested> + Send + 'static,
{
    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let (outcome_tx, outcome_rx) = oneshot::channel();

    tokio::spawn(async move {
        let joined = tokio::task::spawn_blocking(move || {
            // A closed receiver only means nobody is watching
            let mut observer = |percent: u8| {
                let _ = progress_tx.send(percent);
            };
            job(&mut observer)
        })
        .await;

        let result = match joined {
            Ok(result) => result,
            Err(e) => Err(Error::WorkerFailed(e.to_string())),
        };
        match &result {
            Ok(ingested) => tracing::info!(
                points = ingested.points.len(),
                skipped = ingested.skipped.len(),
                "Ingestion finished"
            ),
            Err(e) => tracing::error!(error = %e, "Ingestion failed"),
        }
        let _ = outcome_tx.send(result);
    });

    IngestTask {
        progress: progress_rx,
        outcome: outcome_rx,
    }
}
