// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch submitter that records calls and can stall or fail on demand.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use foliowatch_core::{BatchSubmitter, FolioBatch, FolioError};

/// Records each submitted batch and the instant the call began.
///
/// Delays queued with [`with_delays`](Self::with_delays) are consumed one
/// per call, so a test can make a single cycle overrun the poll interval.
/// Instants come from `tokio::time`, which follows paused test clocks.
#[derive(Default)]
pub struct RecordingSubmitter {
    batches: Mutex<Vec<FolioBatch>>,
    started: Mutex<Vec<Instant>>,
    delays: Mutex<VecDeque<Duration>>,
    fail: bool,
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delays(self, delays: impl IntoIterator<Item = Duration>) -> Self {
        if let Ok(mut queue) = self.delays.lock() {
            queue.extend(delays);
        }
        self
    }

    pub fn batches(&self) -> Vec<FolioBatch> {
        self.batches
            .lock()
            .map(|batches| batches.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.started.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Instants at which each `submit()` call started.
    pub fn started(&self) -> Vec<Instant> {
        self.started
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BatchSubmitter for RecordingSubmitter {
    async fn submit(&self, batch: &FolioBatch) -> Result<(), FolioError> {
        if let Ok(mut started) = self.started.lock() {
            started.push(Instant::now());
        }
        let delay = self.delays.lock().ok().and_then(|mut q| q.pop_front());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Ok(mut batches) = self.batches.lock() {
            batches.push(batch.clone());
        }
        if self.fail {
            return Err(FolioError::Transport {
                message: "recording submitter configured to fail".into(),
                source: None,
            });
        }
        Ok(())
    }
}
