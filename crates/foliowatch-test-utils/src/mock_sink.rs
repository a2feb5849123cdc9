// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notification sink that captures events for assertion.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use foliowatch_core::{AlertEvent, FolioError, NotificationSink};

/// Captures every delivered event. A failing sink still records the
/// attempt, then returns a [`FolioError::Notification`].
#[derive(Clone, Default)]
pub struct MockSink {
    events: Arc<Mutex<Vec<AlertEvent>>>,
    fail: bool,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Events passed to `deliver()` so far.
    pub fn events(&self) -> Vec<AlertEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }
}

#[async_trait]
impl NotificationSink for MockSink {
    fn name(&self) -> &str {
        "mock"
    }

    async fn deliver(&self, event: &AlertEvent) -> Result<(), FolioError> {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
        if self.fail {
            return Err(FolioError::Notification {
                message: "mock sink configured to fail".into(),
                source: None,
            });
        }
        Ok(())
    }
}
