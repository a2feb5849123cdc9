// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::error::FolioError;
use crate::types::{Module, RawSnapshot};

/// Provider of raw counter snapshots from the external transactional system.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Snapshots of every active series for `module`.
    async fn snapshots(&self, module: Module) -> Result<Vec<RawSnapshot>, FolioError>;
}
