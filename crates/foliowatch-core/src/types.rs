// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Foliowatch crates.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::availability;
use crate::error::FolioError;

/// A category of document range tracked by the monitor.
///
/// The external source identifies modules by code (`MOD28`, `MOD29`); the
/// enum only covers the two codes the service knows how to label and query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Module {
    /// Invoice folios.
    #[strum(serialize = "MOD28")]
    #[serde(rename = "MOD28")]
    Invoice,
    /// Credit note folios.
    #[strum(serialize = "MOD29")]
    #[serde(rename = "MOD29")]
    CreditNote,
}

impl Module {
    /// Every tracked module, in polling order.
    pub const ALL: [Module; 2] = [Module::Invoice, Module::CreditNote];

    /// The module code used by the external source.
    pub fn code(&self) -> &'static str {
        match self {
            Module::Invoice => "MOD28",
            Module::CreditNote => "MOD29",
        }
    }

    /// Human-readable document type label.
    pub fn document_type(&self) -> &'static str {
        match self {
            Module::Invoice => "Invoice",
            Module::CreditNote => "Credit Note",
        }
    }

    /// Parses a module code, rejecting anything but the known codes.
    pub fn from_code(code: &str) -> Result<Self, FolioError> {
        code.parse::<Module>().map_err(|_| {
            FolioError::Validation(format!(
                "module must be either {} or {}, got `{code}`",
                Module::Invoice.code(),
                Module::CreditNote.code()
            ))
        })
    }
}

/// Document type label for an arbitrary module code.
pub fn document_type_for(code: &str) -> &'static str {
    code.parse::<Module>()
        .map(|m| m.document_type())
        .unwrap_or("Unknown")
}

/// Identity of one folio series at one store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesKey {
    pub store_code: String,
    pub module_code: String,
    pub range_start: i64,
    pub range_end: i64,
}

impl SeriesKey {
    pub fn new(
        store_code: impl Into<String>,
        module_code: impl Into<String>,
        range_start: i64,
        range_end: i64,
    ) -> Self {
        Self {
            store_code: store_code.into(),
            module_code: module_code.into(),
            range_start,
            range_end,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.module_code, self.store_code, self.range_start, self.range_end
        )
    }
}

/// A counter snapshot read from the external source. Never persisted directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSnapshot {
    pub series: SeriesKey,
    pub current_counter: Option<i64>,
    pub active: bool,
    pub source_timestamp: DateTime<Utc>,
}

impl RawSnapshot {
    /// Runs the availability calculator over this snapshot.
    pub fn available_count(&self) -> i64 {
        availability::compute(
            self.series.range_start,
            self.series.range_end,
            self.current_counter,
            self.active,
        )
    }
}

/// One series observation inside an ingestion batch.
///
/// This is the wire shape carried from the poller to the ingestion entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    #[serde(flatten)]
    pub series: SeriesKey,
    #[serde(default)]
    pub current_counter: Option<i64>,
    pub available_count: i64,
    pub active: bool,
    pub source_timestamp: DateTime<Utc>,
}

impl From<&RawSnapshot> for BatchItem {
    fn from(snapshot: &RawSnapshot) -> Self {
        Self {
            series: snapshot.series.clone(),
            current_counter: snapshot.current_counter,
            available_count: snapshot.available_count(),
            active: snapshot.active,
            source_timestamp: snapshot.source_timestamp,
        }
    }
}

/// An ingestion batch split into its two named groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolioBatch {
    /// When the poller queried the source.
    pub queried_at: DateTime<Utc>,
    #[serde(default)]
    pub invoices: Vec<BatchItem>,
    #[serde(default)]
    pub credit_notes: Vec<BatchItem>,
}

impl FolioBatch {
    /// Returns `true` when neither group carries any series.
    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty() && self.credit_notes.is_empty()
    }

    /// Total number of series across both groups.
    pub fn len(&self) -> usize {
        self.invoices.len() + self.credit_notes.len()
    }

    /// All items, invoices first, in submission order.
    pub fn items(&self) -> impl Iterator<Item = &BatchItem> {
        self.invoices.iter().chain(self.credit_notes.iter())
    }
}

/// A history entry before the store assigns `id` and `ingested_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAvailabilityRecord {
    pub series: SeriesKey,
    pub current_counter: Option<i64>,
    pub available_count: i64,
    pub active: bool,
    pub source_timestamp: DateTime<Utc>,
}

impl From<&BatchItem> for NewAvailabilityRecord {
    fn from(item: &BatchItem) -> Self {
        Self {
            series: item.series.clone(),
            current_counter: item.current_counter,
            available_count: item.available_count,
            active: item.active,
            source_timestamp: item.source_timestamp,
        }
    }
}

/// A persisted, immutable history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    pub id: i64,
    #[serde(flatten)]
    pub series: SeriesKey,
    pub current_counter: Option<i64>,
    pub available_count: i64,
    pub active: bool,
    pub source_timestamp: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
}

/// The input to alert evaluation: one series and how many folios it has left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesAvailability {
    pub series: SeriesKey,
    pub available_count: i64,
}

impl From<&BatchItem> for SeriesAvailability {
    fn from(item: &BatchItem) -> Self {
        Self {
            series: item.series.clone(),
            available_count: item.available_count,
        }
    }
}

/// Alert thresholds resolved for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub warning: i64,
    pub critical: i64,
}

impl Thresholds {
    pub const DEFAULT_WARNING: i64 = 100;
    pub const DEFAULT_CRITICAL: i64 = 20;
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: Self::DEFAULT_WARNING,
            critical: Self::DEFAULT_CRITICAL,
        }
    }
}

/// Severity of an alert.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AlertLevel {
    Warning,
    Critical,
}

/// A threshold crossing for one series, produced by one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub level: AlertLevel,
    pub series: SeriesKey,
    pub available_count: i64,
    pub threshold: i64,
    pub message: String,
}

/// A validated history query.
///
/// Construct through [`HistoryQuery::new`], which enforces the page and date
/// constraints so the store never sees an invalid page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    module: Option<Module>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    page_number: u32,
    page_size: u32,
}

impl HistoryQuery {
    pub const DEFAULT_PAGE_SIZE: i64 = 100;

    pub fn new(
        module: Option<&str>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        page_number: i64,
        page_size: i64,
    ) -> Result<Self, FolioError> {
        if page_number < 1 || page_size < 1 {
            return Err(FolioError::Validation(
                "page number and page size must be positive".to_string(),
            ));
        }
        let page_number = u32::try_from(page_number)
            .map_err(|_| FolioError::Validation("page number is too large".to_string()))?;
        let page_size = u32::try_from(page_size)
            .map_err(|_| FolioError::Validation("page size is too large".to_string()))?;

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(FolioError::Validation(
                    "start date cannot be after end date".to_string(),
                ));
            }
        }

        let module = match module {
            Some(code) if !code.is_empty() => Some(Module::from_code(code)?),
            _ => None,
        };

        Ok(Self {
            module,
            start_date,
            end_date,
            page_number,
            page_size,
        })
    }

    /// Unfiltered query for one page.
    pub fn page(page_number: i64, page_size: i64) -> Result<Self, FolioError> {
        Self::new(None, None, None, page_number, page_size)
    }

    pub fn module(&self) -> Option<Module> {
        self.module
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip before the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number - 1) * u64::from(self.page_size)
    }
}

/// A runtime setting stored alongside the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

/// Health status reported by storage probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}
