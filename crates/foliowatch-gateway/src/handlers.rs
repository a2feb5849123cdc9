// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers for the folio API.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use foliowatch_alert::IngestOutcome;
use foliowatch_core::types::document_type_for;
use foliowatch_core::{AvailabilityRecord, FolioBatch, HealthStatus, HistoryQuery, Module};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Response body for `POST /api/folios/update`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub message: String,
    pub records: usize,
    pub alerts_raised: usize,
}

/// One entry of `GET /api/folios/summary`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    pub document_type: String,
    pub module_code: String,
    pub total_available_folios: i64,
    pub series: Vec<AvailabilityRecord>,
}

/// Query string for `GET /api/folios/history`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    pub module: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

/// Response body for `DELETE /api/folios/history/cleanup`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub deleted: usize,
    pub retention_days: i64,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub storage: String,
}

/// POST /api/folios/update
///
/// Stores the batch and runs the alert check. An empty batch is accepted
/// and ignored.
pub async fn post_update(
    State(state): State<GatewayState>,
    Json(batch): Json<FolioBatch>,
) -> Result<Json<UpdateResponse>, ApiError> {
    info!(
        invoices = batch.invoices.len(),
        credit_notes = batch.credit_notes.len(),
        "folio update received"
    );

    let response = match state.ingestor.ingest(&batch).await? {
        IngestOutcome::Empty => UpdateResponse {
            message: "No folio data received.".to_string(),
            records: 0,
            alerts_raised: 0,
        },
        IngestOutcome::Stored { records, alerts } => UpdateResponse {
            message: "Folio data updated successfully.".to_string(),
            records,
            alerts_raised: alerts.raised,
        },
    };
    Ok(Json(response))
}

/// GET /api/folios/summary
pub async fn get_summary(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<ModuleSummary>>, ApiError> {
    let latest = state.ingestor.store().latest().await?;
    Ok(Json(summarize(latest)))
}

/// Groups latest records by module code, in code order.
pub fn summarize(latest: Vec<AvailabilityRecord>) -> Vec<ModuleSummary> {
    let mut groups: BTreeMap<String, Vec<AvailabilityRecord>> = BTreeMap::new();
    for record in latest {
        groups
            .entry(record.series.module_code.clone())
            .or_default()
            .push(record);
    }

    groups
        .into_iter()
        .map(|(code, series)| ModuleSummary {
            document_type: document_type_for(&code).to_string(),
            total_available_folios: series.iter().map(|r| r.available_count).sum(),
            module_code: code,
            series,
        })
        .collect()
}

/// GET /api/folios/invoices
pub async fn get_invoices(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<AvailabilityRecord>>, ApiError> {
    latest_for(&state, Module::Invoice).await
}

/// GET /api/folios/creditnotes
pub async fn get_credit_notes(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<AvailabilityRecord>>, ApiError> {
    latest_for(&state, Module::CreditNote).await
}

async fn latest_for(
    state: &GatewayState,
    module: Module,
) -> Result<Json<Vec<AvailabilityRecord>>, ApiError> {
    let records = state.ingestor.store().latest_by_module(module).await?;
    Ok(Json(records))
}

/// GET /api/folios/history
pub async fn get_history(
    State(state): State<GatewayState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<AvailabilityRecord>>, ApiError> {
    let query = HistoryQuery::new(
        params.module.as_deref(),
        params.start_date,
        params.end_date,
        params.page_number.unwrap_or(1),
        params.page_size.unwrap_or(HistoryQuery::DEFAULT_PAGE_SIZE),
    )?;
    let records = state.ingestor.store().history(&query).await?;
    Ok(Json(records))
}

/// DELETE /api/folios/history/cleanup
///
/// Prunes with the configured retention. A non-positive retention deletes
/// nothing.
pub async fn delete_cleanup(
    State(state): State<GatewayState>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let retention_days = state.retention_days;
    if retention_days <= 0 {
        warn!(retention_days, "invalid retention period, cleanup skipped");
        return Ok(Json(CleanupResponse {
            deleted: 0,
            retention_days,
        }));
    }

    let deleted = state
        .ingestor
        .store()
        .delete_older_than(retention_days)
        .await?;
    info!(deleted, retention_days, "history cleanup completed");
    Ok(Json(CleanupResponse {
        deleted,
        retention_days,
    }))
}

/// GET /health
///
/// Public. Answers 503 when the storage probe fails.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let storage = match state.ingestor.store().health_check().await {
        Ok(HealthStatus::Healthy) => Ok(()),
        Ok(HealthStatus::Unhealthy(reason)) => Err(reason),
        Err(e) => Err(e.to_string()),
    };

    let (status, label, storage) = match storage {
        Ok(()) => (StatusCode::OK, "ok", "healthy".to_string()),
        Err(reason) => {
            warn!(reason = %reason, "storage health probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", reason)
        }
    };

    let body = HealthResponse {
        status: label.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        storage,
    };
    (status, Json(body)).into_response()
}
