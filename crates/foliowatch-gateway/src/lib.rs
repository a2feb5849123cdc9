// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API for Foliowatch.
//!
//! Accepts batches from the poller on `POST /api/folios/update` and serves
//! the latest-state, summary and history views. Every `/api` route requires
//! the `X-API-KEY` header; `/health` is public.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use error::ApiError;
pub use server::{GatewayState, HealthState, build_router, serve, serve_listener};
