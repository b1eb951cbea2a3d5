//! AssetFlow IT Asset Management
//!
//! REST JSON API for tracking company assets through their lifecycle:
//! inventory with depreciation, maintenance requests, inter-branch transfers,
//! acquisition requests with vendor quotes and budgets, reports and dashboards.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod depreciation;
pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
pub mod services;
pub mod workflow;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
