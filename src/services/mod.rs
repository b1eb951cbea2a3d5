//! Business logic services

pub mod acquisitions;
pub mod assets;
pub mod dashboard;
pub mod maintenance;
pub mod reports;
pub mod settings;
pub mod transfers;
pub mod users;
pub mod vendors;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub assets: assets::AssetsService,
    pub maintenance: maintenance::MaintenanceService,
    pub transfers: transfers::TransfersService,
    pub acquisitions: acquisitions::AcquisitionsService,
    pub vendors: vendors::VendorsService,
    pub reports: reports::ReportsService,
    pub dashboard: dashboard::DashboardService,
    pub settings: settings::SettingsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let settings = settings::SettingsService::new(repository.clone(), config);
        Self {
            users: users::UsersService::new(repository.clone(), config.auth.clone()),
            assets: assets::AssetsService::new(repository.clone(), settings.clone()),
            maintenance: maintenance::MaintenanceService::new(repository.clone()),
            transfers: transfers::TransfersService::new(repository.clone()),
            acquisitions: acquisitions::AcquisitionsService::new(repository.clone(), settings.clone()),
            vendors: vendors::VendorsService::new(repository.clone()),
            reports: reports::ReportsService::new(repository.clone(), settings.clone()),
            dashboard: dashboard::DashboardService::new(repository.clone(), settings.clone()),
            settings,
            repository,
        }
    }

    /// Round trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.repository.pool).await?;
        Ok(())
    }
}
