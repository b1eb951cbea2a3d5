//! Settings service
//!
//! Sections live in the database; configuration only provides the values written on
//! first start.

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AppConfig,
    depreciation::{self, DepreciationConfig, DepreciationResult},
    error::{AppError, AppResult},
    models::settings::{
        AuditSettings, BudgetSettings, DepreciationCalculateQuery, MaintenanceSettings,
        SettingsSection, SystemPreferences, SystemSettings,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct SettingsService {
    repository: Repository,
    defaults: SystemSettings,
}

impl SettingsService {
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let defaults = SystemSettings {
            depreciation: config.depreciation.clone(),
            budget: config.budget.clone().into(),
            ..Default::default()
        };
        Self { repository, defaults }
    }

    /// Write every missing section from the startup defaults
    pub async fn seed_defaults(&self) -> AppResult<()> {
        let settings = &self.repository.settings;
        let d = &self.defaults;
        let seeded = [
            settings.seed(SettingsSection::Depreciation, &d.depreciation).await?,
            settings.seed(SettingsSection::Maintenance, &d.maintenance).await?,
            settings.seed(SettingsSection::Audit, &d.audit).await?,
            settings.seed(SettingsSection::System, &d.system).await?,
            settings.seed(SettingsSection::Budget, &d.budget).await?,
        ];

        for (section, created) in SettingsSection::ALL.iter().zip(seeded) {
            if created {
                tracing::info!(section = section.key(), "seeded default settings");
            }
        }
        Ok(())
    }

    pub async fn get_all(&self) -> AppResult<SystemSettings> {
        Ok(SystemSettings {
            depreciation: self.depreciation().await?,
            maintenance: self
                .section(SettingsSection::Maintenance, &self.defaults.maintenance)
                .await?,
            audit: self.section(SettingsSection::Audit, &self.defaults.audit).await?,
            system: self.section(SettingsSection::System, &self.defaults.system).await?,
            budget: self.budget().await?,
        })
    }

    async fn section<T>(&self, section: SettingsSection, fallback: &T) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned + Clone,
    {
        Ok(self
            .repository
            .settings
            .get(section)
            .await?
            .unwrap_or_else(|| fallback.clone()))
    }

    /// Depreciation policy in effect right now
    pub async fn depreciation(&self) -> AppResult<DepreciationConfig> {
        self.section(SettingsSection::Depreciation, &self.defaults.depreciation)
            .await
    }

    pub async fn budget(&self) -> AppResult<BudgetSettings> {
        self.section(SettingsSection::Budget, &self.defaults.budget).await
    }

    pub async fn update_depreciation(&self, data: DepreciationConfig, by: Uuid) -> AppResult<DepreciationConfig> {
        data.validate().map_err(AppError::Validation)?;
        self.repository
            .settings
            .put(SettingsSection::Depreciation, &data, Some(by))
            .await?;
        tracing::info!(method = %data.method, by = %by, "depreciation settings updated");
        Ok(data)
    }

    pub async fn update_maintenance(&self, data: MaintenanceSettings, by: Uuid) -> AppResult<MaintenanceSettings> {
        data.validate()?;
        self.repository
            .settings
            .put(SettingsSection::Maintenance, &data, Some(by))
            .await?;
        Ok(data)
    }

    pub async fn update_audit(&self, data: AuditSettings, by: Uuid) -> AppResult<AuditSettings> {
        data.validate()?;
        self.repository
            .settings
            .put(SettingsSection::Audit, &data, Some(by))
            .await?;
        Ok(data)
    }

    pub async fn update_system(&self, data: SystemPreferences, by: Uuid) -> AppResult<SystemPreferences> {
        self.repository
            .settings
            .put(SettingsSection::System, &data, Some(by))
            .await?;
        Ok(data)
    }

    pub async fn update_budget(&self, data: BudgetSettings, by: Uuid) -> AppResult<BudgetSettings> {
        data.validate()?;
        self.repository
            .settings
            .put(SettingsSection::Budget, &data, Some(by))
            .await?;
        tracing::info!(
            annual_budget = data.department_annual_budget,
            threshold = data.high_value_threshold,
            "budget settings updated"
        );
        Ok(data)
    }

    /// Run the calculator with the persisted policy
    pub async fn calculate(&self, query: &DepreciationCalculateQuery) -> AppResult<DepreciationResult> {
        if query.purchase_price < 0.0 {
            return Err(AppError::Validation("purchasePrice cannot be negative".to_string()));
        }
        let config = self.depreciation().await?;
        Ok(depreciation::depreciate_with(
            query.purchase_price,
            query.purchase_date,
            query.category,
            query.method.unwrap_or(config.method),
            query.current_date.unwrap_or_else(Utc::now),
            &config,
        ))
    }
}
