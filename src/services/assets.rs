//! Asset inventory service

use chrono::{DateTime, Duration, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use uuid::Uuid;
use validator::Validate;

use crate::{
    depreciation::{self, round2, DepreciationConfig},
    error::{AppError, AppResult},
    models::{
        analytics::{AssetDepreciation, DepreciationAnalytics},
        asset::{Asset, AssetQrCode, AssetQuery, AssetView, CreateAsset, RecordAudit, UpdateAsset},
        enums::{AssetCondition, AssetStatus, Capability},
        page_bounds,
        settings::{AuditFrequency, AuditSettings, SettingsSection},
        user::UserClaims,
    },
    repository::Repository,
    services::settings::SettingsService,
    workflow::{self, TimelineEntry, TransitionContext},
};

/// First audit falls due a year after intake
const INITIAL_AUDIT_DAYS: i64 = 365;

pub(crate) fn money(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Attach calculator output to a stored asset
pub fn view(asset: Asset, config: &DepreciationConfig, now: DateTime<Utc>) -> AssetView {
    let depreciation = depreciation::depreciate(
        money(asset.purchase_price),
        asset.purchase_date,
        asset.category,
        now,
        config,
    );
    AssetView { asset, depreciation }
}

#[derive(Clone)]
pub struct AssetsService {
    repository: Repository,
    settings: SettingsService,
}

impl AssetsService {
    pub fn new(repository: Repository, settings: SettingsService) -> Self {
        Self { repository, settings }
    }

    pub async fn search(&self, query: &AssetQuery) -> AppResult<(Vec<AssetView>, i64, i64, i64)> {
        let (page, limit, offset) = page_bounds(query.page, query.limit);
        let (assets, total) = self.repository.assets.search(query, limit, offset).await?;

        let config = self.settings.depreciation().await?;
        let now = Utc::now();
        let views = assets.into_iter().map(|a| view(a, &config, now)).collect();
        Ok((views, total, page, limit))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<AssetView> {
        let asset = self.repository.assets.get_by_id(id).await?;
        let config = self.settings.depreciation().await?;
        Ok(view(asset, &config, Utc::now()))
    }

    pub async fn create(&self, claims: &UserClaims, data: CreateAsset) -> AppResult<Asset> {
        data.validate()?;
        if data.purchase_price < Decimal::ZERO {
            return Err(AppError::Validation("purchasePrice cannot be negative".to_string()));
        }
        if data.current_value.map(|v| v < Decimal::ZERO).unwrap_or(false) {
            return Err(AppError::Validation("currentValue cannot be negative".to_string()));
        }
        if let Some(assignee) = data.assigned_to {
            claims.require(Capability::AssignAssets)?;
            self.ensure_user(assignee).await?;
        }

        let now = Utc::now();
        let mut asset = Asset {
            id: Uuid::new_v4(),
            qr_code_identifier: Asset::qr_identifier(&data.serial_number, now),
            serial_number: data.serial_number,
            name: data.name,
            category: data.category,
            status: data.status.unwrap_or(AssetStatus::Active),
            condition: data.condition.unwrap_or(AssetCondition::Good),
            branch: data.branch,
            location: data.location,
            assigned_to: data.assigned_to,
            purchase_date: data.purchase_date,
            purchase_price: data.purchase_price,
            current_value: data.current_value.unwrap_or(data.purchase_price),
            vendor: data.vendor,
            warranty: data.warranty,
            warranty_expiry: data.warranty_expiry,
            description: data.description,
            last_audit_date: None,
            next_audit_date: Some(now + Duration::days(INITIAL_AUDIT_DAYS)),
            tags: data.tags,
            custom_fields: data.custom_fields,
            timeline: Vec::new(),
            created_by: Some(claims.user_id),
            created_at: now,
            updated_at: now,
        };

        let ctx = TransitionContext::by(claims.user_id);
        let description = format!("Asset {} registered at {}", asset.name, asset.location);
        workflow::record(&mut asset, "Asset created", description, &ctx);

        let created = self.repository.assets.create(&asset).await?;
        tracing::info!(asset_id = %created.id, serial = %created.serial_number, "asset created");
        Ok(created)
    }

    /// Apply an allow-listed update; status moves go through the workflow
    pub async fn update(&self, claims: &UserClaims, id: Uuid, data: UpdateAsset) -> AppResult<Asset> {
        data.validate()?;
        if data.current_value.map(|v| v < Decimal::ZERO).unwrap_or(false) {
            return Err(AppError::Validation("currentValue cannot be negative".to_string()));
        }
        if let Some(assignee) = data.assigned_to {
            claims.require(Capability::AssignAssets)?;
            if let Some(user) = assignee {
                self.ensure_user(user).await?;
            }
        }

        let mut tx = self.repository.pool.begin().await?;
        let mut asset = self.repository.assets.get_for_update(&mut *tx, id).await?;
        let ctx = TransitionContext::by(claims.user_id).with_notes(data.notes.clone());

        if let Some(status) = data.status.filter(|s| *s != asset.status) {
            workflow::transition(&mut asset, status, &ctx)?;
        }

        if let Some(assignee) = data.assigned_to.filter(|a| *a != asset.assigned_to) {
            asset.assigned_to = assignee;
            let (action, description) = match assignee {
                Some(user) => ("Asset assigned", format!("Asset assigned to user {}", user)),
                None => ("Asset unassigned", "Asset returned to the pool".to_string()),
            };
            workflow::record(&mut asset, action, description, &ctx);
        }

        if let Some(name) = data.name {
            asset.name = name;
        }
        if let Some(category) = data.category {
            asset.category = category;
        }
        if let Some(condition) = data.condition {
            asset.condition = condition;
        }
        if let Some(location) = data.location {
            asset.location = location;
        }
        if let Some(value) = data.current_value {
            asset.current_value = value;
        }
        if let Some(description) = data.description {
            asset.description = Some(description);
        }
        if let Some(warranty) = data.warranty {
            asset.warranty = Some(warranty);
        }
        if let Some(expiry) = data.warranty_expiry {
            asset.warranty_expiry = Some(expiry);
        }
        if let Some(vendor) = data.vendor {
            asset.vendor = vendor;
        }

        let saved = self.repository.assets.save(&mut *tx, &asset).await?;
        tx.commit().await?;
        Ok(saved)
    }

    /// Stamp an audit and schedule the next one from the audit settings
    pub async fn record_audit(&self, claims: &UserClaims, id: Uuid, data: RecordAudit) -> AppResult<Asset> {
        let audit: AuditSettings = self
            .repository
            .settings
            .get(SettingsSection::Audit)
            .await?
            .unwrap_or_default();
        let interval = match audit.frequency {
            AuditFrequency::Monthly => Duration::days(30),
            AuditFrequency::Quarterly => Duration::days(91),
            AuditFrequency::Annually => Duration::days(365),
        };

        let mut tx = self.repository.pool.begin().await?;
        let mut asset = self.repository.assets.get_for_update(&mut *tx, id).await?;
        let ctx = TransitionContext::by(claims.user_id);

        asset.last_audit_date = Some(ctx.now);
        asset.next_audit_date = Some(ctx.now + interval);
        if let Some(condition) = data.condition {
            asset.condition = condition;
        }
        let description = match data.notes.filter(|n| !n.trim().is_empty()) {
            Some(notes) => format!("Audit recorded, condition {}: {}", asset.condition, notes),
            None => format!("Audit recorded, condition {}", asset.condition),
        };
        workflow::record(&mut asset, "Asset audited", description, &ctx);

        let saved = self.repository.assets.save(&mut *tx, &asset).await?;
        tx.commit().await?;
        Ok(saved)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.assets.delete(id).await?;
        tracing::info!(asset_id = %id, "asset deleted");
        Ok(())
    }

    pub async fn qr_code(&self, id: Uuid) -> AppResult<AssetQrCode> {
        let asset = self.repository.assets.get_by_id(id).await?;
        Ok(AssetQrCode {
            asset_id: asset.id,
            serial_number: asset.serial_number,
            qr_code_identifier: asset.qr_code_identifier,
        })
    }

    pub async fn timeline(&self, id: Uuid) -> AppResult<Vec<TimelineEntry<AssetStatus>>> {
        Ok(self.repository.assets.get_by_id(id).await?.timeline)
    }

    /// Calculator output for every asset still in service, grouped by category
    pub async fn depreciation_analytics(&self) -> AppResult<DepreciationAnalytics> {
        let config = self.settings.depreciation().await?;
        let now = Utc::now();
        let assets = self.repository.assets.list_in_service().await?;

        let rows = assets
            .into_iter()
            .map(|asset| {
                let AssetView { asset, depreciation } = view(asset, &config, now);
                let annual_depreciation = if depreciation.age_in_years > 0.0 {
                    round2(depreciation.depreciation_amount / depreciation.age_in_years)
                } else {
                    0.0
                };
                AssetDepreciation {
                    id: asset.id,
                    name: asset.name,
                    category: asset.category,
                    current_value: asset.current_value,
                    depreciation,
                    annual_depreciation,
                }
            })
            .collect();

        Ok(DepreciationAnalytics::from_assets(rows))
    }

    async fn ensure_user(&self, id: Uuid) -> AppResult<()> {
        if self.repository.users.exists(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("User with id {} not found", id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::AssetCategory;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn asset(purchase_date: DateTime<Utc>) -> Asset {
        Asset {
            id: Uuid::new_v4(),
            serial_number: "SN-1".into(),
            name: "Laptop".into(),
            category: AssetCategory::Laptop,
            status: AssetStatus::Active,
            condition: AssetCondition::Good,
            branch: "HQ".into(),
            location: "Floor 2".into(),
            assigned_to: None,
            purchase_date,
            purchase_price: Decimal::from(1000),
            current_value: Decimal::from(950),
            vendor: "Dell".into(),
            warranty: None,
            warranty_expiry: None,
            description: None,
            qr_code_identifier: "ASSET-SN-1-0".into(),
            last_audit_date: None,
            next_audit_date: None,
            tags: Vec::new(),
            custom_fields: BTreeMap::new(),
            timeline: Vec::new(),
            created_by: None,
            created_at: purchase_date,
            updated_at: purchase_date,
        }
    }

    #[test]
    fn test_view_keeps_stored_value_next_to_calculated() {
        let purchased = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let now = purchased + Duration::days(365);
        let v = view(asset(purchased), &DepreciationConfig::default(), now);
        assert_eq!(v.asset.current_value, Decimal::from(950));
        assert_eq!(v.depreciation.current_value, 700.0);
        assert_eq!(v.depreciation.age_in_years, 1.0);
    }

    #[test]
    fn test_money_conversion() {
        assert_eq!(money(Decimal::new(12345, 2)), 123.45);
    }
}
