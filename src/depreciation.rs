//! Asset depreciation calculator
//!
//! Pure functions over an explicit [`DepreciationConfig`]; nothing here touches the
//! database. The stored `current_value` of an asset is independent from these figures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::models::enums::AssetCategory;

const DAYS_PER_YEAR: f64 = 365.0;
const FALLBACK_LIFESPAN_YEARS: f64 = 5.0;
const FALLBACK_DECLINING_RATE: f64 = 20.0;
const FALLBACK_CUSTOM_RATE: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DepreciationMethod {
    #[serde(rename = "straight-line")]
    StraightLine,
    #[serde(rename = "declining-balance")]
    DecliningBalance,
    #[serde(rename = "custom")]
    Custom,
}

impl DepreciationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepreciationMethod::StraightLine => "straight-line",
            DepreciationMethod::DecliningBalance => "declining-balance",
            DepreciationMethod::Custom => "custom",
        }
    }
}

impl std::fmt::Display for DepreciationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Depreciation policy applied to every asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DepreciationConfig {
    pub method: DepreciationMethod,
    /// Useful life in years per category
    #[serde(alias = "default_lifespan")]
    pub default_lifespan: BTreeMap<AssetCategory, f64>,
    /// Annual rate in percent per category (declining-balance and custom)
    #[serde(alias = "custom_rates")]
    pub custom_rates: BTreeMap<AssetCategory, f64>,
    /// Share of the purchase price kept as salvage value, in percent
    #[serde(alias = "salvage_value_percentage")]
    pub salvage_value_percentage: f64,
}

impl Default for DepreciationConfig {
    fn default() -> Self {
        use AssetCategory::*;

        let lifespans = [
            (Electronics, 3.0),
            (Furniture, 7.0),
            (Vehicles, 5.0),
            (Equipment, 5.0),
            (Laptop, 3.0),
            (Monitor, 5.0),
            (Mobile, 2.0),
            (Tablet, 3.0),
            (Desktop, 4.0),
        ];
        let rates = [
            (Electronics, 25.0),
            (Furniture, 10.0),
            (Vehicles, 20.0),
            (Equipment, 15.0),
            (Laptop, 30.0),
            (Monitor, 15.0),
            (Mobile, 40.0),
            (Tablet, 25.0),
            (Desktop, 20.0),
        ];

        Self {
            method: DepreciationMethod::StraightLine,
            default_lifespan: lifespans.into_iter().collect(),
            custom_rates: rates.into_iter().collect(),
            salvage_value_percentage: 10.0,
        }
    }
}

impl DepreciationConfig {
    pub fn lifespan(&self, category: AssetCategory) -> f64 {
        self.default_lifespan
            .get(&category)
            .copied()
            .filter(|years| *years > 0.0)
            .unwrap_or(FALLBACK_LIFESPAN_YEARS)
    }

    fn rate(&self, category: AssetCategory, fallback: f64) -> f64 {
        self.custom_rates.get(&category).copied().unwrap_or(fallback)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.salvage_value_percentage) {
            return Err("salvageValuePercentage must be between 0 and 100".to_string());
        }
        if let Some((category, _)) = self.default_lifespan.iter().find(|(_, y)| **y <= 0.0) {
            return Err(format!("Lifespan for {} must be positive", category));
        }
        if let Some((category, _)) = self
            .custom_rates
            .iter()
            .find(|(_, r)| !(0.0..=100.0).contains(*r))
        {
            return Err(format!("Rate for {} must be between 0 and 100", category));
        }
        Ok(())
    }
}

/// Calculator output; money, rate and age are rounded to two decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepreciationResult {
    pub purchase_price: f64,
    pub current_value: f64,
    pub depreciation_amount: f64,
    /// Share of the purchase price already depreciated, in percent
    pub depreciation_rate: f64,
    pub age_in_years: f64,
    pub method: DepreciationMethod,
    pub salvage_value: f64,
    pub remaining_lifespan: f64,
}

/// Fractional years between two instants, 365-day years, never negative
pub fn age_in_years(purchase_date: DateTime<Utc>, as_of: DateTime<Utc>) -> f64 {
    let seconds = (as_of - purchase_date).num_seconds() as f64;
    (seconds / 86_400.0 / DAYS_PER_YEAR).max(0.0)
}

/// Depreciate using the configured method
pub fn depreciate(
    purchase_price: f64,
    purchase_date: DateTime<Utc>,
    category: AssetCategory,
    as_of: DateTime<Utc>,
    config: &DepreciationConfig,
) -> DepreciationResult {
    depreciate_with(purchase_price, purchase_date, category, config.method, as_of, config)
}

/// Depreciate with an explicit method, reading the category tables from `config`
pub fn depreciate_with(
    purchase_price: f64,
    purchase_date: DateTime<Utc>,
    category: AssetCategory,
    method: DepreciationMethod,
    as_of: DateTime<Utc>,
    config: &DepreciationConfig,
) -> DepreciationResult {
    let p = purchase_price.max(0.0);
    let age = age_in_years(purchase_date, as_of);
    let lifespan = config.lifespan(category);
    let salvage = p * config.salvage_value_percentage / 100.0;
    let depreciable = (p - salvage).max(0.0);

    let (current_value, amount) = match method {
        DepreciationMethod::StraightLine => {
            let annual = depreciable / lifespan;
            let amount = (annual * age).min(depreciable);
            ((p - amount).max(salvage), amount)
        }
        DepreciationMethod::DecliningBalance => {
            let rate = config.rate(category, FALLBACK_DECLINING_RATE);
            let value = (p * (1.0 - rate / 100.0).max(0.0).powf(age)).max(salvage);
            (value, p - value)
        }
        DepreciationMethod::Custom => {
            let rate = config.rate(category, FALLBACK_CUSTOM_RATE);
            let amount = (p * rate * age / 100.0).min(depreciable);
            ((p - amount).max(salvage), amount)
        }
    };

    let rate = if p > 0.0 { amount / p * 100.0 } else { 0.0 };

    DepreciationResult {
        purchase_price: round2(p),
        current_value: round2(current_value),
        depreciation_amount: round2(amount),
        depreciation_rate: round2(rate),
        age_in_years: round2(age),
        method,
        salvage_value: round2(salvage),
        remaining_lifespan: round2((lifespan - age).max(0.0)),
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn purchase() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()
    }

    fn years_later(years: i64) -> DateTime<Utc> {
        purchase() + Duration::days(365 * years)
    }

    #[test]
    fn test_straight_line_at_purchase_date() {
        let config = DepreciationConfig::default();
        let result = depreciate(1000.0, purchase(), AssetCategory::Laptop, purchase(), &config);
        assert_eq!(result.current_value, 1000.0);
        assert_eq!(result.depreciation_amount, 0.0);
        assert_eq!(result.depreciation_rate, 0.0);
        assert_eq!(result.remaining_lifespan, 3.0);
        assert_eq!(result.salvage_value, 100.0);
    }

    #[test]
    fn test_straight_line_one_year() {
        let config = DepreciationConfig::default();
        // Laptop: 3 years, (1000 - 100) / 3 = 300 per year
        let result = depreciate(1000.0, purchase(), AssetCategory::Laptop, years_later(1), &config);
        assert_eq!(result.depreciation_amount, 300.0);
        assert_eq!(result.current_value, 700.0);
        assert_eq!(result.depreciation_rate, 30.0);
        assert_eq!(result.age_in_years, 1.0);
        assert_eq!(result.remaining_lifespan, 2.0);
    }

    #[test]
    fn test_straight_line_caps_at_salvage() {
        let config = DepreciationConfig::default();
        let result = depreciate(1000.0, purchase(), AssetCategory::Mobile, years_later(10), &config);
        assert_eq!(result.current_value, 100.0);
        assert_eq!(result.depreciation_amount, 900.0);
        assert_eq!(result.remaining_lifespan, 0.0);
    }

    #[test]
    fn test_declining_balance() {
        let config = DepreciationConfig::default();
        // Monitor: 15% per year, 1000 * 0.85^2 = 722.5
        let result = depreciate_with(
            1000.0,
            purchase(),
            AssetCategory::Monitor,
            DepreciationMethod::DecliningBalance,
            years_later(2),
            &config,
        );
        assert_eq!(result.current_value, 722.5);
        assert_eq!(result.depreciation_amount, 277.5);
        assert_eq!(result.method, DepreciationMethod::DecliningBalance);
    }

    #[test]
    fn test_custom_rate() {
        let config = DepreciationConfig::default();
        // Furniture: 10% of purchase price per year
        let result = depreciate_with(
            2000.0,
            purchase(),
            AssetCategory::Furniture,
            DepreciationMethod::Custom,
            years_later(3),
            &config,
        );
        assert_eq!(result.depreciation_amount, 600.0);
        assert_eq!(result.current_value, 1400.0);
    }

    #[test]
    fn test_missing_category_falls_back() {
        let mut config = DepreciationConfig::default();
        config.default_lifespan.clear();
        config.custom_rates.clear();

        let straight = depreciate(1000.0, purchase(), AssetCategory::Laptop, years_later(1), &config);
        // 5 year fallback: 900 / 5 = 180
        assert_eq!(straight.depreciation_amount, 180.0);

        let declining = depreciate_with(
            1000.0,
            purchase(),
            AssetCategory::Laptop,
            DepreciationMethod::DecliningBalance,
            years_later(1),
            &config,
        );
        assert_eq!(declining.current_value, 800.0);

        let custom = depreciate_with(
            1000.0,
            purchase(),
            AssetCategory::Laptop,
            DepreciationMethod::Custom,
            years_later(1),
            &config,
        );
        assert_eq!(custom.depreciation_amount, 150.0);
    }

    #[test]
    fn test_never_below_salvage() {
        let config = DepreciationConfig::default();
        let methods = [
            DepreciationMethod::StraightLine,
            DepreciationMethod::DecliningBalance,
            DepreciationMethod::Custom,
        ];
        for method in methods {
            for category in AssetCategory::ALL {
                for days in [0, 30, 365, 1000, 4000, 20_000] {
                    let as_of = purchase() + Duration::days(days);
                    let result =
                        depreciate_with(1234.56, purchase(), *category, method, as_of, &config);
                    assert!(
                        result.current_value >= round2(1234.56 * 0.10),
                        "{:?} {:?} {} days gave {}",
                        method,
                        category,
                        days,
                        result.current_value
                    );
                    assert!(result.current_value <= 1234.56);
                }
            }
        }
    }

    #[test]
    fn test_future_purchase_date_is_age_zero() {
        let config = DepreciationConfig::default();
        let result = depreciate(500.0, years_later(1), AssetCategory::Tablet, purchase(), &config);
        assert_eq!(result.age_in_years, 0.0);
        assert_eq!(result.current_value, 500.0);
    }

    #[test]
    fn test_zero_price() {
        let config = DepreciationConfig::default();
        let result = depreciate(0.0, purchase(), AssetCategory::Desktop, years_later(2), &config);
        assert_eq!(result.current_value, 0.0);
        assert_eq!(result.depreciation_rate, 0.0);
    }

    #[test]
    fn test_config_validation() {
        let mut config = DepreciationConfig::default();
        assert!(config.validate().is_ok());
        config.salvage_value_percentage = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_json_shape() {
        let json = serde_json::to_value(DepreciationConfig::default()).unwrap();
        assert_eq!(json["method"], "straight-line");
        assert_eq!(json["defaultLifespan"]["Mobile"], 2.0);
        assert_eq!(json["customRates"]["Laptop"], 30.0);
        assert_eq!(json["salvageValuePercentage"], 10.0);
    }
}
