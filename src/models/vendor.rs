//! Vendor model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{Availability, Specialization};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[sqlx(json)]
    pub address: Address,
    #[sqlx(json)]
    pub specializations: Vec<Specialization>,
    /// 1 to 5
    pub rating: f64,
    pub response_time: Option<String>,
    pub hourly_rate: Option<Decimal>,
    #[sqlx(json)]
    pub contract: ContractDetails,
    #[sqlx(json)]
    pub certifications: Vec<String>,
    #[sqlx(json)]
    pub service_areas: Vec<String>,
    pub availability: Availability,
    pub is_active: bool,
    #[sqlx(json)]
    pub performance: VendorPerformance,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractDetails {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub terms: Option<String>,
    pub sla: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorPerformance {
    pub tickets_completed: i64,
    /// Hours
    pub average_resolution_time: f64,
    pub satisfaction_score: f64,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorQuery {
    pub specialization: Option<Specialization>,
    pub min_rating: Option<f64>,
    pub availability: Option<Availability>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendor {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 50, message = "Phone is required"))]
    pub phone: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub specializations: Vec<Specialization>,
    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: Option<f64>,
    pub response_time: Option<String>,
    pub hourly_rate: Option<Decimal>,
    #[serde(default)]
    pub contract: ContractDetails,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub service_areas: Vec<String>,
    pub availability: Option<Availability>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVendor {
    #[validate(length(min = 1, max = 200, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub specializations: Option<Vec<Specialization>>,
    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: Option<f64>,
    pub response_time: Option<String>,
    pub hourly_rate: Option<Decimal>,
    pub contract: Option<ContractDetails>,
    pub certifications: Option<Vec<String>>,
    pub service_areas: Option<Vec<String>>,
    pub availability: Option<Availability>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let mut data = UpdateVendor {
            rating: Some(6.0),
            ..Default::default()
        };
        assert!(data.validate().is_err());
        data.rating = Some(4.5);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_create_defaults_nested_documents() {
        let data: CreateVendor = serde_json::from_str(
            r#"{"name": "Fixit", "email": "ops@fixit.io", "phone": "555", "specializations": ["Laptop Repair"]}"#,
        )
        .unwrap();
        assert_eq!(data.address, Address::default());
        assert_eq!(data.specializations, vec![Specialization::LaptopRepair]);
        assert!(data.validate().is_ok());
    }
}
