//! Data models for AssetFlow

pub mod acquisition;
pub mod analytics;
pub mod asset;
pub mod enums;
pub mod maintenance;
pub mod report;
pub mod settings;
pub mod transfer;
pub mod user;
pub mod vendor;

use serde::{Deserialize, Deserializer};

// Re-export commonly used types
pub use acquisition::AcquisitionRequest;
pub use asset::Asset;
pub use maintenance::MaintenanceRequest;
pub use report::Report;
pub use transfer::TransferRequest;
pub use user::{User, UserClaims};
pub use vendor::Vendor;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Resolve `page`/`limit` query values into (page, limit, offset)
pub fn page_bounds(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit, (page - 1) * limit)
}

/// Lets update payloads tell "field absent" from "field set to null".
///
/// Use with `#[serde(default, deserialize_with = "deserialize_some")]` on an `Option<Option<T>>`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(None, None), (1, 10, 0));
        assert_eq!(page_bounds(Some(3), Some(20)), (3, 20, 40));
        assert_eq!(page_bounds(Some(0), Some(1000)), (1, 100, 0));
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        assigned_to: Option<Option<String>>,
    }

    #[test]
    fn test_deserialize_some_distinguishes_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.assigned_to, None);
        let cleared: Patch = serde_json::from_str(r#"{"assigned_to": null}"#).unwrap();
        assert_eq!(cleared.assigned_to, Some(None));
        let set: Patch = serde_json::from_str(r#"{"assigned_to": "u1"}"#).unwrap();
        assert_eq!(set.assigned_to, Some(Some("u1".to_string())));
    }
}
