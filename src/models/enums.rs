//! Shared domain enums
//!
//! Every enum here is stored as TEXT and travels over the wire as the same label.

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Declares a closed set of text labels with serde, Display/FromStr and sqlx TEXT codecs.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: &str = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

text_enum! {
    Role {
        Admin => "Admin",
        Manager => "Manager",
        Employee => "Employee",
        Auditor => "Auditor",
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Employee
    }
}

text_enum! {
    /// Named capability held by a user. Admins implicitly hold all of them.
    Capability {
        ViewAssets => "view_assets",
        CreateAssets => "create_assets",
        EditAssets => "edit_assets",
        DeleteAssets => "delete_assets",
        AssignAssets => "assign_assets",
        ViewMaintenance => "view_maintenance",
        CreateMaintenance => "create_maintenance",
        UpdateMaintenance => "update_maintenance",
        ApproveMaintenance => "approve_maintenance",
        RequestTransfers => "request_transfers",
        ApproveTransfers => "approve_transfers",
        RequestAcquisitions => "request_acquisitions",
        ApproveAcquisitions => "approve_acquisitions",
        ViewAllRequests => "view_all_requests",
        ManageVendors => "manage_vendors",
        ViewAnalytics => "view_analytics",
        ViewUsers => "view_users",
        ManageUsers => "manage_users",
        SystemSettings => "system_settings",
    }
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

text_enum! {
    /// Asset category, also the key of the depreciation tables
    AssetCategory {
        Electronics => "Electronics",
        Furniture => "Furniture",
        Vehicles => "Vehicles",
        Equipment => "Equipment",
        Laptop => "Laptop",
        Monitor => "Monitor",
        Mobile => "Mobile",
        Tablet => "Tablet",
        Desktop => "Desktop",
    }
}

text_enum! {
    AssetStatus {
        Active => "Active",
        Inactive => "Inactive",
        UnderMaintenance => "Under Maintenance",
        Retired => "Retired",
    }
}

text_enum! {
    AssetCondition {
        Excellent => "Excellent",
        Good => "Good",
        Fair => "Fair",
        Poor => "Poor",
    }
}

impl Default for AssetStatus {
    fn default() -> Self {
        AssetStatus::Active
    }
}

impl Default for AssetCondition {
    fn default() -> Self {
        AssetCondition::Good
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

text_enum! {
    /// Priority shared by maintenance, transfer and acquisition requests
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

text_enum! {
    MaintenanceCategory {
        Hardware => "hardware",
        Software => "software",
        Network => "network",
        Other => "other",
    }
}

text_enum! {
    MaintenanceStatus {
        Pending => "pending",
        Approved => "approved",
        InProgress => "in-progress",
        Completed => "completed",
        Cancelled => "cancelled",
        Rejected => "rejected",
    }
}

text_enum! {
    TransferType {
        User => "user",
        Branch => "branch",
        Location => "location",
    }
}

text_enum! {
    TransferStatus {
        Pending => "pending",
        Approved => "approved",
        InTransit => "in-transit",
        Completed => "completed",
        Rejected => "rejected",
    }
}

text_enum! {
    Department {
        Engineering => "Engineering",
        Marketing => "Marketing",
        Design => "Design",
        Hr => "HR",
        Finance => "Finance",
        Operations => "Operations",
        It => "IT",
    }
}

text_enum! {
    AcquisitionStatus {
        Draft => "draft",
        Submitted => "submitted",
        UnderReview => "under-review",
        Approved => "approved",
        Rejected => "rejected",
        Ordered => "ordered",
        Delivered => "delivered",
        Completed => "completed",
    }
}

text_enum! {
    /// Category of a requested line item
    ItemCategory {
        Laptop => "Laptop",
        Monitor => "Monitor",
        Mobile => "Mobile",
        Tablet => "Tablet",
        Desktop => "Desktop",
        Software => "Software",
        Furniture => "Furniture",
        Equipment => "Equipment",
        Other => "Other",
    }
}

text_enum! {
    Urgency {
        Immediate => "immediate",
        WithinMonth => "within-month",
        WithinQuarter => "within-quarter",
        Flexible => "flexible",
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Flexible
    }
}

// ---------------------------------------------------------------------------
// Vendors
// ---------------------------------------------------------------------------

text_enum! {
    Specialization {
        Hardware => "Hardware",
        Software => "Software",
        Network => "Network",
        Mobile => "Mobile",
        Security => "Security",
        AppleProducts => "Apple Products",
        LaptopRepair => "Laptop Repair",
        Infrastructure => "Infrastructure",
        SystemIntegration => "System Integration",
    }
}

text_enum! {
    Availability {
        AroundTheClock => "24/7",
        BusinessHours => "Business Hours",
        OnCall => "On-Call",
        Scheduled => "Scheduled",
    }
}

impl Default for Availability {
    fn default() -> Self {
        Availability::BusinessHours
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

text_enum! {
    ReportType {
        AssetInventory => "asset-inventory",
        MaintenanceSummary => "maintenance-summary",
        DepreciationAnalysis => "depreciation-analysis",
        AuditCompliance => "audit-compliance",
        CostAnalysis => "cost-analysis",
        TransferSummary => "transfer-summary",
        AcquisitionSummary => "acquisition-summary",
    }
}

text_enum! {
    ReportFormat {
        Pdf => "pdf",
        Csv => "csv",
        Excel => "excel",
    }
}

text_enum! {
    ReportDateRange {
        LastMonth => "last-month",
        LastQuarter => "last-quarter",
        LastYear => "last-year",
        Custom => "custom",
    }
}

text_enum! {
    ReportStatus {
        Generating => "generating",
        Completed => "completed",
        Failed => "failed",
    }
}

impl Default for ReportFormat {
    fn default() -> Self {
        ReportFormat::Pdf
    }
}

impl Default for ReportDateRange {
    fn default() -> Self {
        ReportDateRange::LastMonth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for status in AssetStatus::ALL {
            assert_eq!(status.as_str().parse::<AssetStatus>().unwrap(), *status);
        }
        assert_eq!(AssetStatus::UnderMaintenance.as_str(), "Under Maintenance");
        assert_eq!(Availability::AroundTheClock.to_string(), "24/7");
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&MaintenanceStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let parsed: Department = serde_json::from_str("\"HR\"").unwrap();
        assert_eq!(parsed, Department::Hr);
    }

    #[test]
    fn test_unknown_label_rejected() {
        assert!("broken".parse::<AcquisitionStatus>().is_err());
    }
}
