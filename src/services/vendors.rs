//! Vendor directory service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{Capability, Specialization},
        page_bounds,
        user::UserClaims,
        vendor::{CreateVendor, UpdateVendor, Vendor, VendorQuery},
    },
    repository::Repository,
};

fn check_rate(rate: Option<rust_decimal::Decimal>) -> AppResult<()> {
    match rate {
        Some(r) if r.is_sign_negative() => {
            Err(AppError::Validation("hourlyRate cannot be negative".to_string()))
        }
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct VendorsService {
    repository: Repository,
}

impl VendorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn search(&self, query: &VendorQuery) -> AppResult<(Vec<Vendor>, i64, i64, i64)> {
        let (page, limit, offset) = page_bounds(query.page, query.limit);
        let (vendors, total) = self.repository.vendors.search(query, limit, offset).await?;
        Ok((vendors, total, page, limit))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Vendor> {
        self.repository.vendors.get_by_id(id).await
    }

    pub async fn create(&self, claims: &UserClaims, data: CreateVendor) -> AppResult<Vendor> {
        claims.require(Capability::ManageVendors)?;
        data.validate()?;
        check_rate(data.hourly_rate)?;

        let vendor = self.repository.vendors.create(&data).await?;
        tracing::info!(vendor_id = %vendor.id, name = %vendor.name, "vendor created");
        Ok(vendor)
    }

    pub async fn update(&self, claims: &UserClaims, id: Uuid, data: UpdateVendor) -> AppResult<Vendor> {
        claims.require(Capability::ManageVendors)?;
        data.validate()?;
        check_rate(data.hourly_rate)?;
        self.repository.vendors.update(id, &data).await
    }

    pub async fn deactivate(&self, claims: &UserClaims, id: Uuid) -> AppResult<()> {
        claims.require(Capability::ManageVendors)?;
        self.repository.vendors.deactivate(id).await?;
        tracing::info!(vendor_id = %id, "vendor deactivated");
        Ok(())
    }

    pub fn specializations(&self) -> &'static [Specialization] {
        Specialization::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_negative_rate_rejected() {
        assert!(check_rate(Some(Decimal::new(-1, 0))).is_err());
        assert!(check_rate(Some(Decimal::new(7550, 2))).is_ok());
        assert!(check_rate(None).is_ok());
    }
}
