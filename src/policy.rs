//! Capability checks for authenticated users
//!
//! Routes never compare roles directly. They ask the caller's claims whether a
//! capability applies to a resource, where a resource is either unrestricted or a set
//! of participants (requester, assignee, ...) who are allowed in without the broader
//! `view_all_requests` grant.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{Capability, Role},
        user::UserClaims,
    },
};

/// What a capability is being exercised on
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Any,
    /// Users attached to a record; any of them may act on it
    Participants(&'a [Option<Uuid>]),
}

/// Capabilities granted to a freshly created user of the given role
pub fn default_capabilities(role: Role) -> Vec<Capability> {
    use Capability::*;

    match role {
        Role::Admin => Capability::ALL.to_vec(),
        Role::Manager => vec![
            ViewAssets,
            CreateAssets,
            EditAssets,
            AssignAssets,
            ViewMaintenance,
            CreateMaintenance,
            UpdateMaintenance,
            ApproveMaintenance,
            RequestTransfers,
            ApproveTransfers,
            RequestAcquisitions,
            ApproveAcquisitions,
            ViewAllRequests,
            ManageVendors,
            ViewAnalytics,
            ViewUsers,
        ],
        Role::Auditor => vec![
            ViewAssets,
            EditAssets,
            ViewMaintenance,
            ViewAllRequests,
            ViewAnalytics,
        ],
        Role::Employee => vec![
            ViewAssets,
            ViewMaintenance,
            CreateMaintenance,
            UpdateMaintenance,
            RequestTransfers,
            RequestAcquisitions,
        ],
    }
}

impl UserClaims {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.is_admin() || self.permissions.contains(&capability)
    }

    /// Whether the caller may exercise `capability` on `resource`
    pub fn can(&self, capability: Capability, resource: Resource<'_>) -> bool {
        if !self.has(capability) {
            return false;
        }
        match resource {
            Resource::Any => true,
            Resource::Participants(users) => {
                self.has(Capability::ViewAllRequests) || users.contains(&Some(self.user_id))
            }
        }
    }

    pub fn require(&self, capability: Capability) -> AppResult<()> {
        self.require_on(capability, Resource::Any)
    }

    pub fn require_on(&self, capability: Capability, resource: Resource<'_>) -> AppResult<()> {
        if self.can(capability, resource) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing permission '{}' for this resource",
                capability
            )))
        }
    }

    /// Caller only sees records they participate in
    pub fn scoped_to_self(&self) -> bool {
        !self.has(Capability::ViewAllRequests)
    }

    pub fn is_self(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> UserClaims {
        UserClaims {
            sub: "tester".into(),
            user_id: Uuid::new_v4(),
            role,
            department: Some("IT".into()),
            branch: None,
            permissions: default_capabilities(role),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_admin_holds_everything() {
        let mut admin = claims(Role::Admin);
        admin.permissions.clear();
        assert!(admin.can(Capability::SystemSettings, Resource::Any));
        assert!(admin.can(Capability::DeleteAssets, Resource::Participants(&[None])));
    }

    #[test]
    fn test_employee_defaults() {
        let employee = claims(Role::Employee);
        assert!(employee.has(Capability::CreateMaintenance));
        assert!(!employee.has(Capability::ApproveMaintenance));
        assert!(!employee.has(Capability::DeleteAssets));
        assert!(employee.require(Capability::ManageUsers).is_err());
    }

    #[test]
    fn test_participants_or_view_all() {
        let employee = claims(Role::Employee);
        let mine = [Some(employee.user_id), None];
        let theirs = [Some(Uuid::new_v4())];
        assert!(employee.can(Capability::ViewMaintenance, Resource::Participants(&mine)));
        assert!(!employee.can(Capability::ViewMaintenance, Resource::Participants(&theirs)));

        let auditor = claims(Role::Auditor);
        assert!(auditor.can(Capability::ViewMaintenance, Resource::Participants(&theirs)));
        assert!(!auditor.scoped_to_self());
        assert!(employee.scoped_to_self());
    }

    #[test]
    fn test_explicit_grant_beyond_role() {
        let mut employee = claims(Role::Employee);
        employee.permissions.push(Capability::ApproveTransfers);
        assert!(employee.can(Capability::ApproveTransfers, Resource::Any));
    }
}
