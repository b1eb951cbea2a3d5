//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        enums::{Capability, Role},
        page_bounds,
        user::{CreateUser, UpdateProfile, UpdateUser, User, UserClaims, UserQuery},
    },
    policy::default_capabilities,
    repository::{
        users::{DistinctColumn, NewUser},
        Repository,
    },
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    pub fn token_lifetime_seconds(&self) -> i64 {
        self.config.jwt_expiration_hours as i64 * 3600
    }

    /// Authenticate by username or email and return a JWT token
    pub async fn authenticate(&self, login: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_login(login)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid login or password".to_string()))?;

        if !user.is_active {
            return Err(AppError::Authentication("Account is deactivated".to_string()));
        }

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid login or password".to_string()));
        }

        self.repository.users.touch_last_login(user.id).await?;
        let token = self.create_token(&user)?;

        tracing::info!(user_id = %user.id, role = %user.role, "user logged in");
        Ok((token, user))
    }

    fn create_token(&self, user: &User) -> AppResult<String> {
        UserClaims::for_user(user, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Create the configured admin account when no user exists yet
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        let Some(admin) = &self.config.bootstrap_admin else {
            return Ok(());
        };
        if self.repository.users.count().await? > 0 {
            return Ok(());
        }

        let password_hash = Self::hash_password(&admin.password)?;
        let permissions = default_capabilities(Role::Admin);
        let user = self
            .repository
            .users
            .create(&NewUser {
                username: &admin.username,
                email: &admin.email,
                password_hash: &password_hash,
                name: &admin.name,
                role: Role::Admin,
                department: Some("IT"),
                branch: None,
                permissions: &permissions,
            })
            .await?;

        tracing::warn!(user_id = %user.id, username = %user.username, "bootstrap admin account created");
        Ok(())
    }

    pub async fn get_by_id(&self, id: uuid::Uuid) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64, i64, i64)> {
        let (page, limit, offset) = page_bounds(query.page, query.limit);
        let (users, total) = self.repository.users.search(query, limit, offset).await?;
        Ok((users, total, page, limit))
    }

    pub async fn create(&self, data: CreateUser) -> AppResult<User> {
        data.validate()?;
        if self
            .repository
            .users
            .identity_taken(Some(&data.username), Some(&data.email), None)
            .await?
        {
            return Err(AppError::Conflict(
                "User with this username or email already exists".to_string(),
            ));
        }

        let role = data.role.unwrap_or(Role::Employee);
        let permissions = data
            .permissions
            .clone()
            .unwrap_or_else(|| default_capabilities(role));
        let password_hash = Self::hash_password(&data.password)?;

        let user = self
            .repository
            .users
            .create(&NewUser {
                username: &data.username,
                email: &data.email,
                password_hash: &password_hash,
                name: &data.name,
                role,
                department: data.department.as_deref(),
                branch: data.branch.as_deref(),
                permissions: &permissions,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    /// Update a user; role, permissions and activation need `manage_users`
    pub async fn update(&self, claims: &UserClaims, id: uuid::Uuid, data: UpdateUser) -> AppResult<User> {
        data.validate()?;
        let manages_users = claims.has(Capability::ManageUsers);
        if !claims.is_self(id) && !manages_users {
            return Err(AppError::Authorization(
                "You can only update your own profile".to_string(),
            ));
        }
        if data.touches_privileged_fields() && !manages_users {
            return Err(AppError::Authorization(
                "Changing role, permissions or activation requires manage_users".to_string(),
            ));
        }

        if let Some(ref email) = data.email {
            if self.repository.users.identity_taken(None, Some(email), Some(id)).await? {
                return Err(AppError::Conflict("Email is already in use".to_string()));
            }
        }

        let demotes_admin = data.role.map(|r| r != Role::Admin).unwrap_or(false)
            || data.is_active == Some(false);
        if demotes_admin {
            self.guard_last_admin(id).await?;
        }

        self.repository.users.update(id, &data).await
    }

    /// Update the caller's own profile, optionally changing the password
    pub async fn update_profile(&self, user_id: uuid::Uuid, data: UpdateProfile) -> AppResult<User> {
        data.validate()?;
        let user = self.repository.users.get_by_id(user_id).await?;

        if let Some(ref new_password) = data.new_password {
            let current = data.current_password.as_deref().ok_or_else(|| {
                AppError::Validation("Current password is required to change password".to_string())
            })?;
            if !self.verify_password(&user, current)? {
                return Err(AppError::Authentication("Current password is incorrect".to_string()));
            }
            let hash = Self::hash_password(new_password)?;
            self.repository.users.set_password(user_id, &hash).await?;
            tracing::info!(user_id = %user_id, "password changed");
        }

        if let Some(ref email) = data.email {
            if self.repository.users.identity_taken(None, Some(email), Some(user_id)).await? {
                return Err(AppError::Conflict("Email is already in use".to_string()));
            }
        }

        let update = UpdateUser {
            name: data.name,
            email: data.email,
            department: data.department,
            branch: data.branch,
            preferences: data.preferences,
            ..Default::default()
        };
        self.repository.users.update(user_id, &update).await
    }

    /// Soft delete; the last active admin cannot be removed
    pub async fn deactivate(&self, claims: &UserClaims, id: uuid::Uuid) -> AppResult<()> {
        if claims.is_self(id) {
            return Err(AppError::BusinessRule("You cannot deactivate your own account".to_string()));
        }
        self.guard_last_admin(id).await?;
        self.repository.users.deactivate(id).await?;
        tracing::info!(user_id = %id, by = %claims.user_id, "user deactivated");
        Ok(())
    }

    async fn guard_last_admin(&self, id: uuid::Uuid) -> AppResult<()> {
        let target = self.repository.users.get_by_id(id).await?;
        if target.role == Role::Admin
            && target.is_active
            && self.repository.users.count_active_admins().await? <= 1
        {
            return Err(AppError::BusinessRule(
                "Cannot remove the last active administrator".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn departments(&self) -> AppResult<Vec<String>> {
        self.repository.users.distinct(DistinctColumn::Department).await
    }

    pub async fn branches(&self) -> AppResult<Vec<String>> {
        self.repository.users.distinct(DistinctColumn::Branch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_verifies() {
        let hash = UsersService::hash_password("s3cret!").unwrap();
        assert!(hash.starts_with("$argon2"));
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"s3cret!", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }

    #[test]
    fn test_hash_uses_fresh_salt() {
        let a = UsersService::hash_password("same").unwrap();
        let b = UsersService::hash_password("same").unwrap();
        assert_ne!(a, b);
    }
}
