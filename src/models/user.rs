//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{Capability, Role};

/// Full user model from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip)]
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub department: Option<String>,
    pub branch: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    #[sqlx(json)]
    pub permissions: Vec<Capability>,
    #[sqlx(json)]
    pub preferences: UserPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    /// light, dark or auto
    pub theme: String,
    pub notifications: NotificationPreferences,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NotificationPreferences {
    pub email: bool,
    pub browser: bool,
    pub maintenance: bool,
    pub audits: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            notifications: NotificationPreferences::default(),
            language: "en".to_string(),
        }
    }
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            browser: true,
            maintenance: true,
            audits: true,
        }
    }
}

/// User query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub department: Option<String>,
    pub role: Option<Role>,
    pub branch: Option<String>,
    /// Matches name, username or email
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 3, max = 30, message = "Username must be 3-30 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    pub role: Option<Role>,
    pub department: Option<String>,
    pub branch: Option<String>,
    /// Defaults to the role's capabilities
    pub permissions: Option<Vec<Capability>>,
}

/// Update user request
///
/// Role, permissions and the active flag need `manage_users`.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub department: Option<String>,
    pub branch: Option<String>,
    pub preferences: Option<UserPreferences>,
    pub role: Option<Role>,
    pub permissions: Option<Vec<Capability>>,
    pub is_active: Option<bool>,
}

impl UpdateUser {
    pub fn touches_privileged_fields(&self) -> bool {
        self.role.is_some() || self.permissions.is_some() || self.is_active.is_some()
    }
}

/// Update own profile request (for authenticated users)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: Option<String>,
    /// Email address (must be unique)
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub department: Option<String>,
    pub branch: Option<String>,
    pub preferences: Option<UserPreferences>,
    /// Current password (required to change password)
    pub current_password: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: Option<String>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: Uuid,
    pub role: Role,
    pub department: Option<String>,
    pub branch: Option<String>,
    pub permissions: Vec<Capability>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn for_user(user: &User, expiration_hours: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            department: user.department.clone(),
            branch: user.branch.clone(),
            permissions: user.permissions.clone(),
            exp: now + (expiration_hours as i64 * 3600),
            iat: now,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "jdoe".into(),
            email: "jdoe@example.com".into(),
            password_hash: "hash".into(),
            name: "J. Doe".into(),
            role: Role::Manager,
            department: Some("IT".into()),
            branch: Some("HQ".into()),
            is_active: true,
            last_login: None,
            permissions: vec![Capability::ViewAssets],
            preferences: UserPreferences::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let user = sample_user();
        let claims = UserClaims::for_user(&user, 1);
        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, user.id);
        assert_eq!(parsed.role, Role::Manager);
        assert_eq!(parsed.permissions, vec![Capability::ViewAssets]);
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn test_create_user_validation() {
        let data = CreateUser {
            username: "ab".into(),
            email: "not-an-email".into(),
            password: "123".into(),
            name: "X".into(),
            role: None,
            department: None,
            branch: None,
            permissions: None,
        };
        let errors = data.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
