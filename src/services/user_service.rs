use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    constants::{DEFAULT_USER_TIER, USERNAME_MAX_LEN, USERNAME_MIN_LEN},
    db::RecordStore,
    error::{AppError, Result},
    models::{CreateUserRequest, User, UserTier},
    utils::parse_id,
    validation::ValidationErrors,
};

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'
}

fn looks_like_email(value: &str) -> bool {
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn validate_new_user(req: &CreateUserRequest) -> std::result::Result<User, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let username = req.username.as_deref().map(str::trim).unwrap_or_default();
    if username.is_empty() {
        errors.push("username", "Username is required");
    } else if username.len() < USERNAME_MIN_LEN
        || username.len() > USERNAME_MAX_LEN
        || !username.chars().all(is_username_char)
    {
        errors.push(
            "username",
            format!(
                "Username must be {}-{} characters of letters, digits, '_', '.' or '-'",
                USERNAME_MIN_LEN, USERNAME_MAX_LEN
            ),
        );
    }

    let email = req
        .email
        .as_deref()
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();
    if email.is_empty() {
        errors.push("email", "Email is required");
    } else if !looks_like_email(&email) {
        errors.push("email", "Email is not a valid address");
    }

    let tier = match req.tier.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => match UserTier::parse(raw) {
            Some(tier) => tier.as_str(),
            None => {
                errors.push("tier", "tier must be one of: free, premium");
                DEFAULT_USER_TIER
            }
        },
        None => DEFAULT_USER_TIER,
    };

    let preferences = req
        .preferences
        .clone()
        .unwrap_or_else(|| serde_json::json!({}));
    if !preferences.is_object() {
        errors.push("preferences", "preferences must be an object");
    }

    let now = Utc::now();
    errors.finish(User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email,
        tier: tier.to_string(),
        preferences,
        created_at: now,
        updated_at: now,
    })
}

/// User lifecycle. Credentials and sessions live outside this service.
pub struct UserService {
    store: Arc<dyn RecordStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn create_user(&self, req: &CreateUserRequest) -> Result<User> {
        let user = validate_new_user(req)?;
        self.store.insert_user(&user).await?;
        tracing::info!("user_created id={} username={}", user.id, user.username);
        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> Result<User> {
        let id = parse_id("user", id)?;
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Resolves `id` to an existing user or a not-found error.
    pub async fn require_existing(&self, id: &str) -> Result<Uuid> {
        let id = parse_id("user", id)?;
        if !self.store.user_exists(id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(id)
    }
}
