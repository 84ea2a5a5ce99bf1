use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A forum member. The nickname is the identity key and is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub nickname: String,
    pub fullname: String,
    pub about: String,
    /// Globally unique across all users
    pub email: String,
}

/// Profile fields sent on create and update; the nickname comes from the route
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub email: String,
}

impl UserProfile {
    pub fn into_user(self, nickname: &str) -> User {
        User {
            nickname: nickname.to_string(),
            fullname: self.fullname,
            about: self.about,
            email: self.email,
        }
    }

    /// True when an update would change nothing
    pub fn is_empty(&self) -> bool {
        self.fullname.is_empty() && self.about.is_empty() && self.email.is_empty()
    }

    /// Checks a profile submitted for a new user
    pub fn validate_new(&self) -> Result<(), &'static str> {
        if self.fullname.is_empty() {
            return Err("fullname is required");
        }
        if self.email.is_empty() {
            return Err("email is required");
        }
        validate_email(&self.email)
    }

    /// Checks a partial update. Empty fields mean "leave unchanged".
    pub fn validate_update(&self) -> Result<(), &'static str> {
        if self.email.is_empty() {
            return Ok(());
        }
        validate_email(&self.email)
    }
}

/// Nicknames are opaque route segments; only an empty one is refused
pub fn validate_nickname(nickname: &str) -> Result<(), &'static str> {
    if nickname.is_empty() {
        return Err("Nickname cannot be empty");
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), &'static str> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err("email must look like name@host"),
    }
}
