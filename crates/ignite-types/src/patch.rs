//! Partial-update payloads for PATCH endpoints.
//!
//! Every updatable field is `Option<Option<T>>`: the outer `None` means the key
//! was absent (leave unchanged), `Some(None)` means an explicit `null`.
//! Payloads are validated into a change set before anything is written.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Distinguishes an explicit `null` from an absent key when combined with
/// `#[serde(default)]`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchError(pub String);

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for PatchError {}

fn required_text(field: &str, value: Option<String>) -> Result<String, PatchError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(PatchError(format!("{field} cannot be empty"))),
    }
}

// -- Categories --

#[derive(Debug, Default, Deserialize)]
pub struct CategoryPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
}

impl CategoryPatch {
    /// Returns the new (trimmed) name, or `None` when the name is untouched.
    pub fn validate(self) -> Result<Option<String>, PatchError> {
        self.name.map(|n| required_text("name", n)).transpose()
    }
}

// -- Users --

#[derive(Debug, Default, Deserialize)]
pub struct UserPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub roles: Option<Option<Vec<String>>>,
}

/// Validated user changes. `None` fields are left as stored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub roles: Option<Vec<String>>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.roles.is_none()
    }
}

impl UserPatch {
    pub fn validate(self) -> Result<UserChanges, PatchError> {
        let name = self.name.map(|n| required_text("name", n)).transpose()?;
        let email = self
            .email
            .map(|e| required_text("email", e))
            .transpose()?;
        if let Some(email) = &email {
            if !looks_like_email(email) {
                return Err(PatchError("email is not a valid address".into()));
            }
        }
        // Explicit null clears every role; a list replaces them wholesale.
        let roles = self.roles.map(|r| {
            r.unwrap_or_default()
                .into_iter()
                .map(|role| role.trim().to_string())
                .filter(|role| !role.is_empty())
                .collect()
        });

        Ok(UserChanges { name, email, roles })
    }
}

/// Minimal `local@domain.tld` shape check.
pub fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
