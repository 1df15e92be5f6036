use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::contacts::repo::Contact;
use crate::error::ApiError;
use crate::users::services::is_valid_email;

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z\s]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^[0-9()+\-\s]+$").unwrap();
}

pub(crate) fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() || !NAME_RE.is_match(name) {
        return Err(ApiError::Validation(
            "Name must contain only letters and spaces".into(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_contact_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::Validation(
            "Email must be a valid email address".into(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_phone(phone: &str) -> Result<(), ApiError> {
    if phone.is_empty() || !PHONE_RE.is_match(phone) {
        return Err(ApiError::Validation(
            "Phone number must contain only digits, spaces, and special characters".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UpdateContactRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub favorite: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub favorite: Option<bool>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    20
}

const MAX_LIMIT: i64 = 100;

impl ListQuery {
    /// Clamped page size; raw query input is never bound into LIMIT.
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub data: Contact,
}

#[derive(Debug, Serialize)]
pub struct ContactListResponse {
    pub data: Vec<Contact>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rules() {
        assert!(validate_name("Jane Doe").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("Jane42").is_err());
    }

    #[test]
    fn phone_rules() {
        assert!(validate_phone("(067) 123-45-67").is_ok());
        assert!(validate_phone("+380671234567").is_ok());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn list_query_defaults_and_offset() {
        let q: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit(), 20);
        assert_eq!(q.offset(), 0);

        let q: ListQuery = serde_json::from_str(r#"{"page":3,"limit":10}"#).unwrap();
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn hostile_page_and_limit_are_clamped() {
        let q: ListQuery = serde_json::from_str(r#"{"limit":-1}"#).unwrap();
        assert_eq!(q.limit(), 1);
        assert_eq!(q.offset(), 0);

        let q: ListQuery = serde_json::from_str(r#"{"page":-3,"limit":0}"#).unwrap();
        assert_eq!(q.limit(), 1);
        assert_eq!(q.offset(), 0);

        let q: ListQuery = serde_json::from_str(r#"{"limit":100000}"#).unwrap();
        assert_eq!(q.limit(), 100);
    }

    #[test]
    fn update_request_emptiness() {
        let empty: UpdateContactRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
        let named: UpdateContactRequest =
            serde_json::from_str(r#"{"name":"Jane"}"#).unwrap();
        assert!(!named.is_empty());
    }
}
