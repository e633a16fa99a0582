//! Request field validation
//!
//! Handlers run every check for a request through one [`Validator`] so that
//! all failing fields are reported together in a single 400 response.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;

use crate::core::error::{Error, FieldError, Result};

/// Collects per-field failures for one request.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn reject(&mut self, param: &str, msg: &str) {
        self.errors.push(FieldError::new(param, msg));
    }

    /// Required, non-blank text. Returns the trimmed value.
    pub fn not_empty(&mut self, param: &str, value: Option<&str>, msg: &str) -> String {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => {
                self.reject(param, msg);
                String::new()
            }
        }
    }

    /// Field must be sent, but may be empty. Returned untrimmed.
    pub fn present(&mut self, param: &str, value: Option<&str>, msg: &str) -> String {
        match value {
            Some(v) => v.to_string(),
            None => {
                self.reject(param, msg);
                String::new()
            }
        }
    }

    /// Syntactically valid email address, normalised to lower case.
    pub fn email(&mut self, param: &str, value: Option<&str>, msg: &str) -> String {
        match value.map(str::trim) {
            Some(v) if is_email(v) => v.to_lowercase(),
            _ => {
                self.reject(param, msg);
                String::new()
            }
        }
    }

    /// Text of at least `min` characters. Returned untrimmed.
    pub fn min_chars(&mut self, param: &str, value: Option<&str>, min: usize, msg: &str) -> String {
        match value {
            Some(v) if v.chars().count() >= min => v.to_string(),
            _ => {
                self.reject(param, msg);
                String::new()
            }
        }
    }

    /// Text no longer than `max` bytes. Absent values are left to other checks.
    pub fn max_bytes(&mut self, param: &str, value: Option<&str>, max: usize, msg: &str) {
        if value.is_some_and(|v| v.len() > max) {
            self.reject(param, msg);
        }
    }

    /// Required date (RFC 3339 or `YYYY-MM-DD`).
    pub fn date(&mut self, param: &str, value: Option<&str>, msg: &str) -> DateTime<Utc> {
        match value.map(str::trim).and_then(parse_date) {
            Some(date) => date,
            None => {
                self.reject(param, msg);
                DateTime::<Utc>::default()
            }
        }
    }

    /// Optional date; blank counts as absent, garbage is rejected.
    pub fn optional_date(
        &mut self,
        param: &str,
        value: Option<&str>,
        msg: &str,
    ) -> Option<DateTime<Utc>> {
        let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
        let parsed = parse_date(raw);
        if parsed.is_none() {
            self.reject(param, msg);
        }
        parsed
    }

    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self.errors))
        }
    }
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Split a comma separated list, dropping blank entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Blank optional text becomes `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// JSON body extractor whose rejections render as 400 `BadRequest`.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Error::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_every_failure() {
        let mut v = Validator::new();
        v.not_empty("name", Some("   "), "Name is a required field!");
        v.email("email", Some("nope"), "Email is a required field!");
        v.min_chars("password", Some("short"), 8, "Password too short");

        match v.finish() {
            Err(Error::Validation(errors)) => {
                let params: Vec<&str> = errors.iter().map(|e| e.param.as_str()).collect();
                assert_eq!(params, vec!["name", "email", "password"]);
                assert_eq!(errors[0].msg, "Name is a required field!");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_input_passes_through() {
        let mut v = Validator::new();
        let name = v.not_empty("name", Some("  Ada "), "required");
        let email = v.email("email", Some(" Ada@Example.COM "), "bad email");
        let password = v.min_chars("password", Some("password1"), 8, "short");
        v.finish().unwrap();

        assert_eq!(name, "Ada");
        assert_eq!(email, "ada@example.com");
        assert_eq!(password, "password1");
    }

    #[test]
    fn test_email_shapes() {
        for good in ["a@x.com", "first.last@sub.example.org"] {
            assert!(is_email(good), "{good}");
        }
        for bad in ["", "a", "a@", "@x.com", "a@x", "a@@x.com", "a b@x.com", "a@x..com"] {
            assert!(!is_email(bad), "{bad}");
        }
    }

    #[test]
    fn test_password_length_counts_characters() {
        let mut v = Validator::new();
        v.min_chars("password", Some("ééééééé"), 8, "short");
        assert!(v.finish().is_err());
    }

    #[test]
    fn test_max_bytes() {
        let mut v = Validator::new();
        v.max_bytes("password", Some("abcd"), 4, "too long");
        v.max_bytes("password", None, 4, "too long");
        v.finish().unwrap();

        // 'é' is two bytes
        let mut v = Validator::new();
        v.max_bytes("password", Some("abcé"), 4, "too long");
        assert!(matches!(v.finish(), Err(Error::Validation(e)) if e[0].msg == "too long"));
    }

    #[test]
    fn test_present_allows_empty() {
        let mut v = Validator::new();
        v.present("password", Some(""), "required");
        v.finish().unwrap();

        let mut v = Validator::new();
        v.present("password", None, "required");
        assert!(v.finish().is_err());
    }

    #[test]
    fn test_dates() {
        let mut v = Validator::new();
        let from = v.date("fromDate", Some("2020-03-01"), "bad");
        let to = v.optional_date("toDate", Some("2021-01-02T10:00:00Z"), "bad");
        let none = v.optional_date("toDate", Some(""), "bad");
        v.finish().unwrap();

        assert_eq!(from.format("%Y-%m-%d").to_string(), "2020-03-01");
        assert_eq!(to.unwrap().format("%H").to_string(), "10");
        assert!(none.is_none());

        let mut v = Validator::new();
        v.date("fromDate", None, "required");
        v.optional_date("toDate", Some("yesterday"), "bad");
        assert!(matches!(v.finish(), Err(Error::Validation(e)) if e.len() == 2));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" rust, sql ,, axum "),
            vec!["rust".to_string(), "sql".to_string(), "axum".to_string()]
        );
        assert!(split_list(" , ").is_empty());
    }
}
