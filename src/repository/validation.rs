//! Client-side guards: per-column rules checked before any request is sent.

use crate::error::AppError;
use crate::model::Row;
use regex::Regex;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Email,
    /// Absolute http(s) URL.
    Url,
    Uuid,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ValidationRule {
    pub required: bool,
    pub format: Option<Format>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static str>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl ValidationRule {
    pub const fn new() -> Self {
        ValidationRule {
            required: false,
            format: None,
            max_length: None,
            pattern: None,
            minimum: None,
            maximum: None,
        }
    }

    /// Present, non-null and (for strings) non-blank.
    pub const fn required() -> Self {
        ValidationRule {
            required: true,
            ..Self::new()
        }
    }

    pub const fn format(self, format: Format) -> Self {
        ValidationRule {
            format: Some(format),
            ..self
        }
    }

    pub const fn max_length(self, n: usize) -> Self {
        ValidationRule {
            max_length: Some(n),
            ..self
        }
    }

    pub const fn pattern(self, pattern: &'static str) -> Self {
        ValidationRule {
            pattern: Some(pattern),
            ..self
        }
    }

    pub const fn range(self, minimum: f64, maximum: f64) -> Self {
        ValidationRule {
            minimum: Some(minimum),
            maximum: Some(maximum),
            ..self
        }
    }
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a row against per-column rules. All required fields must be present.
    pub fn validate(row: &Row, rules: &[(&str, ValidationRule)]) -> Result<(), AppError> {
        for (col, rule) in rules {
            let val = row.get(*col);
            if rule.required && is_blank(val) {
                return Err(AppError::Validation(format!("{} is required", col)));
            }
            if let Some(v) = val {
                validate_field(col, v, rule)?;
            }
        }
        Ok(())
    }
}

fn is_blank(val: Option<&Value>) -> bool {
    match val {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn validate_field(col: &str, v: &Value, rule: &ValidationRule) -> Result<(), AppError> {
    if v.is_null() {
        return Ok(());
    }
    if let Some(format) = rule.format {
        validate_format(col, v, format)?;
    }
    if let Some(max) = rule.max_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() > max {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    col, max
                )));
            }
        }
    }
    if let Some(pattern) = rule.pattern {
        let re = Regex::new(pattern).map_err(|_| AppError::Validation(format!("invalid pattern for {}", col)))?;
        if let Some(s) = v.as_str() {
            if !re.is_match(s) {
                return Err(AppError::Validation(format!("{} does not match required pattern", col)));
            }
        }
    }
    if let Some(min) = rule.minimum {
        if let Some(n) = v.as_f64() {
            if n < min {
                return Err(AppError::Validation(format!("{} must be at least {}", col, min)));
            }
        }
    }
    if let Some(max) = rule.maximum {
        if let Some(n) = v.as_f64() {
            if n > max {
                return Err(AppError::Validation(format!("{} must be at most {}", col, max)));
            }
        }
    }
    Ok(())
}

fn validate_format(col: &str, v: &Value, format: Format) -> Result<(), AppError> {
    let Some(s) = v.as_str() else {
        return Ok(());
    };
    // Optional text columns arrive as "" from cleared form fields.
    if s.is_empty() {
        return Ok(());
    }
    match format {
        Format::Email => {
            let at = s.find('@');
            if s.len() < 3 || at.map_or(true, |i| i == 0 || i == s.len() - 1) {
                return Err(AppError::Validation(format!("{} must be a valid email", col)));
            }
        }
        Format::Url => {
            if !(s.starts_with("http://") || s.starts_with("https://")) {
                return Err(AppError::Validation(format!("{} must be an http(s) URL", col)));
            }
        }
        Format::Uuid => {
            if uuid::Uuid::parse_str(s).is_err() {
                return Err(AppError::Validation(format!("{} must be a valid UUID", col)));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn required_rejects_missing_null_and_blank() {
        let rules = [("name", ValidationRule::required())];
        for body in [json!({}), json!({"name": null}), json!({"name": "   "})] {
            let err = RequestValidator::validate(&row(body), &rules).unwrap_err();
            assert_eq!(err.to_string(), "validation: name is required");
        }
        assert!(RequestValidator::validate(&row(json!({"name": "Ada"})), &rules).is_ok());
    }

    #[test]
    fn formats() {
        let rules = [
            ("email", ValidationRule::new().format(Format::Email)),
            ("site", ValidationRule::new().format(Format::Url)),
        ];
        assert!(RequestValidator::validate(&row(json!({"email": "a@b.io", "site": "https://x.dev"})), &rules).is_ok());
        assert!(RequestValidator::validate(&row(json!({"email": "", "site": null})), &rules).is_ok());
        assert!(RequestValidator::validate(&row(json!({"email": "nope"})), &rules).is_err());
        assert!(RequestValidator::validate(&row(json!({"email": "a@"})), &rules).is_err());
        assert!(RequestValidator::validate(&row(json!({"site": "ftp://x"})), &rules).is_err());
    }

    #[test]
    fn range_and_length_and_pattern() {
        let rules = [
            ("proficiency", ValidationRule::new().range(0.0, 100.0)),
            ("title", ValidationRule::new().max_length(5)),
            ("slug", ValidationRule::new().pattern("^[a-z0-9-]+$")),
        ];
        assert!(RequestValidator::validate(&row(json!({"proficiency": 100})), &rules).is_ok());
        assert!(RequestValidator::validate(&row(json!({"proficiency": 101})), &rules).is_err());
        assert!(RequestValidator::validate(&row(json!({"proficiency": -1})), &rules).is_err());
        assert!(RequestValidator::validate(&row(json!({"title": "héllo"})), &rules).is_ok());
        assert!(RequestValidator::validate(&row(json!({"title": "toolong"})), &rules).is_err());
        assert!(RequestValidator::validate(&row(json!({"slug": "my-app-2"})), &rules).is_ok());
        assert!(RequestValidator::validate(&row(json!({"slug": "My App"})), &rules).is_err());
    }
}
