//! Post input validation.
//!
//! Request bodies arrive as [`PostFields`], one [`Submitted`] value per
//! field, and leave as a typed [`PostInput`] or a [`ValidationErrors`]
//! listing every violated field.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::Serialize;

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: usize = 255;

/// One field of a submission as it arrived on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Submitted<T> {
    #[default]
    Absent,
    Null,
    Value(T),
    /// Present with the wrong type, e.g. a number where text belongs.
    WrongType,
}

impl<T> From<T> for Submitted<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

/// Raw, unvalidated post fields as submitted by a client.
#[derive(Debug, Clone, Default)]
pub struct PostFields {
    pub title: Submitted<String>,
    pub content: Submitted<String>,
    pub is_draft: Submitted<bool>,
    pub published_at: Submitted<String>,
}

/// Validated post input, safe to persist.
///
/// `published_at` is `None` when the field was left out, `Some(None)` when
/// the client explicitly cleared it.
#[derive(Debug, Clone, PartialEq)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub is_draft: Option<bool>,
    pub published_at: Option<Option<DateTime<Utc>>>,
}

/// A single violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every rule a submission violated, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Messages grouped by field name.
    pub fn by_field(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for error in &self.0 {
            map.entry(error.field.to_string())
                .or_default()
                .push(error.message.clone());
        }
        map
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join(" "))
    }
}

impl PostFields {
    /// Check every rule against `now` and produce a sanitized input.
    pub fn validate(self, now: DateTime<Utc>) -> Result<PostInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = required_text(&mut errors, "title", self.title);
        if let Some(title) = &title {
            if title.chars().count() > TITLE_MAX_CHARS {
                errors.add(
                    "title",
                    format!("The title may not be greater than {TITLE_MAX_CHARS} characters."),
                );
            }
        }

        let content = required_text(&mut errors, "content", self.content);

        let is_draft = match self.is_draft {
            Submitted::Absent | Submitted::Null => None,
            Submitted::Value(flag) => Some(flag),
            Submitted::WrongType => {
                errors.add("is_draft", "The is draft field must be true or false.");
                None
            }
        };

        let published_at = match self.published_at {
            Submitted::Absent => None,
            Submitted::Null => Some(None),
            Submitted::Value(raw) if raw.trim().is_empty() => Some(None),
            Submitted::Value(raw) => match parse_timestamp(raw.trim()) {
                Some(at) if at < now.trunc_subsecs(0) => {
                    errors.add(
                        "published_at",
                        "The published at must be a date after or equal to now.",
                    );
                    None
                }
                Some(at) => Some(Some(at)),
                None => {
                    errors.add("published_at", "The published at is not a valid date.");
                    None
                }
            },
            Submitted::WrongType => {
                errors.add("published_at", "The published at is not a valid date.");
                None
            }
        };

        match (title, content) {
            (Some(title), Some(content)) if errors.is_empty() => Ok(PostInput {
                title,
                content,
                is_draft,
                published_at,
            }),
            _ => Err(errors),
        }
    }
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Submitted<String>,
) -> Option<String> {
    match value {
        Submitted::Value(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        Submitted::WrongType => {
            errors.add(field, format!("The {field} must be a string."));
            None
        }
        _ => {
            errors.add(field, format!("The {field} field is required."));
            None
        }
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`; naive forms are UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(at.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn fields(title: &str, content: &str) -> PostFields {
        PostFields {
            title: title.to_string().into(),
            content: content.to_string().into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_input_is_trimmed() {
        let input = fields("  Hello  ", "\nBody\n").validate(Utc::now()).unwrap();
        assert_eq!(input.title, "Hello");
        assert_eq!(input.content, "Body");
        assert_eq!(input.is_draft, None);
        assert_eq!(input.published_at, None);
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let errors = PostFields::default().validate(Utc::now()).unwrap_err();
        let by_field = errors.by_field();

        assert_eq!(by_field["title"], vec!["The title field is required."]);
        assert_eq!(by_field["content"], vec!["The content field is required."]);
    }

    #[test]
    fn test_blank_title_is_required() {
        let errors = fields("   ", "Body").validate(Utc::now()).unwrap_err();
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].field, "title");
    }

    #[test]
    fn test_title_length_counts_characters() {
        let at_limit = "é".repeat(TITLE_MAX_CHARS);
        assert!(fields(&at_limit, "Body").validate(Utc::now()).is_ok());

        let too_long = "a".repeat(TITLE_MAX_CHARS + 1);
        let errors = fields(&too_long, "Body").validate(Utc::now()).unwrap_err();
        assert_eq!(
            errors.errors()[0].message,
            "The title may not be greater than 255 characters."
        );
    }

    #[test]
    fn test_published_at_formats() {
        let now = Utc::now();
        let tomorrow = (now + TimeDelta::days(1)).trunc_subsecs(0);

        for raw in [
            tomorrow.to_rfc3339(),
            tomorrow.format("%Y-%m-%d %H:%M:%S").to_string(),
        ] {
            let input = PostFields {
                published_at: raw.into(),
                ..fields("Title", "Body")
            }
            .validate(now)
            .unwrap();
            assert_eq!(input.published_at, Some(Some(tomorrow)));
        }

        let date_only = PostFields {
            published_at: (now + TimeDelta::days(2)).format("%Y-%m-%d").to_string().into(),
            ..fields("Title", "Body")
        }
        .validate(now)
        .unwrap();
        assert!(date_only.published_at.flatten().is_some());
    }

    #[test]
    fn test_published_at_in_past_is_rejected() {
        let now = Utc::now();
        let errors = PostFields {
            published_at: (now - TimeDelta::days(1)).to_rfc3339().into(),
            ..fields("Title", "Body")
        }
        .validate(now)
        .unwrap_err();

        assert_eq!(
            errors.by_field()["published_at"],
            vec!["The published at must be a date after or equal to now."]
        );
    }

    #[test]
    fn test_published_at_within_current_second_is_accepted() {
        let now = Utc::now();
        let input = PostFields {
            published_at: now.format("%Y-%m-%d %H:%M:%S").to_string().into(),
            ..fields("Title", "Body")
        }
        .validate(now)
        .unwrap();
        assert_eq!(input.published_at, Some(Some(now.trunc_subsecs(0))));
    }

    #[test]
    fn test_garbage_published_at() {
        let errors = PostFields {
            published_at: "next tuesday".to_string().into(),
            ..fields("Title", "Body")
        }
        .validate(Utc::now())
        .unwrap_err();
        assert_eq!(
            errors.errors()[0].message,
            "The published at is not a valid date."
        );
    }

    #[test]
    fn test_wrong_types_are_reported_per_field() {
        let errors = PostFields {
            title: Submitted::WrongType,
            content: "Body".to_string().into(),
            is_draft: Submitted::WrongType,
            published_at: Submitted::WrongType,
        }
        .validate(Utc::now())
        .unwrap_err();
        let by_field = errors.by_field();

        assert_eq!(by_field["title"], vec!["The title must be a string."]);
        assert_eq!(
            by_field["is_draft"],
            vec!["The is draft field must be true or false."]
        );
        assert_eq!(
            by_field["published_at"],
            vec!["The published at is not a valid date."]
        );
        assert!(!by_field.contains_key("content"));
    }

    #[test]
    fn test_null_title_is_required() {
        let errors = PostFields {
            title: Submitted::Null,
            ..fields("ignored", "Body")
        }
        .validate(Utc::now())
        .unwrap_err();
        assert_eq!(errors.by_field()["title"], vec!["The title field is required."]);
    }

    #[test]
    fn test_published_at_absent_null_and_blank() {
        let now = Utc::now();

        let absent = fields("Title", "Body").validate(now).unwrap();
        assert_eq!(absent.published_at, None);

        let null = PostFields {
            published_at: Submitted::Null,
            ..fields("Title", "Body")
        }
        .validate(now)
        .unwrap();
        assert_eq!(null.published_at, Some(None));

        let blank = PostFields {
            published_at: "  ".to_string().into(),
            ..fields("Title", "Body")
        }
        .validate(now)
        .unwrap();
        assert_eq!(blank.published_at, Some(None));
    }
}
