//! Local field validation. A failed check never reaches the remote
//! collaborator; everything returns the UserInput error class with the
//! offending field as the code.

use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};
use crate::model::ItemDraft;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    // structural check only; the server owns real address verification
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
});

pub const PASSWORD_MIN: usize = 6;
pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 100;
pub const ITEM_DESCRIPTION_MIN: usize = 10;
pub const ITEM_DESCRIPTION_MAX: usize = 1000;
pub const CLAIM_DESCRIPTION_MIN: usize = 10;
pub const CLAIM_DESCRIPTION_MAX: usize = 500;

/// Canonical category list offered by the console; the wire accepts any
/// non-empty string.
pub const CATEGORIES: &[&str] = &[
    "Electronics", "Jewelry", "Clothing", "Documents", "Keys", "Bags", "Wallets", "Books", "Other",
];

pub fn email(value: &str) -> AppResult<()> {
    if EMAIL_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(AppError::user("email", "Invalid email address"))
    }
}

pub fn password(value: &str) -> AppResult<()> {
    if value.chars().count() < PASSWORD_MIN {
        return Err(AppError::user("password", "Password must be at least 6 characters"));
    }
    Ok(())
}

pub fn required(field: &'static str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::UserInput { code: field.into(), message: format!("{} is required", field) });
    }
    Ok(())
}

fn bounded(field: &'static str, value: &str, min: usize, max: usize) -> AppResult<()> {
    required(field, value)?;
    let len = value.chars().count();
    if len < min {
        return Err(AppError::UserInput { code: field.into(), message: format!("{} must be at least {} characters", field, min) });
    }
    if len > max {
        return Err(AppError::UserInput { code: field.into(), message: format!("{} must be at most {} characters", field, max) });
    }
    Ok(())
}

pub fn not_future(field: &'static str, date: NaiveDate) -> AppResult<()> {
    if date > Utc::now().date_naive() {
        return Err(AppError::UserInput { code: field.into(), message: format!("{} cannot be in the future", field) });
    }
    Ok(())
}

pub fn claim_description(value: &str) -> AppResult<()> {
    bounded("description", value, CLAIM_DESCRIPTION_MIN, CLAIM_DESCRIPTION_MAX)
}

pub fn item_draft(draft: &ItemDraft) -> AppResult<()> {
    bounded("title", &draft.title, TITLE_MIN, TITLE_MAX)?;
    bounded("description", &draft.description, ITEM_DESCRIPTION_MIN, ITEM_DESCRIPTION_MAX)?;
    required("category", &draft.category)?;
    required("location", &draft.location)?;
    not_future("date", draft.event_date)?;
    required("contactInfo", &draft.contact_info)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ItemDraft {
        ItemDraft {
            title: "Black wallet".into(),
            description: "Leather wallet with initials".into(),
            category: "Wallets".into(),
            location: "Main hall".into(),
            event_date: Utc::now().date_naive(),
            contact_info: "x@example.com".into(),
            image: None,
        }
    }

    #[test]
    fn email_shapes() {
        assert!(email("a@b.co").is_ok());
        assert!(email("  padded@ok.example  ").is_ok());
        assert!(email("no-at-sign").is_err());
        assert!(email("two@@b.co").is_err());
        assert!(email("a@nodot").is_err());
    }

    #[test]
    fn password_minimum() {
        assert!(password("secret").is_ok());
        assert!(password("12345").is_err());
    }

    #[test]
    fn item_draft_bounds() {
        assert!(item_draft(&draft()).is_ok());

        let mut d = draft();
        d.title = "abc".into();
        let err = item_draft(&d).unwrap_err();
        assert_eq!(err.code_str(), "title");

        let mut d = draft();
        d.event_date = Utc::now().date_naive() + chrono::Duration::days(2);
        assert_eq!(item_draft(&d).unwrap_err().code_str(), "date");

        let mut d = draft();
        d.description = "too short".into();
        assert!(item_draft(&d).is_err());
    }

    #[test]
    fn claim_description_bounds() {
        assert!(claim_description("this wallet has my initials").is_ok());
        assert!(claim_description("mine!").is_err());
        assert!(claim_description(&"x".repeat(501)).is_err());
    }
}
