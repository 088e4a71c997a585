//! Listing and rubric checks.
//!
//! Listings are validated in two independent tiers:
//!
//! - [`check_bb_storage`] runs on every persistence path (admin tooling, API
//!   creation, form submission).
//! - [`check_bb_form`] runs only on the user-facing submission path. It
//!   parses the raw input, re-checks description and price with user-facing
//!   messages and applies the title denylist.
//!
//! Entry points compose the two explicitly; neither calls the other.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    BbFields, BbSubmission, Price, ValidationErrors, ValidationKind, price::PriceError,
    rubrics::NAME_MAX_CHARS,
};

const TITLE_MAX_CHARS: usize = 50;
const KEYWORD_MAX_CHARS: usize = 20;

#[allow(clippy::expect_used)]
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.{4,}$").expect("title pattern is a valid literal"));

/// Rules that only apply to user submissions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingRules {
    banned_titles: Vec<String>,
}

impl ListingRules {
    pub fn new(banned_titles: Vec<String>) -> Self {
        Self { banned_titles }
    }

    fn is_banned(&self, title: &str) -> bool {
        self.banned_titles.iter().any(|banned| banned == title)
    }
}

impl Default for ListingRules {
    fn default() -> Self {
        Self::new(vec!["Прошлогодний снег".to_string()])
    }
}

/// Storage-level checks: title pattern and length, description present,
/// price not negative.
pub fn check_bb_storage(fields: &BbFields) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if !TITLE_RE.is_match(&fields.title) {
        errors.push(
            "title",
            ValidationKind::InvalidTitle,
            "title must be at least 4 characters long",
        );
    } else if fields.title.chars().count() > TITLE_MAX_CHARS {
        errors.push(
            "title",
            ValidationKind::InvalidTitle,
            format!("title must be at most {TITLE_MAX_CHARS} characters long"),
        );
    }

    if is_blank(fields.content.as_deref()) {
        errors.push(
            "content",
            ValidationKind::MissingDescription,
            "content is required",
        );
    }

    if fields.price.is_some_and(Price::is_negative) {
        errors.push(
            "price",
            ValidationKind::NegativePrice,
            "price must not be negative",
        );
    }

    errors
}

/// Form-level checks over a raw submission.
///
/// Always returns the best-effort typed fields together with the failures,
/// so that the storage tier can still report its own problems. An unparsable
/// price is reported here and left out of the returned fields.
pub fn check_bb_form(
    submission: &BbSubmission,
    rules: &ListingRules,
) -> (BbFields, ValidationErrors) {
    let mut errors = ValidationErrors::new();

    let title = submission.title.trim().to_string();
    if rules.is_banned(&title) {
        errors.push(
            "title",
            ValidationKind::BannedTitle,
            "this item is not allowed for sale",
        );
    }

    if is_blank(submission.content.as_deref()) {
        errors.push(
            "content",
            ValidationKind::MissingDescription,
            "describe the item you are selling",
        );
    }

    let raw_price = submission
        .price
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let price = match raw_price.map(str::parse::<Price>) {
        None => None,
        Some(Ok(price)) => {
            if price.is_negative() {
                errors.push(
                    "price",
                    ValidationKind::NegativePrice,
                    "enter a price that is zero or more",
                );
            }
            Some(price)
        }
        Some(Err(err)) => {
            errors.push("price", ValidationKind::InvalidPrice, price_message(&err));
            None
        }
    };

    if submission.rubric_id.is_none() {
        errors.push(
            "rubric",
            ValidationKind::MissingRubric,
            "choose a rubric for the listing",
        );
    }

    let fields = BbFields {
        kind: submission.kind.unwrap_or_default(),
        rubric_id: submission.rubric_id,
        title,
        content: submission.content.clone(),
        price,
        photo: normalize_optional_text(submission.photo.as_deref()),
    };

    (fields, errors)
}

/// Trims a rubric name and checks it is present and short enough.
pub fn clean_rubric_name(name: &str) -> Result<String, ValidationErrors> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationErrors::single(
            "name",
            ValidationKind::InvalidName,
            "rubric name must not be empty",
        ));
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        return Err(ValidationErrors::single(
            "name",
            ValidationKind::InvalidName,
            format!("rubric name must be at most {NAME_MAX_CHARS} characters long"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trims a search keyword and checks it is present and short enough.
pub fn clean_keyword(keyword: &str) -> Result<String, ValidationErrors> {
    let trimmed = keyword.trim();
    if trimmed.is_empty() {
        return Err(ValidationErrors::single(
            "keyword",
            ValidationKind::InvalidKeyword,
            "keyword is required",
        ));
    }
    if trimmed.chars().count() > KEYWORD_MAX_CHARS {
        return Err(ValidationErrors::single(
            "keyword",
            ValidationKind::InvalidKeyword,
            format!("keyword must be at most {KEYWORD_MAX_CHARS} characters long"),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|s| s.trim().is_empty())
}

fn price_message(err: &PriceError) -> String {
    format!("enter a valid price: {err}")
}
