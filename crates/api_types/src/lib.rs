use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    Buy,
    #[default]
    Sell,
    Exchange,
}

pub mod error {
    use super::*;

    /// One failed field of a submission.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FieldErrorView {
        pub field: String,
        pub kind: String,
        pub message: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ValidationErrorResponse {
        pub errors: Vec<FieldErrorView>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ErrorResponse {
        pub error: String,
    }
}

pub mod rubric {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RubricView {
        pub id: i32,
        pub name: String,
        pub photo: Option<String>,
    }

    /// A rubric together with the number of listings filed under it.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RubricCountView {
        pub id: i32,
        pub name: String,
        pub photo: Option<String>,
        pub count: i64,
    }

    /// Body of both rubric creation and rubric edit. On edit a missing
    /// `photo` keeps the stored one.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RubricWrite {
        pub name: String,
        #[serde(default)]
        pub photo: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RubricListResponse {
        pub rubrics: Vec<RubricCountView>,
    }
}

pub mod bb {
    use super::rubric::{RubricCountView, RubricView};
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BbView {
        pub id: i32,
        pub kind: ListingKind,
        pub rubric_id: Option<i32>,
        pub title: String,
        pub content: Option<String>,
        /// Decimal string with two fraction digits, e.g. `"15000.00"`.
        pub price: Option<String>,
        pub published: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub photo: Option<String>,
        pub title_and_price: String,
    }

    /// A listing as typed in by a user.
    ///
    /// `price` is decimal text (`.` or `,` as separator); it is parsed by the
    /// server so that a malformed value is reported with the other field
    /// errors. When editing, a missing `kind` or `photo` keeps the stored
    /// value and an empty `photo` removes it.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BbSubmit {
        #[serde(default)]
        pub kind: Option<ListingKind>,
        #[serde(default)]
        pub rubric_id: Option<i32>,
        pub title: String,
        #[serde(default)]
        pub content: Option<String>,
        #[serde(default)]
        pub price: Option<String>,
        #[serde(default)]
        pub photo: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct KindOption {
        pub value: ListingKind,
        pub label: String,
    }

    /// What a client needs to draw the listing form.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BbFormContext {
        pub kinds: Vec<KindOption>,
        pub rubrics: Vec<RubricView>,
        pub initial_price: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PageInfo {
        pub number: u64,
        pub num_pages: u64,
        pub total: u64,
        pub has_next: bool,
        pub has_previous: bool,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct IndexResponse {
        pub bbs: Vec<BbView>,
        pub rubrics: Vec<RubricCountView>,
        pub page: PageInfo,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ByRubricResponse {
        pub bbs: Vec<BbView>,
        pub rubrics: Vec<RubricCountView>,
        pub current_rubric: RubricView,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DetailResponse {
        pub bb: BbView,
        pub rubrics: Vec<RubricCountView>,
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct IndexQuery {
        pub page: Option<String>,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RubricOrder {
        #[default]
        Price,
        Recency,
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ByRubricQuery {
        #[serde(default)]
        pub order: RubricOrder,
    }
}

pub mod search {
    use super::bb::BbView;
    use super::rubric::RubricView;
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SearchRequest {
        pub keyword: String,
        pub rubric_id: i32,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SearchFormContext {
        pub rubrics: Vec<RubricView>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SearchResponse {
        pub keyword: String,
        pub rubric_id: i32,
        pub bbs: Vec<BbView>,
    }
}

pub mod photo {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PhotoUploadQuery {
        pub filename: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PhotoUploaded {
        /// Reference to store in a listing or rubric `photo` field.
        pub photo: String,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RegisterUser {
        pub username: String,
        #[serde(default)]
        pub email: String,
        #[serde(default)]
        pub first_name: String,
        #[serde(default)]
        pub last_name: String,
        pub password1: String,
        pub password2: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LoginUser {
        pub username: String,
        pub password: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PasswordChange {
        pub old_password: String,
        pub new_password1: String,
        pub new_password2: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Profile {
        pub username: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ProfileEdit {
        #[serde(default)]
        pub email: Option<String>,
        #[serde(default)]
        pub first_name: Option<String>,
        #[serde(default)]
        pub last_name: Option<String>,
    }
}

pub mod sms {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SmsView {
        pub id: i32,
        pub text: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SmsListResponse {
        pub sms: Vec<SmsView>,
    }
}
