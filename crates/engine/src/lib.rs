//! Data model and rules of the bulletin board.
//!
//! The [`Engine`] owns the database connection and exposes every operation
//! on rubrics, listings, accounts and the SMS demo records. Each write runs
//! inside a single database transaction: validation happens first, so a
//! rejected submission never leaves a partial write behind.

pub use bbs::{Bb, BbFields, BbKind, BbOrder, BbSubmission};
pub use error::{EngineError, FieldError, ValidationErrors, ValidationKind};
pub use ops::{Page, ProfileUpdate, Registration};
pub use photos::{numbered_photo_path, photo_path};
pub use price::{Price, PriceError};
pub use rubrics::{Rubric, RubricCount};
pub use sms::Sms;
pub use users::User;
pub use validation::ListingRules;

use sea_orm::DatabaseConnection;

mod bbs;
mod error;
mod ops;
mod photos;
mod price;
mod rubrics;
mod sms;
mod users;
pub mod validation;

type ResultEngine<T> = Result<T, EngineError>;

/// Number of listings shown per index page.
pub const PAGE_SIZE: u64 = 6;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    rules: ListingRules,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    rules: Option<ListingRules>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the submission rules (the title denylist).
    pub fn rules(mut self, rules: ListingRules) -> EngineBuilder {
        self.rules = Some(rules);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            rules: self.rules.unwrap_or_default(),
        })
    }
}
