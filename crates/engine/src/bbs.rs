//! Listings ("bulletin board" entries).
//!
//! A `Bb` carries a title, a free-form description, an optional price and
//! photo, the publication timestamp and the rubric it is filed under.

use chrono::{DateTime, Utc};
use sea_orm::{DbErr, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Price, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BbKind {
    Buy,
    #[default]
    Sell,
    Exchange,
}

impl BbKind {
    pub const ALL: [BbKind; 3] = [BbKind::Buy, BbKind::Sell, BbKind::Exchange];

    /// Single-letter code stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "b",
            Self::Sell => "s",
            Self::Exchange => "c",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::Exchange => "Exchange",
        }
    }
}

impl TryFrom<&str> for BbKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "b" | "buy" => Ok(Self::Buy),
            "s" | "sell" => Ok(Self::Sell),
            "c" | "exchange" => Ok(Self::Exchange),
            other => Err(EngineError::InvalidKind(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bb {
    pub id: i32,
    pub kind: BbKind,
    pub rubric_id: Option<i32>,
    pub title: String,
    pub content: Option<String>,
    pub price: Option<Price>,
    pub published: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub photo: Option<String>,
}

impl Bb {
    /// Title followed by the price, when one is set and not zero.
    pub fn title_and_price(&self) -> String {
        match self.price {
            Some(price) if !price.is_zero() => format!("{} ({price})", self.title),
            _ => self.title.clone(),
        }
    }

    /// The writable fields, as they would be submitted again.
    pub fn fields(&self) -> BbFields {
        BbFields {
            kind: self.kind,
            rubric_id: self.rubric_id,
            title: self.title.clone(),
            content: self.content.clone(),
            price: self.price,
            photo: self.photo.clone(),
        }
    }
}

/// Writable fields of a listing, already typed.
///
/// This is what the storage-level checks see, whatever the entry point.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BbFields {
    pub kind: BbKind,
    pub rubric_id: Option<i32>,
    pub title: String,
    pub content: Option<String>,
    pub price: Option<Price>,
    pub photo: Option<String>,
}

/// A listing as submitted by a user: the price is still raw text.
///
/// `kind` and `photo` may be left out. A new listing then gets the default
/// kind and no photo; an edited listing keeps what it had. A blank `photo`
/// removes the stored one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BbSubmission {
    pub kind: Option<BbKind>,
    pub rubric_id: Option<i32>,
    pub title: String,
    pub content: Option<String>,
    pub price: Option<String>,
    pub photo: Option<String>,
}

/// Order of the listings of one rubric.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BbOrder {
    /// Cheapest first, newest first among equal prices.
    #[default]
    Price,
    /// Newest first, then by title.
    Recency,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bbs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub kind: String,
    pub rubric_id: Option<i32>,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,
    pub price_minor: Option<i64>,
    pub published: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub photo: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rubrics::Entity",
        from = "Column::RubricId",
        to = "super::rubrics::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Rubric,
}

impl Related<super::rubrics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rubric.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Bb {
    type Error = EngineError;

    fn try_from(value: Model) -> ResultEngine<Self> {
        let kind = BbKind::try_from(value.kind.as_str()).map_err(|_| {
            EngineError::Database(DbErr::Type(format!(
                "invalid kind '{}' stored for listing {}",
                value.kind, value.id
            )))
        })?;
        Ok(Self {
            id: value.id,
            kind,
            rubric_id: value.rubric_id,
            title: value.title,
            content: value.content,
            price: value.price_minor.map(Price::from_minor),
            published: value.published,
            updated_at: value.updated_at,
            photo: value.photo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(price: Option<i64>) -> Bb {
        Bb {
            id: 1,
            kind: BbKind::Sell,
            rubric_id: None,
            title: "Toyota Camry".to_string(),
            content: Some("Good condition".to_string()),
            price: price.map(Price::from_minor),
            published: Utc::now(),
            updated_at: Utc::now(),
            photo: None,
        }
    }

    #[test]
    fn title_and_price_formats_two_decimals() {
        assert_eq!(
            sample(Some(1_500_000)).title_and_price(),
            "Toyota Camry (15000.00)"
        );
        assert_eq!(sample(None).title_and_price(), "Toyota Camry");
        assert_eq!(sample(Some(0)).title_and_price(), "Toyota Camry");
    }

    #[test]
    fn kind_codes_round_trip() {
        for kind in BbKind::ALL {
            assert_eq!(BbKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert_eq!(BbKind::default(), BbKind::Sell);
        assert!(BbKind::try_from("x").is_err());
    }

    #[test]
    fn listing_serializes_with_its_price() {
        let bb = sample(Some(1_500_000));
        let json = serde_json::to_value(&bb).unwrap();
        assert_eq!(json["price"], 1_500_000);
        assert_eq!(json["kind"], "sell");
        let back: Bb = serde_json::from_value(json).unwrap();
        assert_eq!(back, bb);
    }
}
