//! Rubrics group listings. A rubric is referenced by listings, never owned
//! by them.

use sea_orm::{FromQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

pub(crate) const NAME_MAX_CHARS: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rubric {
    pub id: i32,
    pub name: String,
    pub photo: Option<String>,
}

/// A rubric annotated with the number of listings pointing at it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct RubricCount {
    pub id: i32,
    pub name: String,
    pub photo: Option<String>,
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rubrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub photo: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bbs::Entity")]
    Bbs,
}

impl Related<super::bbs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bbs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Rubric {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            name: value.name,
            photo: value.photo,
        }
    }
}
