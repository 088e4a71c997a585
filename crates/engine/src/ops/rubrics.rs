use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, ResultEngine, Rubric, RubricCount, ValidationErrors, ValidationKind, bbs,
    rubrics, validation::clean_rubric_name, validation::normalize_optional_text,
};

use crate::{Engine, with_tx};

// Ties on the count fall back to the name so the order is stable.
const POPULARITY_SQL: &str = "SELECT r.id AS id, r.name AS name, r.photo AS photo, \
     COUNT(b.id) AS count \
     FROM rubrics r LEFT JOIN bbs b ON b.rubric_id = r.id \
     GROUP BY r.id, r.name, r.photo";

impl Engine {
    /// All rubrics in default order: name, then rubrics with a photo first.
    pub async fn rubrics(&self) -> ResultEngine<Vec<Rubric>> {
        let models = rubrics::Entity::find()
            .order_by_asc(rubrics::Column::Name)
            .order_by_desc(rubrics::Column::Photo)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Rubric::from).collect())
    }

    pub async fn rubric(&self, rubric_id: i32) -> ResultEngine<Rubric> {
        self.require_rubric(&self.database, rubric_id)
            .await
            .map(Rubric::from)
    }

    /// Rubrics with their listing counts, most populated first.
    pub async fn rubrics_by_popularity(&self) -> ResultEngine<Vec<RubricCount>> {
        self.rubric_counts(false).await
    }

    /// Same order as [`Engine::rubrics_by_popularity`], without empty rubrics.
    pub async fn rubrics_with_bbs(&self) -> ResultEngine<Vec<RubricCount>> {
        self.rubric_counts(true).await
    }

    async fn rubric_counts(&self, non_empty: bool) -> ResultEngine<Vec<RubricCount>> {
        let having = if non_empty {
            " HAVING COUNT(b.id) > 0"
        } else {
            ""
        };
        let sql = format!("{POPULARITY_SQL}{having} ORDER BY count DESC, r.name ASC");
        let backend = self.database.get_database_backend();
        let rows = RubricCount::find_by_statement(Statement::from_string(backend, sql))
            .all(&self.database)
            .await?;
        Ok(rows)
    }

    pub async fn new_rubric(&self, name: &str, photo: Option<&str>) -> ResultEngine<Rubric> {
        let name = clean_rubric_name(name)?;
        let photo = normalize_optional_text(photo);
        with_tx!(self, |db_tx| {
            self.ensure_rubric_name_free(&db_tx, &name, None).await?;

            let active = rubrics::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                photo: ActiveValue::Set(photo),
            };
            let model = active.insert(&db_tx).await?;
            tracing::info!(rubric_id = model.id, name = %model.name, "rubric created");
            Ok(Rubric::from(model))
        })
    }

    /// Renames a rubric. A `photo` of `None` keeps the stored photo, a blank
    /// one removes it.
    pub async fn update_rubric(
        &self,
        rubric_id: i32,
        name: &str,
        photo: Option<&str>,
    ) -> ResultEngine<Rubric> {
        let name = clean_rubric_name(name)?;
        with_tx!(self, |db_tx| {
            let model = self.require_rubric(&db_tx, rubric_id).await?;
            let photo = match photo {
                Some(photo) => normalize_optional_text(Some(photo)),
                None => model.photo.clone(),
            };
            if model.name == name && model.photo == photo {
                Ok(Rubric::from(model))
            } else {
                self.ensure_rubric_name_free(&db_tx, &name, Some(rubric_id))
                    .await?;

                let mut active: rubrics::ActiveModel = model.into();
                active.name = ActiveValue::Set(name);
                active.photo = ActiveValue::Set(photo);
                let model = active.update(&db_tx).await?;
                Ok(Rubric::from(model))
            }
        })
    }

    /// Deletes a rubric. Refused while any listing is filed under it.
    pub async fn delete_rubric(&self, rubric_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_rubric(&db_tx, rubric_id).await?;

            let referenced = bbs::Entity::find()
                .filter(bbs::Column::RubricId.eq(rubric_id))
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(EngineError::ReferentialIntegrity(model.name));
            }

            rubrics::Entity::delete_by_id(rubric_id).exec(&db_tx).await?;
            tracing::info!(rubric_id, "rubric deleted");
            Ok(())
        })
    }

    pub(super) async fn require_rubric<C: ConnectionTrait>(
        &self,
        conn: &C,
        rubric_id: i32,
    ) -> ResultEngine<rubrics::Model> {
        rubrics::Entity::find_by_id(rubric_id)
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("rubric {rubric_id}")))
    }

    async fn ensure_rubric_name_free(
        &self,
        db_tx: &DatabaseTransaction,
        name: &str,
        except: Option<i32>,
    ) -> ResultEngine<()> {
        let mut query = rubrics::Entity::find().filter(rubrics::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(rubrics::Column::Id.ne(id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(ValidationErrors::single(
                "name",
                ValidationKind::DuplicateName,
                format!("rubric '{name}' already exists"),
            )
            .into());
        }
        Ok(())
    }
}
