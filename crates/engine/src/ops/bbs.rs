use chrono::Utc;
use regex::RegexBuilder;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, Select,
    TransactionTrait, prelude::*,
};

use crate::{
    Bb, BbFields, BbOrder, BbSubmission, EngineError, ResultEngine, ValidationErrors, ValidationKind, bbs,
    validation::{check_bb_form, check_bb_storage, clean_keyword},
};

use crate::{Engine, with_tx};

/// One page of a longer listing sequence. Pages are numbered from 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// Resolves a requested page the forgiving way: anything that is not an
/// integer means the first page, anything out of range means the last one.
fn resolve_page_number(requested: Option<&str>, num_pages: u64) -> u64 {
    let last = num_pages.max(1);
    match requested.map(str::trim).map(str::parse::<i64>) {
        None | Some(Err(_)) => 1,
        Some(Ok(n)) if n < 1 => last,
        Some(Ok(n)) => (n as u64).min(last),
    }
}

/// Newest first, then by title.
fn by_recency() -> Select<bbs::Entity> {
    bbs::Entity::find()
        .order_by_desc(bbs::Column::Published)
        .order_by_asc(bbs::Column::Title)
}

/// Submission fields the client left out. An update keeps their stored
/// values, and they take no part in the unchanged-listing comparison.
#[derive(Clone, Copy, Debug, Default)]
struct Omitted {
    kind: bool,
    photo: bool,
}

impl Omitted {
    fn from_submission(submission: &BbSubmission) -> Self {
        Self {
            kind: submission.kind.is_none(),
            photo: submission.photo.is_none(),
        }
    }
}

fn into_bbs(models: Vec<bbs::Model>) -> ResultEngine<Vec<Bb>> {
    models.into_iter().map(Bb::try_from).collect()
}

impl Engine {
    pub async fn bb(&self, bb_id: i32) -> ResultEngine<Bb> {
        let model = self.require_bb(&self.database, bb_id).await?;
        Bb::try_from(model)
    }

    /// Listings newest first, split into pages of `per_page`.
    pub async fn bbs_page(&self, page: Option<&str>, per_page: u64) -> ResultEngine<Page<Bb>> {
        let paginator = by_recency().paginate(&self.database, per_page.max(1));
        let counts = paginator.num_items_and_pages().await?;
        let number = resolve_page_number(page, counts.number_of_pages);
        let items = into_bbs(paginator.fetch_page(number - 1).await?)?;

        Ok(Page {
            number,
            num_pages: counts.number_of_pages.max(1),
            total: counts.number_of_items,
            items,
        })
    }

    /// Listings of a rubric in the requested order.
    ///
    /// A rubric without listings is reported as not found, like an unknown
    /// rubric; [`Engine::search_bbs`] returns an empty sequence instead.
    pub async fn bbs_by_rubric(&self, rubric_id: i32, order: BbOrder) -> ResultEngine<Vec<Bb>> {
        self.require_rubric(&self.database, rubric_id).await?;

        let query = match order {
            BbOrder::Price => bbs::Entity::find()
                .order_by_asc(bbs::Column::PriceMinor)
                .order_by_desc(bbs::Column::Published),
            BbOrder::Recency => by_recency(),
        };
        let models = query
            .filter(bbs::Column::RubricId.eq(rubric_id))
            .all(&self.database)
            .await?;
        if models.is_empty() {
            return Err(EngineError::KeyNotFound(format!(
                "listings of rubric {rubric_id}"
            )));
        }
        into_bbs(models)
    }

    /// Listings of a rubric whose title matches `keyword`, a case-insensitive
    /// regular expression. Possibly empty.
    pub async fn search_bbs(&self, keyword: &str, rubric_id: i32) -> ResultEngine<Vec<Bb>> {
        let keyword = clean_keyword(keyword)?;
        let pattern = RegexBuilder::new(&keyword)
            .case_insensitive(true)
            .build()
            .map_err(|err| {
                ValidationErrors::single(
                    "keyword",
                    ValidationKind::InvalidKeyword,
                    format!("keyword is not a valid expression: {err}"),
                )
            })?;
        self.require_rubric(&self.database, rubric_id).await?;

        let models = by_recency()
            .filter(bbs::Column::RubricId.eq(rubric_id))
            .all(&self.database)
            .await?;
        let matching = models
            .into_iter()
            .filter(|model| pattern.is_match(&model.title))
            .collect();
        into_bbs(matching)
    }

    /// Creates a listing with storage-level validation only (admin tooling,
    /// API-style creation).
    pub async fn new_bb(&self, fields: BbFields) -> ResultEngine<Bb> {
        let errors = check_bb_storage(&fields);
        self.insert_bb(fields, errors).await
    }

    /// Creates a listing from a user submission: form-level checks, then
    /// storage-level checks, every failure reported together.
    pub async fn submit_bb(&self, submission: BbSubmission) -> ResultEngine<Bb> {
        let (fields, errors) = self.check_submission(&submission);
        self.insert_bb(fields, errors).await
    }

    /// Updates a listing with storage-level validation only.
    ///
    /// When every field equals the stored value nothing is written and the
    /// stored listing is returned unchanged.
    pub async fn update_bb(&self, bb_id: i32, fields: BbFields) -> ResultEngine<Bb> {
        let errors = check_bb_storage(&fields);
        self.save_bb(bb_id, fields, errors, Omitted::default())
            .await
    }

    /// Updates a listing from a user submission. A left out kind or photo
    /// keeps its stored value.
    pub async fn submit_bb_update(&self, bb_id: i32, submission: BbSubmission) -> ResultEngine<Bb> {
        let (fields, errors) = self.check_submission(&submission);
        self.save_bb(bb_id, fields, errors, Omitted::from_submission(&submission))
            .await
    }

    pub async fn delete_bb(&self, bb_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_bb(&db_tx, bb_id).await?;
            bbs::Entity::delete_by_id(bb_id).exec(&db_tx).await?;
            tracing::info!(bb_id, "listing deleted");
            Ok(())
        })
    }

    fn check_submission(&self, submission: &BbSubmission) -> (BbFields, ValidationErrors) {
        let (fields, mut errors) = check_bb_form(submission, &self.rules);
        errors.merge(check_bb_storage(&fields));
        (fields, errors)
    }

    async fn insert_bb(&self, fields: BbFields, errors: ValidationErrors) -> ResultEngine<Bb> {
        with_tx!(self, |db_tx| {
            self.finish_validation(&db_tx, &fields, errors).await?;

            let now = Utc::now();
            let active = bbs::ActiveModel {
                id: ActiveValue::NotSet,
                kind: ActiveValue::Set(fields.kind.as_str().to_string()),
                rubric_id: ActiveValue::Set(fields.rubric_id),
                title: ActiveValue::Set(fields.title),
                content: ActiveValue::Set(fields.content),
                price_minor: ActiveValue::Set(fields.price.map(i64::from)),
                published: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                photo: ActiveValue::Set(fields.photo),
            };
            let model = active.insert(&db_tx).await?;
            tracing::info!(bb_id = model.id, title = %model.title, "listing created");
            Bb::try_from(model)
        })
    }

    async fn save_bb(
        &self,
        bb_id: i32,
        mut fields: BbFields,
        errors: ValidationErrors,
        omitted: Omitted,
    ) -> ResultEngine<Bb> {
        with_tx!(self, |db_tx| {
            let model = self.require_bb(&db_tx, bb_id).await?;
            self.finish_validation(&db_tx, &fields, errors).await?;

            let stored = Bb::try_from(model.clone())?;
            if omitted.kind {
                fields.kind = stored.kind;
            }
            if omitted.photo {
                fields.photo = stored.photo.clone();
            }
            if stored.fields() == fields {
                tracing::debug!(bb_id, "listing unchanged, skipping write");
                Ok(stored)
            } else {
                let mut active: bbs::ActiveModel = model.into();
                active.kind = ActiveValue::Set(fields.kind.as_str().to_string());
                active.rubric_id = ActiveValue::Set(fields.rubric_id);
                active.title = ActiveValue::Set(fields.title);
                active.content = ActiveValue::Set(fields.content);
                active.price_minor = ActiveValue::Set(fields.price.map(i64::from));
                active.photo = ActiveValue::Set(fields.photo);
                active.updated_at = ActiveValue::Set(Utc::now());
                let model = active.update(&db_tx).await?;
                Bb::try_from(model)
            }
        })
    }

    /// Adds the checks that need the database (the rubric must exist) and
    /// fails with everything collected so far.
    async fn finish_validation<C: ConnectionTrait>(
        &self,
        conn: &C,
        fields: &BbFields,
        mut errors: ValidationErrors,
    ) -> ResultEngine<()> {
        if let Some(rubric_id) = fields.rubric_id {
            match self.require_rubric(conn, rubric_id).await {
                Ok(_) => {}
                Err(EngineError::KeyNotFound(_)) => errors.push(
                    "rubric",
                    ValidationKind::UnknownRubric,
                    format!("rubric {rubric_id} does not exist"),
                ),
                Err(err) => return Err(err),
            }
        }
        errors.into_result()
    }

    async fn require_bb<C: ConnectionTrait>(&self, conn: &C, bb_id: i32) -> ResultEngine<bbs::Model> {
        bbs::Entity::find_by_id(bb_id)
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("listing {bb_id}")))
    }
}
