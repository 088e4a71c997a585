use chrono::Utc;
use sea_orm::{ActiveValue, QueryOrder, TransactionTrait, prelude::*};

use crate::{ResultEngine, Sms, ValidationErrors, ValidationKind, sms};

use crate::{Engine, with_tx};

impl Engine {
    /// Stored SMS records, newest first.
    pub async fn sms_list(&self) -> ResultEngine<Vec<Sms>> {
        let models = sms::Entity::find()
            .order_by_desc(sms::Column::CreatedAt)
            .order_by_desc(sms::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Sms::from).collect())
    }

    pub async fn new_sms(&self, text: &str) -> ResultEngine<Sms> {
        if text.trim().is_empty() {
            return Err(ValidationErrors::single(
                "text",
                ValidationKind::MissingDescription,
                "text must not be empty",
            )
            .into());
        }
        with_tx!(self, |db_tx| {
            let active = sms::ActiveModel {
                id: ActiveValue::NotSet,
                text: ActiveValue::Set(text.to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            };
            let model = active.insert(&db_tx).await?;
            Ok(Sms::from(model))
        })
    }
}
