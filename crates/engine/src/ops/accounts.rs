use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use password_hash::{SaltString, rand_core::OsRng};
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, User, ValidationErrors, ValidationKind, users,
    validation::normalize_optional_text,
};

use crate::{Engine, with_tx};

const USERNAME_MAX_CHARS: usize = 150;

/// Data of a new account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password1: String,
    pub password2: String,
}

/// Editable profile fields. `None` leaves the stored value alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::Hashing(err.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            tracing::warn!("unreadable password hash: {err}");
            false
        }
    }
}

fn check_new_password(password1: &str, password2: &str, errors: &mut ValidationErrors) {
    if password1.is_empty() {
        errors.push(
            "password1",
            ValidationKind::InvalidPassword,
            "password must not be empty",
        );
    } else if password1 != password2 {
        errors.push(
            "password2",
            ValidationKind::PasswordMismatch,
            "the two password fields didn't match",
        );
    }
}

impl Engine {
    /// Registers a new account. The e-mail must not belong to another
    /// account.
    pub async fn register(&self, registration: Registration) -> ResultEngine<User> {
        let username = registration.username.trim().to_string();
        let email = registration.email.trim().to_string();

        let mut errors = ValidationErrors::new();
        if username.is_empty()
            || username.chars().count() > USERNAME_MAX_CHARS
            || username.chars().any(char::is_whitespace)
        {
            errors.push(
                "username",
                ValidationKind::InvalidUsername,
                format!("username must be 1 to {USERNAME_MAX_CHARS} characters without spaces"),
            );
        }
        check_new_password(&registration.password1, &registration.password2, &mut errors);

        with_tx!(self, |db_tx| {
            if !username.is_empty()
                && users::Entity::find_by_id(username.clone())
                    .one(&db_tx)
                    .await?
                    .is_some()
            {
                errors.push(
                    "username",
                    ValidationKind::DuplicateUsername,
                    "a user with that username already exists",
                );
            }
            self.check_email_free(&db_tx, &email, None, &mut errors)
                .await?;
            errors.into_result()?;

            let active = users::ActiveModel {
                username: ActiveValue::Set(username),
                password_hash: ActiveValue::Set(hash_password(&registration.password1)?),
                email: ActiveValue::Set(email),
                first_name: ActiveValue::Set(registration.first_name.trim().to_string()),
                last_name: ActiveValue::Set(registration.last_name.trim().to_string()),
            };
            let model = active.insert(&db_tx).await?;
            tracing::info!(username = %model.username, "account registered");
            Ok(User::from(model))
        })
    }

    /// Checks credentials and returns the account they belong to.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        if username.is_empty() || password.is_empty() {
            return Err(EngineError::Unauthenticated);
        }
        let model = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .ok_or(EngineError::Unauthenticated)?;
        if !verify_password(password, &model.password_hash) {
            return Err(EngineError::Unauthenticated);
        }
        Ok(User::from(model))
    }

    pub async fn user(&self, username: &str) -> ResultEngine<User> {
        users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {username}")))
    }

    pub async fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password1: &str,
        new_password2: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {username}")))?;

            let mut errors = ValidationErrors::new();
            if !verify_password(old_password, &model.password_hash) {
                errors.push(
                    "old_password",
                    ValidationKind::InvalidPassword,
                    "your old password was entered incorrectly",
                );
            }
            check_new_password(new_password1, new_password2, &mut errors);
            errors.into_result()?;

            let mut active: users::ActiveModel = model.into();
            active.password_hash = ActiveValue::Set(hash_password(new_password1)?);
            active.update(&db_tx).await?;
            tracing::info!(username, "password changed");
            Ok(())
        })
    }

    pub async fn update_profile(&self, username: &str, update: ProfileUpdate) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {username}")))?;

            let mut errors = ValidationErrors::new();
            let email = update.email.as_deref().map(str::trim).map(ToString::to_string);
            if let Some(email) = &email
                && *email != model.email
            {
                self.check_email_free(&db_tx, email, Some(username), &mut errors)
                    .await?;
            }
            errors.into_result()?;

            let mut active: users::ActiveModel = model.into();
            if let Some(email) = email {
                active.email = ActiveValue::Set(email);
            }
            if let Some(first_name) = update.first_name {
                active.first_name = ActiveValue::Set(first_name.trim().to_string());
            }
            if let Some(last_name) = update.last_name {
                active.last_name = ActiveValue::Set(last_name.trim().to_string());
            }
            let model = active.update(&db_tx).await?;
            Ok(User::from(model))
        })
    }

    async fn check_email_free(
        &self,
        db_tx: &DatabaseTransaction,
        email: &str,
        except: Option<&str>,
        errors: &mut ValidationErrors,
    ) -> ResultEngine<()> {
        let Some(email) = normalize_optional_text(Some(email)) else {
            return Ok(());
        };
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(username) = except {
            query = query.filter(users::Column::Username.ne(username));
        }
        if query.one(db_tx).await?.is_some() {
            errors.push(
                "email",
                ValidationKind::DuplicateEmail,
                "an account with this e-mail already exists",
            );
        }
        Ok(())
    }
}
