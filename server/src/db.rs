use futures::future::BoxFuture;
use time::Date;
use uuid::Uuid;

use crate::errors::BackendError;
use crate::submission::{FormToken, NewSubmission, Submission};

#[cfg(test)]
pub(crate) mod mock;

pub trait Db {
    /// Mints a new one-time form token.
    fn create_form_token(&self) -> BoxFuture<Result<Uuid, BackendError>>;

    /// Looks up an outstanding form token.
    fn retrieve_form_token(
        &self,
        token: &Uuid,
    ) -> BoxFuture<Result<Option<FormToken>, BackendError>>;

    /// Uses up a form token. Returns whether the token was still
    /// outstanding; a token can only ever be consumed once.
    fn consume_form_token(&self, token: &Uuid) -> BoxFuture<Result<bool, BackendError>>;

    fn insert(&self, submission: NewSubmission) -> BoxFuture<Result<Submission, BackendError>>;

    fn retrieve(&self, id: i64) -> BoxFuture<Result<Option<Submission>, BackendError>>;

    /// Retrieves every submission, oldest first.
    fn retrieve_all(&self) -> BoxFuture<Result<Vec<Submission>, BackendError>>;

    /// Overwrites the form fields of an existing submission, leaving
    /// the credential fields alone.
    fn update(&self, id: i64, submission: NewSubmission) -> BoxFuture<Result<(), BackendError>>;

    /// Records a freshly issued credential: the stored image path and
    /// the last day it is valid.
    fn update_credential(
        &self,
        id: i64,
        image_path: &str,
        expiry_date: Date,
    ) -> BoxFuture<Result<(), BackendError>>;

    fn delete(&self, id: i64) -> BoxFuture<Result<(), BackendError>>;
}

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{
        self,
        postgres::{PgPool, PgRow},
    };
    use time::{Date, OffsetDateTime};
    use uuid::Uuid;

    use crate::errors::BackendError;
    use crate::submission::{FormToken, NewSubmission, Submission, Times};

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn create_form_token(&self) -> BoxFuture<Result<Uuid, BackendError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/create_form_token.sql"));

                let (token,): (Uuid,) = query
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(token)
            }
            .boxed()
        }

        fn retrieve_form_token(
            &self,
            token: &Uuid,
        ) -> BoxFuture<Result<Option<FormToken>, BackendError>> {
            let token = *token;

            async move {
                let query = sqlx::query(include_str!("queries/retrieve_form_token.sql"));

                let result: Option<FormToken> = query
                    .bind(token)
                    .try_map(|row: PgRow| {
                        let id: Uuid = try_get(&row, "id")?;
                        let created_at: OffsetDateTime = try_get(&row, "created_at")?;

                        Ok(FormToken::new(id, created_at))
                    })
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(result)
            }
            .boxed()
        }

        fn consume_form_token(&self, token: &Uuid) -> BoxFuture<Result<bool, BackendError>> {
            let token = *token;

            async move {
                let query = sqlx::query(include_str!("queries/consume_form_token.sql"));

                let count = query
                    .bind(token)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                Ok(count > 0)
            }
            .boxed()
        }

        fn insert(&self, submission: NewSubmission) -> BoxFuture<Result<Submission, BackendError>> {
            async move {
                let NewSubmission {
                    name,
                    email,
                    phone,
                    dob,
                    gender,
                    country,
                    comments,
                } = submission;

                let query = sqlx::query(include_str!("queries/create.sql"));

                let created = query
                    .bind(name)
                    .bind(email)
                    .bind(phone)
                    .bind(dob)
                    .bind(gender)
                    .bind(country)
                    .bind(comments)
                    .try_map(map_submission_row)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(created)
            }
            .boxed()
        }

        fn retrieve(&self, id: i64) -> BoxFuture<Result<Option<Submission>, BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/retrieve.sql"));

                let submission: Option<Submission> = query
                    .bind(id)
                    .try_map(map_submission_row)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(submission)
            }
            .boxed()
        }

        fn retrieve_all(&self) -> BoxFuture<Result<Vec<Submission>, BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/retrieve_all.sql"));

                let submissions = query
                    .try_map(map_submission_row)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(submissions)
            }
            .boxed()
        }

        fn update(&self, id: i64, submission: NewSubmission) -> BoxFuture<Result<(), BackendError>> {
            async move {
                let NewSubmission {
                    name,
                    email,
                    phone,
                    dob,
                    gender,
                    country,
                    comments,
                } = submission;

                let query = sqlx::query(include_str!("queries/update.sql"));

                let count = query
                    .bind(id)
                    .bind(name)
                    .bind(email)
                    .bind(phone)
                    .bind(dob)
                    .bind(gender)
                    .bind(country)
                    .bind(comments)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NonExistentId(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn update_credential(
            &self,
            id: i64,
            image_path: &str,
            expiry_date: Date,
        ) -> BoxFuture<Result<(), BackendError>> {
            let image_path = image_path.to_owned();

            async move {
                let query = sqlx::query(include_str!("queries/update_credential.sql"));

                let count = query
                    .bind(id)
                    .bind(image_path)
                    .bind(expiry_date)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NonExistentId(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn delete(&self, id: i64) -> BoxFuture<Result<(), BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/delete.sql"));

                let count = query
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NonExistentId(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }
    }

    fn map_submission_row(row: PgRow) -> Result<Submission, sqlx::Error> {
        let id: i64 = try_get(&row, "id")?;
        let name: String = try_get(&row, "name")?;
        let email: String = try_get(&row, "email")?;
        let phone: String = try_get(&row, "phone")?;
        let dob: Date = try_get(&row, "dob")?;
        let gender: String = try_get(&row, "gender")?;
        let country: String = try_get(&row, "country")?;
        let comments: Option<String> = try_get(&row, "comments")?;
        let credential_image_path: Option<String> = try_get(&row, "credential_image_path")?;
        let expiry_date: Option<Date> = try_get(&row, "expiry_date")?;
        let created_at: OffsetDateTime = try_get(&row, "created_at")?;
        let updated_at: OffsetDateTime = try_get(&row, "updated_at")?;

        Ok(Submission {
            id,
            name,
            email,
            phone,
            dob,
            gender,
            country,
            comments,
            credential_image_path,
            expiry_date,
            times: Times {
                created_at,
                updated_at,
            },
        })
    }

    fn try_get<'a, T: sqlx::Type<sqlx::Postgres> + sqlx::decode::Decode<'a, sqlx::Postgres>>(
        row: &'a PgRow,
        column: &str,
    ) -> Result<T, sqlx::Error> {
        use sqlx::prelude::*;

        row.try_get(column)
    }

    fn map_sqlx_error(error: sqlx::Error) -> BackendError {
        BackendError::Sqlx { source: error }
    }
}
