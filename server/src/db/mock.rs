use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::db::Db;
use crate::errors::BackendError;
use crate::submission::{FormToken, NewSubmission, Submission, Times};

/// An in-memory database for service-level tests.
#[derive(Default)]
pub(crate) struct MockDb {
    pub(crate) submissions: RwLock<HashMap<i64, Submission>>,
    pub(crate) tokens: RwLock<HashMap<Uuid, FormToken>>,
    next_id: AtomicI64,
}

impl Db for MockDb {
    fn create_form_token(&self) -> BoxFuture<Result<Uuid, BackendError>> {
        async move {
            let token = Uuid::new_v4();

            self.tokens
                .write()
                .unwrap()
                .insert(token, FormToken::new(token, OffsetDateTime::now_utc()));

            Ok(token)
        }
        .boxed()
    }

    fn retrieve_form_token(
        &self,
        token: &Uuid,
    ) -> BoxFuture<Result<Option<FormToken>, BackendError>> {
        let token = *token;

        async move { Ok(self.tokens.read().unwrap().get(&token).cloned()) }.boxed()
    }

    fn consume_form_token(&self, token: &Uuid) -> BoxFuture<Result<bool, BackendError>> {
        let token = *token;

        async move { Ok(self.tokens.write().unwrap().remove(&token).is_some()) }.boxed()
    }

    fn insert(&self, submission: NewSubmission) -> BoxFuture<Result<Submission, BackendError>> {
        async move {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let now = OffsetDateTime::now_utc();

            let NewSubmission {
                name,
                email,
                phone,
                dob,
                gender,
                country,
                comments,
            } = submission;

            let stored = Submission {
                id,
                name,
                email,
                phone,
                dob,
                gender,
                country,
                comments,
                credential_image_path: None,
                expiry_date: None,
                times: Times {
                    created_at: now,
                    updated_at: now,
                },
            };

            self.submissions.write().unwrap().insert(id, stored.clone());

            Ok(stored)
        }
        .boxed()
    }

    fn retrieve(&self, id: i64) -> BoxFuture<Result<Option<Submission>, BackendError>> {
        async move { Ok(self.submissions.read().unwrap().get(&id).cloned()) }.boxed()
    }

    fn retrieve_all(&self) -> BoxFuture<Result<Vec<Submission>, BackendError>> {
        async move {
            let mut all: Vec<Submission> =
                self.submissions.read().unwrap().values().cloned().collect();
            all.sort_by_key(|submission| submission.id);

            Ok(all)
        }
        .boxed()
    }

    fn update(&self, id: i64, submission: NewSubmission) -> BoxFuture<Result<(), BackendError>> {
        async move {
            let mut submissions = self.submissions.write().unwrap();
            let existing = submissions
                .get_mut(&id)
                .ok_or(BackendError::NonExistentId(id))?;

            let NewSubmission {
                name,
                email,
                phone,
                dob,
                gender,
                country,
                comments,
            } = submission;

            existing.name = name;
            existing.email = email;
            existing.phone = phone;
            existing.dob = dob;
            existing.gender = gender;
            existing.country = country;
            existing.comments = comments;
            existing.times.updated_at = OffsetDateTime::now_utc();

            Ok(())
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
            let mut submissions = self.submissions.write().unwrap();
            let existing = submissions
                .get_mut(&id)
                .ok_or(BackendError::NonExistentId(id))?;

            existing.credential_image_path = Some(image_path);
            existing.expiry_date = Some(expiry_date);
            existing.times.updated_at = OffsetDateTime::now_utc();

            Ok(())
        }
        .boxed()
    }

    fn delete(&self, id: i64) -> BoxFuture<Result<(), BackendError>> {
        async move {
            match self.submissions.write().unwrap().remove(&id) {
                Some(_) => Ok(()),
                None => Err(BackendError::NonExistentId(id)),
            }
        }
        .boxed()
    }
}
