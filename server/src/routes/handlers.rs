use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, o};
use time::Date;
use uuid::Uuid;
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::credential;
use crate::dates;
use crate::db::Db;
use crate::environment::{Environment, SafeStore};
use crate::errors::BackendError;
use crate::routes::{
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::submission::{Submission, SubmissionForm};

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($expression:stmt);+) => {
        let start = Instant::now();

        // TODO when `try` blocks are stabilized, we can wrap the body
        // and return the headers even on errors
        let result = { $($expression)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn index<O: SafeStore>(_environment: Environment<O>) -> RouteResult {
    timed! {
        json(&SuccessResponse::Index {
            service: "gatepass",
            version: info::VERSION,
        })
    }
}

pub async fn generate_code<O: SafeStore>(environment: Environment<O>) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::generate_code(), e);

        let Environment {
            logger,
            db,
            urls,
            store,
            encoder,
        } = environment;

        debug!(logger, "Minting form token...");
        let token = db.create_form_token().await.map_err(error_handler)?;

        let url = urls.form(&token);

        debug!(logger, "Encoding form code..."; "token" => %token, "url" => %url);
        let image = encoder(url.as_str()).map_err(error_handler)?;

        debug!(logger, "Saving form code image...");
        let key = token.to_string();
        let _ = store.save(&key, image).await.map_err(error_handler)?;

        json(&SuccessResponse::GenericCode {
            image: store.reference(&key),
            url,
        })
    }
}

pub async fn form_view<O: SafeStore>(environment: Environment<O>, token: Uuid) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::form_view(token.to_string()), e);

        debug!(environment.logger, "Checking form token..."; "token" => %token);
        let form_token = environment
            .db
            .retrieve_form_token(&token)
            .await
            .map_err(error_handler)?
            .ok_or(BackendError::InvalidToken { token })
            .map_err(error_handler)?;

        json(&SuccessResponse::Form {
            token: form_token.id,
        })
    }
}

pub async fn submit<O: SafeStore>(
    environment: Environment<O>,
    token: Uuid,
    form: SubmissionForm,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::submit(token.to_string()), e);

        let Environment { logger, db, urls, .. } = environment;

        debug!(logger, "Validating submission..."; "token" => %token);
        let validated = form.validate().map_err(error_handler)?;

        // validation happens first so that a rejected POST leaves the
        // token outstanding
        debug!(logger, "Consuming form token...");
        consume_form_token(db.clone(), token).await.map_err(error_handler)?;

        debug!(logger, "Writing submission to database...");
        let created = db.insert(validated).await.map_err(error_handler)?;

        let logger = Arc::new(logger.new(o!("id" => created.id)));
        debug!(logger, "Sending confirmation...");

        with_header(
            with_status(
                json(&SuccessResponse::Created { id: created.id }),
                StatusCode::CREATED,
            ),
            "location",
            urls.profile(created.id).as_str(),
        )
    }
}

pub async fn issue<O: SafeStore>(environment: Environment<O>, id: i64) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::issue(id), e);

        let issued = issue_credential(&environment, id, dates::today_utc())
            .await
            .map_err(error_handler)?;

        json(&issued)
    }
}

pub async fn profile<O: SafeStore>(environment: Environment<O>, id: i64) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::profile(id), e);

        debug!(environment.logger, "Retrieving submission..."; "id" => id);
        let submission = environment
            .db
            .retrieve(id)
            .await
            .map_err(error_handler)?
            .ok_or(BackendError::NonExistentId(id))
            .map_err(error_handler)?;

        // the gate is evaluated on every view so re-issuing a
        // credential reopens access immediately
        credential::ensure_not_expired(&submission, dates::today_utc()).map_err(error_handler)?;

        json(&submission)
    }
}

pub async fn admin_list<O: SafeStore>(environment: Environment<O>) -> RouteResult {
    timed! {
        let submissions = environment
            .db
            .retrieve_all()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::admin_list(), e))?;

        json(&submissions)
    }
}

pub async fn admin_edit_view<O: SafeStore>(environment: Environment<O>, id: i64) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::admin_edit_view(id), e);

        debug!(environment.logger, "Retrieving submission for edit..."; "id" => id);
        let submission = environment
            .db
            .retrieve(id)
            .await
            .map_err(error_handler)?
            .ok_or(BackendError::NonExistentId(id))
            .map_err(error_handler)?;

        json(&submission)
    }
}

pub async fn admin_edit<O: SafeStore>(
    environment: Environment<O>,
    id: i64,
    form: SubmissionForm,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::admin_edit(id), e);

        debug!(environment.logger, "Validating edit..."; "id" => id);
        let validated = form.validate().map_err(error_handler)?;

        // only the form fields are editable; the credential fields
        // stay as they are
        debug!(environment.logger, "Overwriting submission fields...");
        environment.db.update(id, validated).await.map_err(error_handler)?;

        redirect_to_admin()
    }
}

pub async fn admin_delete<O: SafeStore>(environment: Environment<O>, id: i64) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::admin_delete(id), e);

        // the stored image, if any, is left in place
        debug!(environment.logger, "Deleting submission..."; "id" => id);
        environment.db.delete(id).await.map_err(error_handler)?;

        redirect_to_admin()
    }
}

async fn consume_form_token(
    db: Arc<dyn Db + Send + Sync>,
    token: Uuid,
) -> Result<(), BackendError> {
    let consumed = db.consume_form_token(&token).await?;

    if consumed {
        Ok(())
    } else {
        Err(BackendError::InvalidToken { token })
    }
}

/// The issuance service: looks up the submission, encodes its canonical
/// profile locator, overwrites the stored image for that ID, and
/// restarts the validity window from `today`. Returns the updated
/// submission.
async fn issue_credential<O: SafeStore>(
    environment: &Environment<O>,
    id: i64,
    today: Date,
) -> Result<Submission, BackendError> {
    let Environment {
        logger,
        db,
        urls,
        store,
        encoder,
    } = environment.clone();

    let mut submission = db
        .retrieve(id)
        .await?
        .ok_or(BackendError::NonExistentId(id))?;

    let locator = urls.profile(id);

    debug!(logger, "Encoding credential code..."; "id" => id, "locator" => %locator);
    let image = encoder(locator.as_str())?;

    debug!(logger, "Saving credential image...");
    let key = id.to_string();
    store.save(&key, image).await?;
    let image_path = store.reference(&key);

    let expiry_date = credential::expiry_for(today);

    debug!(logger, "Writing credential to database..."; "expiry_date" => %expiry_date);
    db.update_credential(id, &image_path, expiry_date).await?;

    submission.credential_image_path = Some(image_path);
    submission.expiry_date = Some(expiry_date);

    Ok(submission)
}

/// `303 See Other` back to the admin list, the redirect half of the
/// back office's post/redirect/get cycle.
fn redirect_to_admin() -> impl Reply {
    with_header(
        with_status(json(&()), StatusCode::SEE_OTHER),
        "location",
        "/admin",
    )
}

fn format_server_timing(duration: Duration) -> String {
    format!("handler;dur={}", duration.as_secs_f64() * 1000.0)
}
