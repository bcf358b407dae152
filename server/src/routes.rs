use std::sync::Arc;

use log::{error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, WithStatus};

use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod rejection;
mod response;

pub use internal::*;

/// The maximum form body size to accept. The forms are a handful of
/// short text fields, so this is generous.
const MAX_CONTENT_LENGTH: u64 = 64 * 1024;

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status_code_for(e), "message" => %r.error);
        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status_code_for(e)));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        MissingField { .. } | MalformedDate { .. } => StatusCode::BAD_REQUEST,
        NonExistentId(..) | InvalidToken { .. } => StatusCode::NOT_FOUND,
        CredentialExpired { .. } => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use uuid::Uuid;
    use warp::body::{content_length_limit, form};
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{get as g, path as p, path::param as par, post};

    use super::{handlers, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;
    use crate::submission::SubmissionForm;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name<O: Clone + Send + Sync + 'static>(environment: Environment<O>) -> Route {
            let $route_variable = warp::any()
                .map(move || environment.clone());

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    fn form_body() -> impl Filter<Extract = (SubmissionForm,), Error = warp::Rejection> + Clone {
        content_length_limit(MAX_CONTENT_LENGTH).and(form())
    }

    route!(make_index_route => index, rt; end(), g());
    route!(make_generate_code_route => generate_code, rt; p("generate_qr"), end(), post());
    route!(make_form_view_route => form_view, rt; p("form"), par::<Uuid>(), end(), g());
    route!(make_submit_route => submit, rt; p("form"), par::<Uuid>(), end(), post(), form_body());
    route!(make_issue_route => issue, rt; p("generate_user_qr"), par::<i64>(), end(), g());
    route!(make_profile_route => profile, rt; p("profile"), par::<i64>(), end(), g());
    route!(make_admin_list_route => admin_list, rt; p("admin"), end(), g());
    route!(make_admin_edit_view_route => admin_edit_view, rt; p("admin"), p("edit"), par::<i64>(), end(), g());
    route!(make_admin_edit_route => admin_edit, rt; p("admin"), p("edit"), par::<i64>(), end(), post(), form_body());
    route!(make_admin_delete_route => admin_delete, rt; p("admin"), p("delete"), par::<i64>(), end(), post());
}
