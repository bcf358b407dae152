use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
}

// the no-field variants keep empty braces so that flattening them
// still produces a JSON map
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Context {
    AdminDelete { id: i64 },
    AdminEdit { id: i64 },
    AdminEditView { id: i64 },
    AdminList {},
    FormView { token: String },
    GenerateCode {},
    Issue { id: i64 },
    Profile { id: i64 },
    Submit { token: String },
}

impl Context {
    pub fn admin_delete(id: i64) -> Context {
        Context::AdminDelete { id }
    }

    pub fn admin_edit(id: i64) -> Context {
        Context::AdminEdit { id }
    }

    pub fn admin_edit_view(id: i64) -> Context {
        Context::AdminEditView { id }
    }

    pub fn admin_list() -> Context {
        Context::AdminList {}
    }

    pub fn form_view(token: String) -> Context {
        Context::FormView { token }
    }

    pub fn generate_code() -> Context {
        Context::GenerateCode {}
    }

    pub fn issue(id: i64) -> Context {
        Context::Issue { id }
    }

    pub fn profile(id: i64) -> Context {
        Context::Profile { id }
    }

    pub fn submit(token: String) -> Context {
        Context::Submit { token }
    }
}
