use serde::Serialize;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Created {
        id: i64,
    },
    Form {
        token: Uuid,
    },
    GenericCode {
        image: String,
        url: Url,
    },
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
    Index {
        service: &'a str,
        version: &'a str,
    },
}
