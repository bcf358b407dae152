use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::dates;
use crate::errors::BackendError;
use crate::normalization;

/// A single visitor submission in the database.
#[derive(Clone, Debug, Serialize)]
pub struct Submission {
    /// The ID assigned by the database on creation.
    pub(crate) id: i64,

    /// The name provided.
    pub(crate) name: String,

    /// The email address provided.
    pub(crate) email: String,

    /// The phone number provided.
    pub(crate) phone: String,

    /// The date of birth provided.
    #[serde(with = "dates::iso_date")]
    pub(crate) dob: Date,

    /// The gender provided.
    pub(crate) gender: String,

    /// The country provided.
    pub(crate) country: String,

    /// The free-text comments provided, if any.
    pub(crate) comments: Option<String>,

    /// The public path of the issued credential image, if any. Set
    /// together with `expiry_date`, never separately.
    pub(crate) credential_image_path: Option<String>,

    /// The last day the issued credential is valid, if one has been
    /// issued. A submission without an expiry date is never expired.
    #[serde(with = "dates::iso_date_option")]
    pub(crate) expiry_date: Option<Date>,

    /// The times it was created and updated.
    #[serde(flatten)]
    pub(crate) times: Times,
}

/// The validated field set for a submission, produced by
/// [`SubmissionForm::validate`].
#[derive(Clone, Debug)]
pub struct NewSubmission {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) dob: Date,
    pub(crate) gender: String,
    pub(crate) country: String,
    pub(crate) comments: Option<String>,
}

/// The raw fields of a form submission, as they arrive on the wire.
///
/// Every field is optional at this stage; [`validate`](Self::validate)
/// enforces the required set and parses the date of birth, so a
/// malformed POST is rejected before anything touches the database.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubmissionForm {
    /// The name provided.
    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize")]
    pub name: String,

    /// The email address provided.
    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize")]
    pub email: String,

    /// The phone number provided.
    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize")]
    pub phone: String,

    /// The date of birth provided, still unparsed.
    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize")]
    pub dob: String,

    /// The gender provided.
    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize")]
    pub gender: String,

    /// The country provided.
    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize")]
    pub country: String,

    /// The free-text comments provided, if any.
    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub comments: Option<String>,
}

impl SubmissionForm {
    /// Checks the required fields and parses the date of birth,
    /// producing the typed field set or the first failure.
    pub fn validate(self) -> Result<NewSubmission, BackendError> {
        let SubmissionForm {
            name,
            email,
            phone,
            dob,
            gender,
            country,
            comments,
        } = self;

        let name = required("name", name)?;
        let email = required("email", email)?;
        let phone = required("phone", phone)?;
        let gender = required("gender", gender)?;
        let country = required("country", country)?;
        let dob = dates::parse_date(&required("dob", dob)?)?;

        Ok(NewSubmission {
            name,
            email,
            phone,
            dob,
            gender,
            country,
            comments,
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, BackendError> {
    if value.is_empty() {
        Err(BackendError::MissingField { field })
    } else {
        Ok(value)
    }
}

/// The bookkeeping times attached to every submission.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Times {
    /// The date and time it was created.
    #[serde(with = "time::serde::timestamp")]
    pub(crate) created_at: OffsetDateTime,

    /// The date and time it was last modified.
    #[serde(with = "time::serde::timestamp")]
    pub(crate) updated_at: OffsetDateTime,
}

/// An outstanding one-time form token.
#[derive(Clone, Debug, Serialize)]
pub struct FormToken {
    /// The token itself.
    pub(crate) id: Uuid,

    /// The time the token was minted.
    #[serde(with = "time::serde::timestamp")]
    pub(crate) created_at: OffsetDateTime,
}

impl FormToken {
    pub fn new(id: Uuid, created_at: OffsetDateTime) -> Self {
        Self { id, created_at }
    }
}

#[cfg(test)]
mod tests {
    use time::Date;

    use super::SubmissionForm;
    use crate::errors::BackendError;

    fn complete_form() -> SubmissionForm {
        SubmissionForm {
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "+44 20 7946 0000".to_owned(),
            dob: "1990-01-31".to_owned(),
            gender: "female".to_owned(),
            country: "United Kingdom".to_owned(),
            comments: Some("First visit".to_owned()),
        }
    }

    #[test]
    fn it_accepts_a_complete_form() {
        let validated = complete_form().validate().expect("validate complete form");

        assert_eq!(validated.name, "Ada Lovelace");
        assert_eq!(validated.dob, Date::try_from_ymd(1990, 1, 31).unwrap());
        assert_eq!(validated.comments.as_deref(), Some("First visit"));
    }

    #[test]
    fn it_accepts_a_form_without_comments() {
        let form = SubmissionForm {
            comments: None,
            ..complete_form()
        };

        let validated = form.validate().expect("validate form without comments");
        assert_eq!(validated.comments, None);
    }

    #[test]
    fn it_rejects_a_missing_name() {
        let form = SubmissionForm {
            name: String::new(),
            ..complete_form()
        };

        match form.validate() {
            Err(BackendError::MissingField { field }) => assert_eq!(field, "name"),
            other => panic!("expected missing name, got {:?}", other),
        }
    }

    #[test]
    fn it_reports_a_blank_dob_as_missing_rather_than_malformed() {
        let form = SubmissionForm {
            dob: String::new(),
            ..complete_form()
        };

        match form.validate() {
            Err(BackendError::MissingField { field }) => assert_eq!(field, "dob"),
            other => panic!("expected missing dob, got {:?}", other),
        }
    }

    #[test]
    fn it_rejects_a_malformed_dob() {
        let form = SubmissionForm {
            dob: "2024-13-40".to_owned(),
            ..complete_form()
        };

        match form.validate() {
            Err(BackendError::MalformedDate { value, .. }) => assert_eq!(value, "2024-13-40"),
            other => panic!("expected malformed dob, got {:?}", other),
        }
    }

    #[test]
    fn it_normalizes_fields_on_the_way_in() {
        let form: SubmissionForm = serde_urlencoded::from_str(
            "name=%20Ada%20Lovelace%20&email=ada%40example.com&phone=123&dob=%201990-01-31%20&gender=female&country=UK",
        )
        .expect("deserialize urlencoded form");

        assert_eq!(form.name, "Ada Lovelace");
        assert_eq!(form.dob, "1990-01-31");
        assert_eq!(form.comments, None);

        let validated = form.validate().expect("validate normalized form");
        assert_eq!(validated.dob, Date::try_from_ymd(1990, 1, 31).unwrap());
    }
}
