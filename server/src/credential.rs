use time::{Date, Duration};

use crate::errors::BackendError;
use crate::submission::Submission;

/// Number of days an issued credential remains valid, counted from the
/// day of issuance. Re-issuing restarts the window in full.
pub const VALIDITY_DAYS: i64 = 30;

/// Returns the last valid day for a credential issued on `issued_on`.
pub fn expiry_for(issued_on: Date) -> Date {
    issued_on + Duration::days(VALIDITY_DAYS)
}

/// The access gate for profile views. A submission whose expiry date is
/// strictly earlier than `today` is denied; one without an expiry date
/// is always allowed. Evaluated on every access, never cached.
pub fn ensure_not_expired(submission: &Submission, today: Date) -> Result<(), BackendError> {
    match submission.expiry_date {
        Some(expired_on) if expired_on < today => Err(BackendError::CredentialExpired {
            id: submission.id,
            expired_on,
        }),
        _ => Ok(()),
    }
}
