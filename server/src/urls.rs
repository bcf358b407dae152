use url::Url;
use uuid::Uuid;

/// Convenience wrapper for locator generation.
///
/// Locators must be deterministic: the same submission ID always yields
/// the same profile URL, and the same form token always yields the same
/// form URL.
#[derive(Clone)]
pub struct Urls {
    /// Top-level public URL, including trailing slash.
    base: Url,
}

impl Urls {
    /// Create a new instance. `base` must be an absolute URL.
    pub fn new(base: impl AsRef<str>) -> Self {
        let base =
            Url::parse(base.as_ref()).unwrap_or_else(|_| panic!("parse {} as URL", base.as_ref()));

        Urls { base }
    }

    /// The canonical URL of the one-time data collection form for `token`.
    pub fn form(&self, token: &Uuid) -> Url {
        let token = format!("form/{}", token);
        self.base
            .join(&token)
            .unwrap_or_else(|_| panic!("get URL for {}", token))
    }

    /// The canonical profile locator for submission `id`. This is the
    /// string that gets encoded into a credential code.
    pub fn profile(&self, id: i64) -> Url {
        let path = format!("profile/{}", id);
        self.base
            .join(&path)
            .unwrap_or_else(|_| panic!("get URL for {}", path))
    }
}
