use std::fs;
use std::io;
use std::path::PathBuf;

use futures::future::{BoxFuture, FutureExt};

use crate::errors::BackendError;

#[cfg(test)]
pub(crate) mod mock;

pub trait Store: Send + Sync {
    /// The type of successful result.
    type Output;

    /// The type of raw data.
    type Raw;

    /// Saves the given data under the given key. Saving the same key
    /// again overwrites the previous object.
    fn save(&self, key: &str, raw: Self::Raw) -> BoxFuture<Result<Self::Output, BackendError>>;

    /// Returns the public reference for the given key, whether or not
    /// anything has been saved under it yet.
    fn reference(&self, key: &str) -> String;
}

/// A store that writes code images as individual files under a
/// well-known directory.
pub struct FsStore {
    directory: PathBuf,
    public_path: String,
    extension: String,
}

impl FsStore {
    /// Creates a new instance, making sure the directory exists.
    pub fn new(
        directory: impl Into<PathBuf>,
        public_path: impl Into<String>,
        extension: impl AsRef<str>,
    ) -> Result<Self, io::Error> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;

        Ok(Self {
            directory,
            public_path: public_path.into(),
            extension: extension.as_ref().to_owned(),
        })
    }

    pub fn from_env() -> Result<Self, io::Error> {
        use crate::config::get_variable;

        Self::new(
            get_variable("GATEPASS_CODES_DIR"),
            get_variable("GATEPASS_CODES_PATH"),
            "png",
        )
    }

    fn filename(&self, key: &str) -> String {
        format!("{}.{}", key, self.extension)
    }
}

impl Store for FsStore {
    type Output = ();
    type Raw = Vec<u8>;

    fn save(&self, key: &str, raw: Vec<u8>) -> BoxFuture<Result<(), BackendError>> {
        write(self, self.filename(key), raw).boxed()
    }

    fn reference(&self, key: &str) -> String {
        format!("{}/{}", self.public_path, self.filename(key))
    }
}

async fn write(store: &FsStore, filename: String, raw: Vec<u8>) -> Result<(), BackendError> {
    let path = store.directory.join(&filename);

    tokio::fs::write(&path, raw)
        .await
        .map_err(|source| BackendError::ImageWrite {
            path: path.display().to_string(),
            source,
        })
}
