use std::collections::HashMap;
use std::sync::RwLock;

use futures::future::BoxFuture;

use crate::errors::BackendError;
use crate::store::Store;

#[derive(Default)]
pub(crate) struct MockStore {
    pub(crate) map: RwLock<HashMap<String, Vec<u8>>>,
    extension: String,
}

impl MockStore {
    pub fn new(extension: impl AsRef<str>) -> Self {
        MockStore {
            extension: extension.as_ref().to_owned(),
            ..Default::default()
        }
    }

    fn filename(&self, key: &str) -> String {
        format!("{}.{}", key, self.extension)
    }
}

impl Store for MockStore {
    type Output = ();
    type Raw = Vec<u8>;

    fn save(&self, key: &str, raw: Vec<u8>) -> BoxFuture<Result<(), BackendError>> {
        use futures::FutureExt;

        mock_save(self, self.filename(key), raw).boxed()
    }

    fn reference(&self, key: &str) -> String {
        self.filename(key)
    }
}

async fn mock_save(store: &MockStore, filename: String, raw: Vec<u8>) -> Result<(), BackendError> {
    store.map.write().unwrap().insert(filename, raw);

    Ok(())
}
