use std::sync::Arc;

use log::Logger;

use crate::db::Db;
use crate::errors::BackendError;
use crate::store::Store;
use crate::urls::Urls;

pub type Encoder = dyn Fn(&str) -> Result<Vec<u8>, BackendError> + Send + Sync;
pub type VecStore<O> = dyn Store<Output = O, Raw = Vec<u8>> + Send + Sync;

/// Marker for store outputs that can safely cross handler boundaries.
pub trait SafeStore: Clone + Send + Sync {}

impl<T: Clone + Send + Sync> SafeStore for T {}

/// The explicitly threaded context for every route: built once at
/// startup and owned by the servers for their lifetime.
#[derive(Clone)]
pub struct Environment<O: SafeStore> {
    pub logger: Arc<Logger>,
    pub db: Arc<dyn Db + Send + Sync>,
    pub urls: Arc<Urls>,
    pub store: Arc<VecStore<O>>,
    pub encoder: Arc<Encoder>,
}

impl<O: SafeStore> Environment<O> {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<dyn Db + Send + Sync>,
        urls: Arc<Urls>,
        store: Arc<VecStore<O>>,
        encoder: Arc<Encoder>,
    ) -> Self {
        Self {
            logger,
            db,
            urls,
            store,
            encoder,
        }
    }
}
