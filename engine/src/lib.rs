use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use utoipa::{
    PartialSchema,
    openapi::{RefOr, Schema},
};

pub mod app;
pub mod error;
pub mod id;
mod pagination;
pub use pagination::Pagination;

#[derive(Debug, Default)]
pub struct ArwLock<T>(Arc<RwLock<T>>);

impl<T> ArwLock<T> {
    pub fn new(data: T) -> Self {
        Self(Arc::new(RwLock::new(data)))
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().await
    }
}

// derive(Clone) would require T: Clone, but only the Arc is cloned
impl<T> Clone for ArwLock<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// Schema for `optional_field::Field` request properties, which are documented as nullable strings.
pub fn patch_field_schema() -> impl Into<RefOr<Schema>> {
    <Option<String> as PartialSchema>::schema()
}
