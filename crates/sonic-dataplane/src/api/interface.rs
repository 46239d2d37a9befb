//! Interface lifecycle API.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::DataplaneResult;
use crate::types::InterfaceIndex;

/// Message name of the sub-interface deletion request.
pub const DELETE_SUBIF: &str = "delete_subif";

/// Deletes a sub-interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteSubif {
    pub sw_if_index: InterfaceIndex,
}

impl DeleteSubif {
    pub fn new(sw_if_index: InterfaceIndex) -> Self {
        Self { sw_if_index }
    }
}

/// Interface calls of a dataplane control client.
#[async_trait]
pub trait InterfaceApi: Send + Sync {
    /// Deletes a sub-interface.
    async fn delete_subif(&self, request: &DeleteSubif) -> DataplaneResult<()>;
}

#[async_trait]
impl<T: InterfaceApi + ?Sized> InterfaceApi for Arc<T> {
    async fn delete_subif(&self, request: &DeleteSubif) -> DataplaneResult<()> {
        (**self).delete_subif(request).await
    }
}
