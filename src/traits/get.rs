//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::client::LmClient;
use crate::error::Result;

/// Fetch a single entity by ID.
///
/// # Example
///
/// ```ignore
/// use lmexport::{Device, Get, LmClient};
///
/// let client = LmClient::from_env()?;
/// let device = Device::get(&client, 42).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this entity.
    type Id: Send + Sync;

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns [`LmError::NotFound`](crate::LmError::NotFound) if the entity
    /// does not exist, or the request error otherwise.
    async fn get(client: &LmClient, id: Self::Id) -> Result<Self>;
}
