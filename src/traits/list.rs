//! List trait for fetching collections of entities.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::client::LmClient;
use crate::error::{LmError, Result};
use crate::pagination::{ListEnvelope, ListOptions, Page};

/// Maximum pages to fetch (safety limit).
pub const MAX_PAGES: u32 = 10_000;

/// List entities from an offset/size paginated endpoint.
///
/// Implementors only name their endpoint; fetching, envelope handling and
/// paging are shared.
///
/// # Example
///
/// ```ignore
/// use lmexport::{Device, List, ListOptions, LmClient};
///
/// let client = LmClient::from_env()?;
///
/// // Fetch a single page
/// let page = Device::list_page(&client, &(), &ListOptions::default(), 0).await?;
///
/// // Fetch all pages
/// let devices = Device::list_all(&client, &(), &ListOptions::default()).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send + DeserializeOwned {
    /// What selects the collection (parent ids, module type, ...).
    type Query: Send + Sync + std::fmt::Debug;

    /// Resource path of the list endpoint, e.g. `/device/devices`.
    fn resource_path(query: &Self::Query) -> String;

    /// Fetch the page starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after retries or an item does
    /// not match `Self`.
    #[tracing::instrument(skip(client, options))]
    async fn list_page(
        client: &LmClient,
        query: &Self::Query,
        options: &ListOptions,
        offset: u32,
    ) -> Result<Page<Self>> {
        let path = Self::resource_path(query);
        let payload = client.get_json(&path, &options.page_query(offset)).await?;
        ListEnvelope::from_value(payload).into_page(offset, options.size)
    }

    /// Fetch every page.
    ///
    /// Stops on an empty page, a short page, or once the reported total has
    /// been collected. `options.delay` is slept between requests.
    ///
    /// # Errors
    ///
    /// Returns an error if `options.size` is zero or any page request fails.
    async fn list_all(
        client: &LmClient,
        query: &Self::Query,
        options: &ListOptions,
    ) -> Result<Vec<Self>> {
        if options.size == 0 {
            return Err(LmError::InvalidArgument(
                "page size must be greater than zero".to_string(),
            ));
        }

        let mut all_items = Vec::new();
        let mut offset = 0;
        let mut pages = 0;

        loop {
            let page = Self::list_page(client, query, options, offset).await?;
            pages += 1;

            let has_more = page.has_more;
            let total = page.total;
            all_items.extend(page.items);

            if !has_more {
                break;
            }
            if total.is_some_and(|t| all_items.len() as u64 >= t) {
                break;
            }

            // Safety limit to prevent infinite loops
            if pages >= MAX_PAGES {
                tracing::warn!(
                    "Reached pagination limit of {} pages, stopping",
                    MAX_PAGES
                );
                break;
            }

            if !options.delay.is_zero() {
                tokio::time::sleep(options.delay).await;
            }
            offset = offset.saturating_add(options.size);
        }

        tracing::debug!(items = all_items.len(), pages, "Listed all pages");
        Ok(all_items)
    }
}
