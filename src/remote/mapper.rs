//! Maps raw feed responses into feed items

use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use super::RemoteError;
use crate::feed::FeedItem;

const OK_200: u16 = 200;

/// Top-level shape of the remote payload
#[derive(Debug, Deserialize)]
struct Root {
    items: Vec<RemoteFeedItem>,
}

/// Item as sent by the remote source
#[derive(Debug, Deserialize)]
struct RemoteFeedItem {
    id: Uuid,
    description: Option<String>,
    location: Option<String>,
    image: Url,
}

impl From<RemoteFeedItem> for FeedItem {
    fn from(item: RemoteFeedItem) -> Self {
        FeedItem::new(item.id, item.description, item.location, item.image)
    }
}

/// Decodes `body` into feed items
///
/// Any status other than 200, or a body that does not match the expected
/// schema, yields `RemoteError::InvalidData`.
pub fn map_feed_items(body: &[u8], status: u16) -> Result<Vec<FeedItem>, RemoteError> {
    if status != OK_200 {
        return Err(RemoteError::InvalidData);
    }

    let root: Root = serde_json::from_slice(body).map_err(|_| RemoteError::InvalidData)?;
    Ok(root.items.into_iter().map(FeedItem::from).collect())
}
