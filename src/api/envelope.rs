use crate::error::{Error, Result};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::warn;

/// Paginated list wrapper returned by the list endpoints
///
/// ```json
/// {"page": 1, "pageSize": 15, "pageCount": 2, "listCount": 15, "totalCount": 23, "list": [...]}
/// ```
///
/// Every field is optional on the wire, numbers default to zero.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub list_count: u32,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// An item of a page that may point at a node to remove
pub trait PageItem {
    /// Identifier of the item itself
    fn id(&self) -> u64;

    /// Node to delete for this item, `None` when there is nothing to delete
    fn target_node(&self) -> Option<u64>;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Author {
    pub id: u64,
    pub username: String,
    pub realname: String,
    pub reputation: i64,
}

/// Short node description embedded in actions
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeRef {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
}

/// Something a user did, the associated node is the one removed
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionItem {
    pub id: u64,
    pub verb: String,
    #[serde(alias = "actingUser")]
    pub user: Option<Author>,
    #[serde(alias = "associatedNode")]
    pub node: Option<NodeRef>,
    pub root_node: Option<NodeRef>,
}

impl PageItem for ActionItem {
    fn id(&self) -> u64 {
        self.id
    }

    fn target_node(&self) -> Option<u64> {
        self.node.as_ref().map(|node| node.id).filter(|id| *id != 0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Topic {
    pub id: u64,
    pub name: String,
    pub used_count: u64,
}

/// A question written by the user
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionItem {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub body: String,
    pub author: Option<Author>,
    pub creation_date: i64,
    pub topics: Vec<Topic>,
    pub answer_count: u32,
    pub view_count: u32,
    pub score: i64,
}

impl PageItem for QuestionItem {
    fn id(&self) -> u64 {
        self.id
    }

    fn target_node(&self) -> Option<u64> {
        Some(self.id).filter(|id| *id != 0)
    }
}

/// Decode a page envelope, `what` is only used to label errors
///
/// A `listCount` that disagrees with the list length is logged and replaced
/// by the real length.
///
/// # Errors
///
/// Returns `Error::Decode` if the body is not a valid envelope
pub fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<Page<T>> {
    let mut page: Page<T> = serde_json::from_slice(body).map_err(|source| Error::Decode {
        what: what.to_string(),
        source,
    })?;

    let len = u32::try_from(page.list.len()).unwrap_or(u32::MAX);
    if page.list_count != len {
        if page.list_count != 0 {
            warn!(
                "{what}: listCount {} does not match {len} items, using {len}",
                page.list_count
            );
        }
        page.list_count = len;
    }

    Ok(page)
}
