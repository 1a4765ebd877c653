//! Cursor pagination over the comments of a single parent.
//!
//! Pages are ordered newest first. The cursor handed out with a page is the id
//! of its last comment; the next request resumes strictly after it. A page
//! shorter than the requested limit is the last one and carries no cursor.

use serde::Serialize;

use crate::model::{Comment, Id, ParentRef};
use crate::store::traits::CommentStore;
use crate::store::StoreResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Option<Id>,
    pub limit: usize,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self {
            cursor: None,
            limit,
        }
    }

    pub fn after(cursor: impl Into<Id>, limit: usize) -> Self {
        Self {
            cursor: Some(cursor.into()),
            limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentPage {
    /// Where the next page starts; absent on the last page
    #[serde(rename = "cursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Id>,
    pub comments: Vec<Comment>,
}

impl CommentPage {
    /// Build a page from the rows fetched for `limit`
    pub fn seal(comments: Vec<Comment>, limit: usize) -> Self {
        let is_last_page = comments.len() < limit;
        let next_cursor = if is_last_page {
            None
        } else {
            comments.last().map(|comment| comment.id.clone())
        };
        Self {
            next_cursor,
            comments,
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

pub async fn paginate_comments<S: CommentStore + ?Sized>(
    store: &S,
    parent: &ParentRef,
    request: &PageRequest,
) -> StoreResult<CommentPage> {
    let comments = store
        .list_comments_for_parent(parent, request.cursor.as_ref(), request.limit)
        .await?;
    log::debug!(
        "Fetched {} comment(s) of {} after cursor {:?}",
        comments.len(),
        parent,
        request.cursor
    );
    Ok(CommentPage::seal(comments, request.limit))
}
