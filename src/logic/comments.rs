use crate::model::{Comment, NewComment, ParentRef};
use crate::store::traits::CommentStore;
use crate::store::{StoreError, StoreResult};

/// Create a comment and attach it to `parent`, returning the parent's comments.
///
/// Nothing is persisted when the parent does not exist. If linking fails after
/// the comment was created, the comment is removed again.
pub async fn create_under_parent<S: CommentStore + ?Sized>(
    store: &S,
    parent: &ParentRef,
    new_comment: NewComment,
) -> StoreResult<Vec<Comment>> {
    if !store.parent_exists(parent).await? {
        return Err(StoreError::not_found(parent.kind(), parent.id().clone()));
    }

    let comment = store.create_comment(new_comment).await?;
    match store.link_comment(parent, &comment.id).await {
        Ok(comments) => {
            log::info!("Attached comment {} to {}", comment.id, parent);
            Ok(comments)
        }
        Err(link_error) => {
            if let Err(cleanup_error) = store.delete_comment(&comment.id).await {
                log::warn!(
                    "Could not remove unlinked comment {}: {}",
                    comment.id,
                    cleanup_error
                );
            }
            Err(link_error)
        }
    }
}
