use crate::model::{
    Article, ArticleDetail, ArticlePatch, ArticleSummary, Comment, CommentPatch, Id, ListQuery,
    Listing, NewArticle, NewComment, NewProduct, ParentRef, Product, ProductDetail, ProductPatch,
    ProductSummary,
};
use crate::store::StoreResult;

#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    async fn create_product(&self, product: NewProduct) -> StoreResult<Product>;
    /// Get a product with its comments, newest first
    async fn get_product(&self, id: &Id) -> StoreResult<ProductDetail>;
    /// List products matching the query; `search_count` ignores skip/limit
    async fn list_products(&self, query: &ListQuery) -> StoreResult<Listing<ProductSummary>>;
    /// Merge the provided fields into an existing product
    async fn update_product(&self, id: &Id, patch: ProductPatch) -> StoreResult<Product>;
    async fn delete_product(&self, id: &Id) -> StoreResult<()>;
}

#[async_trait::async_trait]
pub trait ArticleStore: Send + Sync {
    async fn create_article(&self, article: NewArticle) -> StoreResult<Article>;
    async fn get_article(&self, id: &Id) -> StoreResult<ArticleDetail>;
    async fn list_articles(&self, query: &ListQuery) -> StoreResult<Listing<ArticleSummary>>;
    async fn update_article(&self, id: &Id, patch: ArticlePatch) -> StoreResult<Article>;
    async fn delete_article(&self, id: &Id) -> StoreResult<()>;
}

#[async_trait::async_trait]
pub trait CommentStore: Send + Sync {
    /// Create a comment that is not attached to any parent yet
    async fn create_comment(&self, comment: NewComment) -> StoreResult<Comment>;
    async fn get_comment(&self, id: &Id) -> StoreResult<Comment>;
    /// All comments, newest first
    async fn list_comments(&self, skip: usize, limit: usize) -> StoreResult<Vec<Comment>>;
    async fn update_comment(&self, id: &Id, patch: CommentPatch) -> StoreResult<Comment>;
    /// Delete a comment. Its parent's comment list no longer contains it afterwards.
    async fn delete_comment(&self, id: &Id) -> StoreResult<()>;
    async fn parent_exists(&self, parent: &ParentRef) -> StoreResult<bool>;
    /// Attach an existing comment to `parent`, detaching it from any previous
    /// parent, and return the parent's comments newest first
    async fn link_comment(&self, parent: &ParentRef, comment_id: &Id) -> StoreResult<Vec<Comment>>;
    /// Up to `limit` comments of `parent` ordered newest first, starting
    /// strictly after the comment `after` when given. An `after` id that is not
    /// one of the parent's comments yields an empty result.
    async fn list_comments_for_parent(
        &self,
        parent: &ParentRef,
        after: Option<&Id>,
        limit: usize,
    ) -> StoreResult<Vec<Comment>>;
}

pub trait Store: ProductStore + ArticleStore + CommentStore + Send + Sync {}
