use chrono::{DateTime, Utc};
use itertools::Itertools;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{
    Article, ArticleDetail, ArticlePatch, ArticleSummary, Comment, CommentPatch, CommentSummary,
    EntityKind, Id, ListQuery, Listing, NewArticle, NewComment, NewProduct, ParentRef, Product,
    ProductDetail, ProductPatch, ProductSummary, SortOrder,
};
use crate::store::traits::{ArticleStore, CommentStore, ProductStore, Store};
use crate::store::{StoreError, StoreResult};

/// Entry tagged with its insertion sequence, which breaks ties between equal
/// creation timestamps
#[derive(Debug, Clone)]
struct Stored<T> {
    seq: u64,
    value: T,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_seq: u64,
    products: HashMap<Id, Stored<Product>>,
    articles: HashMap<Id, Stored<Article>>,
    comments: HashMap<Id, Stored<Comment>>,
}

impl MemoryState {
    fn stamp<T>(&mut self, value: T) -> Stored<T> {
        self.next_seq += 1;
        Stored {
            seq: self.next_seq,
            value,
        }
    }

    fn has_parent(&self, parent: &ParentRef) -> bool {
        match parent {
            ParentRef::Product(id) => self.products.contains_key(id),
            ParentRef::Article(id) => self.articles.contains_key(id),
        }
    }

    /// Comments of `parent`, newest first
    fn comments_of(&self, parent: &ParentRef) -> Vec<&Stored<Comment>> {
        self.comments
            .values()
            .filter(|stored| stored.value.belongs_to(parent))
            .sorted_by(|a, b| newest_first((a.value.created_at, a.seq), (b.value.created_at, b.seq)))
            .collect()
    }

    fn comment_summaries(&self, parent: &ParentRef) -> Vec<CommentSummary> {
        self.comments_of(parent)
            .into_iter()
            .map(|stored| CommentSummary::from(&stored.value))
            .collect()
    }

    /// Detach every comment of a deleted parent
    fn orphan_comments_of(&mut self, parent: &ParentRef) {
        for stored in self.comments.values_mut() {
            if stored.value.belongs_to(parent) {
                stored.value.parent = None;
            }
        }
    }
}

fn newest_first(a: (DateTime<Utc>, u64), b: (DateTime<Utc>, u64)) -> Ordering {
    b.cmp(&a)
}

fn listing_order(
    sort: SortOrder,
    a: (i64, DateTime<Utc>, u64),
    b: (i64, DateTime<Utc>, u64),
) -> Ordering {
    match sort {
        SortOrder::Recent => newest_first((a.1, a.2), (b.1, b.2)),
        SortOrder::Favorite => b
            .0
            .cmp(&a.0)
            .then_with(|| newest_first((a.1, a.2), (b.1, b.2))),
    }
}

/// In-process store keeping every entity in memory.
///
/// Used by the test suite and by the `memory` storage backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProductStore for MemoryStore {
    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        let product = Product::new(product);
        let mut state = self.state.write();
        let stored = state.stamp(product.clone());
        state.products.insert(product.id.clone(), stored);
        Ok(product)
    }

    async fn get_product(&self, id: &Id) -> StoreResult<ProductDetail> {
        let state = self.state.read();
        let product = state
            .products
            .get(id)
            .map(|stored| stored.value.clone())
            .ok_or_else(|| StoreError::not_found(EntityKind::Product, id.clone()))?;
        let comments = state.comment_summaries(&ParentRef::Product(id.clone()));
        Ok(ProductDetail { product, comments })
    }

    async fn list_products(&self, query: &ListQuery) -> StoreResult<Listing<ProductSummary>> {
        let state = self.state.read();
        let matches: Vec<&Stored<Product>> = state
            .products
            .values()
            .filter(|stored| {
                query.matches(&[
                    stored.value.name.as_str(),
                    stored.value.description.as_str(),
                ])
            })
            .collect();
        let search_count = matches.len();

        let items = matches
            .into_iter()
            .sorted_by(|a, b| {
                listing_order(
                    query.sort,
                    (a.value.favorite_count, a.value.created_at, a.seq),
                    (b.value.favorite_count, b.value.created_at, b.seq),
                )
            })
            .skip(query.skip)
            .take(query.limit)
            .map(|stored| ProductSummary::from(&stored.value))
            .collect();

        Ok(Listing {
            items,
            search_count,
        })
    }

    async fn update_product(&self, id: &Id, patch: ProductPatch) -> StoreResult<Product> {
        let mut state = self.state.write();
        let stored = state
            .products
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Product, id.clone()))?;
        patch.apply_to(&mut stored.value);
        stored.value.updated_at = Utc::now();
        Ok(stored.value.clone())
    }

    async fn delete_product(&self, id: &Id) -> StoreResult<()> {
        let mut state = self.state.write();
        if state.products.remove(id).is_none() {
            return Err(StoreError::not_found(EntityKind::Product, id.clone()));
        }
        state.orphan_comments_of(&ParentRef::Product(id.clone()));
        Ok(())
    }
}

#[async_trait::async_trait]
impl ArticleStore for MemoryStore {
    async fn create_article(&self, article: NewArticle) -> StoreResult<Article> {
        let article = Article::new(article);
        let mut state = self.state.write();
        let stored = state.stamp(article.clone());
        state.articles.insert(article.id.clone(), stored);
        Ok(article)
    }

    async fn get_article(&self, id: &Id) -> StoreResult<ArticleDetail> {
        let state = self.state.read();
        let article = state
            .articles
            .get(id)
            .map(|stored| stored.value.clone())
            .ok_or_else(|| StoreError::not_found(EntityKind::Article, id.clone()))?;
        let comments = state.comment_summaries(&ParentRef::Article(id.clone()));
        Ok(ArticleDetail { article, comments })
    }

    async fn list_articles(&self, query: &ListQuery) -> StoreResult<Listing<ArticleSummary>> {
        let state = self.state.read();
        let matches: Vec<&Stored<Article>> = state
            .articles
            .values()
            .filter(|stored| {
                query.matches(&[stored.value.title.as_str(), stored.value.content.as_str()])
            })
            .collect();
        let search_count = matches.len();

        let items = matches
            .into_iter()
            .sorted_by(|a, b| {
                listing_order(
                    query.sort,
                    (a.value.favorite_count, a.value.created_at, a.seq),
                    (b.value.favorite_count, b.value.created_at, b.seq),
                )
            })
            .skip(query.skip)
            .take(query.limit)
            .map(|stored| ArticleSummary::from(&stored.value))
            .collect();

        Ok(Listing {
            items,
            search_count,
        })
    }

    async fn update_article(&self, id: &Id, patch: ArticlePatch) -> StoreResult<Article> {
        let mut state = self.state.write();
        let stored = state
            .articles
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Article, id.clone()))?;
        patch.apply_to(&mut stored.value);
        stored.value.updated_at = Utc::now();
        Ok(stored.value.clone())
    }

    async fn delete_article(&self, id: &Id) -> StoreResult<()> {
        let mut state = self.state.write();
        if state.articles.remove(id).is_none() {
            return Err(StoreError::not_found(EntityKind::Article, id.clone()));
        }
        state.orphan_comments_of(&ParentRef::Article(id.clone()));
        Ok(())
    }
}

#[async_trait::async_trait]
impl CommentStore for MemoryStore {
    async fn create_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let comment = Comment::new(comment);
        let mut state = self.state.write();
        let stored = state.stamp(comment.clone());
        state.comments.insert(comment.id.clone(), stored);
        Ok(comment)
    }

    async fn get_comment(&self, id: &Id) -> StoreResult<Comment> {
        self.state
            .read()
            .comments
            .get(id)
            .map(|stored| stored.value.clone())
            .ok_or_else(|| StoreError::not_found(EntityKind::Comment, id.clone()))
    }

    async fn list_comments(&self, skip: usize, limit: usize) -> StoreResult<Vec<Comment>> {
        let state = self.state.read();
        Ok(state
            .comments
            .values()
            .sorted_by(|a, b| newest_first((a.value.created_at, a.seq), (b.value.created_at, b.seq)))
            .skip(skip)
            .take(limit)
            .map(|stored| stored.value.clone())
            .collect())
    }

    async fn update_comment(&self, id: &Id, patch: CommentPatch) -> StoreResult<Comment> {
        let mut state = self.state.write();
        let stored = state
            .comments
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Comment, id.clone()))?;
        patch.apply_to(&mut stored.value);
        stored.value.updated_at = Utc::now();
        Ok(stored.value.clone())
    }

    async fn delete_comment(&self, id: &Id) -> StoreResult<()> {
        match self.state.write().comments.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(EntityKind::Comment, id.clone())),
        }
    }

    async fn parent_exists(&self, parent: &ParentRef) -> StoreResult<bool> {
        Ok(self.state.read().has_parent(parent))
    }

    async fn link_comment(&self, parent: &ParentRef, comment_id: &Id) -> StoreResult<Vec<Comment>> {
        let mut state = self.state.write();
        if !state.has_parent(parent) {
            return Err(StoreError::not_found(parent.kind(), parent.id().clone()));
        }
        let stored = state
            .comments
            .get_mut(comment_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Comment, comment_id.clone()))?;
        stored.value.parent = Some(parent.clone());
        stored.value.updated_at = Utc::now();

        Ok(state
            .comments_of(parent)
            .into_iter()
            .map(|stored| stored.value.clone())
            .collect())
    }

    async fn list_comments_for_parent(
        &self,
        parent: &ParentRef,
        after: Option<&Id>,
        limit: usize,
    ) -> StoreResult<Vec<Comment>> {
        let state = self.state.read();
        let ordered = state.comments_of(parent);

        let start = match after {
            None => 0,
            Some(cursor) => match ordered.iter().position(|stored| &stored.value.id == cursor) {
                Some(index) => index + 1,
                None => return Ok(Vec::new()),
            },
        };

        Ok(ordered
            .into_iter()
            .skip(start)
            .take(limit)
            .map(|stored| stored.value.clone())
            .collect())
    }
}

impl Store for MemoryStore {}
