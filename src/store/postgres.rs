use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};

use crate::model::{
    Article, ArticleDetail, ArticlePatch, ArticleSummary, Comment, CommentPatch, CommentSummary,
    EntityKind, Id, ListQuery, Listing, NewArticle, NewComment, NewProduct, ParentRef, Product,
    ProductDetail, ProductPatch, ProductSummary, SortOrder,
};
use crate::store::traits::{ArticleStore, CommentStore, ProductStore, Store};
use crate::store::{StoreError, StoreResult};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, tags, favorite_count, created_at, updated_at";
const ARTICLE_COLUMNS: &str = "id, title, content, favorite_count, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, content, product_id, article_id, created_at, updated_at";

/// SQLSTATE codes meaning the values themselves were rejected: check
/// violation, not-null violation, string too long, invalid text representation
const INPUT_REJECTION_CODES: [&str; 4] = ["23514", "23502", "22001", "22P02"];

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run the embedded migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

trait SqlxResultExt<T> {
    fn store_context(self, context: &'static str) -> StoreResult<T>;
}

impl<T> SqlxResultExt<T> for Result<T, sqlx::Error> {
    fn store_context(self, context: &'static str) -> StoreResult<T> {
        self.map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err {
                let rejected = db_err
                    .code()
                    .is_some_and(|code| INPUT_REJECTION_CODES.contains(&code.as_ref()));
                if rejected {
                    return StoreError::InvalidInput(db_err.message().to_string());
                }
            }
            StoreError::Backend(anyhow::Error::new(err).context(context))
        })
    }
}

fn like_pattern(keyword: Option<&String>) -> Option<String> {
    keyword.map(|keyword| {
        let escaped = keyword
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

fn order_clause(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Recent => "created_at DESC, id DESC",
        SortOrder::Favorite => "favorite_count DESC, created_at DESC, id DESC",
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn parent_table(parent: &ParentRef) -> &'static str {
    match parent {
        ParentRef::Product(_) => "products",
        ParentRef::Article(_) => "articles",
    }
}

/// Column holding the parent's id and the column of the other parent kind
fn parent_columns(parent: &ParentRef) -> (&'static str, &'static str) {
    match parent {
        ParentRef::Product(_) => ("product_id", "article_id"),
        ParentRef::Article(_) => ("article_id", "product_id"),
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        tags: row.try_get("tags")?,
        favorite_count: row.try_get("favorite_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn product_summary_from_row(row: &PgRow) -> Result<ProductSummary, sqlx::Error> {
    Ok(ProductSummary {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        created_at: row.try_get("created_at")?,
    })
}

fn article_summary_from_row(row: &PgRow) -> Result<ArticleSummary, sqlx::Error> {
    Ok(ArticleSummary {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

fn article_from_row(row: &PgRow) -> Result<Article, sqlx::Error> {
    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        favorite_count: row.try_get("favorite_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment, sqlx::Error> {
    let product_id: Option<String> = row.try_get("product_id")?;
    let article_id: Option<String> = row.try_get("article_id")?;
    let parent = match (product_id, article_id) {
        (Some(id), _) => Some(ParentRef::Product(id)),
        (None, Some(id)) => Some(ParentRef::Article(id)),
        (None, None) => None,
    };

    Ok(Comment {
        id: row.try_get("id")?,
        content: row.try_get("content")?,
        parent,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn comment_summary_from_row(row: &PgRow) -> Result<CommentSummary, sqlx::Error> {
    Ok(CommentSummary {
        id: row.try_get("id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

impl PostgresStore {
    async fn comment_summaries(&self, parent: &ParentRef) -> StoreResult<Vec<CommentSummary>> {
        let (column, _) = parent_columns(parent);
        let sql = format!(
            "SELECT id, content, created_at FROM comments WHERE {} = $1 ORDER BY created_at DESC, id DESC",
            column
        );
        let rows = sqlx::query(&sql)
            .bind(parent.id())
            .fetch_all(&self.pool)
            .await
            .store_context("Failed to fetch comments")?;

        rows.iter()
            .map(comment_summary_from_row)
            .collect::<Result<Vec<_>, _>>()
            .store_context("Failed to decode comments")
    }

    async fn count_matches(
        &self,
        table: &str,
        filter: &str,
        pattern: Option<&str>,
    ) -> StoreResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {}", table, filter);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(pattern)
            .fetch_one(&self.pool)
            .await
            .store_context("Failed to count matches")?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl ProductStore for PostgresStore {
    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        let product = Product::new(product);
        let sql = format!(
            "INSERT INTO products (id, name, description, price, tags) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.tags)
            .fetch_one(&self.pool)
            .await
            .store_context("Failed to create product")?;

        product_from_row(&row).store_context("Failed to decode product")
    }

    async fn get_product(&self, id: &Id) -> StoreResult<ProductDetail> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .store_context("Failed to fetch product")?;

        let Some(row) = row else {
            return Err(StoreError::not_found(EntityKind::Product, id.clone()));
        };

        let product = product_from_row(&row).store_context("Failed to decode product")?;
        let comments = self
            .comment_summaries(&ParentRef::Product(id.clone()))
            .await?;
        Ok(ProductDetail { product, comments })
    }

    async fn list_products(&self, query: &ListQuery) -> StoreResult<Listing<ProductSummary>> {
        let filter = "($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1)";
        let pattern = like_pattern(query.keyword.as_ref());

        let sql = format!(
            "SELECT id, name, price, created_at FROM products WHERE {} ORDER BY {} LIMIT $2 OFFSET $3",
            filter,
            order_clause(query.sort)
        );
        let rows = sqlx::query(&sql)
            .bind(pattern.as_deref())
            .bind(to_i64(query.limit))
            .bind(to_i64(query.skip))
            .fetch_all(&self.pool)
            .await
            .store_context("Failed to list products")?;

        let items = rows
            .iter()
            .map(product_summary_from_row)
            .collect::<Result<Vec<_>, _>>()
            .store_context("Failed to decode products")?;

        let search_count = self.count_matches("products", filter, pattern.as_deref()).await?;
        Ok(Listing {
            items,
            search_count,
        })
    }

    async fn update_product(&self, id: &Id, patch: ProductPatch) -> StoreResult<Product> {
        let sql = format!(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                tags = COALESCE($5, tags),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(patch.name)
            .bind(patch.description)
            .bind(patch.price)
            .bind(patch.tags)
            .fetch_optional(&self.pool)
            .await
            .store_context("Failed to update product")?;

        match row {
            Some(row) => product_from_row(&row).store_context("Failed to decode product"),
            None => Err(StoreError::not_found(EntityKind::Product, id.clone())),
        }
    }

    async fn delete_product(&self, id: &Id) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .store_context("Failed to delete product")?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Product, id.clone()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ArticleStore for PostgresStore {
    async fn create_article(&self, article: NewArticle) -> StoreResult<Article> {
        let article = Article::new(article);
        let sql = format!(
            "INSERT INTO articles (id, title, content) VALUES ($1, $2, $3) RETURNING {}",
            ARTICLE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&article.id)
            .bind(&article.title)
            .bind(&article.content)
            .fetch_one(&self.pool)
            .await
            .store_context("Failed to create article")?;

        article_from_row(&row).store_context("Failed to decode article")
    }

    async fn get_article(&self, id: &Id) -> StoreResult<ArticleDetail> {
        let sql = format!("SELECT {} FROM articles WHERE id = $1", ARTICLE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .store_context("Failed to fetch article")?;

        let Some(row) = row else {
            return Err(StoreError::not_found(EntityKind::Article, id.clone()));
        };

        let article = article_from_row(&row).store_context("Failed to decode article")?;
        let comments = self
            .comment_summaries(&ParentRef::Article(id.clone()))
            .await?;
        Ok(ArticleDetail { article, comments })
    }

    async fn list_articles(&self, query: &ListQuery) -> StoreResult<Listing<ArticleSummary>> {
        let filter = "($1::text IS NULL OR title ILIKE $1 OR content ILIKE $1)";
        let pattern = like_pattern(query.keyword.as_ref());

        let sql = format!(
            "SELECT id, title, content, created_at FROM articles WHERE {} ORDER BY {} LIMIT $2 OFFSET $3",
            filter,
            order_clause(query.sort)
        );
        let rows = sqlx::query(&sql)
            .bind(pattern.as_deref())
            .bind(to_i64(query.limit))
            .bind(to_i64(query.skip))
            .fetch_all(&self.pool)
            .await
            .store_context("Failed to list articles")?;

        let items = rows
            .iter()
            .map(article_summary_from_row)
            .collect::<Result<Vec<_>, _>>()
            .store_context("Failed to decode articles")?;

        let search_count = self.count_matches("articles", filter, pattern.as_deref()).await?;
        Ok(Listing {
            items,
            search_count,
        })
    }

    async fn update_article(&self, id: &Id, patch: ArticlePatch) -> StoreResult<Article> {
        let sql = format!(
            r#"
            UPDATE articles SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ARTICLE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.content)
            .fetch_optional(&self.pool)
            .await
            .store_context("Failed to update article")?;

        match row {
            Some(row) => article_from_row(&row).store_context("Failed to decode article"),
            None => Err(StoreError::not_found(EntityKind::Article, id.clone())),
        }
    }

    async fn delete_article(&self, id: &Id) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .store_context("Failed to delete article")?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Article, id.clone()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CommentStore for PostgresStore {
    async fn create_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let comment = Comment::new(comment);
        let sql = format!(
            "INSERT INTO comments (id, content) VALUES ($1, $2) RETURNING {}",
            COMMENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&comment.id)
            .bind(&comment.content)
            .fetch_one(&self.pool)
            .await
            .store_context("Failed to create comment")?;

        comment_from_row(&row).store_context("Failed to decode comment")
    }

    async fn get_comment(&self, id: &Id) -> StoreResult<Comment> {
        let sql = format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .store_context("Failed to fetch comment")?;

        match row {
            Some(row) => comment_from_row(&row).store_context("Failed to decode comment"),
            None => Err(StoreError::not_found(EntityKind::Comment, id.clone())),
        }
    }

    async fn list_comments(&self, skip: usize, limit: usize) -> StoreResult<Vec<Comment>> {
        let sql = format!(
            "SELECT {} FROM comments ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            COMMENT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(to_i64(limit))
            .bind(to_i64(skip))
            .fetch_all(&self.pool)
            .await
            .store_context("Failed to list comments")?;

        rows.iter()
            .map(comment_from_row)
            .collect::<Result<Vec<_>, _>>()
            .store_context("Failed to decode comments")
    }

    async fn update_comment(&self, id: &Id, patch: CommentPatch) -> StoreResult<Comment> {
        let sql = format!(
            "UPDATE comments SET content = COALESCE($2, content), updated_at = NOW() WHERE id = $1 RETURNING {}",
            COMMENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(patch.content)
            .fetch_optional(&self.pool)
            .await
            .store_context("Failed to update comment")?;

        match row {
            Some(row) => comment_from_row(&row).store_context("Failed to decode comment"),
            None => Err(StoreError::not_found(EntityKind::Comment, id.clone())),
        }
    }

    async fn delete_comment(&self, id: &Id) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .store_context("Failed to delete comment")?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Comment, id.clone()));
        }
        Ok(())
    }

    async fn parent_exists(&self, parent: &ParentRef) -> StoreResult<bool> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)",
            parent_table(parent)
        );
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(parent.id())
            .fetch_one(&self.pool)
            .await
            .store_context("Failed to check comment parent")
    }

    async fn link_comment(&self, parent: &ParentRef, comment_id: &Id) -> StoreResult<Vec<Comment>> {
        let (column, other_column) = parent_columns(parent);
        let mut tx = self
            .pool
            .begin()
            .await
            .store_context("Failed to begin transaction")?;

        // Lock the parent row so it cannot disappear before the link is committed
        let lock_sql = format!("SELECT id FROM {} WHERE id = $1 FOR SHARE", parent_table(parent));
        let locked_parent = sqlx::query(&lock_sql)
            .bind(parent.id())
            .fetch_optional(&mut *tx)
            .await
            .store_context("Failed to check comment parent")?;
        if locked_parent.is_none() {
            return Err(StoreError::not_found(parent.kind(), parent.id().clone()));
        }

        let update_sql = format!(
            "UPDATE comments SET {} = $2, {} = NULL, updated_at = NOW() WHERE id = $1",
            column, other_column
        );
        let result = sqlx::query(&update_sql)
            .bind(comment_id)
            .bind(parent.id())
            .execute(&mut *tx)
            .await
            .store_context("Failed to link comment")?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Comment, comment_id.clone()));
        }

        let list_sql = format!(
            "SELECT {} FROM comments WHERE {} = $1 ORDER BY created_at DESC, id DESC",
            COMMENT_COLUMNS, column
        );
        let rows = sqlx::query(&list_sql)
            .bind(parent.id())
            .fetch_all(&mut *tx)
            .await
            .store_context("Failed to fetch linked comments")?;

        tx.commit()
            .await
            .store_context("Failed to commit comment link")?;

        rows.iter()
            .map(comment_from_row)
            .collect::<Result<Vec<_>, _>>()
            .store_context("Failed to decode comments")
    }

    async fn list_comments_for_parent(
        &self,
        parent: &ParentRef,
        after: Option<&Id>,
        limit: usize,
    ) -> StoreResult<Vec<Comment>> {
        let (column, _) = parent_columns(parent);
        // An unknown cursor makes the row comparison NULL, so nothing matches
        let sql = format!(
            r#"
            SELECT {columns} FROM comments
            WHERE {column} = $1
              AND ($2::text IS NULL OR (created_at, id) < (
                  SELECT c.created_at, c.id FROM comments c WHERE c.id = $2 AND c.{column} = $1
              ))
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
            columns = COMMENT_COLUMNS,
            column = column
        );
        let rows = sqlx::query(&sql)
            .bind(parent.id())
            .bind(after.map(String::as_str))
            .bind(to_i64(limit))
            .fetch_all(&self.pool)
            .await
            .store_context("Failed to page comments")?;

        rows.iter()
            .map(comment_from_row)
            .collect::<Result<Vec<_>, _>>()
            .store_context("Failed to decode comments")
    }
}

impl Store for PostgresStore {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(None), None);
        assert_eq!(
            like_pattern(Some(&"chair".to_string())),
            Some("%chair%".to_string())
        );
        assert_eq!(
            like_pattern(Some(&"50%_off\\".to_string())),
            Some("%50\\%\\_off\\\\%".to_string())
        );
    }

    #[test]
    fn test_order_clause_per_sort() {
        assert!(order_clause(SortOrder::Recent).starts_with("created_at DESC"));
        assert!(order_clause(SortOrder::Favorite).starts_with("favorite_count DESC"));
    }

    #[test]
    fn test_parent_columns() {
        let product = ParentRef::Product("p".to_string());
        let article = ParentRef::Article("a".to_string());
        assert_eq!(parent_columns(&product), ("product_id", "article_id"));
        assert_eq!(parent_columns(&article), ("article_id", "product_id"));
        assert_eq!(parent_table(&article), "articles");
    }

    #[test]
    fn test_non_database_errors_are_backend_failures() {
        let result: Result<(), sqlx::Error> = Err(sqlx::Error::RowNotFound);
        let err = result.store_context("Failed to fetch product").unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(err.to_string(), "Failed to fetch product");
    }
}
