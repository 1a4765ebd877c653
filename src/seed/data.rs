use anyhow::{Context, Result};

use crate::logic::create_under_parent;
use crate::model::{ListQuery, NewArticle, NewComment, NewProduct, ParentRef, SortOrder};
use crate::store::traits::Store;

fn sample_products() -> Vec<NewProduct> {
    vec![
        NewProduct {
            name: "Oak Dining Table".to_string(),
            description: "Solid oak table that seats six".to_string(),
            price: 890,
            tags: vec!["wood".to_string(), "table".to_string()],
        },
        NewProduct {
            name: "Chair".to_string(),
            description: "A sturdy chair with a walnut finish".to_string(),
            price: 50,
            tags: vec!["wood".to_string()],
        },
        NewProduct {
            name: "Desk Lamp".to_string(),
            description: "Adjustable LED lamp with warm light".to_string(),
            price: 35,
            tags: vec!["light".to_string(), "desk".to_string()],
        },
    ]
}

fn sample_articles() -> Vec<NewArticle> {
    vec![
        NewArticle {
            title: "Caring for oak furniture".to_string(),
            content: "Wipe with a damp cloth and oil twice a year.".to_string(),
        },
        NewArticle {
            title: "Lighting a small office".to_string(),
            content: "Combine a ceiling light with a warm desk lamp.".to_string(),
        },
    ]
}

fn comment(content: &str) -> NewComment {
    NewComment {
        content: content.to_string(),
    }
}

/// Insert a small sample catalog unless products already exist
pub async fn load_seed_data<S: Store>(store: &S) -> Result<()> {
    let existing = store
        .list_products(&ListQuery::new(SortOrder::Recent, 0, 1))
        .await
        .context("Failed to check for existing products")?;
    if existing.search_count > 0 {
        log::info!(
            "Catalog already holds {} product(s) - skipping seed data",
            existing.search_count
        );
        return Ok(());
    }

    let mut product_ids = Vec::new();
    for product in sample_products() {
        let created = store
            .create_product(product)
            .await
            .context("Failed to seed product")?;
        product_ids.push(created.id);
    }

    let mut article_ids = Vec::new();
    for article in sample_articles() {
        let created = store
            .create_article(article)
            .await
            .context("Failed to seed article")?;
        article_ids.push(created.id);
    }

    let comments = [
        (ParentRef::Product(product_ids[0].clone()), "Arrived well packed, looks great"),
        (ParentRef::Product(product_ids[0].clone()), "Heavier than expected"),
        (ParentRef::Product(product_ids[1].clone()), "nice!"),
        (ParentRef::Article(article_ids[0].clone()), "Which oil do you recommend?"),
    ];
    let comment_count = comments.len();
    for (parent, content) in comments {
        create_under_parent(store, &parent, comment(content))
            .await
            .with_context(|| format!("Failed to seed comment on {}", parent))?;
    }

    log::info!(
        "Seed data loaded: {} products, {} articles, {} comments",
        product_ids.len(),
        article_ids.len(),
        comment_count
    );
    Ok(())
}
