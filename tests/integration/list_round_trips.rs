//! Round trips made by the list endpoints, counted from sqlx's statement events
//!
//! Needs a migrated-or-empty database at `DATABASE_URL`.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use sqlx::postgres::PgPoolOptions;
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    Layer,
};

use catalog_server::{
    config::AppConfig,
    models::{
        author::{AuthorQuery, CreateAuthor},
        book::{BookQuery, CreateBook},
    },
    query::Page,
    repository::Repository,
    services::Services,
};

/// Counts every statement sqlx reports as executed
#[derive(Clone, Default)]
struct StatementCounter(Arc<AtomicUsize>);

impl StatementCounter {
    fn take(&self) -> usize {
        self.0.swap(0, Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for StatementCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() == "sqlx::query" {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[tokio::test]
#[ignore] // Run with: DATABASE_URL=... cargo test -- --ignored
async fn test_list_round_trips_do_not_grow_with_page_size() {
    let counter = StatementCounter::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(counter.clone()));

    let config = AppConfig::default();
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| config.database.url.clone());
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .expect("Failed to connect");
    sqlx::migrate!("./migrations").run(&pool).await.expect("Failed to migrate");

    let repository = Repository::new(pool);
    let services = Services::new(repository.clone(), &config);

    let tag = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
    let mut author_ids = Vec::new();
    for i in 0..50 {
        let author = repository
            .authors
            .create(&CreateAuthor {
                last_name: format!("Trips{}{:02}", tag, i),
                first_name: "Round".to_string(),
                middle_name: None,
                birth_date: None,
                bio: None,
            })
            .await
            .expect("author");
        for title in ["First", "Second"] {
            repository
                .books
                .create(&CreateBook {
                    title: format!("{} {}", title, tag),
                    year: 1900 + i,
                    preface: None,
                    author_id: author.id,
                })
                .await
                .expect("book");
        }
        author_ids.push(author.id);
    }

    let authors = AuthorQuery {
        search: Some(format!("Trips{}", tag)),
        ..AuthorQuery::default()
    };
    let books = BookQuery {
        search: Some(tag.clone()),
        ..BookQuery::default()
    };

    counter.take();
    for per_page in [1, 50] {
        let page = Page::new(None, Some(per_page), &config.pagination);

        let (items, total) = services.authors.list(&authors, page).await.expect("authors");
        assert_eq!(total, 50);
        assert_eq!(items.len(), per_page as usize);
        assert!(items.iter().all(|a| a.books.as_ref().map(Vec::len) == Some(2)));
        // count, annotated page, one prefetch of every listed author's books
        assert_eq!(counter.take(), 3, "authors with per_page={}", per_page);

        let (items, total) = services.books.list(&books, page).await.expect("books");
        assert_eq!(total, 100);
        assert_eq!(items.len(), per_page as usize);
        // count, page joined with authors
        assert_eq!(counter.take(), 2, "books with per_page={}", per_page);
    }

    for id in author_ids {
        sqlx::query("DELETE FROM books WHERE author_id = $1")
            .bind(id)
            .execute(&repository.pool)
            .await
            .expect("cleanup");
        repository.authors.delete(id).await.expect("cleanup");
    }
}
