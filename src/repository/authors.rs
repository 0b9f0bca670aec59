//! Authors repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use super::books::{BOOK_AUTHOR_FK, BOOK_COLUMNS};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorQuery, CreateAuthor, UpdateAuthor},
        book::BookRow,
    },
    query::{Conditions, OrderingFilter, Page, SearchFilter},
};

const AUTHOR_COLUMNS: &str = "a.id, a.last_name, a.first_name, a.middle_name, a.birth_date, a.bio";

pub const AUTHOR_SEARCH: SearchFilter =
    SearchFilter::new(&["a.last_name", "a.first_name", "a.middle_name"]);

pub const AUTHOR_ORDERING: OrderingFilter = OrderingFilter::new(
    &[("last_name", "a.last_name"), ("first_name", "a.first_name")],
    &["last_name", "first_name"],
    "a.id",
);

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    fn filtered(head: &str, query: &AuthorQuery) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(head);
        AUTHOR_SEARCH.push_where(&mut builder, &mut Conditions::new(), query.search.as_deref());
        builder
    }

    /// Count and page statements for an author list; the page carries a `books_count` annotation
    pub fn list_statements(query: &AuthorQuery, page: Page) -> [QueryBuilder<'static, Postgres>; 2] {
        let count = Self::filtered("SELECT COUNT(*) FROM authors a", query);

        let mut select = Self::filtered(
            &format!(
                "SELECT {}, (SELECT COUNT(*) FROM books b WHERE b.author_id = a.id) AS books_count FROM authors a",
                AUTHOR_COLUMNS
            ),
            query,
        );
        AUTHOR_ORDERING.push_order_by(&mut select, query.ordering.as_deref());
        page.push_limit(&mut select);

        [count, select]
    }

    /// Filtered, ordered page of authors with their book counts
    pub async fn list(&self, query: &AuthorQuery, page: Page) -> AppResult<(Vec<Author>, i64)> {
        let [mut count, mut select] = Self::list_statements(query, page);

        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;
        let authors = select
            .build_query_as::<Author>()
            .fetch_all(&self.pool)
            .await?;

        Ok((authors, total))
    }

    /// Get author by ID (without aggregate annotation)
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(&format!("SELECT {} FROM authors a WHERE a.id = $1", AUTHOR_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Live count of the books referencing an author
    pub async fn count_books(&self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub(crate) fn books_statement(author_ids: &[i32]) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM books b JOIN authors a ON a.id = b.author_id WHERE b.author_id = ANY(",
            BOOK_COLUMNS
        ));
        builder.push_bind(author_ids.to_vec());
        builder.push(") ORDER BY b.title, b.id");
        builder
    }

    /// Books of all the given authors in one statement, sorted by title
    pub async fn books_of(&self, author_ids: &[i32]) -> AppResult<Vec<BookRow>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = Self::books_statement(author_ids)
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Create a new author
    pub async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let row = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (last_name, first_name, middle_name, birth_date, bio)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, last_name, first_name, middle_name, birth_date, bio
            "#,
        )
        .bind(&data.last_name)
        .bind(&data.first_name)
        .bind(&data.middle_name)
        .bind(data.birth_date)
        .bind(data.bio.as_deref().unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Replace every writable field of an author
    pub async fn replace(&self, id: i32, data: &CreateAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors
            SET last_name = $1, first_name = $2, middle_name = $3, birth_date = $4, bio = $5
            WHERE id = $6
            RETURNING id, last_name, first_name, middle_name, birth_date, bio
            "#,
        )
        .bind(&data.last_name)
        .bind(&data.first_name)
        .bind(&data.middle_name)
        .bind(data.birth_date)
        .bind(data.bio.as_deref().unwrap_or_default())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Update the fields present in `data`
    pub async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        if data.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE authors SET ");
        let mut sets = builder.separated(", ");

        macro_rules! set_field {
            ($field:expr, $name:literal) => {
                if let Some(ref val) = $field {
                    sets.push(concat!($name, " = ")).push_bind_unseparated(val.clone());
                }
            };
        }

        set_field!(data.last_name, "last_name");
        set_field!(data.first_name, "first_name");
        set_field!(data.middle_name, "middle_name");
        set_field!(data.birth_date, "birth_date");
        set_field!(data.bio, "bio");

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING id, last_name, first_name, middle_name, birth_date, bio");

        builder
            .build_query_as::<Author>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Delete an author; refused by storage while books reference it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                Err(AppError::NotFound(format!("Author {} not found", id)))
            }
            Ok(_) => Ok(()),
            Err(e) => {
                let error = AppError::from(e);
                if error.violated_constraint() != Some(BOOK_AUTHOR_FK) {
                    return Err(error);
                }
                let books = self.count_books(id).await?;
                Err(AppError::Protected(format!(
                    "Author {} is referenced by {} book(s) and cannot be deleted",
                    id, books
                )))
            }
        }
    }
}
