//! Books repository for database operations.
//!
//! Every statement that returns books joins `authors` in the same round trip,
//! since a book is never rendered without its author.

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::book::{year_to_db, BookQuery, BookRow, CreateBook, UpdateBook, YEAR_RANGE_MESSAGE},
    query::{Conditions, OrderingFilter, Page, SearchFilter},
};

pub const BOOK_AUTHOR_TITLE_UNIQUE: &str = "books_author_title_key";
pub const BOOK_YEAR_RANGE: &str = "books_year_range";
pub const BOOK_AUTHOR_FK: &str = "books_author_id_fkey";

/// Book columns plus the joined author columns, as read by `BookRow`
pub(crate) const BOOK_COLUMNS: &str = "b.id, b.author_id, b.year, b.title, b.preface, b.cover, \
     a.last_name AS author_last_name, a.first_name AS author_first_name, \
     a.middle_name AS author_middle_name, a.birth_date AS author_birth_date, a.bio AS author_bio";

pub const BOOK_SEARCH: SearchFilter = SearchFilter::new(&["b.title"]);

pub const BOOK_ORDERING: OrderingFilter = OrderingFilter::new(
    &[
        ("title", "b.title"),
        ("year", "b.year"),
        ("author__last_name", "a.last_name"),
    ],
    &["title"],
    "b.id",
);

/// Translate constraint violations of a book write into client errors
fn map_write_error(error: sqlx::Error) -> AppError {
    let error = AppError::from(error);
    let constraint = error.violated_constraint().map(str::to_owned);
    match constraint.as_deref() {
        Some(BOOK_AUTHOR_TITLE_UNIQUE) => {
            AppError::Conflict("This author already has a book with this title".to_string())
        }
        Some(BOOK_YEAR_RANGE) => AppError::field("year", YEAR_RANGE_MESSAGE),
        Some(BOOK_AUTHOR_FK) => AppError::field("author_id", "Author does not exist"),
        _ => error,
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    fn filtered(head: &str, query: &BookQuery) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(head);
        let mut conditions = Conditions::new();

        if let Some(author_id) = query.author {
            conditions.next(&mut builder);
            builder.push("b.author_id = ").push_bind(author_id);
        }
        if let Some(year) = query.year {
            conditions.next(&mut builder);
            builder.push("b.year = ").push_bind(year);
        }
        BOOK_SEARCH.push_where(&mut builder, &mut conditions, query.search.as_deref());

        builder
    }

    /// Count and page statements for a book list
    pub fn list_statements(query: &BookQuery, page: Page) -> [QueryBuilder<'static, Postgres>; 2] {
        let count = Self::filtered("SELECT COUNT(*) FROM books b", query);

        let mut select = Self::filtered(
            &format!("SELECT {} FROM books b JOIN authors a ON a.id = b.author_id", BOOK_COLUMNS),
            query,
        );
        BOOK_ORDERING.push_order_by(&mut select, query.ordering.as_deref());
        page.push_limit(&mut select);

        [count, select]
    }

    /// Filtered, ordered page of books with their authors
    pub async fn list(&self, query: &BookQuery, page: Page) -> AppResult<(Vec<BookRow>, i64)> {
        let [mut count, mut select] = Self::list_statements(query, page);

        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;
        let rows = select
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BookRow> {
        sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books b JOIN authors a ON a.id = b.author_id WHERE b.id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Create a new book
    pub async fn create(&self, data: &CreateBook) -> AppResult<BookRow> {
        sqlx::query_as::<_, BookRow>(&format!(
            r#"
            WITH b AS (
                INSERT INTO books (author_id, year, title, preface)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {} FROM b JOIN authors a ON a.id = b.author_id
            "#,
            BOOK_COLUMNS
        ))
        .bind(data.author_id)
        .bind(year_to_db(data.year)?)
        .bind(&data.title)
        .bind(data.preface.as_deref().unwrap_or_default())
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    /// Replace every writable field of a book
    pub async fn replace(&self, id: i32, data: &CreateBook) -> AppResult<BookRow> {
        sqlx::query_as::<_, BookRow>(&format!(
            r#"
            WITH b AS (
                UPDATE books SET author_id = $1, year = $2, title = $3, preface = $4
                WHERE id = $5
                RETURNING *
            )
            SELECT {} FROM b JOIN authors a ON a.id = b.author_id
            "#,
            BOOK_COLUMNS
        ))
        .bind(data.author_id)
        .bind(year_to_db(data.year)?)
        .bind(&data.title)
        .bind(data.preface.as_deref().unwrap_or_default())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Update the fields present in `data`
    pub async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<BookRow> {
        if data.is_empty() {
            return self.get_by_id(id).await;
        }

        let year = data.year.map(year_to_db).transpose()?;

        let mut builder = QueryBuilder::<Postgres>::new("WITH b AS (UPDATE books SET ");
        let mut sets = builder.separated(", ");
        if let Some(ref title) = data.title {
            sets.push("title = ").push_bind_unseparated(title.clone());
        }
        if let Some(year) = year {
            sets.push("year = ").push_bind_unseparated(year);
        }
        if let Some(ref preface) = data.preface {
            sets.push("preface = ").push_bind_unseparated(preface.clone());
        }
        if let Some(author_id) = data.author_id {
            sets.push("author_id = ").push_bind_unseparated(author_id);
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format!(
            " RETURNING *) SELECT {} FROM b JOIN authors a ON a.id = b.author_id",
            BOOK_COLUMNS
        ));

        builder
            .build_query_as::<BookRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Attach (or detach with `None`) the cover file path
    pub async fn set_cover(&self, id: i32, cover: Option<&str>) -> AppResult<BookRow> {
        sqlx::query_as::<_, BookRow>(&format!(
            r#"
            WITH b AS (
                UPDATE books SET cover = $1 WHERE id = $2 RETURNING *
            )
            SELECT {} FROM b JOIN authors a ON a.id = b.author_id
            "#,
            BOOK_COLUMNS
        ))
        .bind(cover)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Delete a book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }
}
