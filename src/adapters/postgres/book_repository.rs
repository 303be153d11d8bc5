use crate::domain::{Book, BookId, BookSearchField, BookSummary, BookUpdate, NewBook};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

const BOOK_COLUMNS: &str = r#"
    book_id,
    title,
    author,
    category,
    image,
    isbn,
    publisher,
    publication_year,
    total_copies,
    available_copies,
    created_at,
    updated_at
"#;

const SUMMARY_COLUMNS: &str = r#"
    book_id,
    title,
    author,
    category,
    image,
    available_copies,
    total_copies
"#;

/// PostgreSQLの行データをBookに変換する
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    Ok(Book {
        book_id: BookId::try_from(row.get::<i64, _>("book_id"))?,
        title: row.get("title"),
        author: row.get("author"),
        category: row.get("category"),
        image: row.get("image"),
        isbn: row.get("isbn"),
        publisher: row.get("publisher"),
        publication_year: row.get("publication_year"),
        total_copies: row.get("total_copies"),
        available_copies: row.get("available_copies"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_row_to_summary(row: &PgRow) -> Result<BookSummary> {
    Ok(BookSummary {
        book_id: BookId::try_from(row.get::<i64, _>("book_id"))?,
        title: row.get("title"),
        author: row.get("author"),
        category: row.get("category"),
        image: row.get("image"),
        available_copies: row.get("available_copies"),
        total_copies: row.get("total_copies"),
    })
}

/// `%` `_` `\` をエスケープしてLIKEパターンに埋め込む
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn list_all(&self) -> Result<Vec<BookSummary>> {
        let sql = format!(
            "SELECT {} FROM books ORDER BY created_at ASC, book_id ASC",
            SUMMARY_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(map_row_to_summary).collect()
    }

    /// 列名は`BookSearchField`の固定値のみを埋め込む
    async fn search(&self, field: BookSearchField, term: &str) -> Result<Vec<BookSummary>> {
        let sql = format!(
            "SELECT {} FROM books WHERE {} ILIKE $1 ORDER BY created_at ASC, book_id ASC",
            SUMMARY_COLUMNS,
            field.column()
        );
        let rows = sqlx::query(&sql)
            .bind(like_pattern(term))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_summary).collect()
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let sql = format!("SELECT {} FROM books WHERE book_id = $1", BOOK_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(book_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn insert(&self, book: NewBook) -> Result<Book> {
        let sql = format!(
            r#"
            INSERT INTO books (
                title,
                author,
                category,
                image,
                isbn,
                publisher,
                publication_year,
                total_copies,
                available_copies
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.category)
            .bind(book.image.as_deref().filter(|image| !image.is_empty()))
            .bind(&book.isbn)
            .bind(&book.publisher)
            .bind(book.publication_year.unwrap_or_default())
            .bind(book.total_copies.unwrap_or_default())
            .bind(book.available_copies.unwrap_or_default())
            .fetch_one(&self.pool)
            .await?;

        map_row_to_book(&row)
    }

    /// NULLのパラメータは既存値を維持する
    async fn update(&self, book_id: BookId, update: BookUpdate) -> Result<Option<Book>> {
        let sql = format!(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                category = COALESCE($4, category),
                image = COALESCE($5, image),
                isbn = COALESCE($6, isbn),
                publisher = COALESCE($7, publisher),
                publication_year = COALESCE($8, publication_year),
                total_copies = COALESCE($9, total_copies),
                available_copies = COALESCE($10, available_copies),
                updated_at = NOW()
            WHERE book_id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(book_id.value())
            .bind(update.title)
            .bind(update.author)
            .bind(update.category)
            .bind(update.image)
            .bind(update.isbn)
            .bind(update.publisher)
            .bind(update.publication_year)
            .bind(update.total_copies)
            .bind(update.available_copies)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn delete(&self, book_id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }
}
