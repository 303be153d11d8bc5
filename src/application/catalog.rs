use crate::domain::{
    Book, BookId, BookSearchField, BookSummary, BookUpdate, NewBook, validate_new_book,
};

use super::dependencies::ServiceDependencies;
use super::errors::{ApplicationError, Result};

/// 全書籍を登録順に取得する
pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<BookSummary>> {
    deps.books
        .list_all()
        .await
        .map_err(ApplicationError::CatalogError)
}

/// 書籍を検索する
///
/// 空白のみの検索語：タイトル検索は全件、著者・カテゴリ検索は空を返す。
pub async fn search_books(
    deps: &ServiceDependencies,
    field: BookSearchField,
    term: &str,
) -> Result<Vec<BookSummary>> {
    if term.trim().is_empty() {
        if field.lists_all_on_blank_term() {
            return list_books(deps).await;
        }
        return Ok(Vec::new());
    }

    deps.books
        .search(field, term)
        .await
        .map_err(ApplicationError::CatalogError)
}

/// IDで書籍を取得する
pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.books
        .get_by_id(book_id)
        .await
        .map_err(ApplicationError::CatalogError)?
        .ok_or(ApplicationError::BookNotFound(book_id))
}

/// 書籍を登録する
pub async fn create_book(deps: &ServiceDependencies, book: NewBook) -> Result<Book> {
    validate_new_book(&book).map_err(ApplicationError::InvalidBook)?;

    let created = deps.books.insert(book).await.map_err(|e| {
        tracing::error!("Book insert error: {}", e);
        ApplicationError::CatalogError(e)
    })?;

    tracing::info!(book_id = %created.book_id, title = %created.title, "Book created");
    Ok(created)
}

/// 書籍を更新する
pub async fn update_book(
    deps: &ServiceDependencies,
    book_id: BookId,
    update: BookUpdate,
) -> Result<Book> {
    deps.books
        .update(book_id, update)
        .await
        .map_err(ApplicationError::CatalogError)?
        .ok_or(ApplicationError::BookNotFound(book_id))
}

/// 書籍を削除する
///
/// 存在しない書籍の削除も成功として扱う。
pub async fn delete_book(deps: &ServiceDependencies, book_id: BookId) -> Result<()> {
    let deleted = deps
        .books
        .delete(book_id)
        .await
        .map_err(ApplicationError::CatalogError)?;

    tracing::info!(book_id = %book_id, deleted, "Book delete requested");
    Ok(())
}
