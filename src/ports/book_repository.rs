use crate::domain::{Book, BookId, BookSearchField, BookSummary, BookUpdate, NewBook};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍リポジトリポート
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 全書籍を登録日時の昇順で取得する
    async fn list_all(&self) -> Result<Vec<BookSummary>>;

    /// 指定列の大文字小文字を区別しない部分一致で検索する
    async fn search(&self, field: BookSearchField, term: &str) -> Result<Vec<BookSummary>>;

    /// IDで書籍を1件取得する
    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>>;

    /// 書籍を登録し、採番された行を返す
    ///
    /// 入力は検証済みであること。
    async fn insert(&self, book: NewBook) -> Result<Book>;

    /// 書籍を更新し、更新後の行を返す（存在しなければ`None`）
    async fn update(&self, book_id: BookId, update: BookUpdate) -> Result<Option<Book>>;

    /// 書籍を削除する
    ///
    /// 削除した場合は`true`。
    async fn delete(&self, book_id: BookId) -> Result<bool>;
}
