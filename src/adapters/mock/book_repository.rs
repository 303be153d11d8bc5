use crate::domain::{
    Book, BookId, BookSearchField, BookSummary, BookUpdate, NewBook, matches_ilike,
};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::lock;

/// BookRepositoryのモック実装
pub struct BookRepository {
    books: Mutex<BTreeMap<BookId, Book>>,
    next_id: Mutex<i64>,
    lookup_failure: Mutex<Option<String>>,
}

impl BookRepository {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(BTreeMap::new()),
            next_id: Mutex::new(1),
            lookup_failure: Mutex::new(None),
        }
    }

    /// テスト用：書籍を追加する
    ///
    /// 登録日時は追加順に1秒ずつ進める。
    pub fn add_book(&self, title: &str, author: &str, category: &str, available: i32) -> Book {
        let book_id = self.allocate_id();
        let created_at = Utc::now() + Duration::seconds(book_id.value());
        let book = Book {
            book_id,
            title: title.to_string(),
            author: author.to_string(),
            category: category.to_string(),
            image: None,
            isbn: format!("978-0-00-{:06}", book_id.value()),
            publisher: "Test Press".to_string(),
            publication_year: 2020,
            total_copies: available.max(1),
            available_copies: available,
            created_at,
            updated_at: created_at,
        };
        lock(&self.books).insert(book_id, book.clone());
        book
    }

    /// テスト用：IDを指定して書籍を置く
    pub fn put(&self, book: Book) {
        lock(&self.books).insert(book.book_id, book);
    }

    /// テスト用：取得系の呼び出しを失敗させる
    pub fn fail_lookups(&self, message: &str) {
        *lock(&self.lookup_failure) = Some(message.to_string());
    }

    pub fn count(&self) -> usize {
        lock(&self.books).len()
    }

    fn allocate_id(&self) -> BookId {
        let mut next_id = lock(&self.next_id);
        let id = *next_id;
        *next_id += 1;
        // 1から採番するので常に正
        BookId::try_from(id).unwrap_or_else(|_| unreachable!("book ids start at 1"))
    }

    fn check_failure(&self) -> Result<()> {
        match lock(&self.lookup_failure).clone() {
            Some(message) => Err(message.into()),
            None => Ok(()),
        }
    }

    fn summaries<F>(&self, filter: F) -> Vec<BookSummary>
    where
        F: Fn(&Book) -> bool,
    {
        let books = lock(&self.books);
        let mut matching: Vec<&Book> = books.values().filter(|book| filter(book)).collect();
        matching.sort_by_key(|book| (book.created_at, book.book_id));
        matching.into_iter().map(BookSummary::from).collect()
    }
}

impl Default for BookRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn list_all(&self) -> Result<Vec<BookSummary>> {
        self.check_failure()?;
        Ok(self.summaries(|_| true))
    }

    async fn search(&self, field: BookSearchField, term: &str) -> Result<Vec<BookSummary>> {
        self.check_failure()?;
        Ok(self.summaries(|book| {
            let value = match field {
                BookSearchField::Title => &book.title,
                BookSearchField::Author => &book.author,
                BookSearchField::Category => &book.category,
            };
            matches_ilike(value, term)
        }))
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        self.check_failure()?;
        Ok(lock(&self.books).get(&book_id).cloned())
    }

    async fn insert(&self, book: NewBook) -> Result<Book> {
        let book_id = self.allocate_id();
        let now = Utc::now() + Duration::seconds(book_id.value());
        let created = Book {
            book_id,
            title: book.title,
            author: book.author,
            category: book.category,
            image: book.image.filter(|image| !image.is_empty()),
            isbn: book.isbn,
            publisher: book.publisher,
            publication_year: book.publication_year.unwrap_or_default(),
            total_copies: book.total_copies.unwrap_or_default(),
            available_copies: book.available_copies.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        lock(&self.books).insert(book_id, created.clone());
        Ok(created)
    }

    async fn update(&self, book_id: BookId, update: BookUpdate) -> Result<Option<Book>> {
        let mut books = lock(&self.books);
        let Some(book) = books.get_mut(&book_id) else {
            return Ok(None);
        };
        update.apply_to(book);
        book.updated_at = Utc::now();
        Ok(Some(book.clone()))
    }

    async fn delete(&self, book_id: BookId) -> Result<bool> {
        Ok(lock(&self.books).remove(&book_id).is_some())
    }
}
