use rusty_library_reservations::application::ApplicationError;
use rusty_library_reservations::application::catalog::{
    create_book, delete_book, get_book, list_books, search_books, update_book,
};
use rusty_library_reservations::domain::*;

mod common;

use common::MockBackends;

/// 検索用の書籍を3冊登録する
fn seed_catalog(backends: &MockBackends) -> Vec<Book> {
    vec![
        backends
            .books
            .add_book("Dune", "Frank Herbert", "Science Fiction", 2),
        backends
            .books
            .add_book("Emma", "Jane Austen", "Classics", 1),
        backends
            .books
            .add_book("Children of Dune", "Frank Herbert", "Science Fiction", 0),
    ]
}

fn valid_new_book() -> NewBook {
    NewBook {
        title: "Rust in Action".to_string(),
        author: "Tim McNamara".to_string(),
        category: "Programming".to_string(),
        image: Some("https://example.com/cover.png".to_string()),
        isbn: "978-1-61729-455-6".to_string(),
        publisher: "Manning".to_string(),
        publication_year: Some(2021),
        total_copies: Some(2),
        available_copies: Some(2),
    }
}

fn titles(books: &[BookSummary]) -> Vec<&str> {
    books.iter().map(|book| book.title.as_str()).collect()
}

#[tokio::test]
async fn test_list_books_in_creation_order() {
    let backends = MockBackends::new();
    seed_catalog(&backends);

    let books = list_books(&backends.deps()).await.unwrap();

    assert_eq!(titles(&books), vec!["Dune", "Emma", "Children of Dune"]);
}

#[tokio::test]
async fn test_search_is_case_insensitive_substring() {
    let backends = MockBackends::new();
    seed_catalog(&backends);
    let deps = backends.deps();

    let by_title = search_books(&deps, BookSearchField::Title, "dUnE").await.unwrap();
    assert_eq!(titles(&by_title), vec!["Dune", "Children of Dune"]);

    let by_author = search_books(&deps, BookSearchField::Author, "austen")
        .await
        .unwrap();
    assert_eq!(titles(&by_author), vec!["Emma"]);

    let by_category = search_books(&deps, BookSearchField::Category, "fiction")
        .await
        .unwrap();
    assert_eq!(by_category.len(), 2);
}

#[tokio::test]
async fn test_search_blank_term_depends_on_field() {
    let backends = MockBackends::new();
    seed_catalog(&backends);
    let deps = backends.deps();

    let by_title = search_books(&deps, BookSearchField::Title, "  ").await.unwrap();
    assert_eq!(by_title.len(), 3);

    let by_author = search_books(&deps, BookSearchField::Author, "").await.unwrap();
    assert!(by_author.is_empty());

    let by_category = search_books(&deps, BookSearchField::Category, " ")
        .await
        .unwrap();
    assert!(by_category.is_empty());
}

#[tokio::test]
async fn test_get_book_found_and_missing() {
    let backends = MockBackends::new();
    let seeded = seed_catalog(&backends);
    let deps = backends.deps();

    let book = get_book(&deps, seeded[1].book_id).await.unwrap();
    assert_eq!(book, seeded[1]);

    let missing = BookId::try_from(999).unwrap();
    let result = get_book(&deps, missing).await;
    assert!(matches!(result, Err(ApplicationError::BookNotFound(id)) if id == missing));
}

#[tokio::test]
async fn test_create_book_success() {
    let backends = MockBackends::new();

    let created = create_book(&backends.deps(), valid_new_book()).await.unwrap();

    assert_eq!(created.title, "Rust in Action");
    assert_eq!(created.publication_year, 2021);
    assert_eq!(backends.books.count(), 1);
}

#[tokio::test]
async fn test_create_book_missing_fields() {
    let backends = MockBackends::new();
    let book = NewBook {
        publisher: String::new(),
        ..valid_new_book()
    };

    let result = create_book(&backends.deps(), book).await;

    assert!(matches!(
        result,
        Err(ApplicationError::InvalidBook(
            NewBookError::MissingRequiredFields
        ))
    ));
    assert_eq!(backends.books.count(), 0);
}

#[tokio::test]
async fn test_create_book_invalid_image_url() {
    let backends = MockBackends::new();
    let book = NewBook {
        image: Some("cover.png".to_string()),
        ..valid_new_book()
    };

    let result = create_book(&backends.deps(), book).await;

    assert!(matches!(
        result,
        Err(ApplicationError::InvalidBook(NewBookError::InvalidImageUrl))
    ));
    assert_eq!(backends.books.count(), 0);
}

#[tokio::test]
async fn test_update_book_applies_only_given_fields() {
    let backends = MockBackends::new();
    let seeded = seed_catalog(&backends);

    let updated = update_book(
        &backends.deps(),
        seeded[0].book_id,
        BookUpdate {
            available_copies: Some(5),
            ..BookUpdate::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.available_copies, 5);
    assert_eq!(updated.title, seeded[0].title);
    assert_eq!(updated.author, seeded[0].author);
}

#[tokio::test]
async fn test_update_missing_book() {
    let backends = MockBackends::new();
    let missing = BookId::try_from(404).unwrap();

    let result = update_book(&backends.deps(), missing, BookUpdate::default()).await;

    assert!(matches!(result, Err(ApplicationError::BookNotFound(_))));
}

#[tokio::test]
async fn test_delete_book_is_idempotent() {
    let backends = MockBackends::new();
    let seeded = seed_catalog(&backends);
    let deps = backends.deps();

    delete_book(&deps, seeded[0].book_id).await.unwrap();
    delete_book(&deps, seeded[0].book_id).await.unwrap();

    assert_eq!(backends.books.count(), 2);
}

#[tokio::test]
async fn test_catalog_backend_failure() {
    let backends = MockBackends::new();
    backends.books.fail_lookups("relation \"books\" does not exist");

    let result = list_books(&backends.deps()).await;

    assert!(matches!(result, Err(ApplicationError::CatalogError(_))));
}
