mod common;

use chrono::{DateTime, Duration, Utc};
use rusty_library_reservations::adapters::postgres::{
    PostgresAuthBackend, PostgresBookRepository, PostgresEligibilityRules,
    PostgresReservationRepository,
};
use rusty_library_reservations::domain::*;
use rusty_library_reservations::ports::{
    AuthBackend, AuthError, BookRepository, EligibilityRules, ReservationRepository,
};
use serial_test::serial;
use sqlx::PgPool;

/// PostgreSQLの時刻精度（マイクロ秒）に合わせて丸める
fn truncate_to_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(dt.timestamp_micros()).expect("Invalid timestamp")
}

/// テストデータをクリーンアップ
async fn cleanup(pool: &PgPool) {
    sqlx::query("TRUNCATE penalties, reservations, sessions, books, users RESTART IDENTITY CASCADE")
        .execute(pool)
        .await
        .expect("Failed to cleanup test data");
}

fn new_book(title: &str, author: &str, category: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: author.to_string(),
        category: category.to_string(),
        image: None,
        isbn: format!("isbn-{}", title.to_lowercase().replace(' ', "-")),
        publisher: "Test Press".to_string(),
        publication_year: Some(2020),
        total_copies: Some(1),
        available_copies: Some(1),
    }
}

async fn register(auth: &PostgresAuthBackend, email: &str) -> Principal {
    auth.sign_up(NewAccount {
        first_name: "Test".to_string(),
        last_name: "Reader".to_string(),
        email: email.to_string(),
        password: "correct-horse".to_string(),
    })
    .await
    .expect("Failed to register user")
}

async fn add_penalty(pool: &PgPool, user: PrincipalId, reason: &str) {
    sqlx::query("INSERT INTO penalties (user_id, reason) VALUES ($1, $2)")
        .bind(user.value())
        .bind(reason)
        .execute(pool)
        .await
        .expect("Failed to insert penalty");
}

// ============================================================================
// Books
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL"]
#[serial]
async fn test_book_repository_insert_and_search() {
    let pool = common::create_test_pool().await;
    cleanup(&pool).await;
    let books = PostgresBookRepository::new(pool.clone());

    let dune = books
        .insert(new_book("Dune", "Frank Herbert", "Science Fiction"))
        .await
        .expect("Failed to insert book");
    books
        .insert(new_book("Emma", "Jane Austen", "Classics"))
        .await
        .expect("Failed to insert book");
    books
        .insert(new_book("100% Dune", "Someone", "Parody"))
        .await
        .expect("Failed to insert book");

    let all = books.list_all().await.expect("Failed to list books");
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].book_id, dune.book_id);

    let found = books
        .search(BookSearchField::Title, "dUNe")
        .await
        .expect("Failed to search");
    assert_eq!(found.len(), 2);

    // ワイルドカード文字はリテラルとして扱う
    let literal = books
        .search(BookSearchField::Title, "100%")
        .await
        .expect("Failed to search");
    assert_eq!(literal.len(), 1);
    assert_eq!(literal[0].title, "100% Dune");

    let by_author = books
        .search(BookSearchField::Author, "austen")
        .await
        .expect("Failed to search");
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].title, "Emma");

    cleanup(&pool).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
#[serial]
async fn test_book_repository_update_and_delete() {
    let pool = common::create_test_pool().await;
    cleanup(&pool).await;
    let books = PostgresBookRepository::new(pool.clone());

    let book = books
        .insert(new_book("Dune", "Frank Herbert", "Science Fiction"))
        .await
        .expect("Failed to insert book");

    let updated = books
        .update(
            book.book_id,
            BookUpdate {
                available_copies: Some(0),
                ..BookUpdate::default()
            },
        )
        .await
        .expect("Failed to update book")
        .expect("Book should exist");
    assert_eq!(updated.available_copies, 0);
    assert_eq!(updated.title, "Dune");
    assert!(updated.updated_at >= book.updated_at);

    assert!(books.delete(book.book_id).await.expect("Failed to delete"));
    assert!(!books.delete(book.book_id).await.expect("Failed to delete"));
    assert!(
        books
            .get_by_id(book.book_id)
            .await
            .expect("Failed to get book")
            .is_none()
    );

    let missing = books
        .update(book.book_id, BookUpdate::default())
        .await
        .expect("Failed to update book");
    assert!(missing.is_none());

    cleanup(&pool).await;
}

// ============================================================================
// Reservations
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL"]
#[serial]
async fn test_reservation_repository_due_soon_and_reminder() {
    let pool = common::create_test_pool().await;
    cleanup(&pool).await;
    let auth = PostgresAuthBackend::new(pool.clone(), Duration::hours(24));
    let books = PostgresBookRepository::new(pool.clone());
    let reservations = PostgresReservationRepository::new(pool.clone());

    let reader = register(&auth, "reader@example.com").await;
    let other = register(&auth, "other@example.com").await;
    let book = books
        .insert(new_book("Dune", "Frank Herbert", "Science Fiction"))
        .await
        .expect("Failed to insert book");

    let now = truncate_to_micros(Utc::now());
    let window = ReservationPolicy::default().reminder_window_at(now);

    let soon = reservations
        .insert(ReservationRequest {
            book_id: book.book_id,
            due_date: now + Duration::days(3),
            user_id: reader.id,
        })
        .await
        .expect("Failed to insert reservation");
    assert_eq!(soon.status, ReservationStatus::Active);
    assert!(!soon.reminder_sent);
    assert_eq!(soon.due_date, now + Duration::days(3));

    // 期間外
    reservations
        .insert(ReservationRequest {
            book_id: book.book_id,
            due_date: now + Duration::days(30),
            user_id: reader.id,
        })
        .await
        .expect("Failed to insert reservation");
    // 他の利用者
    reservations
        .insert(ReservationRequest {
            book_id: book.book_id,
            due_date: now + Duration::days(3),
            user_id: other.id,
        })
        .await
        .expect("Failed to insert reservation");

    let mine = reservations
        .find_by_user(reader.id)
        .await
        .expect("Failed to list reservations");
    assert_eq!(mine.len(), 2);

    let due = reservations
        .find_due_soon(reader.id, window)
        .await
        .expect("Failed to find due soon");
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].reservation_id, soon.reservation_id);

    reservations
        .mark_reminder_sent(soon.reservation_id)
        .await
        .expect("Failed to mark reminder");
    reservations
        .mark_reminder_sent(soon.reservation_id)
        .await
        .expect("Marking twice should succeed");

    let due = reservations
        .find_due_soon(reader.id, window)
        .await
        .expect("Failed to find due soon");
    assert!(due.is_empty());

    cleanup(&pool).await;
}

// ============================================================================
// Eligibility
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL"]
#[serial]
async fn test_eligibility_rules_follow_pending_penalties() {
    let pool = common::create_test_pool().await;
    cleanup(&pool).await;
    let auth = PostgresAuthBackend::new(pool.clone(), Duration::hours(24));
    let rules = PostgresEligibilityRules::new(pool.clone());

    let reader = register(&auth, "reader@example.com").await;

    let verdict = rules
        .evaluate_reservation_eligibility(reader.id)
        .await
        .expect("Failed to evaluate eligibility");
    assert_eq!(verdict, ReservationEligibility::allowed());

    add_penalty(&pool, reader.id, "Overdue book").await;

    let verdict = rules
        .evaluate_reservation_eligibility(reader.id)
        .await
        .expect("Failed to evaluate eligibility");
    assert!(!verdict.can_reserve);
    assert_eq!(verdict.restriction_reason.as_deref(), Some("Overdue book"));

    sqlx::query("UPDATE penalties SET status = 'resolved' WHERE user_id = $1")
        .bind(reader.id.value())
        .execute(&pool)
        .await
        .expect("Failed to resolve penalty");

    let verdict = rules
        .evaluate_reservation_eligibility(reader.id)
        .await
        .expect("Failed to evaluate eligibility");
    assert!(verdict.can_reserve);

    cleanup(&pool).await;
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL"]
#[serial]
async fn test_auth_backend_session_lifecycle() {
    let pool = common::create_test_pool().await;
    cleanup(&pool).await;
    let auth = PostgresAuthBackend::new(pool.clone(), Duration::hours(24));

    let principal = register(&auth, "reader@example.com").await;

    let duplicate = auth
        .sign_up(NewAccount {
            first_name: "Again".to_string(),
            last_name: "Reader".to_string(),
            email: "reader@example.com".to_string(),
            password: "another-password".to_string(),
        })
        .await;
    assert!(matches!(duplicate, Err(AuthError::AlreadyRegistered)));

    let wrong = auth
        .sign_in_with_password("reader@example.com", "wrong-horse")
        .await;
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

    let session = auth
        .sign_in_with_password("reader@example.com", "correct-horse")
        .await
        .expect("Failed to sign in");
    assert_eq!(session.principal, principal);

    let current = auth
        .current_principal(&session.token)
        .await
        .expect("Failed to resolve session");
    assert_eq!(current, Some(principal.clone()));

    let updated = auth
        .update_email(principal.id, "renamed@example.com")
        .await
        .expect("Failed to update email");
    assert_eq!(updated.email, "renamed@example.com");

    auth.sign_out(&session.token).await.expect("Failed to sign out");
    let current = auth
        .current_principal(&session.token)
        .await
        .expect("Failed to resolve session");
    assert!(current.is_none());

    auth.delete_user(principal.id)
        .await
        .expect("Failed to delete user");
    let again = auth.delete_user(principal.id).await;
    assert!(matches!(again, Err(AuthError::UserNotFound)));

    cleanup(&pool).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
#[serial]
async fn test_auth_backend_sign_in_removes_expired_sessions() {
    let pool = common::create_test_pool().await;
    cleanup(&pool).await;
    let auth = PostgresAuthBackend::new(pool.clone(), Duration::hours(24));

    let principal = register(&auth, "reader@example.com").await;
    sqlx::query(
        "INSERT INTO sessions (token, user_id, expires_at) VALUES ('stale-token', $1, NOW() - INTERVAL '1 hour')",
    )
    .bind(principal.id.value())
    .execute(&pool)
    .await
    .expect("Failed to insert expired session");

    let session = auth
        .sign_in_with_password("reader@example.com", "correct-horse")
        .await
        .expect("Failed to sign in");

    let tokens: Vec<String> = sqlx::query_scalar("SELECT token FROM sessions")
        .fetch_all(&pool)
        .await
        .expect("Failed to list sessions");
    assert_eq!(tokens, vec![session.token.as_str().to_string()]);

    cleanup(&pool).await;
}
