use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::BookId;

static IMAGE_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://.+\..+").expect("image url pattern is valid"));

/// 書籍（booksテーブルの1行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub category: String,
    pub image: Option<String>,
    pub isbn: String,
    pub publisher: String,
    pub publication_year: i32,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 一覧・検索用の射影
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub category: String,
    pub image: Option<String>,
    pub available_copies: i32,
    pub total_copies: i32,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            book_id: book.book_id,
            title: book.title.clone(),
            author: book.author.clone(),
            category: book.category.clone(),
            image: book.image.clone(),
            available_copies: book.available_copies,
            total_copies: book.total_copies,
        }
    }
}

/// 書籍登録の入力
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub total_copies: Option<i32>,
    #[serde(default)]
    pub available_copies: Option<i32>,
}

/// 書籍更新の入力（指定されたフィールドのみ更新）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub total_copies: Option<i32>,
    pub available_copies: Option<i32>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// 更新内容を書籍に適用する
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(category) = &self.category {
            book.category = category.clone();
        }
        if let Some(image) = &self.image {
            book.image = Some(image.clone());
        }
        if let Some(isbn) = &self.isbn {
            book.isbn = isbn.clone();
        }
        if let Some(publisher) = &self.publisher {
            book.publisher = publisher.clone();
        }
        if let Some(year) = self.publication_year {
            book.publication_year = year;
        }
        if let Some(total) = self.total_copies {
            book.total_copies = total;
        }
        if let Some(available) = self.available_copies {
            book.available_copies = available;
        }
    }
}

/// 検索対象の列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSearchField {
    Title,
    Author,
    Category,
}

impl BookSearchField {
    pub fn column(&self) -> &'static str {
        match self {
            BookSearchField::Title => "title",
            BookSearchField::Author => "author",
            BookSearchField::Category => "category",
        }
    }

    /// 空の検索語に対する振る舞い
    ///
    /// タイトル検索は全件を返し、著者・カテゴリ検索は空を返す。
    pub fn lists_all_on_blank_term(&self) -> bool {
        matches!(self, BookSearchField::Title)
    }
}

impl std::str::FromStr for BookSearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(BookSearchField::Title),
            "author" => Ok(BookSearchField::Author),
            "category" => Ok(BookSearchField::Category),
            _ => Err(format!("Invalid search field: {}", s)),
        }
    }
}

/// 大文字小文字を区別しない部分一致（ILIKE '%term%' 相当）
pub fn matches_ilike(value: &str, term: &str) -> bool {
    value.to_lowercase().contains(&term.to_lowercase())
}

/// 書籍登録のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewBookError {
    /// 必須項目が欠けている
    MissingRequiredFields,
    /// 画像URLの形式が不正
    InvalidImageUrl,
}

/// 書籍登録の入力を検証する
///
/// 必須項目をすべて確認してから画像URLを確認する。
pub fn validate_new_book(book: &NewBook) -> Result<(), NewBookError> {
    let missing = book.title.is_empty()
        || book.author.is_empty()
        || book.category.is_empty()
        || book.isbn.is_empty()
        || book.publisher.is_empty()
        || book.publication_year.is_none_or(|year| year == 0)
        || book.total_copies.is_none_or(|total| total == 0)
        || book.available_copies.is_none();
    if missing {
        return Err(NewBookError::MissingRequiredFields);
    }

    if let Some(image) = book.image.as_deref().filter(|image| !image.is_empty()) {
        if !IMAGE_URL_PATTERN.is_match(image) {
            return Err(NewBookError::InvalidImageUrl);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_book() -> NewBook {
        NewBook {
            title: "The Left Hand of Darkness".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            category: "Science Fiction".to_string(),
            image: None,
            isbn: "9780441478125".to_string(),
            publisher: "Ace Books".to_string(),
            publication_year: Some(1969),
            total_copies: Some(3),
            available_copies: Some(3),
        }
    }

    #[test]
    fn test_validate_new_book_accepts_complete_input() {
        assert_eq!(validate_new_book(&complete_book()), Ok(()));
    }

    #[test]
    fn test_validate_new_book_requires_fields() {
        let mut book = complete_book();
        book.publisher.clear();
        assert_eq!(
            validate_new_book(&book),
            Err(NewBookError::MissingRequiredFields)
        );

        let mut book = complete_book();
        book.total_copies = Some(0);
        assert_eq!(
            validate_new_book(&book),
            Err(NewBookError::MissingRequiredFields)
        );
    }

    #[test]
    fn test_validate_new_book_allows_zero_available_copies() {
        let mut book = complete_book();
        book.available_copies = Some(0);
        assert_eq!(validate_new_book(&book), Ok(()));
    }

    #[test]
    fn test_validate_new_book_checks_image_url() {
        let mut book = complete_book();
        book.image = Some("not-a-url".to_string());
        assert_eq!(validate_new_book(&book), Err(NewBookError::InvalidImageUrl));

        book.image = Some("https://covers.example.org/lhod.jpg".to_string());
        assert_eq!(validate_new_book(&book), Ok(()));
    }

    #[test]
    fn test_matches_ilike_is_case_insensitive_substring() {
        assert!(matches_ilike("Ursula K. Le Guin", "le gu"));
        assert!(matches_ilike("Ursula K. Le Guin", ""));
        assert!(!matches_ilike("Ursula K. Le Guin", "tolkien"));
    }

    #[test]
    fn test_book_update_apply_to_only_touches_given_fields() {
        let now = Utc::now();
        let mut book = Book {
            book_id: BookId::try_from(1).unwrap(),
            title: "Old".to_string(),
            author: "Author".to_string(),
            category: "Cat".to_string(),
            image: None,
            isbn: "1".to_string(),
            publisher: "Pub".to_string(),
            publication_year: 2000,
            total_copies: 2,
            available_copies: 2,
            created_at: now,
            updated_at: now,
        };
        let update = BookUpdate {
            title: Some("New".to_string()),
            available_copies: Some(1),
            ..Default::default()
        };

        update.apply_to(&mut book);

        assert_eq!(book.title, "New");
        assert_eq!(book.available_copies, 1);
        assert_eq!(book.author, "Author");
        assert!(!update.is_empty());
        assert!(BookUpdate::default().is_empty());
    }

    #[test]
    fn test_search_field_parse() {
        assert_eq!("author".parse::<BookSearchField>(), Ok(BookSearchField::Author));
        assert!("isbn".parse::<BookSearchField>().is_err());
        assert!(BookSearchField::Title.lists_all_on_blank_term());
        assert!(!BookSearchField::Category.lists_all_on_blank_term());
    }
}
