//! フォーム入力の構造的な検証
//!
//! 検証結果は言語に依存しない`ValidationIssue`で表す。
//! メッセージへの変換はプレゼンテーション層（`i18n`）で行う。

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

/// Unicodeのローカル部・ドメイン部を許容する簡易パターン
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

pub const SIGN_IN_PASSWORD_MIN: usize = 6;
pub const SIGN_UP_PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 100;
pub const NAME_MAX: usize = 50;

/// 検証対象のフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Password,
    Email,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
            Field::Password => "password",
            Field::Email => "email",
        }
    }
}

/// 検証エラーの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    /// 未入力
    Required,
    /// メールアドレスの形式が不正
    InvalidEmail,
    /// 最小文字数未満
    TooShort { min: usize },
    /// 最大文字数超過
    TooLong { max: usize },
}

/// フィールドごとの検証エラー（1フィールドに複数可）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, Vec<ValidationIssue>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Field, issue: ValidationIssue) {
        self.0.entry(field).or_default().push(issue);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: Field) -> &[ValidationIssue] {
        self.0.get(&field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &[ValidationIssue])> {
        self.0.iter().map(|(field, issues)| (*field, issues.as_slice()))
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

fn check_length(errors: &mut FieldErrors, field: Field, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len < min {
        errors.push(field, ValidationIssue::TooShort { min });
    }
    if len > max {
        errors.push(field, ValidationIssue::TooLong { max });
    }
}

fn check_name(errors: &mut FieldErrors, field: Field, value: &str) {
    if value.is_empty() {
        errors.push(field, ValidationIssue::Required);
    }
    if value.chars().count() > NAME_MAX {
        errors.push(field, ValidationIssue::TooLong { max: NAME_MAX });
    }
}

fn check_email_pattern(errors: &mut FieldErrors, value: &str) {
    if value.is_empty() {
        errors.push(Field::Email, ValidationIssue::Required);
    }
    if !EMAIL_PATTERN.is_match(value) {
        errors.push(Field::Email, ValidationIssue::InvalidEmail);
    }
}

/// サインインフォーム
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_length(
            &mut errors,
            Field::Password,
            &self.password,
            SIGN_IN_PASSWORD_MIN,
            PASSWORD_MAX,
        );
        check_email_pattern(&mut errors, &self.email);
        errors.into_result()
    }
}

/// 新規登録フォーム
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, Field::FirstName, &self.first_name);
        check_name(&mut errors, Field::LastName, &self.last_name);
        check_length(
            &mut errors,
            Field::Password,
            &self.password,
            SIGN_UP_PASSWORD_MIN,
            PASSWORD_MAX,
        );
        check_email_pattern(&mut errors, &self.email);
        errors.into_result()
    }
}

/// メールアドレス変更フォーム
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateEmailForm {
    #[serde(default)]
    pub email: String,
}

impl UpdateEmailForm {
    /// 登録フォームより厳密なメール形式チェックを使う
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.email.is_empty() {
            errors.push(Field::Email, ValidationIssue::Required);
        }
        if !self.email.validate_email() {
            errors.push(Field::Email, ValidationIssue::InvalidEmail);
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_accepts_valid_credentials() {
        let form = SignInForm {
            email: "reader@example.com".to_string(),
            password: "hunter22".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_sign_in_accepts_unicode_email() {
        let form = SignInForm {
            email: "läsare@bibliotek.se".to_string(),
            password: "hunter22".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_sign_in_rejects_malformed_emails() {
        for email in ["reader", "reader@", "reader@example", "re ader@example.com", "@example.com"] {
            let form = SignInForm {
                email: email.to_string(),
                password: "hunter22".to_string(),
            };
            let errors = form.validate().unwrap_err();
            assert_eq!(
                errors.get(Field::Email),
                &[ValidationIssue::InvalidEmail],
                "email {email:?}"
            );
            assert!(errors.get(Field::Password).is_empty());
        }
    }

    #[test]
    fn test_sign_in_empty_email_reports_every_issue() {
        let form = SignInForm {
            email: String::new(),
            password: "hunter22".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get(Field::Email),
            &[ValidationIssue::Required, ValidationIssue::InvalidEmail]
        );
    }

    #[test]
    fn test_sign_in_password_bounds() {
        let short = SignInForm {
            email: "reader@example.com".to_string(),
            password: "12345".to_string(),
        };
        assert_eq!(
            short.validate().unwrap_err().get(Field::Password),
            &[ValidationIssue::TooShort { min: 6 }]
        );

        let long = SignInForm {
            email: "reader@example.com".to_string(),
            password: "x".repeat(101),
        };
        assert_eq!(
            long.validate().unwrap_err().get(Field::Password),
            &[ValidationIssue::TooLong { max: 100 }]
        );
    }

    #[test]
    fn test_sign_up_requires_names_and_longer_password() {
        let form = SignUpForm {
            first_name: String::new(),
            last_name: "L".repeat(51),
            email: "reader@example.com".to_string(),
            password: "1234567".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get(Field::FirstName), &[ValidationIssue::Required]);
        assert_eq!(
            errors.get(Field::LastName),
            &[ValidationIssue::TooLong { max: 50 }]
        );
        assert_eq!(
            errors.get(Field::Password),
            &[ValidationIssue::TooShort { min: 8 }]
        );
        assert!(errors.get(Field::Email).is_empty());
    }

    #[test]
    fn test_update_email_validation() {
        let ok = UpdateEmailForm {
            email: "new@example.com".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty = UpdateEmailForm::default();
        assert_eq!(
            empty.validate().unwrap_err().get(Field::Email),
            &[ValidationIssue::Required, ValidationIssue::InvalidEmail]
        );

        let bad = UpdateEmailForm {
            email: "not-an-email".to_string(),
        };
        assert_eq!(
            bad.validate().unwrap_err().get(Field::Email),
            &[ValidationIssue::InvalidEmail]
        );
    }
}
