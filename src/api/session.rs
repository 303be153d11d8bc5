use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{
        header::{ACCEPT_LANGUAGE, AUTHORIZATION},
        request::Parts,
    },
};
use serde::Deserialize;
use std::convert::Infallible;

use crate::domain::SessionToken;
use crate::i18n::Translator;

/// `Authorization: Bearer <token>` のセッション
///
/// ヘッダーがない・形式が不正な場合は`None`。
/// 未認証時の扱いは各ユースケースが決める。
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<SessionToken>);

impl MaybeSession {
    pub fn token(&self) -> Option<&SessionToken> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(SessionToken::new);

        Ok(Self(token))
    }
}

#[derive(Debug, Deserialize)]
struct LocaleQuery {
    locale: Option<String>,
}

/// リクエストのロケール（`?locale=` → `Accept-Language` の先頭）
#[derive(Debug, Clone, Default)]
pub struct RequestLocale(pub Option<String>);

impl RequestLocale {
    /// 本文の`locale`を優先し、なければ既定ロケール
    pub fn resolve(&self, body_locale: Option<&str>, translator: &Translator) -> String {
        body_locale
            .filter(|locale| !locale.trim().is_empty())
            .or(self.0.as_deref())
            .unwrap_or(translator.default_locale())
            .to_string()
    }
}

/// `sv-SE,sv;q=0.9,en;q=0.8` → `sv-SE`
fn first_accepted_language(header: &str) -> Option<String> {
    header
        .split(',')
        .filter_map(|entry| entry.split(';').next())
        .map(str::trim)
        .find(|tag| !tag.is_empty() && *tag != "*")
        .map(str::to_string)
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestLocale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_query = Query::<LocaleQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.locale)
            .filter(|locale| !locale.trim().is_empty());

        let locale = from_query.or_else(|| {
            parts
                .headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|value| value.to_str().ok())
                .and_then(first_accepted_language)
        });

        Ok(Self(locale))
    }
}
