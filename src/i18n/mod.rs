//! メッセージの多言語化
//!
//! 組み込みの英語カタログに、ロケールごとのJSONファイル
//! （`<dir>/<locale>.json`、フラットな key → 文字列）を重ねる。
//! 検索順：要求ロケール → 言語部分（`sv-SE` → `sv`）→ 既定ロケール → 英語

mod messages;

pub use messages::{FormKind, MessageKey};

use crate::domain::forms::FieldErrors;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

/// ロケールファイル読み込みのエラー
#[derive(Debug, Error)]
pub enum I18nError {
    #[error("Failed to read locale file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid locale file {path}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 翻訳器
#[derive(Debug, Clone)]
pub struct Translator {
    default_locale: String,
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl Translator {
    /// 英語カタログのみで作成
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: normalize(&default_locale.into()),
            catalogs: HashMap::new(),
        }
    }

    /// ロケールのカタログを追加する（既存のキーは上書き）
    pub fn with_catalog(
        mut self,
        locale: impl Into<String>,
        entries: HashMap<String, String>,
    ) -> Self {
        self.catalogs
            .entry(normalize(&locale.into()))
            .or_default()
            .extend(entries);
        self
    }

    /// ディレクトリ内の `*.json` を読み込む
    pub fn load_dir(default_locale: impl Into<String>, dir: &Path) -> Result<Self, I18nError> {
        let mut translator = Self::new(default_locale);
        let io_error = |source| I18nError::Io {
            path: dir.display().to_string(),
            source,
        };

        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let raw = std::fs::read_to_string(&path).map_err(|source| I18nError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let entries: HashMap<String, String> =
                serde_json::from_str(&raw).map_err(|source| I18nError::Json {
                    path: path.display().to_string(),
                    source,
                })?;

            tracing::debug!(locale, keys = entries.len(), "Loaded locale catalog");
            translator = translator.with_catalog(locale.to_string(), entries);
        }

        Ok(translator)
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// 翻訳する
    pub fn translate(&self, locale: &str, key: MessageKey) -> String {
        let locale = normalize(locale);
        let language = locale.split('-').next().unwrap_or(locale.as_str());

        [locale.as_str(), language, self.default_locale.as_str()]
            .into_iter()
            .find_map(|candidate| {
                self.catalogs
                    .get(candidate)
                    .and_then(|catalog| catalog.get(key.as_str()))
            })
            .cloned()
            .unwrap_or_else(|| key.english().to_string())
    }

    /// フィールドごとの検証エラーをメッセージに変換する
    pub fn field_errors(
        &self,
        locale: &str,
        form: FormKind,
        errors: &FieldErrors,
    ) -> BTreeMap<String, Vec<String>> {
        errors
            .iter()
            .map(|(field, issues)| {
                let messages = issues
                    .iter()
                    .map(|issue| self.translate(locale, form.issue_key(field, *issue)))
                    .collect();
                (field.as_str().to_string(), messages)
            })
            .collect()
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new("en")
    }
}

/// `en_US` / `EN-us` → `en-us`
fn normalize(locale: &str) -> String {
    locale.trim().replace('_', "-").to_lowercase()
}
