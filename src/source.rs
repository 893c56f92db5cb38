//! Where translation files come from.
//!
//! A source turns a language code into the raw text of that language's
//! translation file, located at `<base><code>.json`. Interpreting the text is
//! the loader's job.

use crate::error::LoadError;
use crate::i18n::LanguageCode;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Fetches the raw translation file for a language.
pub trait TranslationSource: Send + Sync {
    fn fetch(&self, code: &LanguageCode)
        -> impl Future<Output = Result<String, LoadError>> + Send;
}

/// Location of a code's file under a base path or URL prefix.
pub fn file_name_for(base: &str, code: &LanguageCode) -> String {
    format!("{}{}.json", base, code)
}

/// Fetches translation files over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn url_for(&self, code: &LanguageCode) -> String {
        file_name_for(&self.base_url, code)
    }
}

impl TranslationSource for HttpSource {
    async fn fetch(&self, code: &LanguageCode) -> Result<String, LoadError> {
        let url = self.url_for(code);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoadError::Transport {
                code: code.to_string(),
                message: format!("GET {}: {}", url, e),
            })?;

        // Anything below the client/server error range counts as success
        let status = response.status().as_u16();
        if status >= 400 {
            return Err(LoadError::NotFound {
                code: code.to_string(),
                status,
            });
        }

        response.text().await.map_err(|e| LoadError::Transport {
            code: code.to_string(),
            message: format!("reading body of {}: {}", url, e),
        })
    }
}

/// Reads translation files from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    base_path: String,
}

impl FileSource {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn path_for(&self, code: &LanguageCode) -> PathBuf {
        PathBuf::from(file_name_for(&self.base_path, code))
    }
}

impl TranslationSource for FileSource {
    async fn fetch(&self, code: &LanguageCode) -> Result<String, LoadError> {
        let path = self.path_for(code);

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => LoadError::NotFound {
                    code: code.to_string(),
                    status: 404,
                },
                ErrorKind::InvalidData => LoadError::Parse {
                    code: code.to_string(),
                    message: format!("{} is not valid UTF-8", path.display()),
                },
                _ => LoadError::Transport {
                    code: code.to_string(),
                    message: format!("{}: {}", path.display(), e),
                },
            })
    }
}

/// Serves translation files held in memory. Used where the payloads are
/// already at hand, such as tests of the session and host layers.
#[derive(Debug, Default)]
pub struct MemorySource {
    payloads: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the file contents served for `code`.
    pub fn with_payload(mut self, code: &str, payload: impl Into<String>) -> Self {
        self.payloads.insert(code.to_string(), payload.into());
        self
    }

    /// Number of fetches served so far, successful or not.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl TranslationSource for MemorySource {
    async fn fetch(&self, code: &LanguageCode) -> Result<String, LoadError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        // Behave like real I/O: let other loads run before completing
        tokio::task::yield_now().await;

        self.payloads
            .get(code.as_str())
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                code: code.to_string(),
                status: 404,
            })
    }
}

/// A source chosen at runtime from the configured base path.
#[derive(Debug, Clone)]
pub enum AnySource {
    Http(HttpSource),
    File(FileSource),
}

impl TranslationSource for AnySource {
    async fn fetch(&self, code: &LanguageCode) -> Result<String, LoadError> {
        match self {
            AnySource::Http(source) => source.fetch(code).await,
            AnySource::File(source) => source.fetch(code).await,
        }
    }
}

/// HTTP for `http://` and `https://` base paths, the filesystem otherwise.
pub fn source_for_path(base: &str, timeout: Duration) -> Result<AnySource> {
    if base.starts_with("http://") || base.starts_with("https://") {
        Ok(AnySource::Http(HttpSource::new(base, timeout)?))
    } else {
        Ok(AnySource::File(FileSource::new(base)))
    }
}
