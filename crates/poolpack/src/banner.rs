//! License banner rendering.
//!
//! A [`BannerTemplate`] is read once from disk and rendered into a [`Banner`]
//! at the start of every pipeline run. The banner is immutable afterwards and
//! is handed to the tasks of that run explicitly, so a run that crosses
//! midnight still stamps every artifact with the same date.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::error::ConfigError;

/// Placeholder replaced with the build date.
pub const DATE_PLACEHOLDER: &str = "@@date";

/// Placeholder replaced with the package version.
pub const VERSION_PLACEHOLDER: &str = "@@version";

/// Source of "today" for banner rendering.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Banner template with date and version placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerTemplate {
    path: Option<PathBuf>,
    text: String,
    date_placeholder: String,
    version_placeholder: String,
}

impl BannerTemplate {
    /// Create a template from text using the default placeholders.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            path: None,
            text: text.into(),
            date_placeholder: DATE_PLACEHOLDER.to_string(),
            version_placeholder: VERSION_PLACEHOLDER.to_string(),
        }
    }

    /// Read a template from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TemplateUnreadable`] if the file cannot be read.
    /// The pipeline cannot run without a banner, so callers treat this as
    /// fatal.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::TemplateUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            ..Self::new(text)
        })
    }

    /// Replace the placeholder tokens.
    pub fn with_placeholders(
        mut self,
        date: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        self.date_placeholder = date.into();
        self.version_placeholder = version.into();
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Render the banner.
    ///
    /// The first occurrence of each placeholder is substituted. Everything
    /// else in the template, license markers included, is kept byte for byte.
    pub fn render(&self, version: &str, date: NaiveDate) -> Banner {
        let date = date.format("%Y-%m-%d").to_string();
        let text = self
            .text
            .replacen(&self.date_placeholder, &date, 1)
            .replacen(&self.version_placeholder, version, 1);

        Banner(Arc::from(text))
    }

    /// Render using `clock` for the date.
    pub fn render_now(&self, version: &str, clock: &dyn Clock) -> Banner {
        self.render(version, clock.today())
    }
}

/// Rendered banner, shared by every task of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner(Arc<str>);

impl Banner {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prepend the banner to `code`, separated by a newline.
    pub fn prepend_to(&self, code: &str) -> String {
        let mut out = String::with_capacity(self.0.len() + code.len() + 1);
        out.push_str(&self.0);
        if !self.0.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(code);
        out
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Banner {
    fn from(text: &str) -> Self {
        Banner(Arc::from(text))
    }
}
