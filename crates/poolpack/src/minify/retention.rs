//! Comment retention rules.

use regex::Regex;

use crate::error::ConfigError;

/// Decides whether a single source comment survives minification.
///
/// A comment is retained when it matches the license marker, unless it also
/// contains every template marker. The second clause drops the unrendered
/// license template that ships inside the worker source: it still carries
/// the literal date and version placeholders next to the output file name,
/// while the rendered banner carries none of the placeholders.
#[derive(Debug, Clone)]
pub struct RetentionPredicate {
    license: Regex,
    template_markers: Vec<String>,
}

impl RetentionPredicate {
    /// Build a predicate.
    ///
    /// `template_markers` are matched literally. An empty list disables the
    /// template exclusion.
    pub fn new<I, S>(license_marker: &str, template_markers: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let license = Regex::new(license_marker).map_err(|e| ConfigError::InvalidPattern {
            pattern: license_marker.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            license,
            template_markers: template_markers
                .into_iter()
                .map(Into::into)
                .filter(|m: &String| !m.is_empty())
                .collect(),
        })
    }

    pub fn retains(&self, comment: &str) -> bool {
        self.license.is_match(comment) && !self.is_unrendered_template(comment)
    }

    fn is_unrendered_template(&self, comment: &str) -> bool {
        !self.template_markers.is_empty()
            && self
                .template_markers
                .iter()
                .all(|marker| comment.contains(marker.as_str()))
    }
}

/// Comment handling for one minification.
#[derive(Debug, Clone, Default)]
pub enum CommentPolicy {
    /// Strip every comment.
    #[default]
    DropAll,
    /// Keep the comments the predicate retains.
    Retain(RetentionPredicate),
}

impl CommentPolicy {
    pub fn keeps(&self, comment: &str) -> bool {
        match self {
            CommentPolicy::DropAll => false,
            CommentPolicy::Retain(predicate) => predicate.retains(comment),
        }
    }
}
