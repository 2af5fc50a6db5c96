//! Mapping from URLs to mirrored file paths
//!
//! A [`ResourcePath`] is derived from a URL's authority, directory and
//! filename. It is both the dedup key and the location of the mirrored file
//! relative to the output directory.

use crate::url::domain::extract_authority;
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Filename used when a URL path ends in a directory separator
pub const INDEX_FILE: &str = "index.html";

const HTML_SUFFIX: &str = ".html";

/// Relative path of a mirrored resource, `<authority>/<dir>/<file>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Derives the resource path for a URL
    ///
    /// Query strings and fragments do not take part in the mapping. Empty,
    /// `.` and `..` segments are dropped so the result never escapes the
    /// authority directory.
    ///
    /// Returns `None` for URLs without a host.
    pub fn from_url(url: &Url) -> Option<Self> {
        let authority = extract_authority(url)?;
        let path = url.path();

        let (dir, file) = match path.rfind('/') {
            Some(idx) => (&path[..idx], &path[idx + 1..]),
            None => ("", path),
        };

        let file = match file {
            "" | "." | ".." => INDEX_FILE,
            name => name,
        };

        let mut parts = vec![authority.as_str()];
        parts.extend(
            dir.split('/')
                .filter(|segment| !matches!(*segment, "" | "." | "..")),
        );
        parts.push(file);

        Some(Self(parts.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts to a relative filesystem path
    pub fn to_path_buf(&self) -> PathBuf {
        self.0.split('/').collect()
    }

    /// Returns true if the filename already carries an HTML-like suffix
    pub fn has_html_suffix(&self) -> bool {
        let lower = self.0.to_ascii_lowercase();
        lower.ends_with(".html") || lower.ends_with(".htm")
    }

    /// Returns this path with `.html` appended to the filename
    pub fn with_html_suffix(&self) -> Self {
        Self(format!("{}{}", self.0, HTML_SUFFIX))
    }

    /// Returns the path normalized for HTML content
    pub fn for_html(&self) -> Self {
        if self.has_html_suffix() {
            self.clone()
        } else {
            self.with_html_suffix()
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
