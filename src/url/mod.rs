//! URL handling module for Ripple-Mirror
//!
//! This module decides which discovered links are followed. The scope of a
//! crawl is fixed from the seed URL: a link is in scope when it points at the
//! seed's authority and its path starts with the seed's path.

mod domain;
mod path;

use crate::{UrlError, UrlResult};
use url::{ParseError, Url};

// Re-export main functions
pub use domain::extract_authority;
pub use path::{ResourcePath, INDEX_FILE};

/// Outcome of resolving a discovered link against the crawl scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDecision {
    /// The link is absolute (or was made absolute) and inside the scope
    InScope(Url),
    /// The link points at another host or outside the seed path
    OutOfScope,
    /// A relative form that is not followed (fragment, query, `mailto:`, ...)
    Unsupported,
}

/// Scheme, authority and path prefix fixed from the seed URL
///
/// Immutable for the crawl's lifetime and shared read-only by every task.
#[derive(Debug, Clone)]
pub struct ScopeContext {
    seed: Url,
    authority: String,
    base_path: String,
}

impl ScopeContext {
    /// Builds the scope from a seed URL
    ///
    /// The seed must be a non-empty absolute `http` or `https` URL with a host.
    ///
    /// # Examples
    ///
    /// ```
    /// use ripple_mirror::url::ScopeContext;
    ///
    /// let scope = ScopeContext::from_seed("http://example.com/docs/").unwrap();
    /// assert_eq!(scope.authority(), "example.com");
    /// assert_eq!(scope.base_path(), "/docs/");
    ///
    /// assert!(ScopeContext::from_seed("not a url").is_err());
    /// ```
    pub fn from_seed(seed: &str) -> UrlResult<Self> {
        let seed = seed.trim();
        if seed.is_empty() {
            return Err(UrlError::Empty);
        }

        let url = match Url::parse(seed) {
            Ok(url) => url,
            Err(ParseError::RelativeUrlWithoutBase) => {
                return Err(UrlError::NotAbsolute(seed.to_string()))
            }
            Err(source) => {
                return Err(UrlError::Parse {
                    url: seed.to_string(),
                    source,
                })
            }
        };

        if !is_http(&url) {
            return Err(UrlError::InvalidScheme(seed.to_string()));
        }

        let authority =
            extract_authority(&url).ok_or_else(|| UrlError::MissingHost(seed.to_string()))?;
        let base_path = url.path().to_string();

        Ok(Self {
            seed: url,
            authority,
            base_path,
        })
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    pub fn scheme(&self) -> &str {
        self.seed.scheme()
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Resolves a discovered link against the scope
    ///
    /// Absolute links are kept as they are. Relative links are only followed
    /// when they start with `/`, in which case the seed's scheme and
    /// authority are filled in; every other relative form is unsupported.
    ///
    /// An empty link is a same-document reference and is unsupported. Links
    /// that cannot be parsed at all are an error.
    pub fn resolve(&self, link: &str) -> UrlResult<LinkDecision> {
        let link = link.trim();
        if link.is_empty() {
            return Ok(LinkDecision::Unsupported);
        }

        let url = match Url::parse(link) {
            Ok(url) => url,
            Err(ParseError::RelativeUrlWithoutBase) => {
                if !link.starts_with('/') {
                    return Ok(LinkDecision::Unsupported);
                }
                self.seed.join(link).map_err(|source| UrlError::Parse {
                    url: link.to_string(),
                    source,
                })?
            }
            Err(source) => {
                return Err(UrlError::Parse {
                    url: link.to_string(),
                    source,
                })
            }
        };

        Ok(self.classify(url))
    }

    /// Applies the in-scope test to an absolute URL
    fn classify(&self, url: Url) -> LinkDecision {
        if !is_http(&url) {
            return LinkDecision::Unsupported;
        }

        let same_authority = extract_authority(&url).as_deref() == Some(self.authority.as_str());
        if same_authority && url.path().starts_with(&self.base_path) {
            LinkDecision::InScope(url)
        } else {
            LinkDecision::OutOfScope
        }
    }
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
