//! Media-type normalization and the storage type policy.
//!
//! Every content-type string that enters the system goes through
//! [`normalize`] before it is compared or stored, so `Text/Markdown;
//! charset=utf-8` and `text/x-markdown` both end up as `text/markdown`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical Markdown media type.
pub const TEXT_MARKDOWN: &str = "text/markdown";
/// Plain text.
pub const TEXT_PLAIN: &str = "text/plain";
/// HTML.
pub const TEXT_HTML: &str = "text/html";
/// JSON.
pub const APPLICATION_JSON: &str = "application/json";

const LEGACY_MARKDOWN: &str = "text/x-markdown";

/// Closed set accepted by [`TypePolicy::Strict`].
const STRICT_TYPES: [&str; 4] = [TEXT_PLAIN, TEXT_MARKDOWN, APPLICATION_JSON, TEXT_HTML];

/// Strip parameters, trim and lowercase a content type.
///
/// The legacy `text/x-markdown` alias maps to [`TEXT_MARKDOWN`]. Empty input
/// yields an empty string.
#[must_use]
pub fn normalize(content_type: &str) -> String {
    let base = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if base == LEGACY_MARKDOWN {
        TEXT_MARKDOWN.to_owned()
    } else {
        base
    }
}

/// Compare two content types by media type only, ignoring parameters.
#[must_use]
pub fn same_media_type(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Check a content type against the default [`TypePolicy`].
#[must_use]
pub fn is_supported(content_type: &str) -> bool {
    TypePolicy::default().is_supported(content_type)
}

/// Which media types may be stored as fragments.
///
/// The policy is picked once at configuration time; it decides which
/// fragments can ever be constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypePolicy {
    /// Any `text/*` subtype plus `application/json`.
    #[default]
    Permissive,
    /// Exactly `text/plain`, `text/markdown`, `text/html` and `application/json`.
    Strict,
}

impl TypePolicy {
    /// Return `true` if the normalized form of `content_type` is accepted.
    #[must_use]
    pub fn is_supported(self, content_type: &str) -> bool {
        let media_type = normalize(content_type);
        if media_type.is_empty() {
            return false;
        }

        match self {
            Self::Permissive => {
                media_type
                    .strip_prefix("text/")
                    .is_some_and(|subtype| !subtype.is_empty())
                    || media_type == APPLICATION_JSON
            }
            Self::Strict => STRICT_TYPES.contains(&media_type.as_str()),
        }
    }

    /// Return a string representation of the policy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Permissive => "permissive",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for TypePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `Content-Type` value that keeps its `charset` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Normalized media type.
    pub media_type: String,
    /// The `charset` parameter, if one was given.
    pub charset: Option<String>,
}

impl ContentType {
    /// Parse a content-type header value.
    ///
    /// Parameter names are matched case-insensitively; only `charset` is kept.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let charset = value
            .split(';')
            .skip(1)
            .filter_map(|param| param.split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, v)| v.trim().trim_matches('"').to_owned())
            .filter(|v| !v.is_empty());

        Self {
            media_type: normalize(value),
            charset,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.charset {
            Some(charset) => write!(f, "{}; charset={charset}", self.media_type),
            None => f.write_str(&self.media_type),
        }
    }
}
