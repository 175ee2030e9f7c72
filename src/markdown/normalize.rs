//! Image URL normalization
//!
//! Agents frequently emit protocol-relative (`//host/x.png`) or bare
//! (`host/x.png`) image URLs which browsers resolve against the page
//! origin. Every `![alt](url)` reference is rewritten to absolute HTTPS.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap());

/// Rewrite scheme-less image URLs in `markdown` to absolute HTTPS URLs.
///
/// URLs starting with `http://` or `https://` are left byte-for-byte
/// untouched, `//host/..` gets an `https:` prefix and anything else gets
/// `https://`. Alt text and non-image content are never modified, and the
/// function is idempotent.
#[must_use]
pub fn normalize_image_urls(markdown: &str) -> Cow<'_, str> {
    IMAGE.replace_all(markdown, |caps: &Captures| {
        let url = caps[2].trim();
        if has_scheme(url) {
            return caps[0].to_string();
        }

        let absolute = match url.strip_prefix("//") {
            Some(rest) => format!("https://{rest}"),
            None => format!("https://{url}"),
        };
        format!("![{}]({absolute})", &caps[1])
    })
}

fn has_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
