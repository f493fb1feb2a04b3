//! URL slug derivation.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static INVALID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\-_/]").unwrap());
static DASHES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Normalize a declared slug.
///
/// Trims surrounding whitespace and slashes, lowercases, turns whitespace
/// runs into `-`, strips characters outside `[a-z0-9-_/]` and collapses
/// repeated dashes. Returns `None` if nothing is left.
///
/// # Examples
///
/// ```
/// use folio_site::normalize_slug;
///
/// assert_eq!(normalize_slug("/Docs/Getting Started/").as_deref(), Some("docs/getting-started"));
/// assert_eq!(normalize_slug(" // "), None);
/// ```
pub fn normalize_slug(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('/').to_lowercase();
    let dashed = WHITESPACE_RE.replace_all(&trimmed, "-");
    let stripped = INVALID_RE.replace_all(&dashed, "");
    let collapsed = DASHES_RE.replace_all(&stripped, "-");
    let slug = collapsed.trim_matches('/');
    (!slug.is_empty()).then(|| slug.to_owned())
}

/// Derive a slug from a page title.
///
/// Same rules as [`normalize_slug`], except that `/` is removed and
/// leading or trailing dashes are trimmed.
///
/// # Examples
///
/// ```
/// use folio_site::slug_from_title;
///
/// assert_eq!(slug_from_title("About Us!").as_deref(), Some("about-us"));
/// assert_eq!(slug_from_title("R&D / Labs").as_deref(), Some("rd-labs"));
/// ```
pub fn slug_from_title(title: &str) -> Option<String> {
    let slug = normalize_slug(&title.replace('/', ""))?;
    let slug = slug.trim_matches('-');
    (!slug.is_empty()).then(|| slug.to_owned())
}

/// Slug for a page: the declared slug if it normalizes to something,
/// otherwise one derived from the title.
pub fn derive_slug(declared: Option<&str>, title: Option<&str>) -> Option<String> {
    declared
        .and_then(normalize_slug)
        .or_else(|| title.and_then(slug_from_title))
}
