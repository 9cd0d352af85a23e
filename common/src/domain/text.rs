use std::sync::LazyLock;

use nutype::nutype;
use regex::Regex;

const SLUG_SYMBOLS_REGEX: &str = r"^[a-z0-9]+(-[a-z0-9]+)*$";

static SLUG_SYMBOLS_REGEX_COMPILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(SLUG_SYMBOLS_REGEX).expect("SLUG_SYMBOLS_REGEX must be a valid regex")
});

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_SYMBOLS_REGEX_COMPILED.is_match(slug)
}

/// URL-safe identifier for a public content page.
#[nutype(
    sanitize(trim, lowercase),
    validate(not_empty, len_char_max = 120, predicate = is_valid_slug),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct Slug(String);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 300),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct Title(String);
