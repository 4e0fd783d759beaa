use std::cmp::Reverse;

use url::Url;

use crate::domain::WONDER_HOST;

/// Pages that redirect chains and nav links frequently land on but that never
/// identify a dataset.
const IGNORED_PAGES: [&str; 2] = ["faq.html", "main.html"];

/// Vocabulary of dataset-family markers used to score candidates.
const FAMILY_KEYWORDS: [&str; 9] = [
    "sql", "icd10", "natality", "mort", "bridged", "birth", "ucd", "cmf", "mcd",
];

/// True for absolute URLs on the service host whose path ends in `.html`.
/// Idempotent as a filter: applying it twice equals applying it once.
pub fn is_canonical_page(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let host_matches = parsed
        .host_str()
        .is_some_and(|host| host.eq_ignore_ascii_case(WONDER_HOST));
    host_matches && parsed.path().to_lowercase().ends_with(".html")
}

/// Trailing path segment of a URL, e.g. `ucd-icd10.html`.
pub fn page_slug(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    parsed
        .path()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Pick the most plausible dataset page from `candidates`: drop block-listed
/// pages, then prefer the candidate whose path hits the most family keywords,
/// breaking ties by shorter path and then lexicographic URL order. If the
/// block list empties a non-empty set, the fallback wins as-is.
pub fn select_canonical(mut candidates: Vec<String>, fallback: Option<String>) -> Option<String> {
    if candidates.is_empty() {
        return fallback;
    }

    candidates.retain(|url| {
        let lower = url.to_lowercase();
        !IGNORED_PAGES.iter().any(|blocked| lower.contains(blocked))
    });
    if candidates.is_empty() {
        return fallback;
    }

    candidates.into_iter().min_by_key(|url| {
        let path = Url::parse(url)
            .map(|parsed| parsed.path().to_string())
            .unwrap_or_default();
        let lower = path.to_lowercase();
        let hits = FAMILY_KEYWORDS
            .iter()
            .filter(|&&keyword| lower.contains(keyword))
            .count();
        (Reverse(hits), path.len(), url.clone())
    })
}
