use regex::Regex;
use url::Url;

/// Targets of `<meta http-equiv="refresh" content="0;url=...">` tags.
/// Attribute order within the tag does not matter.
pub fn meta_refresh_targets(body: &str) -> Vec<String> {
    let tag = Regex::new(r"(?i)<meta[^>]*>").unwrap();
    let refresh = Regex::new(r#"(?i)http-equiv\s*=\s*["']?refresh"#).unwrap();
    let content = Regex::new(r#"(?i)content\s*=\s*(?:"([^"]+)"|'([^']+)')"#).unwrap();
    let target = Regex::new(r"(?i)url\s*=\s*([^;]+)").unwrap();

    let mut targets = Vec::new();
    for tag_match in tag.find_iter(body) {
        let tag_text = tag_match.as_str();
        if !refresh.is_match(tag_text) {
            continue;
        }
        let Some(value) = content
            .captures(tag_text)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        else {
            continue;
        };
        let Some(target_caps) = target.captures(value.as_str()) else {
            continue;
        };
        let raw = target_caps[1].trim().trim_matches(['"', '\'']).to_string();
        if !raw.is_empty() {
            targets.push(raw);
        }
    }
    targets
}

/// Targets of inline-script navigation: `window.location = "..."`,
/// `document.location = "..."`, `location.href = "..."` and
/// `location.replace("...")`.
pub fn script_nav_targets(body: &str) -> Vec<String> {
    let assignments = [
        r#"(?i)window\.location\s*=\s*(?:'([^']+)'|"([^"]+)")"#,
        r#"(?i)document\.location\s*=\s*(?:'([^']+)'|"([^"]+)")"#,
        r#"(?i)location\.href\s*=\s*(?:'([^']+)'|"([^"]+)")"#,
        r#"(?i)location\.replace\(\s*(?:'([^']+)'|"([^"]+)")\s*\)"#,
    ];

    let mut targets = Vec::new();
    for pattern in assignments {
        let re = Regex::new(pattern).unwrap();
        for caps in re.captures_iter(body) {
            if let Some(m) = caps.get(1).or_else(|| caps.get(2)) {
                let raw = m.as_str().trim();
                if !raw.is_empty() {
                    targets.push(raw.to_string());
                }
            }
        }
    }
    targets
}

/// Href values of anchor tags, skipping script pseudo-links and
/// fragment-only links.
pub fn anchor_targets(body: &str) -> Vec<String> {
    let link_re = Regex::new(r#"(?i)<a\s[^>]*href\s*=\s*["']([^"']+)["']"#).unwrap();

    let mut targets = Vec::new();
    for caps in link_re.captures_iter(body) {
        let href = caps[1].trim();
        if href.is_empty()
            || href.to_lowercase().starts_with("javascript:")
            || href.starts_with('#')
        {
            continue;
        }
        targets.push(href.to_string());
    }
    targets
}

/// All redirect-target candidates mined from an HTML body, absolutized
/// against the page URL. Meta refresh first, then script navigation, then
/// anchors; order is preserved for first-seen dedup downstream.
pub fn redirect_candidates(body: &str, base_url: &str) -> Vec<String> {
    let mut raw = meta_refresh_targets(body);
    raw.extend(script_nav_targets(body));
    raw.extend(anchor_targets(body));
    raw.iter()
        .map(|candidate| absolutize(base_url, candidate))
        .collect()
}

/// Resolve a potentially relative URL against a base URL.
pub fn absolutize(base_url: &str, candidate: &str) -> String {
    if candidate.is_empty() {
        return base_url.to_string();
    }
    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        return candidate.to_string();
    }
    if let Ok(base) = Url::parse(base_url) {
        if let Ok(resolved) = base.join(candidate) {
            return resolved.to_string();
        }
    }
    candidate.to_string()
}
