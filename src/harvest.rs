use std::collections::{HashSet, VecDeque};
use std::thread;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::domain::{WONDER_BASE, WONDER_HOST};
use crate::mine;
use crate::probe::WonderClient;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::select;
use crate::years::YearExtractor;

/// Controls for one crawl pass over the static documentation pages.
#[derive(Debug, Clone)]
pub struct HarvestOptions {
    pub seeds: Vec<String>,
    pub max_pages: usize,
    pub delay: Duration,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            seeds: default_seeds(),
            max_pages: 120,
            delay: Duration::from_millis(250),
        }
    }
}

/// Entry pages that link out to most of the static dataset pages.
pub fn default_seeds() -> Vec<String> {
    vec![
        format!("{WONDER_BASE}/"),
        format!("{WONDER_BASE}/welcomet.html"), // topics
        format!("{WONDER_BASE}/welcomea.html"), // A-Z index
        format!("{WONDER_BASE}/about.html"),
        format!("{WONDER_BASE}/data.html"),
        format!("{WONDER_BASE}/mortSQL.html"),
    ]
}

/// One static-page link discovered during the crawl. The title and source
/// are those of the page the link was found on.
#[derive(Debug, Clone, Serialize)]
pub struct HarvestedLink {
    pub url: String,
    pub page_name: String,
    pub title: String,
    pub years: String,
    pub source_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarvestSummary {
    pub pages_visited: usize,
    pub links_recorded: usize,
    pub link_harvest_path: String,
}

/// Breadth-first crawl from the seed pages, recording every on-host static
/// page link once. The first page to mention a link owns its record.
pub fn crawl(
    client: &dyn WonderClient,
    options: &HarvestOptions,
    sink: &dyn ProgressSink,
) -> (Vec<HarvestedLink>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = options.seeds.iter().cloned().collect();
    let mut recorded: HashSet<String> = HashSet::new();
    let mut links = Vec::new();

    while seen.len() < options.max_pages {
        let Some(url) = queue.pop_front() else {
            break;
        };
        if seen.contains(&url) {
            continue;
        }
        if !is_wonder_host(&url) {
            continue;
        }

        sink.event(ProgressEvent::message(format!("Fetching page: {url}")));
        let response = client.fetch_page(&url).ok();
        seen.insert(url.clone());
        let Some(page) = response
            .filter(|page| page.status == 200 && page.content_type.contains("text/html"))
        else {
            continue;
        };

        let title = page_title(&page.body);
        for link in page_links(&page.body, &url) {
            if recorded.insert(link.clone()) {
                let mut years = YearExtractor::LINK_TEXT.extract(&link);
                if years.is_empty() {
                    years = YearExtractor::LINK_TEXT.extract(&title);
                }
                links.push(HarvestedLink {
                    url: link.clone(),
                    page_name: select::page_slug(&link),
                    title: title.clone(),
                    years,
                    source_url: url.clone(),
                });
            }
            if !seen.contains(&link) && seen.len() + queue.len() < options.max_pages {
                queue.push_back(link);
            }
        }

        thread::sleep(options.delay);
    }

    let visited = seen.len();
    (links, visited)
}

const TITLE_NOISE: [&str; 4] = [
    " on CDC WONDER",
    " - CDC WONDER",
    " Request",
    " Request Form",
];

/// Page title with the boilerplate WONDER suffixes removed. Falls back to
/// the first heading when the title element is empty or missing.
pub fn page_title(html: &str) -> String {
    let title_re = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
    if let Some(caps) = title_re.captures(html) {
        let text = strip_tags(&caps[1]);
        if !text.is_empty() {
            let mut title = text.trim().to_string();
            for noise in TITLE_NOISE {
                title = title.replace(noise, "");
            }
            return title.trim().to_string();
        }
    }

    let h1_re = Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap();
    match h1_re.captures(html) {
        Some(caps) => strip_tags(&caps[1]).trim().to_string(),
        None => String::new(),
    }
}

fn strip_tags(fragment: &str) -> String {
    Regex::new(r"<[^>]+>")
        .unwrap()
        .replace_all(fragment, "")
        .into_owned()
}

fn page_links(html: &str, current_url: &str) -> Vec<String> {
    mine::anchor_targets(html)
        .into_iter()
        .map(|href| mine::absolutize(current_url, &href))
        .filter(|url| select::is_canonical_page(url))
        .collect()
}

fn is_wonder_host(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .host_str()
                .map(|host| host.eq_ignore_ascii_case(WONDER_HOST))
        })
        .unwrap_or(false)
}
