use std::collections::HashSet;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, LOCATION, USER_AGENT};
use reqwest::redirect::Policy;

use crate::domain::{DatasetId, DatasetProbe, DiscoveryKind};
use crate::error::WonderError;
use crate::mine;
use crate::select;
use crate::years::YearExtractor;

/// The controller dispatches through interstitial pages and login-wall
/// detours, so the service is probed with a browser-like identity.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_REDIRECT_HOPS: usize = 10;

/// One followed redirect: the URL that was fetched and the raw Location
/// header it answered with.
#[derive(Debug, Clone)]
pub struct RedirectHop {
    pub url: String,
    pub location: String,
}

/// Terminal response of a page fetch, with the redirect chain that led to it.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub final_url: String,
    pub status: u16,
    pub hops: Vec<RedirectHop>,
    pub location: Option<String>,
    pub content_type: String,
    pub body: String,
}

pub trait WonderClient: Send + Sync {
    fn fetch_page(&self, url: &str) -> Result<PageResponse, WonderError>;
}

#[derive(Clone)]
pub struct WonderHttpClient {
    client: Client,
}

impl WonderHttpClient {
    /// Builds a client that does NOT follow redirects on its own; every hop's
    /// Location header is a discovery signal, so the chain is walked manually.
    pub fn new() -> Result<Self, WonderError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .redirect(Policy::none())
            .build()
            .map_err(|err| WonderError::WonderHttp(err.to_string()))?;
        Ok(Self { client })
    }
}

impl WonderClient for WonderHttpClient {
    fn fetch_page(&self, url: &str) -> Result<PageResponse, WonderError> {
        let mut hops = Vec::new();
        let mut current = url.to_string();
        for _ in 0..=MAX_REDIRECT_HOPS {
            let response = self
                .client
                .get(&current)
                .send()
                .map_err(|err| WonderError::WonderHttp(err.to_string()))?;
            let status = response.status().as_u16();
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);

            if response.status().is_redirection() {
                if let Some(next) = location.as_deref() {
                    hops.push(RedirectHop {
                        url: current.clone(),
                        location: next.to_string(),
                    });
                    current = mine::absolutize(&current, next);
                    continue;
                }
            }

            let final_url = response.url().to_string();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let body = response
                .text()
                .map_err(|err| WonderError::WonderHttp(err.to_string()))?;
            return Ok(PageResponse {
                final_url,
                status,
                hops,
                location,
                content_type,
                body,
            });
        }
        Err(WonderError::TooManyRedirects(url.to_string()))
    }
}

/// Probe one dataset identifier: fetch its controller URL, gather candidate
/// page URLs from every redirect signal, and pick the canonical page. Always
/// yields a row; transport failures become `error` rows, never aborts.
pub fn probe_dataset(client: &dyn WonderClient, id: &DatasetId) -> DatasetProbe {
    let controller_url = id.controller_url();
    let page = match client.fetch_page(&controller_url) {
        Ok(page) => page,
        Err(err) => {
            return DatasetProbe {
                id: id.to_string(),
                controller_url,
                http_status: "error".to_string(),
                discovery: DiscoveryKind::Error,
                final_url: String::new(),
                page_name: String::new(),
                years: String::new(),
                error: err.to_string(),
            };
        }
    };

    let mut candidates = Vec::new();
    for hop in &page.hops {
        candidates.push(mine::absolutize(&hop.url, &hop.location));
    }
    if let Some(location) = page.location.as_deref() {
        candidates.push(mine::absolutize(&page.final_url, location));
    }
    if select::is_canonical_page(&page.final_url) {
        candidates.push(page.final_url.clone());
    }
    // Even a 500 can carry an HTML body that names the real page.
    if page.content_type.contains("text/html") && !page.body.is_empty() {
        candidates.extend(mine::redirect_candidates(&page.body, &page.final_url));
    }

    candidates.retain(|candidate| select::is_canonical_page(candidate));
    let mut seen = HashSet::new();
    candidates.retain(|candidate| seen.insert(candidate.clone()));

    let fallback = select::is_canonical_page(&page.final_url).then(|| page.final_url.clone());
    match select::select_canonical(candidates, fallback) {
        Some(chosen) => {
            let discovery = if chosen.trim_end_matches('/') == controller_url.trim_end_matches('/')
            {
                DiscoveryKind::Direct
            } else {
                DiscoveryKind::Redirect
            };
            let page_name = select::page_slug(&chosen);
            let years = YearExtractor::PAGE_NAME.extract(&page_name);
            DatasetProbe {
                id: id.to_string(),
                controller_url,
                http_status: page.status.to_string(),
                discovery,
                final_url: chosen,
                page_name,
                years,
                error: String::new(),
            }
        }
        None => DatasetProbe {
            id: id.to_string(),
            controller_url,
            http_status: page.status.to_string(),
            discovery: if page.status == 200 {
                DiscoveryKind::Direct
            } else {
                DiscoveryKind::Http(page.status)
            },
            final_url: String::new(),
            page_name: String::new(),
            years: String::new(),
            error: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubWonder {
        response: Result<PageResponse, WonderError>,
    }

    impl WonderClient for StubWonder {
        fn fetch_page(&self, _url: &str) -> Result<PageResponse, WonderError> {
            match &self.response {
                Ok(page) => Ok(page.clone()),
                Err(err) => Err(WonderError::WonderHttp(err.to_string())),
            }
        }
    }

    fn page(final_url: &str, status: u16) -> PageResponse {
        PageResponse {
            final_url: final_url.to_string(),
            status,
            hops: Vec::new(),
            location: None,
            content_type: "text/html;charset=utf-8".to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn redirect_hop_resolves_to_page() {
        let id = DatasetId::from_ordinal(76);
        let stub = StubWonder {
            response: Ok(PageResponse {
                hops: vec![RedirectHop {
                    url: id.controller_url(),
                    location: "/ucd-icd10.html".to_string(),
                }],
                ..page("https://wonder.cdc.gov/ucd-icd10.html", 200)
            }),
        };
        let row = probe_dataset(&stub, &id);
        assert_eq!(row.discovery, DiscoveryKind::Redirect);
        assert_eq!(row.final_url, "https://wonder.cdc.gov/ucd-icd10.html");
        assert_eq!(row.page_name, "ucd-icd10.html");
        assert_eq!(row.http_status, "200");
        assert!(row.error.is_empty());
    }

    #[test]
    fn body_mined_candidate_wins_over_nothing() {
        let id = DatasetId::from_ordinal(8);
        let stub = StubWonder {
            response: Ok(PageResponse {
                body: r#"<meta http-equiv="refresh" content="0;url=/natality-2007-2023.html">"#
                    .to_string(),
                ..page(&id.controller_url(), 200)
            }),
        };
        let row = probe_dataset(&stub, &id);
        assert_eq!(row.discovery, DiscoveryKind::Redirect);
        assert_eq!(
            row.final_url,
            "https://wonder.cdc.gov/natality-2007-2023.html"
        );
        assert_eq!(row.years, "2007-2023");
    }

    #[test]
    fn plain_ok_without_candidates_is_direct() {
        let id = DatasetId::from_ordinal(3);
        let stub = StubWonder {
            response: Ok(page(&id.controller_url(), 200)),
        };
        let row = probe_dataset(&stub, &id);
        assert_eq!(row.discovery, DiscoveryKind::Direct);
        assert!(row.final_url.is_empty());
        assert!(row.page_name.is_empty());
    }

    #[test]
    fn failure_status_without_candidates_is_http_kind() {
        let id = DatasetId::from_ordinal(4);
        let stub = StubWonder {
            response: Ok(page(&id.controller_url(), 500)),
        };
        let row = probe_dataset(&stub, &id);
        assert_eq!(row.discovery, DiscoveryKind::Http(500));
        assert_eq!(row.http_status, "500");
    }

    #[test]
    fn transport_failure_becomes_error_row() {
        let id = DatasetId::from_ordinal(5);
        let stub = StubWonder {
            response: Err(WonderError::WonderHttp("connection reset".to_string())),
        };
        let row = probe_dataset(&stub, &id);
        assert_eq!(row.discovery, DiscoveryKind::Error);
        assert_eq!(row.http_status, "error");
        assert!(row.error.contains("connection reset"));
    }

    #[test]
    fn server_side_rewrite_to_canonical_page_is_redirect() {
        // No Location header anywhere, but the terminal URL is already a
        // static page. The fallback path should still record it.
        let id = DatasetId::from_ordinal(9);
        let landing = "https://wonder.cdc.gov/direct-landing.html";
        let stub = StubWonder {
            response: Ok(page(landing, 200)),
        };
        let row = probe_dataset(&stub, &id);
        assert_eq!(row.discovery, DiscoveryKind::Redirect);
        assert_eq!(row.final_url, landing);
    }

    #[test]
    fn non_html_body_is_not_mined() {
        let id = DatasetId::from_ordinal(6);
        let stub = StubWonder {
            response: Ok(PageResponse {
                content_type: "application/json".to_string(),
                body: r#"<a href="/mort.html">x</a>"#.to_string(),
                ..page(&id.controller_url(), 200)
            }),
        };
        let row = probe_dataset(&stub, &id);
        assert_eq!(row.discovery, DiscoveryKind::Direct);
        assert!(row.final_url.is_empty());
    }
}
