use std::time::Duration;

use once_cell::sync::Lazy;
use ureq::ResponseExt;

use crate::error::Result;

/// Default HTTP request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Shared HTTP agent for connection pooling
static HTTP_AGENT: Lazy<ureq::Agent> = Lazy::new(|| {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
        .build()
        .into()
});

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// A fetched page: the final URL after redirects plus the raw HTML.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub html: String,
}

/// Fetch a page over plain HTTP. Job boards behind bot walls need a rendered
/// page saved to disk instead; this path covers the rest.
pub fn fetch_page(url: &str) -> Result<Page> {
    let response = HTTP_AGENT
        .get(url)
        .header("User-Agent", USER_AGENT)
        .header("Accept-Language", "en")
        .call()?;

    let final_url = response.get_uri().to_string();
    let html = response.into_body().read_to_string()?;

    tracing::debug!(url = %final_url, bytes = html.len(), "fetched page");

    Ok(Page {
        url: final_url,
        html,
    })
}
