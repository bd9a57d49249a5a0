use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

use crate::site::SiteProfile;
use crate::structured::{extract_list, extract_scalar};

/// Lightweight summary of one search-result card. Full records come from the
/// posting page itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCard {
    pub job_id: Option<String>,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub posted: Option<String>,
    pub snippet: Option<String>,
    pub job_url: Option<String>,
}

/// Pull all recognizable cards off a search-results page. Cards without a
/// title are dropped.
pub fn extract_cards(html: &str, site: &SiteProfile) -> Vec<JobCard> {
    let doc = Html::parse_document(html);
    let root_selector = match Selector::parse(site.card.root) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("invalid card root selector for {}: {:?}", site.name, e);
            return Vec::new();
        }
    };

    let mut cards = Vec::new();
    for root in doc.select(&root_selector) {
        let link = extract_scalar(root, site.card.link)
            .and_then(|href| absolutize(site.base_url, &href));

        let job_id = root
            .value()
            .attrs()
            .find(|(name, _)| Some(*name) == site.card.id_attr)
            .map(|(_, value)| value.to_string())
            .or_else(|| {
                link.as_deref()
                    .and_then(|url| site.extract_job_id(url, ""))
            });

        let card = JobCard {
            job_id,
            title: extract_scalar(root, site.card.title),
            company_name: extract_scalar(root, site.card.company),
            location: extract_scalar(root, site.card.location),
            salary: extract_scalar(root, site.card.salary),
            posted: extract_scalar(root, site.card.posted),
            snippet: extract_list(root, site.card.snippet).first().cloned(),
            job_url: link,
        };

        if card.title.is_some() {
            cards.push(card);
        }
    }

    tracing::debug!(site = site.name, count = cards.len(), "extracted cards");
    cards
}

fn absolutize(base: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    Url::parse(base).ok()?.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SIMPLYHIRED;

    const RESULTS_PAGE: &str = r#"<html><body>
      <div data-testid="searchSerpJob" data-jobkey="key-1">
        <h2 data-testid="searchSerpJobTitle"><a href="/job/key-1">Data Analyst</a></h2>
        <span data-testid="companyName">Acme Corp</span>
        <span data-testid="searchSerpJobLocation">Bengaluru</span>
        <p data-testid="searchSerpJobDateStamp">3 days ago</p>
        <p data-testid="searchSerpJobSnippet">Analyze things.</p>
      </div>
      <div data-testid="searchSerpJob">
        <h2 data-testid="searchSerpJobTitle"><a href="/job/key-2">BI Engineer</a></h2>
      </div>
      <div data-testid="searchSerpJob"><p>ad slot, no title</p></div>
    </body></html>"#;

    #[test]
    fn test_extracts_cards_with_titles_only() {
        let cards = extract_cards(RESULTS_PAGE, &SIMPLYHIRED);
        assert_eq!(cards.len(), 2);

        assert_eq!(cards[0].job_id.as_deref(), Some("key-1"));
        assert_eq!(cards[0].title.as_deref(), Some("Data Analyst"));
        assert_eq!(cards[0].company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(cards[0].snippet.as_deref(), Some("Analyze things."));
        assert_eq!(
            cards[0].job_url.as_deref(),
            Some("https://www.simplyhired.co.in/job/key-1")
        );
    }

    #[test]
    fn test_card_id_recovered_from_link() {
        let cards = extract_cards(RESULTS_PAGE, &SIMPLYHIRED);
        assert_eq!(cards[1].job_id.as_deref(), Some("key-2"));
    }

    #[test]
    fn test_no_cards_on_unrelated_page() {
        let cards = extract_cards("<html><body><p>hi</p></body></html>", &SIMPLYHIRED);
        assert!(cards.is_empty());
    }
}
