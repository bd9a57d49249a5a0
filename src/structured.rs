use scraper::{ElementRef, Selector};

use crate::normalize::clean_text;
use crate::site::Locator;

/// Try each locator in order inside `scope`; the first that yields a
/// non-empty trimmed value wins. A locator with an attribute name reads
/// that attribute, otherwise the concatenated element text.
pub fn extract_scalar(scope: ElementRef, locators: &[Locator]) -> Option<String> {
    for locator in locators {
        let selector = match Selector::parse(locator.css) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!("skipping invalid selector {:?}: {:?}", locator.css, e);
                continue;
            }
        };

        for element in scope.select(&selector) {
            if let Some(value) = element_value(element, locator) {
                return Some(value);
            }
        }
    }
    None
}

/// List variant: the first locator that matches anything contributes all of
/// its non-empty matches; later locators are not consulted.
pub fn extract_list(scope: ElementRef, locators: &[Locator]) -> Vec<String> {
    for locator in locators {
        let selector = match Selector::parse(locator.css) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!("skipping invalid selector {:?}: {:?}", locator.css, e);
                continue;
            }
        };

        let items: Vec<String> = scope
            .select(&selector)
            .filter_map(|el| element_value(el, locator))
            .collect();
        if !items.is_empty() {
            return items;
        }
    }
    Vec::new()
}

/// First element matching any locator, for locating container roots.
pub fn find_element<'a>(scope: ElementRef<'a>, locators: &[Locator]) -> Option<ElementRef<'a>> {
    for locator in locators {
        let selector = match Selector::parse(locator.css) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!("skipping invalid selector {:?}: {:?}", locator.css, e);
                continue;
            }
        };
        if let Some(element) = scope.select(&selector).next() {
            return Some(element);
        }
    }
    None
}

fn element_value(element: ElementRef, locator: &Locator) -> Option<String> {
    let raw = match locator.attr {
        Some(name) => element.value().attr(name)?.to_string(),
        None => element.text().collect::<Vec<_>>().join(" "),
    };
    let cleaned = clean_text(&raw);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
