use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node, Selector};

use crate::normalize::clean_text;
use crate::record::SectionValue;

/// Items at or under this length keep a committed section as a list;
/// anything longer collapses the section to a single joined string.
const SHORT_ITEM_MAX: usize = 200;

/// Known header texts (normalized: lowercased, trailing colon stripped)
/// mapped to canonical section keys. Unmapped headers pass through under
/// their normalized text.
pub static SECTION_MAP: &[(&str, &str)] = &[
    ("key responsibilities", "responsibilities"),
    ("responsibilities", "responsibilities"),
    ("roles and responsibilities", "responsibilities"),
    ("your responsibilities", "responsibilities"),
    ("what you will do", "responsibilities"),
    ("what you'll do", "responsibilities"),
    ("duties", "responsibilities"),
    ("requirements", "requirements"),
    ("what we're looking for", "requirements"),
    ("what we are looking for", "requirements"),
    ("qualifications", "requirements"),
    ("who you are", "requirements"),
    ("most relevant skills", "mostRelevantSkills"),
    ("required skills", "mostRelevantSkills"),
    ("skills required", "mostRelevantSkills"),
    ("skills", "mostRelevantSkills"),
    ("other relevant skills", "otherRelevantSkills"),
    ("preferred skills", "otherRelevantSkills"),
    ("nice to have", "otherRelevantSkills"),
    ("pay", "pay"),
    ("salary", "pay"),
    ("stipend", "pay"),
    ("compensation", "pay"),
    ("job type", "jobType"),
    ("job types", "jobType"),
    ("employment type", "jobType"),
    ("work location", "workLocation"),
    ("location", "workLocation"),
    ("benefits", "benefits"),
    ("perks and benefits", "benefits"),
    ("schedule", "schedule"),
    ("shift", "schedule"),
    ("shift and schedule", "schedule"),
    ("education", "education"),
];

static LI_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li").expect("Invalid li selector"));

/// `Label: value` on a single line, label being plain words
static LABEL_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\w\s'’]+):\s*(.+)$").expect("Invalid label-value regex")
});

/// Lowercase, trim, and strip a trailing colon from a raw header text.
pub fn normalize_header(raw: &str) -> String {
    clean_text(raw)
        .to_lowercase()
        .trim_end_matches(':')
        .trim()
        .to_string()
}

/// Map a raw header to its canonical section key.
pub fn canonical_key(raw: &str) -> String {
    let normalized = normalize_header(raw);
    SECTION_MAP
        .iter()
        .find(|(header, _)| *header == normalized)
        .map(|(_, key)| key.to_string())
        .unwrap_or(normalized)
}

/// Plain text of the description container, one line per text node.
pub fn description_text(root: ElementRef) -> String {
    root.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Walk the direct children of the description container, splitting it into
/// sections at header-like elements (h1-h6, b/strong, bold-leading or
/// `Label: value` paragraphs). Content before the first header is discarded;
/// a header followed by no content commits nothing.
pub fn segment(root: ElementRef) -> BTreeMap<String, SectionValue> {
    let mut walker = Walker::default();

    for node in root.children() {
        if let Some(element) = ElementRef::wrap(node) {
            walker.visit(element);
        } else if let Node::Text(text) = node.value() {
            walker.push(&text.text);
        }
    }

    walker.finish()
}

#[derive(Default)]
struct Walker {
    sections: BTreeMap<String, SectionValue>,
    current: Option<String>,
    content: Vec<String>,
}

impl Walker {
    fn visit(&mut self, element: ElementRef) {
        match element.value().name() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "b" | "strong" => {
                self.open(&element_text(element));
            }
            "ul" | "ol" => {
                for li in element.select(&LI_SEL) {
                    self.push(&element_text(li));
                }
            }
            "li" => self.push(&element_text(element)),
            _ => self.visit_block(element),
        }
    }

    /// A p/div/span is a header when it leads with bold text, a direct
    /// commit when it reads `Label: value`, and plain content otherwise.
    fn visit_block(&mut self, element: ElementRef) {
        let whole = element_text(element);
        if whole.is_empty() {
            return;
        }

        let direct_bold = element
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| matches!(child.value().name(), "b" | "strong"));

        if let Some(bold) = direct_bold {
            let label = element_text(bold);
            if label.is_empty() {
                self.push(&whole);
                return;
            }
            let rest = whole
                .strip_prefix(&label)
                .unwrap_or("")
                .trim_start_matches([':', '-'])
                .trim();
            if rest.is_empty() {
                self.open(&label);
            } else {
                self.commit_direct(&label, rest);
            }
        } else if let Some(caps) = LABEL_VALUE_RE.captures(&whole) {
            let label = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let value = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            self.commit_direct(label, value);
        } else {
            self.push(&whole);
        }
    }

    fn open(&mut self, header: &str) {
        self.commit();
        let normalized = normalize_header(header);
        if !normalized.is_empty() {
            self.current = Some(normalized);
        }
    }

    fn push(&mut self, text: &str) {
        if self.current.is_none() {
            return;
        }
        let cleaned = clean_text(text);
        if !cleaned.is_empty() {
            self.content.push(cleaned);
        }
    }

    /// `Label: value` commits immediately and closes any open section.
    fn commit_direct(&mut self, label: &str, value: &str) {
        self.commit();
        let key = canonical_key(label);
        if !key.is_empty() && !value.is_empty() {
            self.sections
                .insert(key, SectionValue::Text(value.to_string()));
        }
    }

    fn commit(&mut self) {
        if let Some(name) = self.current.take() {
            if !self.content.is_empty() {
                let value = fold_content(std::mem::take(&mut self.content));
                self.sections.insert(canonical_key(&name), value);
            }
        }
        self.content.clear();
    }

    fn finish(mut self) -> BTreeMap<String, SectionValue> {
        self.commit();
        self.sections
    }
}

fn element_text(element: ElementRef) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// One string stays a string; several short strings form a list; anything
/// with a long item collapses to a single joined string.
fn fold_content(mut items: Vec<String>) -> SectionValue {
    if items.len() == 1 {
        return SectionValue::Text(items.remove(0));
    }
    if items.iter().all(|item| item.chars().count() <= SHORT_ITEM_MAX) {
        SectionValue::List(items)
    } else {
        SectionValue::Text(items.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn segment_html(body: &str) -> BTreeMap<String, SectionValue> {
        let html = format!("<html><body><div id=\"desc\">{body}</div></body></html>");
        let doc = Html::parse_document(&html);
        let sel = Selector::parse("#desc").unwrap();
        let root = doc.select(&sel).next().unwrap();
        segment(root)
    }

    #[test]
    fn test_header_with_list_content() {
        let sections = segment_html(
            "<h3>Responsibilities</h3><ul><li>A</li><li>B</li></ul>",
        );
        assert_eq!(
            sections.get("responsibilities"),
            Some(&SectionValue::List(vec!["A".to_string(), "B".to_string()]))
        );
    }

    #[test]
    fn test_header_mapping_and_passthrough() {
        let sections = segment_html(
            "<b>What we're looking for:</b><ul><li>SQL</li></ul>\
             <b>Our office dogs</b><p>Two labradors.</p>",
        );
        assert!(sections.contains_key("requirements"));
        assert_eq!(
            sections.get("our office dogs"),
            Some(&SectionValue::Text("Two labradors.".to_string()))
        );
    }

    #[test]
    fn test_bold_label_with_inline_value() {
        let sections = segment_html("<p><b>Pay:</b> ₹50,000 per month</p>");
        assert_eq!(
            sections.get("pay"),
            Some(&SectionValue::Text("₹50,000 per month".to_string()))
        );
    }

    #[test]
    fn test_plain_label_value_paragraph() {
        let sections = segment_html("<p>Work location: Remote</p>");
        assert_eq!(
            sections.get("workLocation"),
            Some(&SectionValue::Text("Remote".to_string()))
        );
    }

    #[test]
    fn test_content_before_first_header_discarded() {
        let sections = segment_html(
            "<p>About the company blurb.</p><h3>Schedule</h3><p>Day shift</p>",
        );
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections.get("schedule"),
            Some(&SectionValue::Text("Day shift".to_string()))
        );
    }

    #[test]
    fn test_header_without_content_not_stored() {
        let sections = segment_html("<h3>Benefits</h3><h3>Schedule</h3><p>Day shift</p>");
        assert!(!sections.contains_key("benefits"));
        assert!(sections.contains_key("schedule"));
    }

    #[test]
    fn test_long_items_collapse_to_text() {
        let long = "x".repeat(250);
        let sections = segment_html(&format!(
            "<h3>Requirements</h3><ul><li>short</li><li>{long}</li></ul>"
        ));
        match sections.get("requirements") {
            Some(SectionValue::Text(text)) => {
                assert!(text.starts_with("short "));
            }
            other => panic!("expected joined text, got {other:?}"),
        }
    }

    #[test]
    fn test_description_text_joins_lines() {
        let html = "<html><body><div id=\"d\"><p>One</p><p>Two</p></div></body></html>";
        let doc = Html::parse_document(html);
        let sel = Selector::parse("#d").unwrap();
        let root = doc.select(&sel).next().unwrap();
        assert_eq!(description_text(root), "One\nTwo");
    }

    #[test]
    fn test_canonical_key_normalization() {
        assert_eq!(canonical_key("  Key Responsibilities: "), "responsibilities");
        assert_eq!(canonical_key("Stipend"), "pay");
        assert_eq!(canonical_key("Dress Code"), "dress code");
    }
}
