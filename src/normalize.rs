use once_cell::sync::Lazy;
use regex::Regex;

// Pre-compiled regex for whitespace normalization (compile once, use many times)
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex pattern")
});

/// Collapse runs of whitespace into single spaces and trim.
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").to_string()
}

/// Strip noise from a pay/salary string, keeping alphanumerics, whitespace,
/// common separators and currency symbols.
pub fn strip_pay_noise(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || matches!(c, ',' | '.' | '-' | '/' | '₹' | '$' | '€' | '£' | '¥')
        })
        .collect();
    clean_text(&kept)
}

/// Split a comma-separated skills string into trimmed items.
pub fn split_skills(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Trim skill items, drop empties, and de-duplicate case-insensitively
/// while preserving first-seen order.
pub fn clean_skill_list(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut cleaned = Vec::new();
    for item in items {
        let trimmed = clean_text(&item);
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            cleaned.push(trimmed);
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Data \n Analyst\t II "), "Data Analyst II");
    }

    #[test]
    fn test_strip_pay_noise_keeps_currency() {
        assert_eq!(
            strip_pay_noise("₹50,000 ~ ₹70,000* per month!"),
            "₹50,000 ₹70,000 per month"
        );
        assert_eq!(strip_pay_noise("$25.50/hr (est.)"), "$25.50/hr est.");
    }

    #[test]
    fn test_split_skills() {
        assert_eq!(
            split_skills("Python, SQL , , Tableau"),
            vec!["Python", "SQL", "Tableau"]
        );
    }

    #[test]
    fn test_clean_skill_list_dedupes_case_insensitively() {
        let items = vec![
            " Python ".to_string(),
            "SQL".to_string(),
            "python".to_string(),
            "".to_string(),
        ];
        assert_eq!(clean_skill_list(items), vec!["Python", "SQL"]);
    }
}
