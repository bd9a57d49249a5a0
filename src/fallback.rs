use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::DescField;

/// Per-field regex heuristics run against the plain description text when
/// neither the structured pass nor the segmenter resolved the field. Each
/// pattern is a single case-insensitive search; the first capture group is
/// the value.
static PATTERNS: Lazy<Vec<(DescField, Regex)>> = Lazy::new(|| {
    let table: &[(DescField, &str)] = &[
        (
            DescField::JobType,
            r"(?i)\b(full[- ]?time|part[- ]?time|contract|internship|temporary)\b",
        ),
        (
            DescField::Pay,
            r"(?i)(?:salary|pay)[:\-]?\s*([₹$€£]?\s?[\d,\.]+(?:\s*(?:per|/)?\s*\w+)?)",
        ),
        (
            DescField::WorkLocation,
            r"(?i)work location[:\-]?\s*([A-Za-z, \-/]+)",
        ),
        (DescField::Benefits, r"(?i)benefits[:\-]?\s*(.+)"),
        (DescField::Schedule, r"(?i)schedule[:\-]?\s*(.+)"),
        (DescField::Education, r"(?i)education[:\-]?\s*(.+)"),
        (
            DescField::MostRelevantSkills,
            r"(?i)most relevant skills[:\-]?\s*(.+)",
        ),
        (
            DescField::OtherRelevantSkills,
            r"(?i)other relevant skills[:\-]?\s*(.+)",
        ),
    ];
    table
        .iter()
        .map(|(field, pattern)| {
            (
                *field,
                Regex::new(pattern).expect("Invalid fallback regex pattern"),
            )
        })
        .collect()
});

/// Run the field's heuristic over the description text. Returns the trimmed
/// first capture, or `None` when the field has no pattern or nothing matched.
pub fn extract_field(text: &str, field: DescField) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let regex = PATTERNS
        .iter()
        .find(|(candidate, _)| *candidate == field)
        .map(|(_, re)| re)?;

    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_type_word_boundary() {
        let text = "Job Type: Full-time. Some other text.";
        assert_eq!(
            extract_field(text, DescField::JobType).as_deref(),
            Some("Full-time")
        );
        assert_eq!(
            extract_field("We offer parttimey vibes", DescField::JobType),
            None
        );
    }

    #[test]
    fn test_pay_with_currency_and_period() {
        let text = "Pay: ₹30,000 per month plus incentives";
        assert_eq!(
            extract_field(text, DescField::Pay).as_deref(),
            Some("₹30,000 per month")
        );
    }

    #[test]
    fn test_work_location() {
        let text = "Work location: Bengaluru, Karnataka\nMore text";
        assert_eq!(
            extract_field(text, DescField::WorkLocation).as_deref(),
            Some("Bengaluru, Karnataka")
        );
    }

    #[test]
    fn test_skills_line() {
        let text = "Most relevant skills: Python, SQL, Tableau";
        assert_eq!(
            extract_field(text, DescField::MostRelevantSkills).as_deref(),
            Some("Python, SQL, Tableau")
        );
    }

    #[test]
    fn test_empty_text_short_circuits() {
        assert_eq!(extract_field("", DescField::Benefits), None);
    }
}
