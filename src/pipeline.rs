use scraper::Html;
use serde::Serialize;

use crate::fallback;
use crate::llm::GenerativeBackend;
use crate::normalize::{clean_skill_list, split_skills, strip_pay_noise};
use crate::record::{DescField, JobRecord, SectionValue};
use crate::sections;
use crate::site::SiteProfile;
use crate::structured::{extract_list, extract_scalar, find_element};

/// Which pass resolved a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Structured,
    Section,
    Regex,
    Generative,
}

/// One accepted field resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtractionAttempt {
    pub field: &'static str,
    pub strategy: Strategy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub structured: usize,
    pub section: usize,
    pub regex: usize,
    pub generative: usize,
    pub unresolved: usize,
}

/// Per-extraction observer record: which strategy won each field, plus
/// per-strategy totals. Owned by the caller, never global.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    pub attempts: Vec<ExtractionAttempt>,
    pub stats: ExtractionStats,
}

impl ExtractionReport {
    fn accept(&mut self, field: &'static str, strategy: Strategy) {
        self.attempts.push(ExtractionAttempt { field, strategy });
        match strategy {
            Strategy::Structured => self.stats.structured += 1,
            Strategy::Section => self.stats.section += 1,
            Strategy::Regex => self.stats.regex += 1,
            Strategy::Generative => self.stats.generative += 1,
        }
    }

    fn miss(&mut self) {
        self.stats.unresolved += 1;
    }

    /// Strategy that resolved a field, if any did.
    pub fn strategy_for(&self, field: &str) -> Option<Strategy> {
        self.attempts
            .iter()
            .find(|a| a.field == field)
            .map(|a| a.strategy)
    }
}

/// A finished extraction: the record plus its report.
#[derive(Debug)]
pub struct Extraction {
    pub record: JobRecord,
    pub report: ExtractionReport,
}

/// One description-derived value on its way through the cascade.
struct Slot<T> {
    value: Option<T>,
    strategy: Option<Strategy>,
}

impl<T> Slot<T> {
    fn empty() -> Self {
        Slot {
            value: None,
            strategy: None,
        }
    }

    fn filled(value: Option<T>, strategy: Strategy) -> Self {
        match value {
            Some(v) => Slot {
                value: Some(v),
                strategy: Some(strategy),
            },
            None => Slot::empty(),
        }
    }

    fn or(self, other: Slot<T>) -> Slot<T> {
        if self.value.is_some() {
            self
        } else {
            other
        }
    }

    fn fill_from(&mut self, value: Option<T>, strategy: Strategy) {
        if self.value.is_none() {
            if let Some(v) = value {
                self.value = Some(v);
                self.strategy = Some(strategy);
            }
        }
    }

    fn settle(self, field: &'static str, report: &mut ExtractionReport) -> Option<T> {
        match (self.value, self.strategy) {
            (Some(v), Some(strategy)) => {
                report.accept(field, strategy);
                Some(v)
            }
            _ => {
                report.miss();
                None
            }
        }
    }
}

/// The per-document extraction state machine: structured selectors, then the
/// section segmenter, then regex heuristics, then one generative call for
/// whatever is still open. Earlier strategies always win; values are never
/// merged across strategies.
pub struct Extractor {
    site: &'static SiteProfile,
    backend: Box<dyn GenerativeBackend>,
}

impl Extractor {
    pub fn new(site: &'static SiteProfile, backend: Box<dyn GenerativeBackend>) -> Self {
        Extractor { site, backend }
    }

    pub fn site(&self) -> &'static SiteProfile {
        self.site
    }

    /// Extract one posting from rendered HTML. Missing fields are misses,
    /// never errors; a page with no description container still yields a
    /// record from the structural pass alone.
    pub fn extract(&self, html: &str, source_url: &str) -> Extraction {
        let doc = Html::parse_document(html);
        let root = doc.root_element();
        let mut record = JobRecord::new(Some(source_url));
        let mut report = ExtractionReport::default();

        record.title = structural(&mut report, "title", extract_scalar(root, self.site.title));
        record.company_name = structural(
            &mut report,
            "companyName",
            extract_scalar(root, self.site.company),
        );
        record.location = structural(
            &mut report,
            "location",
            extract_scalar(root, self.site.location),
        );
        record.salary = structural(
            &mut report,
            "salary",
            extract_scalar(root, self.site.salary).map(|s| strip_pay_noise(&s)),
        );

        let desc_root = find_element(root, self.site.description);
        if desc_root.is_none() {
            tracing::debug!(site = self.site.name, "no description container found");
        }
        let mut section_map = desc_root.map(sections::segment).unwrap_or_default();
        let desc_text = desc_root
            .map(sections::description_text)
            .filter(|t| !t.is_empty());
        record.job_description = desc_text.clone();
        let text = desc_text.as_deref().unwrap_or("");

        // Scalar cascade: structured, then section, then regex.
        let mut job_type = Slot::filled(
            extract_scalar(root, self.site.job_type),
            Strategy::Structured,
        )
        .or(section_slot(&mut section_map, DescField::JobType))
        .or(regex_slot(text, DescField::JobType));

        let mut pay = section_slot(&mut section_map, DescField::Pay)
            .or(regex_slot(text, DescField::Pay));

        let mut work_location = section_slot(&mut section_map, DescField::WorkLocation)
            .or(regex_slot(text, DescField::WorkLocation));

        let mut education = section_slot(&mut section_map, DescField::Education)
            .or(regex_slot(text, DescField::Education));

        // benefits and schedule keep their section shape (string or list)
        let mut benefits = Slot::filled(
            non_empty_list(extract_list(root, self.site.benefits)).map(SectionValue::List),
            Strategy::Structured,
        )
        .or(section_value_slot(&mut section_map, DescField::Benefits))
        .or(Slot::filled(
            fallback::extract_field(text, DescField::Benefits).map(SectionValue::Text),
            Strategy::Regex,
        ));

        let mut schedule = section_value_slot(&mut section_map, DescField::Schedule)
            .or(Slot::filled(
                fallback::extract_field(text, DescField::Schedule).map(SectionValue::Text),
                Strategy::Regex,
            ));

        let mut most_skills = Slot::filled(
            non_empty_list(extract_list(root, self.site.skills)),
            Strategy::Structured,
        )
        .or(skill_section_slot(&mut section_map, DescField::MostRelevantSkills))
        .or(Slot::filled(
            fallback::extract_field(text, DescField::MostRelevantSkills)
                .map(|s| split_skills(&s))
                .and_then(non_empty_list),
            Strategy::Regex,
        ));

        let mut other_skills =
            skill_section_slot(&mut section_map, DescField::OtherRelevantSkills).or(Slot::filled(
                fallback::extract_field(text, DescField::OtherRelevantSkills)
                    .map(|s| split_skills(&s))
                    .and_then(non_empty_list),
                Strategy::Regex,
            ));

        // One generative call covers every still-open field.
        let needs_generative = job_type.value.is_none()
            || pay.value.is_none()
            || work_location.value.is_none()
            || education.value.is_none()
            || benefits.value.is_none()
            || schedule.value.is_none()
            || most_skills.value.is_none()
            || other_skills.value.is_none();

        if needs_generative && !text.is_empty() && self.backend.is_enabled() {
            let fields = self.backend.extract_fields(text);
            if fields.is_empty() {
                tracing::debug!(site = self.site.name, "generative pass returned no fields");
            }
            job_type.fill_from(fields.job_type, Strategy::Generative);
            pay.fill_from(fields.pay, Strategy::Generative);
            work_location.fill_from(fields.work_location, Strategy::Generative);
            education.fill_from(fields.education, Strategy::Generative);
            benefits.fill_from(
                fields.benefits.map(SectionValue::Text),
                Strategy::Generative,
            );
            schedule.fill_from(
                fields.schedule.map(SectionValue::Text),
                Strategy::Generative,
            );
            most_skills.fill_from(
                non_empty_list(fields.most_relevant_skills),
                Strategy::Generative,
            );
            other_skills.fill_from(
                non_empty_list(fields.other_relevant_skills),
                Strategy::Generative,
            );
        }

        record.job_type = job_type.settle(DescField::JobType.key(), &mut report);
        record.pay = pay
            .settle(DescField::Pay.key(), &mut report)
            .map(|p| strip_pay_noise(&p));
        record.work_location = work_location.settle(DescField::WorkLocation.key(), &mut report);
        record.education = education.settle(DescField::Education.key(), &mut report);
        record.benefits = benefits.settle(DescField::Benefits.key(), &mut report);
        record.schedule = schedule.settle(DescField::Schedule.key(), &mut report);
        record.most_relevant_skills = most_skills
            .settle(DescField::MostRelevantSkills.key(), &mut report)
            .map(clean_skill_list)
            .unwrap_or_default();
        record.other_relevant_skills = other_skills
            .settle(DescField::OtherRelevantSkills.key(), &mut report)
            .map(clean_skill_list)
            .unwrap_or_default();

        // Sections the cascade did not consume pass through verbatim; the
        // eight description keys always resolve through the record fields.
        record.extra_sections = section_map
            .into_iter()
            .filter(|(key, value)| !DescField::is_description_field(key) && !value.is_empty())
            .collect();

        record.job_id = self.site.extract_job_id(source_url, html);

        tracing::debug!(
            site = self.site.name,
            valid = record.is_valid(),
            structured = report.stats.structured,
            section = report.stats.section,
            regex = report.stats.regex,
            generative = report.stats.generative,
            unresolved = report.stats.unresolved,
            "extraction finished"
        );

        Extraction { record, report }
    }
}

fn structural(
    report: &mut ExtractionReport,
    field: &'static str,
    value: Option<String>,
) -> Option<String> {
    match value {
        Some(v) => {
            report.accept(field, Strategy::Structured);
            Some(v)
        }
        None => {
            report.miss();
            None
        }
    }
}

fn non_empty_list(items: Vec<String>) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Section hit flattened to a scalar string.
fn section_slot(
    sections: &mut std::collections::BTreeMap<String, SectionValue>,
    field: DescField,
) -> Slot<String> {
    let value = sections
        .remove(field.key())
        .map(|v| v.as_joined_text())
        .filter(|s| !s.trim().is_empty());
    Slot::filled(value, Strategy::Section)
}

/// Section hit kept in its committed shape.
fn section_value_slot(
    sections: &mut std::collections::BTreeMap<String, SectionValue>,
    field: DescField,
) -> Slot<SectionValue> {
    let value = sections.remove(field.key()).filter(|v| !v.is_empty());
    Slot::filled(value, Strategy::Section)
}

/// Section hit as a skill list: committed lists stay lists, committed text
/// splits on commas.
fn skill_section_slot(
    sections: &mut std::collections::BTreeMap<String, SectionValue>,
    field: DescField,
) -> Slot<Vec<String>> {
    let value = sections.remove(field.key()).and_then(|v| match v {
        SectionValue::Text(s) => non_empty_list(split_skills(&s)),
        SectionValue::List(items) => non_empty_list(items),
    });
    Slot::filled(value, Strategy::Section)
}

fn regex_slot(text: &str, field: DescField) -> Slot<String> {
    Slot::filled(fallback::extract_field(text, field), Strategy::Regex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Disabled, LlmFields};
    use crate::site::SIMPLYHIRED;

    struct StubBackend {
        fields: LlmFields,
    }

    impl GenerativeBackend for StubBackend {
        fn extract_fields(&self, _description: &str) -> LlmFields {
            self.fields.clone()
        }
    }

    const PAGE: &str = r#"<html><body>
      <h1 data-testid="viewJobTitle">Data Analyst</h1>
      <div data-testid="viewJobCompanyName"><span data-testid="detailText">Acme Corp</span></div>
      <div data-testid="viewJobCompanyLocation"><span data-testid="detailText">Bengaluru</span></div>
      <div data-testid="viewJobBodyJobFullDescriptionContent">
        <p>Join our analytics team.</p>
        <h3>Responsibilities</h3>
        <ul><li>A</li><li>B</li></ul>
        <p><b>Pay:</b> ₹50,000 per month</p>
        <p>This is a Full-time role with growth opportunities.</p>
      </div>
    </body></html>"#;

    #[test]
    fn test_structured_and_section_resolution() {
        let extractor = Extractor::new(&SIMPLYHIRED, Box::new(Disabled));
        let extraction = extractor.extract(PAGE, "https://example.com/job/1?jobkey=k1");
        let record = extraction.record;

        assert_eq!(record.title.as_deref(), Some("Data Analyst"));
        assert_eq!(record.company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(record.pay.as_deref(), Some("₹50,000 per month"));
        assert_eq!(record.job_id.as_deref(), Some("k1"));
        assert_eq!(
            record.extra_sections.get("responsibilities"),
            Some(&SectionValue::List(vec!["A".to_string(), "B".to_string()]))
        );

        assert_eq!(
            extraction.report.strategy_for("pay"),
            Some(Strategy::Section)
        );
        assert_eq!(
            extraction.report.strategy_for("title"),
            Some(Strategy::Structured)
        );
    }

    #[test]
    fn test_regex_resolves_job_type_from_text() {
        let extractor = Extractor::new(&SIMPLYHIRED, Box::new(Disabled));
        let extraction = extractor.extract(PAGE, "https://example.com/job/1");

        assert_eq!(extraction.record.job_type.as_deref(), Some("Full-time"));
        assert_eq!(
            extraction.report.strategy_for("jobType"),
            Some(Strategy::Regex)
        );
    }

    #[test]
    fn test_generative_fills_only_open_fields() {
        let backend = StubBackend {
            fields: LlmFields {
                pay: Some("$10".to_string()),
                most_relevant_skills: vec!["Python".to_string(), "SQL".to_string()],
                ..LlmFields::default()
            },
        };
        let extractor = Extractor::new(&SIMPLYHIRED, Box::new(backend));
        let extraction = extractor.extract(PAGE, "https://example.com/job/1");

        // pay already resolved by the segmenter; the stub must not override it
        assert_eq!(extraction.record.pay.as_deref(), Some("₹50,000 per month"));
        assert_eq!(
            extraction.record.most_relevant_skills,
            vec!["Python", "SQL"]
        );
        assert_eq!(
            extraction.report.strategy_for("mostRelevantSkills"),
            Some(Strategy::Generative)
        );
    }

    #[test]
    fn test_page_without_description_container() {
        let html = "<html><body><h1 data-testid=\"viewJobTitle\">Analyst</h1></body></html>";
        let extractor = Extractor::new(&SIMPLYHIRED, Box::new(Disabled));
        let extraction = extractor.extract(html, "https://example.com/job/2");
        let record = extraction.record;

        assert_eq!(record.title.as_deref(), Some("Analyst"));
        assert_eq!(record.job_description, None);
        assert_eq!(record.job_type, None);
        assert!(record.extra_sections.is_empty());
        assert!(extraction.report.stats.unresolved > 0);
    }

    #[test]
    fn test_extra_sections_never_shadow_description_fields() {
        let html = r#"<html><body>
          <h1 data-testid="viewJobTitle">Analyst</h1>
          <div data-testid="viewJobBodyJobFullDescriptionContent">
            <h3>Benefits</h3><ul><li>Health insurance</li><li>PF</li></ul>
            <h3>Responsibilities</h3><p>Build dashboards.</p>
          </div>
        </body></html>"#;
        let extractor = Extractor::new(&SIMPLYHIRED, Box::new(Disabled));
        let record = extractor.extract(html, "https://example.com/job/3").record;

        assert!(record.benefits.is_some());
        assert!(record.extra_sections.contains_key("responsibilities"));
        assert!(record
            .extra_sections
            .keys()
            .all(|key| !DescField::is_description_field(key)));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let extractor = Extractor::new(&SIMPLYHIRED, Box::new(Disabled));
        let a = extractor.extract(PAGE, "https://example.com/job/1");
        let b = extractor.extract(PAGE, "https://example.com/job/1");
        assert_eq!(a.record, b.record);
    }
}
