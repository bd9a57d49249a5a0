use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A committed description section: either a single string or a list of
/// short items. Serializes untagged, so consumers see `"text"` or `["a","b"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionValue {
    Text(String),
    List(Vec<String>),
}

impl SectionValue {
    pub fn is_empty(&self) -> bool {
        match self {
            SectionValue::Text(s) => s.trim().is_empty(),
            SectionValue::List(items) => items.is_empty(),
        }
    }

    /// Flatten to a single string (list items joined with ", ").
    pub fn as_joined_text(&self) -> String {
        match self {
            SectionValue::Text(s) => s.clone(),
            SectionValue::List(items) => items.join(", "),
        }
    }

}

/// The eight description-derived fields the fallback cascade resolves.
/// Everything else committed by the segmenter lands in `extraSections`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescField {
    JobType,
    Pay,
    WorkLocation,
    Benefits,
    Schedule,
    Education,
    MostRelevantSkills,
    OtherRelevantSkills,
}

impl DescField {
    pub const SCALARS: [DescField; 6] = [
        DescField::JobType,
        DescField::Pay,
        DescField::WorkLocation,
        DescField::Benefits,
        DescField::Schedule,
        DescField::Education,
    ];

    pub const LISTS: [DescField; 2] =
        [DescField::MostRelevantSkills, DescField::OtherRelevantSkills];

    /// The canonical section-map key, which is also the wire name.
    pub fn key(self) -> &'static str {
        match self {
            DescField::JobType => "jobType",
            DescField::Pay => "pay",
            DescField::WorkLocation => "workLocation",
            DescField::Benefits => "benefits",
            DescField::Schedule => "schedule",
            DescField::Education => "education",
            DescField::MostRelevantSkills => "mostRelevantSkills",
            DescField::OtherRelevantSkills => "otherRelevantSkills",
        }
    }

    pub fn is_description_field(key: &str) -> bool {
        DescField::SCALARS
            .iter()
            .chain(DescField::LISTS.iter())
            .any(|f| f.key() == key)
    }
}

/// One extracted job posting. The key set is fixed: absent scalars serialize
/// as `null`, absent lists as `[]`, absent sections as `{}`. No timestamp
/// lives here, so extracting the same document twice yields identical records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub pay: Option<String>,
    #[serde(default)]
    pub work_location: Option<String>,
    #[serde(default)]
    pub benefits: Option<SectionValue>,
    #[serde(default)]
    pub schedule: Option<SectionValue>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub most_relevant_skills: Vec<String>,
    #[serde(default)]
    pub other_relevant_skills: Vec<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub extra_sections: BTreeMap<String, SectionValue>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
}

impl JobRecord {
    pub fn new(source_url: Option<&str>) -> Self {
        JobRecord {
            title: None,
            company_name: None,
            location: None,
            salary: None,
            job_type: None,
            pay: None,
            work_location: None,
            benefits: None,
            schedule: None,
            education: None,
            most_relevant_skills: Vec::new(),
            other_relevant_skills: Vec::new(),
            job_description: None,
            extra_sections: BTreeMap::new(),
            source_url: source_url.map(String::from),
            job_id: None,
        }
    }

    /// A record is usable when it carries at least a non-empty title.
    pub fn is_valid(&self) -> bool {
        self.title
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }
}
