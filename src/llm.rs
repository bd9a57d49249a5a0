use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::{JoblensError, Result};

/// Sentinel the model is told to emit for absent string fields.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Chat-completions model used when the config does not name one.
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

const CHAT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Descriptions are truncated to this many characters before prompting.
const MAX_DESCRIPTION_CHARS: usize = 2000;

const EXTRACTION_PROMPT: &str = r#"Extract the following fields from the job description below.
If a field is not present, use "Not specified" for strings and an empty list for lists.

Fields:
- jobType (string): Full-time, Part-time, Contract, Internship, Temporary, etc.
- pay (string): salary, stipend or pay range
- workLocation (string): Remote, Hybrid, or the on-site city
- benefits (string): benefits offered
- schedule (string): shift or schedule details
- education (string): education requirements
- mostRelevantSkills (list of strings): specific skills or tools, e.g. ["Python", "SQL"]
- otherRelevantSkills (list of strings): other skills mentioned
If no skills are listed, use an empty list, never a string like "see above".

Job description:
{{description}}

Respond with ONLY a JSON object, no other text:
{"jobType": "...", "pay": "...", "workLocation": "...", "benefits": "...", "schedule": "...", "education": "...", "mostRelevantSkills": [], "otherRelevantSkills": []}"#;

/// Fields a generative backend can recover from free-form description text.
/// Sentinels are already normalized away: `None`/empty means the model had
/// nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmFields {
    pub job_type: Option<String>,
    pub pay: Option<String>,
    pub work_location: Option<String>,
    pub benefits: Option<String>,
    pub schedule: Option<String>,
    pub education: Option<String>,
    pub most_relevant_skills: Vec<String>,
    pub other_relevant_skills: Vec<String>,
}

impl LlmFields {
    pub fn is_empty(&self) -> bool {
        self.job_type.is_none()
            && self.pay.is_none()
            && self.work_location.is_none()
            && self.benefits.is_none()
            && self.schedule.is_none()
            && self.education.is_none()
            && self.most_relevant_skills.is_empty()
            && self.other_relevant_skills.is_empty()
    }
}

/// Last-resort field extraction from description text. Implementations must
/// be infallible at this seam: on any transport or parse failure they return
/// `LlmFields::default()` so the merge layer sees an ordinary miss.
pub trait GenerativeBackend: Send + Sync {
    fn extract_fields(&self, description: &str) -> LlmFields;

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Backend used when no credentials are configured. Same return path as a
/// runtime failure.
pub struct Disabled;

impl GenerativeBackend for Disabled {
    fn extract_fields(&self, _description: &str) -> LlmFields {
        LlmFields::default()
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Groq OpenAI-compatible chat-completions backend.
pub struct GroqBackend {
    agent: ureq::Agent,
    api_key: String,
    model: String,
}

impl GroqBackend {
    pub fn new(api_key: String, model: String, timeout_secs: u64) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            .build()
            .into();
        GroqBackend {
            agent,
            api_key,
            model,
        }
    }

    fn request(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
            max_tokens: 512,
        };

        let response = self
            .agent
            .post(CHAT_ENDPOINT)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body)?;

        let reply: Value = response.into_body().read_json()?;
        reply["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                JoblensError::MalformedResponse("no message content in completion".to_string())
            })
    }
}

impl GenerativeBackend for GroqBackend {
    fn extract_fields(&self, description: &str) -> LlmFields {
        let truncated: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
        let prompt = EXTRACTION_PROMPT.replace("{{description}}", &truncated);

        match self.request(&prompt) {
            Ok(content) => parse_model_reply(&content),
            Err(e) => {
                tracing::warn!("generative extraction failed: {e}");
                LlmFields::default()
            }
        }
    }
}

/// Build the backend the config allows: Groq when an API key is present,
/// otherwise the disabled backend.
pub fn backend_from_config(config: &Config) -> Box<dyn GenerativeBackend> {
    match config.api_key() {
        Some(key) => Box::new(GroqBackend::new(
            key,
            config.model.clone(),
            config.llm_timeout_secs,
        )),
        None => {
            tracing::info!("generative fallback disabled: no API key configured");
            Box::new(Disabled)
        }
    }
}

/// Parse the model reply, tolerating prose around the JSON object. Falls
/// back to the first-`{` last-`}` substring before giving up.
pub fn parse_model_reply(content: &str) -> LlmFields {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return normalize_fields(&value);
    }

    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&content[start..=end]) {
                return normalize_fields(&value);
            }
        }
    }

    tracing::warn!("model reply contained no parseable JSON object");
    LlmFields::default()
}

fn normalize_fields(value: &Value) -> LlmFields {
    LlmFields {
        job_type: scalar(value, "jobType"),
        pay: scalar(value, "pay"),
        work_location: scalar(value, "workLocation"),
        benefits: scalar(value, "benefits"),
        schedule: scalar(value, "schedule"),
        education: scalar(value, "education"),
        most_relevant_skills: list(value, "mostRelevantSkills"),
        other_relevant_skills: list(value, "otherRelevantSkills"),
    }
}

fn scalar(value: &Value, key: &str) -> Option<String> {
    value[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(NOT_SPECIFIED))
        .map(String::from)
}

/// Lists must be real arrays of strings. A lone deflection item like
/// "see above" counts as empty, and so does a string where a list belongs.
fn list(value: &Value, key: &str) -> Vec<String> {
    let items: Vec<String> = match value[key].as_array() {
        Some(array) => array
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(NOT_SPECIFIED))
            .map(String::from)
            .collect(),
        None => return Vec::new(),
    };

    if items.len() == 1 && items[0].to_lowercase().starts_with("see above") {
        return Vec::new();
    }
    items
}
