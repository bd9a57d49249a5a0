use thiserror::Error;

#[derive(Error, Debug)]
pub enum JoblensError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Unknown site profile: {0}")]
    UnknownSite(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Input unavailable: {0}")]
    InputUnavailable(String),
}

impl JoblensError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            JoblensError::HttpError(_) => Some(
                "Check your internet connection, or pass a saved page with --file",
            ),
            JoblensError::UnknownSite(_) => Some(
                "Run `joblens sites` to see the built-in site profiles",
            ),
            JoblensError::InputUnavailable(_) => Some(
                "Provide exactly one of --file or --url",
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, JoblensError>;
