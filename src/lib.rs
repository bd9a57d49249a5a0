pub mod cards;
pub mod cli;
pub mod config;
pub mod error;
pub mod fallback;
pub mod fetch;
pub mod llm;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod sections;
pub mod site;
pub mod structured;

pub use error::{JoblensError, Result};
