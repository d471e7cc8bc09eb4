pub mod assemble;
pub mod orchestrator;
pub mod paginate;
pub mod parser;
pub mod pdf;
pub mod publish;
pub mod sections;
pub mod theme;
pub mod types;
pub mod wrap;

pub use assemble::*;
pub use orchestrator::*;
pub use paginate::*;
pub use parser::*;
pub use publish::*;
pub use types::*;

use thiserror::Error;

use crate::narrative::NarrativeError;
use crate::records::RecordsError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Patient data unavailable: {0}")]
    DataFetch(#[from] RecordsError),

    #[error("Narrative generation failed: {0}")]
    Narrative(#[from] NarrativeError),

    #[error("PDF rendering failed: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
