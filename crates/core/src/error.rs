use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("file is not a pdf: {path} (first bytes {magic:?})")]
    NotAPdf { path: PathBuf, magic: Vec<u8> },

    #[error("regex error: {0}")]
    RegexError(#[from] regex::Error),
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("inference request failed: {0}")]
    Request(String),
}

/// Status class reported to whoever submitted the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadInput,
    NotFound,
    Internal,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::BadInput => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum AskError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Decode(#[from] ExtractError),

    #[error("{0}")]
    NotFound(String),

    #[error("{}", inference_message(*page, source))]
    Inference {
        page: Option<u32>,
        #[source]
        source: InferenceError,
    },
}

impl AskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AskError::InvalidInput(_) => ErrorKind::BadInput,
            AskError::NotFound(_) => ErrorKind::NotFound,
            AskError::Decode(_) | AskError::Inference { .. } => ErrorKind::Internal,
        }
    }
}

impl From<InferenceError> for AskError {
    fn from(source: InferenceError) -> Self {
        AskError::Inference { page: None, source }
    }
}

fn inference_message(page: Option<u32>, source: &InferenceError) -> String {
    match page {
        Some(page) => format!("page {page}: {source}"),
        None => source.to_string(),
    }
}

pub type Result<T, E = AskError> = std::result::Result<T, E>;
