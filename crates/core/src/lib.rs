pub mod classifier;
pub mod error;
pub mod extractor;
pub mod gateways;
pub mod keywords;
pub mod matcher;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod traits;

pub use classifier::{classify, classify_with, IntentRule, INTENT_RULES};
pub use error::{AskError, ErrorKind, ExtractError, InferenceError};
pub use extractor::{
    concat_pages, extract_by_page, extract_full_text, extract_sections, load_pdf_bytes,
    split_sections, LopdfExtractor, PdfExtractor,
};
pub use gateways::{GradioConfig, GradioGateway};
pub use keywords::{extract_keywords, ENGLISH_STOPWORDS};
pub use matcher::find_relevant_section;
pub use models::{
    Answer, AnswerOptions, AskRequest, ErrorEnvelope, GenerationParams, InferenceRequest, Intent,
    Page, PageAnswer, Prompt, Section, SectionMap, FULL_CONTENT_DISCLOSURE,
};
pub use orchestrator::QuestionRouter;
pub use prompts::{overview_prompt, page_prompt, page_prompts, section_prompt};
pub use traits::InferenceGateway;
