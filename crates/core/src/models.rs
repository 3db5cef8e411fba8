use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const FULL_CONTENT_DISCLOSURE: &str = "Full PDF Content Used";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page_number: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

/// Heading-delimited sections in document order.
///
/// A title that was already seen keeps its first content; later sections
/// carrying the same title are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    sections: Vec<Section>,
    titles: HashSet<String>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the title was already present and the section was dropped.
    pub fn insert(&mut self, title: impl Into<String>, content: impl Into<String>) -> bool {
        let title = title.into();
        if !self.titles.insert(title.clone()) {
            return false;
        }

        self.sections.push(Section {
            title,
            content: content.into(),
        });
        true
    }

    pub fn get(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.title == title)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.title.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl<'a> IntoIterator for &'a SectionMap {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    General,
    PageByPage,
    SectionSpecific,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub message: String,
    pub system_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub api_name: String,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.7,
            top_p: 0.95,
            api_name: "/chat".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceRequest {
    pub prompt: Prompt,
    pub params: GenerationParams,
}

#[derive(Debug, Clone, Default)]
pub struct AskRequest {
    pub pdf: Option<Vec<u8>>,
    pub question: Option<String>,
}

impl AskRequest {
    pub fn new(pdf: Vec<u8>, question: impl Into<String>) -> Self {
        Self {
            pdf: Some(pdf),
            question: Some(question.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAnswer {
    pub page_number: u32,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Section {
        answer: String,
        section: String,
        content: String,
    },
    Overview {
        answer: String,
        content: String,
    },
    Pages {
        responses: Vec<PageAnswer>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub status: u16,
}

impl From<&crate::AskError> for ErrorEnvelope {
    fn from(error: &crate::AskError) -> Self {
        Self {
            error: error.to_string(),
            status: error.kind().status_code(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnswerOptions {
    pub max_pdf_bytes: usize,
    pub section_heading_regex: &'static str,
    pub params: GenerationParams,
}

impl Default for AnswerOptions {
    fn default() -> Self {
        Self {
            max_pdf_bytes: 16 * 1024 * 1024,
            section_heading_regex: r"\n\s*(\b[A-Z][A-Za-z\s\-]+\b)\s*\n",
            params: GenerationParams::default(),
        }
    }
}
