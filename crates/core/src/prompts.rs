//! System instructions that carry document context to the chat model.
//!
//! The model sees nothing of the PDF except what these strings embed.

use crate::models::{Page, Prompt, Section};

pub fn overview_prompt(question: &str, document_text: &str) -> Prompt {
    Prompt {
        message: question.to_string(),
        system_message: format!(
            "Based on the following text from the PDF document:\n{document_text}\nPlease answer the question with a general overview or conclusion."
        ),
    }
}

pub fn page_prompt(question: &str, page: &Page) -> Prompt {
    Prompt {
        message: question.to_string(),
        system_message: format!(
            "Analyze the following text from page {} of a PDF document:\n{}\nPlease answer the question.",
            page.page_number, page.text
        ),
    }
}

pub fn page_prompts(question: &str, pages: &[Page]) -> Vec<(u32, Prompt)> {
    pages
        .iter()
        .map(|page| (page.page_number, page_prompt(question, page)))
        .collect()
}

pub fn section_prompt(question: &str, section: &Section) -> Prompt {
    Prompt {
        message: question.to_string(),
        system_message: format!(
            "Based on the following text from the '{}' section of the PDF:\n{}\nPlease answer the question and provide relevant references from the PDF.",
            section.title, section.content
        ),
    }
}
