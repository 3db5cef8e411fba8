use crate::classifier::classify;
use crate::extractor::{
    extract_by_page, extract_full_text, extract_sections, LopdfExtractor, PdfExtractor,
};
use crate::keywords::extract_keywords;
use crate::matcher::find_relevant_section;
use crate::prompts::{overview_prompt, page_prompts, section_prompt};
use crate::traits::InferenceGateway;
use crate::{
    Answer, AnswerOptions, AskError, AskRequest, InferenceRequest, Intent, PageAnswer, Prompt,
    FULL_CONTENT_DISCLOSURE,
};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

pub const MISSING_INPUT_MESSAGE: &str = "Please upload a PDF and ask a question.";
pub const NO_SECTION_MESSAGE: &str = "Could not find relevant section in the PDF.";

/// Routes one question about one PDF to the matching context strategy and asks the gateway.
///
/// Holds no per-document state; the gateway is shared read-only across calls.
pub struct QuestionRouter<G, E = LopdfExtractor>
where
    G: InferenceGateway,
    E: PdfExtractor,
{
    gateway: G,
    extractor: E,
    options: AnswerOptions,
}

impl<G> QuestionRouter<G, LopdfExtractor>
where
    G: InferenceGateway + Send + Sync,
{
    pub fn new(gateway: G) -> Self {
        Self::with_extractor(gateway, LopdfExtractor, AnswerOptions::default())
    }
}

impl<G, E> QuestionRouter<G, E>
where
    G: InferenceGateway + Send + Sync,
    E: PdfExtractor + Send + Sync,
{
    pub fn with_extractor(gateway: G, extractor: E, options: AnswerOptions) -> Self {
        Self {
            gateway,
            extractor,
            options,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn options(&self) -> &AnswerOptions {
        &self.options
    }

    pub async fn ask(&self, request: AskRequest) -> Result<Answer, AskError> {
        let (pdf, question) = self.validate(request)?;
        let intent = classify(&question);
        let span = info_span!("ask", request_id = %Uuid::new_v4(), intent = ?intent);

        async move {
            info!(pdf_bytes = pdf.len(), "answering question");
            match intent {
                Intent::General => self.answer_overview(&pdf, &question).await,
                Intent::PageByPage => self.answer_pages(&pdf, &question).await,
                Intent::SectionSpecific => self.answer_section(&pdf, &question).await,
            }
        }
        .instrument(span)
        .await
    }

    fn validate(&self, request: AskRequest) -> Result<(Vec<u8>, String), AskError> {
        let pdf = request.pdf.filter(|bytes| !bytes.is_empty());
        let question = request
            .question
            .filter(|question| !question.trim().is_empty());

        let (Some(pdf), Some(question)) = (pdf, question) else {
            return Err(AskError::InvalidInput(MISSING_INPUT_MESSAGE.to_string()));
        };

        if pdf.len() > self.options.max_pdf_bytes {
            return Err(AskError::InvalidInput(format!(
                "PDF is {} bytes; the limit is {} bytes.",
                pdf.len(),
                self.options.max_pdf_bytes
            )));
        }

        Ok((pdf, question))
    }

    async fn answer_overview(&self, pdf: &[u8], question: &str) -> Result<Answer, AskError> {
        let text = extract_full_text(&self.extractor, pdf)?;
        let answer = self.predict(overview_prompt(question, &text)).await?;

        Ok(Answer::Overview {
            answer,
            content: FULL_CONTENT_DISCLOSURE.to_string(),
        })
    }

    async fn answer_pages(&self, pdf: &[u8], question: &str) -> Result<Answer, AskError> {
        let pages = extract_by_page(&self.extractor, pdf)?;
        let mut responses = Vec::with_capacity(pages.len());

        // One call at a time so responses stay in page order.
        for (page_number, prompt) in page_prompts(question, &pages) {
            let answer = self
                .predict(prompt)
                .await
                .map_err(|error| match error {
                    AskError::Inference { source, .. } => AskError::Inference {
                        page: Some(page_number),
                        source,
                    },
                    other => other,
                })?;

            debug!(page_number, "page answered");
            responses.push(PageAnswer {
                page_number,
                answer,
            });
        }

        Ok(Answer::Pages { responses })
    }

    async fn answer_section(&self, pdf: &[u8], question: &str) -> Result<Answer, AskError> {
        let sections = extract_sections(&self.extractor, pdf, self.options.section_heading_regex)?;
        let keywords = extract_keywords(question);
        debug!(section_count = sections.len(), keywords = ?keywords, "searching sections");

        let section = find_relevant_section(&sections, keywords.as_slice())
            .ok_or_else(|| AskError::NotFound(NO_SECTION_MESSAGE.to_string()))?;
        info!(section = %section.title, "matched section");

        let answer = self.predict(section_prompt(question, section)).await?;

        Ok(Answer::Section {
            answer,
            section: section.title.clone(),
            content: section.content.clone(),
        })
    }

    async fn predict(&self, prompt: Prompt) -> Result<String, AskError> {
        let request = InferenceRequest {
            prompt,
            params: self.options.params.clone(),
        };

        Ok(self.gateway.predict(&request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::test_pdf;
    use crate::{ErrorKind, ExtractError, InferenceError, Page};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGateway {
        calls: Mutex<Vec<InferenceRequest>>,
        fail_on_call: Option<usize>,
    }

    impl RecordingGateway {
        fn failing_on(call: usize) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on_call: Some(call),
            }
        }

        fn calls(&self) -> Vec<InferenceRequest> {
            self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl InferenceGateway for RecordingGateway {
        async fn predict(&self, request: &InferenceRequest) -> Result<String, InferenceError> {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| InferenceError::Request("poisoned".to_string()))?;
            calls.push(request.clone());

            if self.fail_on_call == Some(calls.len()) {
                return Err(InferenceError::Request("service unavailable".to_string()));
            }
            Ok(format!("answer {}", calls.len()))
        }
    }

    struct FixedPages(Vec<&'static str>);

    impl PdfExtractor for FixedPages {
        fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<Page>, ExtractError> {
            Ok(self
                .0
                .iter()
                .enumerate()
                .map(|(index, text)| Page {
                    page_number: (index + 1) as u32,
                    text: text.to_string(),
                })
                .collect())
        }
    }

    fn router_over(
        gateway: RecordingGateway,
        pages: Vec<&'static str>,
    ) -> QuestionRouter<RecordingGateway, FixedPages> {
        QuestionRouter::with_extractor(gateway, FixedPages(pages), AnswerOptions::default())
    }

    const PAPER: [&str; 2] = [
        "Pump study\nIntroduction\nWe study pumps.\n",
        "\nMethodology\nA sample of ten pumps was tested.\n\nResults\nPressure rose by 4%.\n",
    ];

    #[tokio::test]
    async fn summary_questions_send_the_whole_document_once() -> Result<(), AskError> {
        let router = router_over(RecordingGateway::default(), PAPER.to_vec());

        let answer = router
            .ask(AskRequest::new(b"%PDF".to_vec(), "Can you summarize this document?"))
            .await?;

        let calls = router.gateway().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt.message, "Can you summarize this document?");
        assert!(calls[0].prompt.system_message.contains(&PAPER.concat()));
        assert_eq!(
            answer,
            Answer::Overview {
                answer: "answer 1".to_string(),
                content: FULL_CONTENT_DISCLOSURE.to_string(),
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn page_questions_call_once_per_page_in_order() -> Result<(), AskError> {
        let router = QuestionRouter::with_extractor(
            RecordingGateway::default(),
            LopdfExtractor,
            AnswerOptions::default(),
        );
        let pdf = test_pdf::build(&["First page", "Second page", "Third page"]);

        let answer = router
            .ask(AskRequest::new(pdf, "Go through pages and explain"))
            .await?;

        let calls = router.gateway().calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[2]
            .prompt
            .system_message
            .starts_with("Analyze the following text from page 3 of a PDF document:"));

        let Answer::Pages { responses } = answer else {
            panic!("expected a page-by-page answer");
        };
        let numbers = responses.iter().map(|r| r.page_number).collect::<Vec<_>>();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(responses[1].answer, "answer 2");
        Ok(())
    }

    #[tokio::test]
    async fn page_failure_names_the_failing_page() {
        let router = router_over(RecordingGateway::failing_on(2), vec!["one", "two", "three"]);

        let error = router
            .ask(AskRequest::new(b"%PDF".to_vec(), "Explain each page"))
            .await
            .expect_err("second page should fail");

        assert!(matches!(error, AskError::Inference { page: Some(2), .. }));
        assert_eq!(error.kind(), ErrorKind::Internal);
        assert_eq!(router.gateway().calls().len(), 2);
    }

    #[tokio::test]
    async fn section_questions_answer_from_the_matched_section() -> Result<(), AskError> {
        let router = router_over(RecordingGateway::default(), PAPER.to_vec());

        let answer = router
            .ask(AskRequest::new(b"%PDF".to_vec(), "What does the Methodology section say?"))
            .await?;

        assert_eq!(
            answer,
            Answer::Section {
                answer: "answer 1".to_string(),
                section: "Methodology".to_string(),
                content: "A sample of ten pumps was tested.".to_string(),
            }
        );

        let calls = router.gateway().calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.system_message.contains("'Methodology' section"));
        Ok(())
    }

    #[tokio::test]
    async fn unmatched_section_questions_are_not_found() {
        let router = router_over(RecordingGateway::default(), PAPER.to_vec());

        let error = router
            .ask(AskRequest::new(b"%PDF".to_vec(), "Which turbine failed?"))
            .await
            .expect_err("no section mentions turbines");

        assert!(matches!(error, AskError::NotFound(_)));
        assert_eq!(error.kind().status_code(), 404);
        assert!(router.gateway().calls().is_empty());
    }

    #[tokio::test]
    async fn missing_inputs_are_rejected_before_decoding() {
        let router = router_over(RecordingGateway::default(), PAPER.to_vec());

        for request in [
            AskRequest::default(),
            AskRequest {
                pdf: Some(b"%PDF".to_vec()),
                question: Some("   ".to_string()),
            },
            AskRequest {
                pdf: Some(Vec::new()),
                question: Some("Summarize".to_string()),
            },
        ] {
            let error = router.ask(request).await.expect_err("input is incomplete");
            assert_eq!(error.kind(), ErrorKind::BadInput);
            assert_eq!(error.to_string(), MISSING_INPUT_MESSAGE);
        }
        assert!(router.gateway().calls().is_empty());
    }

    #[tokio::test]
    async fn oversized_pdfs_are_rejected() {
        let options = AnswerOptions {
            max_pdf_bytes: 4,
            ..AnswerOptions::default()
        };
        let router = QuestionRouter::with_extractor(RecordingGateway::default(), FixedPages(vec!["x"]), options);

        let error = router
            .ask(AskRequest::new(b"%PDF-1.7".to_vec(), "Summarize"))
            .await
            .expect_err("pdf exceeds the limit");
        assert_eq!(error.kind(), ErrorKind::BadInput);
    }

    #[tokio::test]
    async fn undecodable_pdfs_are_internal_failures() {
        let router = QuestionRouter::new(RecordingGateway::default());

        let error = router
            .ask(AskRequest::new(b"not a pdf".to_vec(), "Summarize"))
            .await
            .expect_err("bytes are not a pdf");

        assert!(matches!(error, AskError::Decode(ExtractError::PdfParse(_))));
        assert_eq!(error.kind(), ErrorKind::Internal);
        assert!(router.gateway().calls().is_empty());
    }

    #[tokio::test]
    async fn generation_params_travel_with_every_call() -> Result<(), AskError> {
        let router = router_over(RecordingGateway::default(), vec!["a", "b"]);

        router
            .ask(AskRequest::new(b"%PDF".to_vec(), "Explain page by page"))
            .await?;

        for call in router.gateway().calls() {
            assert_eq!(call.params, router.options().params);
        }
        Ok(())
    }
}
