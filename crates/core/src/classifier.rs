use crate::models::Intent;

pub struct IntentRule {
    pub intent: Intent,
    pub phrases: &'static [&'static str],
}

impl IntentRule {
    fn matches(&self, lowered_question: &str) -> bool {
        self.phrases
            .iter()
            .any(|phrase| lowered_question.contains(phrase))
    }
}

/// Evaluated top-down; the first rule with a matching phrase decides the intent.
pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::General,
        phrases: &[
            "summarize",
            "overview",
            "general",
            "conclusion",
            "purpose",
            "about",
            "content",
        ],
    },
    IntentRule {
        intent: Intent::PageByPage,
        phrases: &["page by page", "each page", "analyze page", "go through pages"],
    },
];

pub const FALLBACK_INTENT: Intent = Intent::SectionSpecific;

pub fn classify(question: &str) -> Intent {
    classify_with(INTENT_RULES, question)
}

pub fn classify_with(rules: &[IntentRule], question: &str) -> Intent {
    let lowered = question.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.intent)
        .unwrap_or(FALLBACK_INTENT)
}
