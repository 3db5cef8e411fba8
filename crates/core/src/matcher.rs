use crate::models::{Section, SectionMap};

/// First section, in document order, whose title or content contains any keyword.
///
/// No scoring: an earlier weak match beats a later strong one.
pub fn find_relevant_section<'a, S: AsRef<str>>(
    sections: &'a SectionMap,
    keywords: &[S],
) -> Option<&'a Section> {
    if keywords.is_empty() {
        return None;
    }

    let keywords = keywords
        .iter()
        .map(|keyword| keyword.as_ref().to_lowercase())
        .collect::<Vec<_>>();

    sections.iter().find(|section| {
        let title = section.title.to_lowercase();
        let content = section.content.to_lowercase();
        keywords
            .iter()
            .any(|keyword| title.contains(keyword.as_str()) || content.contains(keyword.as_str()))
    })
}
