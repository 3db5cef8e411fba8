use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

const MIN_KEYWORD_CHARS: usize = 3;

/// Clitics split off a word before filtering, so "what's" yields "what" and "'s".
const CONTRACTION_SUFFIXES: [&str; 7] = ["n't", "'s", "'re", "'ve", "'ll", "'d", "'m"];

/// Standard English stopword list (the NLTK corpus).
pub const ENGLISH_STOPWORDS: [&str; 179] = [
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

static STOPWORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ENGLISH_STOPWORDS.iter().copied().collect());

static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}_]+(?:['’\-][\p{L}\p{N}_]+)*").expect("word pattern is valid")
});

/// Lowercased question terms minus stopwords and tokens of two characters or fewer.
///
/// Order and duplicates are kept.
pub fn extract_keywords(question: &str) -> Vec<String> {
    WORD_RE
        .find_iter(question)
        .flat_map(|token| split_contraction(token.as_str().to_lowercase().replace('’', "'")))
        .filter(|token| token.chars().count() >= MIN_KEYWORD_CHARS)
        .filter(|token| !STOPWORDS.contains(token.as_str()))
        .collect()
}

fn split_contraction(token: String) -> Vec<String> {
    CONTRACTION_SUFFIXES
        .iter()
        .find_map(|suffix| {
            token
                .strip_suffix(suffix)
                .filter(|stem| !stem.is_empty())
                .map(|stem| vec![stem.to_string(), (*suffix).to_string()])
        })
        .unwrap_or_else(|| vec![token])
}
