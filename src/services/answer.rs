use std::cmp::Reverse;
use std::collections::HashSet;

use super::faq_store::FaqRecord;

/// Streamed when no FAQ record matches the question.
pub const NO_MATCH_REPLY: &str = "Sorry, I don't have an answer for that yet. \
Try asking about NTUST, its campus, colleges or departments.";

const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "at", "be", "can", "do", "does", "for", "how", "is", "it",
    "its", "me", "of", "on", "or", "tell", "the", "to", "was", "what", "which", "you",
];

/// Lower-cased words of `text`, minus stop words and single ASCII letters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .filter(|word| !word.is_ascii() || word.len() > 1)
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct MatchScore {
    question_hits: usize,
    unmatched: Reverse<usize>,
    answer_hits: usize,
}

impl MatchScore {
    fn is_match(&self) -> bool {
        self.question_hits > 0 || self.answer_hits > 0
    }
}

fn score(record: &FaqRecord, query: &HashSet<String>) -> MatchScore {
    let question: HashSet<String> = tokenize(&record.question).into_iter().collect();
    let answer: HashSet<String> = tokenize(&record.answer).into_iter().collect();

    let question_hits = query.intersection(&question).count();
    MatchScore {
        question_hits,
        unmatched: Reverse(question.len() - question_hits),
        answer_hits: query.intersection(&answer).count(),
    }
}

/// Pick the record that best answers `query`.
///
/// Ranked by query words found in the question, then by how few question
/// words went unmatched, then by query words found in the answer. Ties keep
/// the earlier record.
pub fn best_match<'a>(records: &'a [FaqRecord], query: &str) -> Option<&'a FaqRecord> {
    let query: HashSet<String> = tokenize(query).into_iter().collect();
    if query.is_empty() {
        return None;
    }

    let mut best: Option<(MatchScore, &FaqRecord)> = None;
    for record in records {
        let candidate = score(record, &query);
        if !candidate.is_match() {
            continue;
        }
        if best.is_none_or(|(top, _)| candidate > top) {
            best = Some((candidate, record));
        }
    }
    best.map(|(_, record)| record)
}

/// Split a reply into word-sized chunks for streaming.
///
/// Concatenating the chunks gives back `text` exactly.
pub fn reply_chunks(text: &str) -> Vec<String> {
    text.split_inclusive(' ').map(str::to_owned).collect()
}
