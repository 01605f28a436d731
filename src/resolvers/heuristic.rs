//! Last-resort heuristic: a literal `answer: N` token somewhere on the page.

use super::{Resolution, Resolver};
use crate::answer::Answer;
use crate::corpus::Corpus;
use async_trait::async_trait;
use regex::Regex;

/// Scans the joined corpus for an explicit `answer` token with digits.
pub struct HeuristicResolver;

#[async_trait]
impl Resolver for HeuristicResolver {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn resolve(&self, corpus: &Corpus) -> Resolution {
        let answer_re =
            Regex::new(r"(?i)answer[:\s]*([0-9]{1,12})").expect("answer token regex is valid");

        match answer_re
            .captures(corpus.joined())
            .and_then(|cap| cap[1].parse::<i64>().ok())
        {
            Some(n) => Resolution::resolved(Answer::Integer(n)),
            None => Resolution::no_match(),
        }
    }
}
