use serde::{Deserialize, Serialize};

use crate::adapter::Question;

const STRICT_TERMINOLOGY_PREFIX: &str = "You are a senior practitioner of Traditional Chinese Medicine (TCM). \
Answer the following question using precise TCM terminology. \
Name acupuncture points by their standard code and pinyin (for example ST36 Zusanli), \
herbal formulas by pinyin and English name, and patterns by their classical name. \
Do not use colloquial or Western paraphrases where a TCM term exists. \
If the question falls outside TCM, say so briefly.\n\nQuestion: ";

const STRUCTURED_PATTERN_PREFIX: &str = "You are a Traditional Chinese Medicine (TCM) clinical advisor. \
Answer the following question in exactly three labelled sections:\n\
1. Pattern: the TCM pattern (syndrome differentiation) that best fits.\n\
2. Principle: the treatment principle derived from that pattern.\n\
3. Points: the recommended acupuncture points with their codes and a one-line rationale each.\n\
Keep each section short and clinically focused.\n\nQuestion: ";

const BRIEF_EXPERT_PREFIX: &str = "You are an expert in Traditional Chinese Medicine (TCM). \
Give a brief, direct expert answer of no more than a few sentences to the following. \
Mention the single most relevant pattern, point or herb when it applies.\n\n";

/// Instruction template placed in front of the user's question.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PromptStyle {
    StrictTerminology,
    StructuredPattern,
    BriefExpert,
}

impl PromptStyle {
    pub fn prefix(&self) -> &'static str {
        match self {
            PromptStyle::StrictTerminology => STRICT_TERMINOLOGY_PREFIX,
            PromptStyle::StructuredPattern => STRUCTURED_PATTERN_PREFIX,
            PromptStyle::BriefExpert => BRIEF_EXPERT_PREFIX,
        }
    }
}

/// Composes the prompt sent to the model. Pure: the same question and style always give the same string.
pub fn build_prompt(question: &Question, style: PromptStyle) -> String {
    let prefix = style.prefix();
    let mut prompt = String::with_capacity(prefix.len() + question.as_str().len());
    prompt.push_str(prefix);
    prompt.push_str(question.as_str());
    prompt
}
