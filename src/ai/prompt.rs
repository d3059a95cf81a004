//! Generation Prompt Construction
//!
//! [`GenerationRequest`] is the read-only snapshot of constraints plus
//! vocabulary that one collaborator call is built from. It is rebuilt fresh
//! for every retry — never mutated in place — so a round always reflects
//! the constraints it was asked to satisfy.

use serde_json::json;

use crate::types::ConstraintSpec;
use crate::vocab::VocabularyIndex;

/// Snapshot of everything one generation call needs.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    spec: ConstraintSpec,
    words: Vec<String>,
    batch_size: usize,
}

impl GenerationRequest {
    pub fn new(spec: &ConstraintSpec, index: &VocabularyIndex, batch_size: usize) -> Self {
        Self {
            spec: spec.clone(),
            words: index.words().map(str::to_string).collect(),
            batch_size,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn spec(&self) -> &ConstraintSpec {
        &self.spec
    }

    /// Render the textual instruction sent to the collaborator.
    pub fn render(&self) -> String {
        let glue_verbs = self.spec.glue_verbs().join(", ");
        let numeral_rule = if self.spec.numerals_allowed() {
            "Digits may appear only when they are listed in the allowed vocabulary.".to_string()
        } else {
            "Never use digits or numerals.".to_string()
        };

        let example = json!({
            "sentences": [
                {
                    "text": "La doctora está aquí.",
                    "clozes": ["doctora"],
                    "english_gloss": "The doctor is here."
                }
            ]
        });

        PromptBuilder::new()
            .role(
                "You are a Spanish tutor for absolute beginners",
                &format!(
                    "write {} very simple Spanish ({}) sentences for cloze flashcards",
                    self.batch_size,
                    self.spec.language()
                ),
            )
            .objectives(vec![
                format!(
                    "Each sentence has between {} and {} words.",
                    self.spec.min_words(),
                    self.spec.max_words()
                ),
                format!(
                    "Use ONLY words from the allowed vocabulary below, plus articles, \
                     basic pronouns, and present-tense forms of these verbs: {glue_verbs}."
                ),
                "Present tense only. Keep grammar correct, including gender and number \
                 agreement between nouns, articles, and adjectives."
                    .to_string(),
                format!(
                    "Mark {} to {} words per sentence as cloze targets; every target must \
                     appear verbatim in its sentence.",
                    self.spec.cloze_min(),
                    self.spec.cloze_max()
                ),
                "Give a short English gloss for each sentence.".to_string(),
                numeral_rule,
            ])
            .section("Allowed vocabulary", &self.words.join(", "))
            .section(
                "Output format",
                &format!(
                    "Respond with exactly this JSON shape and nothing else:\n{}",
                    serde_json::to_string_pretty(&example).unwrap_or_default()
                ),
            )
            .section(
                "Do not",
                "- use any word outside the allowed vocabulary and the glue sets\n\
                 - add commentary, markdown fences, or fields beyond the schema\n\
                 - repeat the same sentence twice",
            )
            .build()
    }
}

// =============================================================================
// Prompt Builder
// =============================================================================

/// Minimal section-based prompt builder for consistent instruction
/// structure across retries.
#[derive(Debug, Default)]
struct PromptBuilder {
    sections: Vec<String>,
}

impl PromptBuilder {
    fn new() -> Self {
        Self::default()
    }

    fn role(mut self, who: &str, task: &str) -> Self {
        self.sections.push(format!("{who}. Your task: {task}."));
        self
    }

    fn objectives(mut self, objectives: Vec<String>) -> Self {
        let numbered: Vec<String> = objectives
            .iter()
            .enumerate()
            .map(|(i, o)| format!("{}. {}", i + 1, o))
            .collect();
        self.sections
            .push(format!("## Rules\n{}", numbered.join("\n")));
        self
    }

    fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(format!("## {header}\n{content}"));
        self
    }

    fn build(self) -> String {
        self.sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        let spec = ConstraintSpec::default();
        let index = VocabularyIndex::from_words(vec!["arcilla", "doctora", "aquí"]).unwrap();
        GenerationRequest::new(&spec, &index, 5)
    }

    #[test]
    fn test_render_includes_vocabulary_and_bounds() {
        let prompt = request().render();
        assert!(prompt.contains("arcilla, doctora, aquí"));
        assert!(prompt.contains("between 4 and 7 words"));
        assert!(prompt.contains("1 to 2 words"));
    }

    #[test]
    fn test_render_names_glue_verbs() {
        let prompt = request().render();
        assert!(prompt.contains("ser, estar, tener, haber, ir, ver, querer"));
    }

    #[test]
    fn test_render_numeral_rule_follows_spec() {
        let prompt = request().render();
        assert!(prompt.contains("Never use digits"));

        let spec = ConstraintSpec::default().with_numerals_allowed();
        let index = VocabularyIndex::from_words(vec!["24"]).unwrap();
        let prompt = GenerationRequest::new(&spec, &index, 5).render();
        assert!(prompt.contains("listed in the allowed vocabulary"));
    }

    #[test]
    fn test_request_is_a_snapshot() {
        let req = request();
        assert_eq!(req.batch_size(), 5);
        assert_eq!(req.spec().max_words(), 7);
    }
}
