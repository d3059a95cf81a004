//! Gender/Number Agreement Check
//!
//! A fixed agreement table, not a parser: for every noun the vocabulary
//! recognizes (with recorded gender), adjacent articles and adjectives must
//! carry the matching gender/number form. Adjective forms are derived from
//! the stored lemma by the regular -o/-a inflection plus -s/-es plurals;
//! forms the table cannot derive are not flagged, so the check only reports
//! mismatches it can prove.

use crate::types::{Violation, ViolationKind};
use crate::vocab::{Category, Gender, Number, VocabularyIndex};

use super::tokens::is_article;

/// Scan adjacent article/adjective positions around every recognized noun.
/// Returns the first mismatch found, in token order.
pub fn check_agreement(tokens: &[String], index: &VocabularyIndex) -> Option<Violation> {
    for (i, token) in tokens.iter().enumerate() {
        let Some(resolved) = index.resolve(token) else {
            continue;
        };
        if resolved.entry.category != Category::Noun {
            continue;
        }
        // Agreement is only checkable when the noun's gender is recorded.
        let Some(gender) = resolved.entry.gender else {
            continue;
        };
        let number = resolved.number;

        if i > 0 {
            let prev = &tokens[i - 1];
            if is_article(prev) && !article_agrees(prev, gender, number) {
                return Some(
                    Violation::new(
                        ViolationKind::Agreement,
                        format!(
                            "article \"{prev}\" does not agree with {} noun \"{token}\"",
                            describe(gender, number)
                        ),
                    )
                    .with_token(prev.clone()),
                );
            }
            if let Some(violation) = check_adjective(prev, token, gender, number, index) {
                return Some(violation);
            }
        }

        if let Some(next) = tokens.get(i + 1)
            && let Some(violation) = check_adjective(next, token, gender, number, index)
        {
            return Some(violation);
        }
    }

    None
}

/// Check one neighbor of a noun: if the vocabulary knows it as an
/// adjective, its surface form must match the derived agreement form.
fn check_adjective(
    neighbor: &str,
    noun: &str,
    gender: Gender,
    number: Number,
    index: &VocabularyIndex,
) -> Option<Violation> {
    let resolved = index.resolve(neighbor)?;
    if resolved.entry.category != Category::Adjective {
        return None;
    }

    let expected = expected_adjective_form(&resolved.entry.word, gender, number);
    if neighbor.to_lowercase() == expected {
        return None;
    }

    Some(
        Violation::new(
            ViolationKind::Agreement,
            format!(
                "adjective \"{neighbor}\" does not agree with {} noun \"{noun}\" (expected \"{expected}\")",
                describe(gender, number)
            ),
        )
        .with_token(neighbor.to_string()),
    )
}

/// The fixed article table.
fn article_agrees(article: &str, gender: Gender, number: Number) -> bool {
    let article = article.to_lowercase();
    let allowed: [&str; 2] = match (gender, number) {
        (Gender::Masculine, Number::Singular) => ["el", "un"],
        (Gender::Feminine, Number::Singular) => ["la", "una"],
        (Gender::Masculine, Number::Plural) => ["los", "unos"],
        (Gender::Feminine, Number::Plural) => ["las", "unas"],
    };
    allowed.contains(&article.as_str())
}

/// Derive the agreement form of an adjective lemma.
///
/// Lemmas ending in -o/-a inflect for gender; anything else (-e, consonant)
/// is gender-invariable. Plurals append -s after a vowel, -es otherwise.
fn expected_adjective_form(lemma: &str, gender: Gender, number: Number) -> String {
    let base = if let Some(stem) = lemma.strip_suffix(['o', 'a']) {
        match gender {
            Gender::Masculine => format!("{stem}o"),
            Gender::Feminine => format!("{stem}a"),
        }
    } else {
        lemma.to_string()
    };

    match number {
        Number::Singular => base,
        Number::Plural => {
            if base.ends_with(['a', 'e', 'i', 'o', 'u']) {
                format!("{base}s")
            } else {
                format!("{base}es")
            }
        }
    }
}

fn describe(gender: Gender, number: Number) -> &'static str {
    match (gender, number) {
        (Gender::Masculine, Number::Singular) => "masculine singular",
        (Gender::Feminine, Number::Singular) => "feminine singular",
        (Gender::Masculine, Number::Plural) => "masculine plural",
        (Gender::Feminine, Number::Plural) => "feminine plural",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::VocabularyEntry;

    fn index() -> VocabularyIndex {
        VocabularyIndex::build(vec![
            VocabularyEntry::new("arcilla", Category::Noun).with_gender(Gender::Feminine),
            VocabularyEntry::new("doctora", Category::Noun).with_gender(Gender::Feminine),
            VocabularyEntry::new("libro", Category::Noun).with_gender(Gender::Masculine),
            VocabularyEntry::new("rojo", Category::Adjective),
            VocabularyEntry::new("azul", Category::Adjective),
            VocabularyEntry::new("agua", Category::Noun),
        ])
        .unwrap()
    }

    fn toks(s: &str) -> Vec<String> {
        super::super::tokens::tokenize(s)
    }

    #[test]
    fn test_matching_article_passes() {
        assert!(check_agreement(&toks("La arcilla está aquí"), &index()).is_none());
        assert!(check_agreement(&toks("Un libro rojo"), &index()).is_none());
    }

    #[test]
    fn test_mismatched_article_flagged() {
        let violation = check_agreement(&toks("El arcilla está aquí"), &index()).unwrap();
        assert_eq!(violation.kind, ViolationKind::Agreement);
        assert_eq!(violation.token.as_deref(), Some("El"));
    }

    #[test]
    fn test_plural_article() {
        assert!(check_agreement(&toks("Las doctoras"), &index()).is_none());
        assert!(check_agreement(&toks("Los doctoras"), &index()).is_some());
    }

    #[test]
    fn test_adjective_gender_inflection() {
        assert!(check_agreement(&toks("La arcilla roja"), &index()).is_none());

        let violation = check_agreement(&toks("La arcilla rojo"), &index()).unwrap();
        assert!(violation.detail.contains("expected \"roja\""));
    }

    #[test]
    fn test_invariable_adjective() {
        assert!(check_agreement(&toks("El libro azul"), &index()).is_none());
        assert!(check_agreement(&toks("Los libros azules"), &index()).is_none());

        let violation = check_agreement(&toks("Los libros azul"), &index()).unwrap();
        assert!(violation.detail.contains("expected \"azules\""));
    }

    #[test]
    fn test_adjective_before_noun() {
        assert!(check_agreement(&toks("La roja arcilla"), &index()).is_none());
        assert!(check_agreement(&toks("La rojo arcilla"), &index()).is_some());
    }

    #[test]
    fn test_noun_without_gender_skipped() {
        // "agua" has no recorded gender, so nothing can be proven.
        assert!(check_agreement(&toks("El agua"), &index()).is_none());
    }
}
