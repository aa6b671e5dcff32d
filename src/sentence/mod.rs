//! Rule-cascade sentence boundary detection.
//!
//! Text goes through an ordered list of [`rules::Rule`]s that tag punctuation
//! with reserved marker characters ([`markers::Marker`]); [`split::recover`]
//! then cuts on the unprotected breaks and puts the punctuation back.

pub mod markers;
pub mod rules;
pub mod split;

use tracing::{debug, warn};

pub use markers::Marker;
pub use rules::{Rule, Stage};

/// Run the whole cascade over `text`. Total: never fails.
pub fn mark_boundaries(text: &str) -> String {
    rules::cascade()
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// Run only the rules of one stage; handy for inspecting the cascade.
pub fn mark_stage(text: &str, stage: Stage) -> String {
    rules::rules_for(stage).fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// Split text into trimmed, non-empty sentences in input order.
///
/// Blank input yields an empty list rather than an error.
pub fn split_sentences(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        debug!("blank input text, no sentences");
        return Vec::new();
    }
    if markers::contains_reserved(text) {
        warn!(len = text.len(), "input contains reserved marker code points; splits may be wrong");
    }
    let marked = mark_boundaries(text);
    let sentences = split::recover(&marked);
    debug!(sentences = sentences.len(), "split sentences");
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squash(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn titles_decimals_and_times() {
        let got = split_sentences(
            "Dr. Smith met Mr. Jones at 3.5 p.m. It was raining. The meeting ended.",
        );
        assert_eq!(
            got,
            vec![
                "Dr. Smith met Mr. Jones at 3.5 p.m.",
                "It was raining.",
                "The meeting ended.",
            ]
        );
    }

    #[test]
    fn blank_input_gives_nothing() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n\t ").is_empty());
    }

    #[test]
    fn p_values_and_semicolons() {
        let got = split_sentences("The p-value was less than 0.05. Effects were small; others were not.");
        assert_eq!(
            got,
            vec!["The p-value was less than 0.05.", "Effects were small;", "others were not."]
        );
    }

    #[test]
    fn initials_and_initialisms_do_not_split() {
        let got = split_sentences("J. Smith and A. B. Jones wrote it. The U.S. government agreed. Talks ended.");
        assert_eq!(
            got,
            vec![
                "J. Smith and A. B. Jones wrote it.",
                "The U.S. government agreed.",
                "Talks ended.",
            ]
        );
    }

    #[test]
    fn question_and_exclamation_end_sentences() {
        let got = split_sentences("Is it true? Yes! It is.");
        assert_eq!(got, vec!["Is it true?", "Yes!", "It is."]);
    }

    #[test]
    fn quoted_punctuation_stays_inside() {
        let got = split_sentences("He asked \"why?\" and left. \"Stop!\" she said.");
        assert_eq!(got, vec!["He asked \"why?\" and left.", "\"Stop!\" she said."]);
    }

    #[test]
    fn ellipsis_policy() {
        assert_eq!(
            split_sentences("He paused... Then he spoke."),
            vec!["He paused...", "Then he spoke."]
        );
        assert_eq!(
            split_sentences("He paused... and then spoke."),
            vec!["He paused... and then spoke."]
        );
    }

    #[test]
    fn domains_numbers_and_units() {
        assert_eq!(
            split_sentences("Visit www.example.com for details. No. 5 was best. Station N°. 12 was used."),
            vec![
                "Visit www.example.com for details.",
                "No. 5 was best.",
                "Station N°. 12 was used.",
            ]
        );
    }

    #[test]
    fn numbered_list_marker_at_start() {
        assert_eq!(split_sentences("1. Patients were enrolled."), vec!["1. Patients were enrolled."]);
    }

    #[test]
    fn recovery_keeps_every_character_and_no_markers() {
        let texts = [
            "Dr. Smith met Mr. Jones at 3.5 p.m. It was raining.",
            "Results (n = 12) were mixed; see Fig. 2. Wow! that was odd... Really?",
            "BACKGROUND:\nCancer is common.\n\nMETHODS:\nWe used e.g. CRISPR at 37°C. Done.",
            "Unicode — «quoted» text… with ümlauts. Ça va? Oui.",
        ];
        for text in texts {
            let sentences = split_sentences(text);
            assert!(!sentences.is_empty());
            for s in &sentences {
                assert!(!markers::contains_reserved(s), "marker leaked into {s:?}");
                assert_eq!(s.trim(), s);
            }
            assert_eq!(squash(&sentences.join(" ")), squash(text));
        }
    }

    #[test]
    fn ellipsis_breaks_before_non_ascii_capital() {
        assert_eq!(split_sentences("Sein résumé... Über alles."), vec!["Sein résumé...", "Über alles."]);
    }

    #[test]
    fn stage_helper_matches_full_cascade_prefix() {
        let text = "It was 3.5 mg.";
        let numbers = mark_stage(text, Stage::Numbers);
        assert!(numbers.contains(Marker::Number.ch()));
        assert!(!numbers.contains(Marker::Break.ch()));
        assert!(mark_boundaries(text).ends_with(Marker::Break.ch()));
    }
}
