use std::sync::OnceLock;

use regex::Regex;

use super::markers::Marker;

const PREPOSITIVE_ABBREVIATIONS: [&str; 5] = ["dr", "mr", "ms", "mt", "st"];
const NUMBER_ABBREVIATIONS: [&str; 2] = ["no", "px"];

/// Cascade stages, in the order they run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Numbers,
    Abbreviations,
    Punctuation,
    Geolocations,
    MultiplePeriods,
    Ellipsis,
    BetweenPunctuation,
    QuotedQuestion,
    Exclamation,
    BasicBreakers,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::Numbers,
        Stage::Abbreviations,
        Stage::Punctuation,
        Stage::Geolocations,
        Stage::MultiplePeriods,
        Stage::Ellipsis,
        Stage::BetweenPunctuation,
        Stage::QuotedQuestion,
        Stage::Exclamation,
        Stage::BasicBreakers,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Numbers => "numbers",
            Stage::Abbreviations => "abbreviations",
            Stage::Punctuation => "punctuation",
            Stage::Geolocations => "geolocations",
            Stage::MultiplePeriods => "multiple_periods",
            Stage::Ellipsis => "ellipsis",
            Stage::BetweenPunctuation => "between_punctuation",
            Stage::QuotedQuestion => "quoted_question",
            Stage::Exclamation => "exclamation",
            Stage::BasicBreakers => "basic_breakers",
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum Action {
    Replace(Marker),
    ReplaceWithBreak(Marker),
    AppendBreak,
    Protect,
}

impl Action {
    fn write(&self, out: &mut String, matched: &str) {
        match self {
            Action::Replace(m) => out.push(m.ch()),
            Action::ReplaceWithBreak(m) => {
                out.push(m.ch());
                out.push(Marker::Break.ch());
            }
            Action::AppendBreak => {
                out.push_str(matched);
                out.push(Marker::Break.ch());
            }
            Action::Protect => {
                out.push(Marker::ProtectOpen.ch());
                out.push_str(matched);
                out.push(Marker::ProtectClose.ch());
            }
        }
    }
}

#[derive(Debug)]
enum Ahead {
    Any,
    Must(Regex),
    // drop one trailing '.' from the match when the rest of the text matches
    BackOffPeriod(Regex),
}

/// One step of the cascade: a target pattern plus the context it must sit in.
///
/// `behind` is checked against everything before the target, `ahead` against
/// everything after it. Neither is consumed, so targets can sit back to back
/// the way zero-width lookarounds allow.
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub stage: Stage,
    behind: Option<Regex>,
    target: Regex,
    ahead: Ahead,
    action: Action,
}

impl Rule {
    fn new(name: &'static str, stage: Stage, target: &str, action: Action) -> Self {
        Rule {
            name,
            stage,
            behind: None,
            target: compile(target),
            ahead: Ahead::Any,
            action,
        }
    }

    fn behind(mut self, pat: &str) -> Self {
        self.behind = Some(compile(&format!(r"(?:{pat})\z")));
        self
    }

    fn ahead(mut self, pat: &str) -> Self {
        self.ahead = Ahead::Must(compile(&format!(r"\A(?:{pat})")));
        self
    }

    fn back_off_period(mut self, pat: &str) -> Self {
        self.ahead = Ahead::BackOffPeriod(compile(&format!(r"\A(?:{pat})")));
        self
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Rewrites every accepted occurrence of the target in one pass.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 16);
        let mut last = 0usize;
        let mut pos = 0usize;

        while pos < text.len() {
            let Some(m) = self.target.find_at(text, pos) else { break };
            match self.accept(text, m.start(), m.end()) {
                Some(end) => {
                    out.push_str(&text[last..m.start()]);
                    self.action.write(&mut out, &text[m.start()..end]);
                    last = end;
                    pos = end.max(next_char(text, m.start()));
                }
                // rejected: retry one char further, like a lookaround miss would
                None => pos = next_char(text, m.start()),
            }
        }
        out.push_str(&text[last..]);
        out
    }

    fn accept(&self, text: &str, start: usize, end: usize) -> Option<usize> {
        if let Some(b) = &self.behind {
            if !b.is_match(&text[..start]) {
                return None;
            }
        }
        match &self.ahead {
            Ahead::Any => Some(end),
            Ahead::Must(re) => re.is_match(&text[end..]).then_some(end),
            Ahead::BackOffPeriod(re) => {
                if text[start..end].ends_with('.') && re.is_match(&text[end..]) {
                    Some(end - 1)
                } else {
                    Some(end)
                }
            }
        }
    }
}

fn compile(pat: &str) -> Regex {
    Regex::new(pat).unwrap_or_else(|e| panic!("invalid boundary rule pattern {pat:?}: {e}"))
}

fn next_char(text: &str, i: usize) -> usize {
    text[i..].chars().next().map(|c| i + c.len_utf8()).unwrap_or(text.len())
}

/// The full ordered cascade. Compiled once per process.
pub fn cascade() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(build)
}

pub fn rules_for(stage: Stage) -> impl Iterator<Item = &'static Rule> {
    cascade().iter().filter(move |r| r.stage == stage)
}

fn build() -> Vec<Rule> {
    use Action::*;
    use Stage::*;

    let pabb = PREPOSITIVE_ABBREVIATIONS.join("|");
    let nubb = NUMBER_ABBREVIATIONS.join("|");
    let num = Replace(Marker::Number);
    let abbr = Replace(Marker::Abbreviation);

    vec![
        // decimals, leading-dot numbers, "1." list markers
        Rule::new("decimal", Numbers, r"\.", num).behind(r"\d").ahead(r"\d"),
        Rule::new("dot_before_digit", Numbers, r"\.", num).ahead(r"\d"),
        Rule::new("digit_dot_glued", Numbers, r"\.", num).behind(r"\d").ahead(r"\S"),
        Rule::new("list_number", Numbers, r"\.", num).behind(r"^\d").ahead(r"\s\S|\)"),
        Rule::new("list_number_2", Numbers, r"\.", num).behind(r"^\d\d").ahead(r"\s\S|\)"),
        // "U.S.", "e.g." and friends; the last period stays breakable before a capital
        Rule::new("initialism", Abbreviations, r"\b[a-zA-Z](?:\.[a-zA-Z])+\.*", Protect)
            .back_off_period(r"\s\p{Lu}"),
        Rule::new("pm", Abbreviations, r"(?i)p\.m\.*", Protect),
        Rule::new("am", Abbreviations, r"(?i)a\.m\.", Protect),
        Rule::new("possessive", Abbreviations, r"\.", abbr).ahead(r"'s(?:\s|\$|\z)"),
        Rule::new("company_kg", Abbreviations, r"\.", abbr).behind("Co").ahead(r"\sKG"),
        Rule::new("leading_initial", Abbreviations, r"\.", abbr).behind(r"^[A-Z]").ahead(r"\s"),
        Rule::new("initial", Abbreviations, r"\.", abbr).behind(r"\s[A-Z]").ahead(r"\s"),
        Rule::new("prepositive", Abbreviations, r"\.", abbr)
            .behind(&format!(r"(?:^|\s)(?i:{pabb})"))
            .ahead(r"\s|\d"),
        Rule::new("number_abbreviation", Abbreviations, r"\.", abbr)
            .behind(&format!(r"(?:^|\s)(?i:{nubb})"))
            .ahead(r"\s*\d|:?\s+\("),
        Rule::new("terminal_run", Punctuation, r"[!?]+", AppendBreak)
            .behind(r"\S")
            .ahead(r"\s|\z|\$"),
        Rule::new("degree", Geolocations, r"\.", Replace(Marker::MultiPeriod))
            .behind(r"[a-zA-Z]°")
            .ahead(r"\s*\d"),
        Rule::new("inner_period", MultiplePeriods, r"\.", Replace(Marker::MultiPeriod))
            .behind(r"\w")
            .ahead(r"\w"),
        Rule::new("ellipsis_break", Ellipsis, r"\.\.\.", ReplaceWithBreak(Marker::Ellipsis))
            .ahead(r"\s+\p{Lu}"),
        Rule::new("ellipsis_before_period", Ellipsis, r"\.{3}", ReplaceWithBreak(Marker::Ellipsis))
            .behind(r"\S")
            .ahead(r"\.\s\p{Lu}"),
        Rule::new("ellipsis_continued", Ellipsis, r"\.\.\.", Replace(Marker::Ellipsis)),
        // BetweenPunctuation intentionally has no rules: quoted and bracketed
        // spans are left to the later stages.
        Rule::new("question_in_quote", QuotedQuestion, r"\?", Replace(Marker::QuestionInQuote))
            .ahead(r#"['"]"#),
        Rule::new("exclamation_inline", Exclamation, "!", Replace(Marker::ExclamationInQuote))
            .ahead(r#"['"]|,\s[a-z]|\s[a-z]"#),
        Rule::new("period", BasicBreakers, r"\.", ReplaceWithBreak(Marker::Dot)),
        Rule::new("semicolon", BasicBreakers, ";", ReplaceWithBreak(Marker::Semicolon)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_stage(stage: Stage, text: &str) -> String {
        rules_for(stage).fold(text.to_string(), |acc, r| r.apply(&acc))
    }

    fn show(text: &str) -> String {
        text.chars()
            .map(|c| match Marker::from_char(c) {
                Some(Marker::Break) => "|".to_string(),
                Some(Marker::ProtectOpen) => "[".to_string(),
                Some(Marker::ProtectClose) => "]".to_string(),
                Some(Marker::Number) => "#".to_string(),
                Some(Marker::Abbreviation) => "~".to_string(),
                Some(Marker::MultiPeriod) => "*".to_string(),
                Some(Marker::Ellipsis) => "…".to_string(),
                Some(Marker::Dot) => ".".to_string(),
                Some(m) => format!("<{m:?}>"),
                None => c.to_string(),
            })
            .collect()
    }

    #[test]
    fn stages_are_ordered_as_declared() {
        let mut last = 0;
        for rule in cascade() {
            let idx = Stage::ALL.iter().position(|s| *s == rule.stage).unwrap();
            assert!(idx >= last, "rule {} out of order", rule.name);
            last = idx;
        }
        assert_eq!(rules_for(Stage::BetweenPunctuation).count(), 0);
    }

    #[test]
    fn numbers_tag_decimals_and_list_markers() {
        assert_eq!(show(&run_stage(Stage::Numbers, "It was 3.5 mg.")), "It was 3#5 mg.");
        assert_eq!(show(&run_stage(Stage::Numbers, "1. Intro")), "1# Intro");
        assert_eq!(show(&run_stage(Stage::Numbers, "about .5 of it")), "about #5 of it");
        assert_eq!(show(&run_stage(Stage::Numbers, "was 5. Then")), "was 5. Then");
    }

    #[test]
    fn adjacent_targets_share_context() {
        // both periods need a digit on each side; the middle digit serves twice
        assert_eq!(show(&run_stage(Stage::Numbers, "1.2.3")), "1#2#3");
        assert_eq!(show(&run_stage(Stage::MultiplePeriods, "a.b.c")), "a*b*c");
    }

    #[test]
    fn initialism_backs_off_before_capital() {
        let out = show(&run_stage(Stage::Abbreviations, "at 5 p.m. It rained"));
        assert_eq!(out, "at 5 [[p.m]]. It rained");
        let out = show(&run_stage(Stage::Abbreviations, "the U.S. army"));
        assert_eq!(out, "the [U.S.] army");
        let out = show(&run_stage(Stage::Abbreviations, "in the U.S. Österreich"));
        assert_eq!(out, "in the [U.S]. Österreich");
    }

    #[test]
    fn titles_tagged_at_start_and_after_space() {
        let out = show(&run_stage(Stage::Abbreviations, "Dr. Who met Mr. X and st. 4"));
        assert_eq!(out, "Dr~ Who met Mr~ X and st~ 4");
        // a word merely ending in a title is not a title
        let out = show(&run_stage(Stage::Abbreviations, "the first. Next"));
        assert_eq!(out, "the first. Next");
    }

    #[test]
    fn number_abbreviation_needs_digits_or_parenthesis() {
        assert_eq!(show(&run_stage(Stage::Abbreviations, "No. 5 won")), "No~ 5 won");
        assert_eq!(show(&run_stage(Stage::Abbreviations, "see no. (a)")), "see no~ (a)");
        assert_eq!(show(&run_stage(Stage::Abbreviations, "said no. Then")), "said no. Then");
    }

    #[test]
    fn terminal_run_appends_break() {
        let out = show(&run_stage(Stage::Punctuation, "Really?! Yes? ok"));
        assert_eq!(out, "Really?!| Yes?| ok");
        let out = show(&run_stage(Stage::Punctuation, "why?\""));
        assert_eq!(out, "why?\"");
    }

    #[test]
    fn ellipsis_breaks_only_before_capital() {
        assert_eq!(show(&run_stage(Stage::Ellipsis, "wait... Then")), "wait…| Then");
        assert_eq!(show(&run_stage(Stage::Ellipsis, "wait... then")), "wait… then");
        assert_eq!(show(&run_stage(Stage::Ellipsis, "résumé... Über")), "résumé…| Über");
    }

    #[test]
    fn rejected_candidate_retries_one_char_later() {
        // first three dots fail the lookahead, dots 2..4 pass
        assert_eq!(show(&run_stage(Stage::Ellipsis, "so.... Then")), "so.…| Then");
    }

    #[test]
    fn basic_breakers_mark_every_remaining_period() {
        let out = show(&run_stage(Stage::BasicBreakers, "a. b; c"));
        assert_eq!(out, "a.| b<Semicolon>| c");
    }
}
