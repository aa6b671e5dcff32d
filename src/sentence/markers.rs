// Reserved private-use code points. Input text containing any of these is
// not rejected; it just produces false splits.

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    Break,
    Dot,
    Semicolon,
    Question,
    Exclamation,
    Abbreviation,
    Number,
    MultiPeriod,
    QuestionInQuote,
    ExclamationInQuote,
    Ellipsis,
    ProtectOpen,
    ProtectClose,
}

pub const ALL: [Marker; 13] = [
    Marker::Break,
    Marker::Dot,
    Marker::Semicolon,
    Marker::Question,
    Marker::Exclamation,
    Marker::Abbreviation,
    Marker::Number,
    Marker::MultiPeriod,
    Marker::QuestionInQuote,
    Marker::ExclamationInQuote,
    Marker::Ellipsis,
    Marker::ProtectOpen,
    Marker::ProtectClose,
];

impl Marker {
    pub const fn ch(self) -> char {
        match self {
            Marker::Break => '\u{F050}',
            Marker::Dot => '\u{F051}',
            Marker::Semicolon => '\u{F052}',
            Marker::Question => '\u{F053}',
            Marker::Exclamation => '\u{F054}',
            Marker::Abbreviation => '\u{F055}',
            Marker::Number => '\u{F056}',
            Marker::MultiPeriod => '\u{F057}',
            Marker::QuestionInQuote => '\u{F058}',
            Marker::ExclamationInQuote => '\u{F059}',
            Marker::Ellipsis => '\u{F05A}',
            Marker::ProtectOpen => '\u{F05B}',
            Marker::ProtectClose => '\u{F05C}',
        }
    }

    /// Original punctuation a marker stands for (empty for structural markers).
    pub const fn restore(self) -> &'static str {
        match self {
            Marker::Break | Marker::ProtectOpen | Marker::ProtectClose => "",
            Marker::Dot | Marker::Abbreviation | Marker::Number | Marker::MultiPeriod => ".",
            Marker::Semicolon => ";",
            Marker::Question | Marker::QuestionInQuote => "?",
            Marker::Exclamation | Marker::ExclamationInQuote => "!",
            Marker::Ellipsis => "...",
        }
    }

    pub fn from_char(c: char) -> Option<Marker> {
        ALL.iter().copied().find(|m| m.ch() == c)
    }
}

pub fn is_reserved(c: char) -> bool {
    ('\u{F050}'..='\u{F05C}').contains(&c)
}

pub fn contains_reserved(text: &str) -> bool {
    text.chars().any(is_reserved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_points_are_distinct_and_reserved() {
        for (i, a) in ALL.iter().enumerate() {
            assert!(is_reserved(a.ch()));
            assert_eq!(Marker::from_char(a.ch()), Some(*a));
            for b in ALL.iter().skip(i + 1) {
                assert_ne!(a.ch(), b.ch());
            }
        }
    }

    #[test]
    fn plain_text_has_no_reserved_chars() {
        assert!(!contains_reserved("Dr. Smith met Mr. Jones at 3.5 p.m. — ok… «quoted»"));
        assert!(contains_reserved("a\u{F050}b"));
    }
}
