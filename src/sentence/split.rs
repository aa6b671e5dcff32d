use super::markers::Marker;

/// Cut marked text on unprotected breaks and restore the original punctuation.
///
/// Breaks inside a protection span (spans may nest) are dropped without
/// splitting. Output is trimmed; blank pieces are skipped.
pub fn recover(marked: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::with_capacity(marked.len().min(512));
    let mut depth = 0usize;

    for c in marked.chars() {
        match Marker::from_char(c) {
            Some(Marker::ProtectOpen) => depth += 1,
            Some(Marker::ProtectClose) => depth = depth.saturating_sub(1),
            Some(Marker::Break) if depth == 0 => flush(&mut current, &mut out),
            Some(m) => current.push_str(m.restore()),
            None => current.push(c),
        }
    }
    flush(&mut current, &mut out);
    out
}

fn flush(current: &mut String, out: &mut Vec<String>) {
    let s = current.trim();
    if !s.is_empty() {
        out.push(s.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(marker: Marker) -> char {
        marker.ch()
    }

    #[test]
    fn splits_only_outside_protection() {
        let marked = format!(
            "A{o}b{d}{b}c{x}{b} Next{d}{b}",
            o = m(Marker::ProtectOpen),
            d = m(Marker::Dot),
            b = m(Marker::Break),
            x = m(Marker::ProtectClose),
        );
        assert_eq!(recover(&marked), vec!["Ab.c", "Next."]);
    }

    #[test]
    fn nested_protection_is_balanced() {
        let o = m(Marker::ProtectOpen);
        let x = m(Marker::ProtectClose);
        let b = m(Marker::Break);
        let marked = format!("{o}{o}p{mp}m{x}{b}{x}. rest{b} tail", mp = m(Marker::MultiPeriod));
        assert_eq!(recover(&marked), vec!["p.m. rest", "tail"]);
    }

    #[test]
    fn restores_every_marker() {
        let marked = format!(
            "3{n}5 Dr{a} x{e} y{q}\" z{i}\"{b}",
            n = m(Marker::Number),
            a = m(Marker::Abbreviation),
            e = m(Marker::Ellipsis),
            q = m(Marker::QuestionInQuote),
            i = m(Marker::ExclamationInQuote),
            b = m(Marker::Break),
        );
        assert_eq!(recover(&marked), vec!["3.5 Dr. x... y?\" z!\""]);
    }

    #[test]
    fn blank_pieces_dropped() {
        let b = m(Marker::Break);
        assert!(recover(&format!("{b}  {b}\n{b}")).is_empty());
        assert!(recover("").is_empty());
    }
}
