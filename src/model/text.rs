//! Text transforms for the reading pane: hifz masking and tajweed marks

const MASK: char = '·';

/// Hide all but the first `revealed_words` words of `text`.
///
/// Whitespace is preserved so the masked verse keeps its shape; combining
/// marks of hidden words are dropped with their letters.
pub fn hifz_mask(text: &str, revealed_words: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_index = 0;
    let mut in_word = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if in_word {
                word_index += 1;
                in_word = false;
            }
            out.push(c);
            continue;
        }
        in_word = true;
        if word_index < revealed_words {
            out.push(c);
        } else if !is_diacritic(c) {
            out.push(MASK);
        }
    }
    out
}

/// Diacritic classes highlighted in tajweed mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mark {
    Plain,
    Fatha,
    Damma,
    Kasra,
    Sukun,
    Shadda,
}

impl Mark {
    fn of(c: char) -> Mark {
        match c {
            '\u{064E}' => Mark::Fatha,
            '\u{064F}' => Mark::Damma,
            '\u{0650}' => Mark::Kasra,
            '\u{0652}' => Mark::Sukun,
            '\u{0651}' => Mark::Shadda,
            _ => Mark::Plain,
        }
    }
}

/// A run of text sharing one mark class
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub mark: Mark,
}

/// Split `text` into runs so each marked diacritic can be styled on its own
pub fn tajweed_segments(text: &str) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    for c in text.chars() {
        let mark = Mark::of(c);
        match segments.last_mut() {
            Some(last) if last.mark == mark => last.text.push(c),
            _ => segments.push(Segment { text: c.to_string(), mark }),
        }
    }
    segments
}

fn is_diacritic(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06ED}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_reveals_leading_words() {
        assert_eq!(hifz_mask("alpha beta  gamma", 1), "alpha ····  ·····");
        assert_eq!(hifz_mask("alpha beta", 5), "alpha beta");
        assert_eq!(hifz_mask("", 0), "");
    }

    #[test]
    fn mask_drops_hidden_diacritics() {
        // "بِسْمِ" is three letters carrying three marks
        assert_eq!(hifz_mask("بِسْمِ", 0), "···");
    }

    #[test]
    fn segments_split_on_marks() {
        let segments = tajweed_segments("بِسْ");
        let marks: Vec<Mark> = segments.iter().map(|s| s.mark).collect();
        assert_eq!(marks, vec![Mark::Plain, Mark::Kasra, Mark::Plain, Mark::Sukun]);
        let joined: String = segments.into_iter().map(|s| s.text).collect();
        assert_eq!(joined, "بِسْ");
    }

    #[test]
    fn plain_text_is_one_segment() {
        let segments = tajweed_segments("abc def");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].mark, Mark::Plain);
    }
}
