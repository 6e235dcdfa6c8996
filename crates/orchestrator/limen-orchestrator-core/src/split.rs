//! Text line splitting.
//!
//! The preparer needs text broken into visual lines before it can wrap each
//! line in a mask. Real line metrics live host-side, so the splitter is a
//! capability: hosts with access to actual layout can supply measured
//! breaks, while [`GreedySplitter`] approximates them from an average glyph
//! advance. Paragraph text is first segmented on blank lines (`\n\n`), each
//! of which becomes exactly one placeholder row.

/// Splits one hard-break-free run of text into visual lines for a box
/// `width` px wide.
pub trait LineSplitter {
    fn split(&self, text: &str, width: f32) -> Vec<String>;
}

/// Width-greedy word wrap over an estimated fixed glyph advance.
#[derive(Clone, Debug)]
pub struct GreedySplitter {
    pub char_px: f32,
}

impl Default for GreedySplitter {
    fn default() -> Self {
        Self { char_px: 9.6 }
    }
}

impl LineSplitter for GreedySplitter {
    fn split(&self, text: &str, width: f32) -> Vec<String> {
        let advance = self.char_px.max(f32::EPSILON);
        let columns = ((width / advance).floor() as usize).max(1);
        let mut lines = Vec::new();
        let mut line = String::new();
        for word in text.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            if line.chars().count() + 1 + word.chars().count() <= columns {
                line.push(' ');
                line.push_str(word);
            } else {
                lines.push(std::mem::take(&mut line));
                line.push_str(word);
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
        lines
    }
}

/// One piece of segmented paragraph text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// Where a blank line sat; becomes one placeholder row.
    Gap,
}

/// Segment text on blank lines. Every `\n\n` occurrence yields exactly one
/// [`Segment::Gap`]; remaining single hard breaks are treated as soft.
pub fn segment(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    for (i, chunk) in text.split("\n\n").enumerate() {
        if i > 0 {
            out.push(Segment::Gap);
        }
        let flat = chunk.replace('\n', " ");
        if !flat.trim().is_empty() {
            out.push(Segment::Text(flat));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greedy_wrap_respects_column_budget() {
        let splitter = GreedySplitter { char_px: 10.0 };
        // 100px -> 10 columns.
        let lines = splitter.split("alpha beta gamma", 100.0);
        assert_eq!(lines, vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn narrow_boxes_still_fit_one_word_per_line() {
        let splitter = GreedySplitter { char_px: 10.0 };
        let lines = splitter.split("unbreakable words", 5.0);
        assert_eq!(lines, vec!["unbreakable", "words"]);
    }

    #[test]
    fn empty_text_produces_no_lines() {
        let splitter = GreedySplitter::default();
        assert!(splitter.split("", 300.0).is_empty());
        assert!(splitter.split("   ", 300.0).is_empty());
    }

    #[test]
    fn each_blank_line_becomes_one_gap() {
        assert_eq!(
            segment("one\n\ntwo"),
            vec![
                Segment::Text("one".into()),
                Segment::Gap,
                Segment::Text("two".into())
            ]
        );
        // Two consecutive blank lines are two gaps with nothing between.
        assert_eq!(
            segment("one\n\n\n\ntwo"),
            vec![
                Segment::Text("one".into()),
                Segment::Gap,
                Segment::Gap,
                Segment::Text("two".into())
            ]
        );
    }

    #[test]
    fn single_breaks_are_soft() {
        assert_eq!(segment("one\ntwo"), vec![Segment::Text("one two".into())]);
    }
}
