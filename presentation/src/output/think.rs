//! Separation of `<think>` blocks from streamed model output.
//!
//! Reasoning models wrap their chain of thought in `<think>...</think>`.
//! Tags can arrive split across chunks, so the filter holds back any tail
//! that could still become a tag.

const OPEN: &str = "<think>";
const CLOSE: &str = "</think>";

/// A piece of streamed text, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Answer text
    Text(String),
    /// Content of a think block
    Thought(String),
}

#[derive(Debug, Default)]
pub struct ThinkFilter {
    pending: String,
    inside: bool,
    /// Whether any answer text was emitted yet
    started: bool,
}

impl ThinkFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning the segments that are now certain
    pub fn push(&mut self, chunk: &str) -> Vec<Segment> {
        self.pending.push_str(chunk);
        let mut out = Vec::new();

        loop {
            let tag = if self.inside { CLOSE } else { OPEN };
            if let Some(pos) = self.pending.find(tag) {
                let before: String = self.pending.drain(..pos).collect();
                self.pending.drain(..tag.len());
                self.emit(before, &mut out);
                self.inside = !self.inside;
            } else {
                let cut = self.pending.len() - partial_tag_len(&self.pending, tag);
                let ready: String = self.pending.drain(..cut).collect();
                self.emit(ready, &mut out);
                return out;
            }
        }
    }

    /// Flush whatever is held back at the end of the stream
    pub fn finish(&mut self) -> Vec<Segment> {
        let rest = std::mem::take(&mut self.pending);
        let mut out = Vec::new();
        self.emit(rest, &mut out);
        out
    }

    fn emit(&mut self, text: String, out: &mut Vec<Segment>) {
        if self.inside {
            if !text.is_empty() {
                out.push(Segment::Thought(text));
            }
            return;
        }

        // Whitespace left behind by a hidden think block
        let text = if self.started {
            text
        } else {
            text.trim_start().to_string()
        };
        if !text.is_empty() {
            self.started = true;
            out.push(Segment::Text(text));
        }
    }
}

/// Length of the longest suffix of `text` that is a proper prefix of `tag`
fn partial_tag_len(text: &str, tag: &str) -> usize {
    (1..tag.len())
        .rev()
        .find(|&n| text.ends_with(&tag[..n]))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(chunks: &[&str]) -> Vec<Segment> {
        let mut filter = ThinkFilter::new();
        let mut out: Vec<Segment> = chunks.iter().flat_map(|c| filter.push(c)).collect();
        out.extend(filter.finish());
        out
    }

    fn text(segments: &[Segment]) -> String {
        segments
            .iter()
            .filter_map(|s| match s {
                Segment::Text(t) => Some(t.as_str()),
                Segment::Thought(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(run(&["Three ", "deployments."]), vec![
            Segment::Text("Three ".to_string()),
            Segment::Text("deployments.".to_string()),
        ]);
    }

    #[test]
    fn test_think_block_is_separated() {
        let out = run(&["<think>count them</think>\n\nThere are 3."]);
        assert_eq!(out, vec![
            Segment::Thought("count them".to_string()),
            Segment::Text("There are 3.".to_string()),
        ]);
    }

    #[test]
    fn test_tags_split_across_chunks() {
        let out = run(&["<thi", "nk>hmm</th", "ink>", "Done", " <"]);
        assert_eq!(text(&out), "Done <");
        assert!(out.contains(&Segment::Thought("hmm".to_string())));
    }

    #[test]
    fn test_unclosed_block_stays_thought() {
        let out = run(&["Answer. <think>still going"]);
        assert_eq!(out, vec![
            Segment::Text("Answer. ".to_string()),
            Segment::Thought("still going".to_string()),
        ]);
    }

    #[test]
    fn test_lookalike_is_text() {
        assert_eq!(text(&run(&["a <b> c"])), "a <b> c");
    }
}
