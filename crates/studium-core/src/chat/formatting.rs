//! Reply text normalization.
//!
//! Raw completion output tends to arrive as one dense block. Before a
//! reply is stored and returned, it is lightly reflowed for readability:
//! code fences get their own line, CJK sentence terminators become
//! paragraph breaks, and runs of blank lines are collapsed.

/// CJK sentence terminators that end a paragraph.
const SENTENCE_TERMINATORS: [char; 3] = ['。', '！', '？'];

/// Normalize a completion reply for display.
///
/// - Ensures every ``` fence starts on its own line.
/// - Inserts a paragraph break after 。 ！ ？ (consuming any whitespace
///   that already followed the terminator).
/// - Collapses runs of three or more newlines down to two.
/// - Trims surrounding whitespace.
pub fn normalize_reply(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let fenced = content.replace("```", "\n```");

    let mut broken = String::with_capacity(fenced.len());
    let mut chars = fenced.chars().peekable();
    while let Some(c) = chars.next() {
        broken.push(c);
        if SENTENCE_TERMINATORS.contains(&c) {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            broken.push_str("\n\n");
        }
    }

    let mut collapsed = String::with_capacity(broken.len());
    let mut newline_run = 0usize;
    for c in broken.chars() {
        if c == '\n' {
            newline_run += 1;
            if newline_run <= 2 {
                collapsed.push(c);
            }
        } else {
            newline_run = 0;
            collapsed.push(c);
        }
    }

    collapsed.trim().to_string()
}
