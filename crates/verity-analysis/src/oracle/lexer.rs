//! Comment scanner over raw fixture text.
//!
//! Independent of the parser so the oracle can be read even from a fixture the
//! grammar rejects. String, char, and text-block literals are skipped so that
//! `"// Noncompliant"` inside a literal is never taken for a marker.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RawCommentStyle {
    Line,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawComment<'s> {
    pub style: RawCommentStyle,
    pub start_byte: usize,
    pub end_byte: usize,
    pub text: &'s str,
}

/// All comments in `text`, in source order.
pub fn scan_comments(text: &str) -> Vec<RawComment<'_>> {
    let bytes = text.as_bytes();
    let n = bytes.len();
    let mut comments = Vec::new();
    let mut i = 0;

    while i < n {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = (i + 2..n)
                    .find(|&j| matches!(bytes[j], b'\n' | b'\r'))
                    .unwrap_or(n);
                comments.push(RawComment {
                    style: RawCommentStyle::Line,
                    start_byte: i,
                    end_byte: end,
                    text: &text[i..end],
                });
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = text[i + 2..].find("*/").map(|p| i + 2 + p + 2).unwrap_or(n);
                comments.push(RawComment {
                    style: RawCommentStyle::Block,
                    start_byte: i,
                    end_byte: end,
                    text: &text[i..end],
                });
                i = end;
            }
            b'"' if bytes[i..].starts_with(b"\"\"\"") => i = skip_text_block(bytes, i + 3),
            b'"' => i = skip_quoted(bytes, i + 1, b'"'),
            b'\'' => i = skip_quoted(bytes, i + 1, b'\''),
            _ => i += 1,
        }
    }
    comments
}

/// Index just past the closing quote, or the end of the line for an
/// unterminated literal.
fn skip_quoted(bytes: &[u8], mut j: usize, quote: u8) -> usize {
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' | b'\r' => return j,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn skip_text_block(bytes: &[u8], mut j: usize) -> usize {
    while j < bytes.len() {
        if bytes[j] == b'\\' {
            j += 2;
        } else if bytes[j..].starts_with(b"\"\"\"") {
            return j + 3;
        } else {
            j += 1;
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(src: &str) -> Vec<&str> {
        scan_comments(src).into_iter().map(|c| c.text).collect()
    }

    #[test]
    fn finds_line_and_block_comments() {
        let src = "int a; // one\n/* two */ int b; /** three\n */";
        assert_eq!(texts(src), vec!["// one", "/* two */", "/** three\n */"]);
    }

    #[test]
    fn skips_comment_lookalikes_in_literals() {
        let src = "String s = \"// Noncompliant\"; char c = '/'; // real\n";
        assert_eq!(texts(src), vec!["// real"]);
    }

    #[test]
    fn skips_text_blocks_and_escaped_quotes() {
        let src = "String t = \"\"\"\n  // not a comment \\\"\"\"\n  \"\"\"; String e = \"a\\\"//b\"; // yes";
        assert_eq!(texts(src), vec!["// yes"]);
    }

    #[test]
    fn unterminated_block_runs_to_end() {
        assert_eq!(texts("a /* open"), vec!["/* open"]);
    }

    #[test]
    fn line_comment_stops_at_carriage_return() {
        assert_eq!(texts("// a\r\nb // c"), vec!["// a", "// c"]);
    }
}
