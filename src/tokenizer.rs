//! Lossless single-pass tokenizer for HTML/XHTML markup.
//!
//! The tokenizer splits a document into [`Token::Tag`] and [`Token::Text`]
//! spans without building a DOM. Concatenating the raw text of all tokens in
//! order reproduces the input byte-for-byte, for any input, including
//! malformed markup. This is what lets the transform in [`crate::engine`]
//! rewrite text runs while leaving every tag untouched.

use memchr::{memchr, memmem};

/// One span of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Markup: a tag, comment, processing instruction, or CDATA section.
    /// Passed through verbatim by every transform.
    Tag(&'a str),
    /// Character data between tags. Candidate for word splitting.
    Text(&'a str),
}

impl<'a> Token<'a> {
    /// The raw source text of this token.
    pub fn as_str(&self) -> &'a str {
        match self {
            Token::Tag(raw) | Token::Text(raw) => raw,
        }
    }
}

/// Iterator over the tokens of a markup document. Single forward pass,
/// O(n) in document length.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer { input, pos: 0 }
    }

    /// Find the end (exclusive) of the markup construct starting at `start`,
    /// which must point at a `<`. Returns `None` if the construct is never
    /// terminated; the caller then degrades to literal text.
    fn find_tag_end(&self, start: usize) -> Option<usize> {
        let rest = &self.input.as_bytes()[start..];

        // Comments, CDATA sections, and processing instructions may contain
        // bare angle brackets, so they end at their own terminator only.
        for (open, close) in [
            (&b"<!--"[..], &b"-->"[..]),
            (&b"<![CDATA["[..], &b"]]>"[..]),
            (&b"<?"[..], &b"?>"[..]),
        ] {
            if rest.starts_with(open) {
                let at = memmem::find(&rest[open.len()..], close)?;
                return Some(start + open.len() + at + close.len());
            }
        }

        // Ordinary tag: scan to `>`, but a quoted attribute value hides any
        // `>` or `<` it contains.
        let mut quote: Option<u8> = None;
        for (i, &b) in rest.iter().enumerate().skip(1) {
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    b'>' => return Some(start + i + 1),
                    _ => {}
                },
            }
        }
        None
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.pos >= self.input.len() {
            return None;
        }
        let start = self.pos;
        let bytes = self.input.as_bytes();

        if bytes[start] == b'<' {
            if let Some(end) = self.find_tag_end(start) {
                self.pos = end;
                return Some(Token::Tag(&self.input[start..end]));
            }
            // Unterminated construct: everything from the `<` on is literal
            // text. Losslessness wins over strictness.
            self.pos = self.input.len();
            return Some(Token::Text(&self.input[start..]));
        }

        let end = match memchr(b'<', &bytes[start..]) {
            Some(at) => start + at,
            None => self.input.len(),
        };
        self.pos = end;
        Some(Token::Text(&self.input[start..end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Tokenizer::new(input).collect()
    }

    fn reassemble(input: &str) -> String {
        tokens(input).iter().map(|t| t.as_str()).collect()
    }

    #[test]
    fn test_simple_document() {
        assert_eq!(
            tokens("<p>Hello world</p>"),
            vec![
                Token::Tag("<p>"),
                Token::Text("Hello world"),
                Token::Tag("</p>"),
            ]
        );
    }

    #[test]
    fn test_quoted_attribute_hides_angle_brackets() {
        let input = r#"<img alt="a > b < c" src="x.png"/>after"#;
        assert_eq!(
            tokens(input),
            vec![
                Token::Tag(r#"<img alt="a > b < c" src="x.png"/>"#),
                Token::Text("after"),
            ]
        );
    }

    #[test]
    fn test_comment_is_one_tag() {
        let input = "a<!-- <p> not a tag --> b";
        assert_eq!(
            tokens(input),
            vec![
                Token::Text("a"),
                Token::Tag("<!-- <p> not a tag -->"),
                Token::Text(" b"),
            ]
        );
    }

    #[test]
    fn test_processing_instruction_and_cdata() {
        let input = "<?xml version=\"1.0\"?><![CDATA[1 < 2 > 0]]>tail";
        assert_eq!(
            tokens(input),
            vec![
                Token::Tag("<?xml version=\"1.0\"?>"),
                Token::Tag("<![CDATA[1 < 2 > 0]]>"),
                Token::Text("tail"),
            ]
        );
    }

    #[test]
    fn test_unterminated_tag_becomes_text() {
        assert_eq!(
            tokens("before<unclosed and more"),
            vec![Token::Text("before"), Token::Text("<unclosed and more")]
        );
        assert_eq!(
            tokens("x<!-- never closed"),
            vec![Token::Text("x"), Token::Text("<!-- never closed")]
        );
    }

    #[test]
    fn test_entities_stay_in_text() {
        assert_eq!(
            tokens("<p>Tom &amp; Jerry</p>"),
            vec![
                Token::Tag("<p>"),
                Token::Text("Tom &amp; Jerry"),
                Token::Tag("</p>"),
            ]
        );
    }

    #[test]
    fn test_reassembly_is_lossless() {
        for input in [
            "",
            "plain text only",
            "<p>Hello</p>",
            "<a href='q>u<o'>link</a>",
            "a < b and c > d",
            "tail<",
            "<!DOCTYPE html><html xmlns=\"http://www.w3.org/1999/xhtml\"><body>\u{e9}\u{4e2d}\u{6587}</body></html>",
            "<!-- broken",
            "<![CDATA[ also broken",
        ] {
            assert_eq!(reassemble(input), input, "lossy on {input:?}");
        }
    }
}
