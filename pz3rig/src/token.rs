//! Lexical layer for PZ3/CR2 text.
//!
//! The format has no real grammar: whether a bare word is a statement keyword or an
//! argument depends on its position in the line, file references start with `:` and run
//! to the end of the line (spaces included), and quoted strings may span lines. The
//! [`Splitter`] cuts the text into raw segments that cover every byte of the input, and
//! the [`Tokenizer`] drops blanks and comments and decides which words are keys.

/// Kind of a raw segment produced by [`Splitter`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SegmentKind {
    /// A run of whitespace.
    Blank,
    /// `/` up to the end of the line.
    Comment,
    /// `"..."`, quotes included.
    String,
    /// `:` up to the end of the line.
    Ref,
    /// Any other run of non-whitespace.
    Word,
    /// End of input; its text is empty.
    Eof,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
    /// Byte offset of the first character.
    pub offset: usize,
    /// 1-based line of the first character.
    pub line: usize,
}

/// Splits text into raw segments.
///
/// Iterating yields every segment up to (not including) end of input, so joining the
/// texts of all yielded segments gives back the input.
#[derive(Clone, Debug)]
pub struct Splitter<'a> {
    input: &'a str,
    index: usize,
    line: usize,
}

impl<'a> Splitter<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            index: 0,
            line: 1,
        }
    }

    /// Fraction of the input consumed so far. Empty input counts as fully consumed.
    pub fn position(&self) -> f64 {
        if self.input.is_empty() {
            1.0
        } else {
            self.index as f64 / self.input.len() as f64
        }
    }

    pub fn offset(&self) -> usize {
        self.index
    }

    /// Line the next segment starts on.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn next_segment(&mut self) -> Segment<'a> {
        let start = self.index;
        let line = self.line;
        let Some(first) = self.input[start..].chars().next() else {
            return Segment {
                kind: SegmentKind::Eof,
                text: "",
                offset: start,
                line,
            };
        };

        let kind = if first.is_whitespace() {
            self.index = self.scan_while(start, char::is_whitespace);
            SegmentKind::Blank
        } else if first == '"' {
            let body = start + first.len_utf8();
            let close = self.scan_while(body, |c| c != '"');
            // An unterminated string runs to the end of input.
            self.index = if close < self.input.len() {
                close + 1
            } else {
                close
            };
            SegmentKind::String
        } else if first == ':' {
            self.index = self.scan_while(start, |c| c != '\n');
            SegmentKind::Ref
        } else if first == '/' {
            self.index = self.scan_while(start, |c| c != '\n');
            SegmentKind::Comment
        } else {
            self.index = self.scan_while(start, |c| !c.is_whitespace());
            SegmentKind::Word
        };

        let text = &self.input[start..self.index];
        self.line += text.bytes().filter(|&b| b == b'\n').count();
        Segment {
            kind,
            text,
            offset: start,
            line,
        }
    }

    fn scan_while(&self, from: usize, pred: impl Fn(char) -> bool) -> usize {
        self.input[from..]
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map(|(i, _)| from + i)
            .unwrap_or(self.input.len())
    }
}

impl<'a> Iterator for Splitter<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = self.next_segment();
        (segment.kind != SegmentKind::Eof).then_some(segment)
    }
}

/// Kind of a logical token produced by [`Tokenizer`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TokenKind {
    /// Starts a statement: `{`, `}` or a word opening a line or following a brace.
    Key,
    Word,
    String,
    Ref,
    Eof,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: usize,
    pub line: usize,
}

impl Token<'_> {
    pub fn is_key(&self) -> bool {
        self.kind == TokenKind::Key
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

/// Logical token stream: blanks and comments removed, words classified.
#[derive(Clone, Debug)]
pub struct Tokenizer<'a> {
    splitter: Splitter<'a>,
    at_line_start: bool,
    quote_count: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            splitter: Splitter::new(input),
            at_line_start: true,
            quote_count: 0,
        }
    }

    pub fn position(&self) -> f64 {
        self.splitter.position()
    }

    pub fn offset(&self) -> usize {
        self.splitter.offset()
    }

    pub fn line(&self) -> usize {
        self.splitter.line()
    }

    /// Treat the next `count` tokens as plain words wherever they appear.
    pub fn quote_next(&mut self, count: usize) {
        debug_assert_eq!(self.quote_count, 0, "nested quote request");
        self.quote_count = count;
    }

    fn classify_word(&self, word: &str) -> TokenKind {
        if self.quote_count > 0 {
            TokenKind::Word
        } else if word == "{" || word == "}" {
            TokenKind::Key
        } else if self.at_line_start && !word.contains(':') {
            TokenKind::Key
        } else {
            TokenKind::Word
        }
    }

    /// Next logical token; returns `Eof` tokens forever once the input is exhausted.
    pub fn next_token(&mut self) -> Token<'a> {
        let token = loop {
            let segment = self.splitter.next_segment();
            let kind = match segment.kind {
                SegmentKind::Blank => {
                    if segment.text.contains('\n') {
                        self.at_line_start = true;
                    }
                    continue;
                }
                SegmentKind::Comment => {
                    self.at_line_start = false;
                    continue;
                }
                SegmentKind::Word => self.classify_word(segment.text),
                SegmentKind::String => TokenKind::String,
                SegmentKind::Ref => TokenKind::Ref,
                SegmentKind::Eof => TokenKind::Eof,
            };
            // Departs from the line-start rule on purpose: a word right after a brace
            // starts a new statement even mid-line.
            self.at_line_start = kind == TokenKind::Key && matches!(segment.text, "{" | "}");
            break Token {
                kind,
                text: segment.text,
                offset: segment.offset,
                line: segment.line,
            };
        };
        self.quote_count = self.quote_count.saturating_sub(1);
        token
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        (!token.is_eof()).then_some(token)
    }
}
