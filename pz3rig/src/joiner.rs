use crate::token::{Token, TokenKind, Tokenizer};

/// Statements whose arguments are a fixed number of tokens that might otherwise be
/// mistaken for keys (for example an argument that opens a line).
const FIXED_ARITY: &[(&str, usize)] = &[("valueOpDeltaAdd", 4), ("addChild", 2)];

pub(crate) fn fixed_arity(keyword: &str) -> Option<usize> {
    FIXED_ARITY
        .iter()
        .find(|(name, _)| *name == keyword)
        .map(|&(_, count)| count)
}

/// A keyword and the raw tokens grouped with it.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement<'a> {
    pub keyword: Token<'a>,
    pub args: Vec<Token<'a>>,
}

impl<'a> Statement<'a> {
    pub fn keyword(&self) -> &'a str {
        self.keyword.text
    }

    pub fn arg_texts(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.args.iter().map(|t| t.text)
    }
}

/// Groups the logical token stream into statements.
#[derive(Clone, Debug)]
pub struct Joiner<'a> {
    tokenizer: Tokenizer<'a>,
    look_ahead: Token<'a>,
}

impl<'a> Joiner<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut tokenizer = Tokenizer::new(input);
        let look_ahead = next_quoted(&mut tokenizer);
        Self {
            tokenizer,
            look_ahead,
        }
    }

    pub fn position(&self) -> f64 {
        self.tokenizer.position()
    }

    pub fn line(&self) -> usize {
        self.tokenizer.line()
    }

    pub fn next_statement(&mut self) -> Option<Statement<'a>> {
        if self.look_ahead.is_eof() {
            return None;
        }
        let keyword = self.look_ahead;
        let mut args = Vec::new();
        loop {
            self.look_ahead = next_quoted(&mut self.tokenizer);
            if matches!(self.look_ahead.kind, TokenKind::Key | TokenKind::Eof) {
                break;
            }
            args.push(self.look_ahead);
        }
        Some(Statement { keyword, args })
    }
}

fn next_quoted<'a>(tokenizer: &mut Tokenizer<'a>) -> Token<'a> {
    let token = tokenizer.next_token();
    if token.is_key() {
        if let Some(count) = fixed_arity(token.text) {
            tokenizer.quote_next(count);
        }
    }
    token
}

impl<'a> Iterator for Joiner<'a> {
    type Item = Statement<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_statement()
    }
}
