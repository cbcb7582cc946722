use crate::joiner::{Joiner, Statement};
use crate::{Container, Entry, Error, Value};
use std::borrow::Cow;
use std::path::Path;
use std::str::FromStr;

/// Statements between two progress reports.
const PROGRESS_INTERVAL: usize = 100;

/// Lazily builds the top-level objects of a PZ3 text.
///
/// Every `{` opens a container and every `}` closes one; a container closed with no
/// other container open is yielded. Structural errors end the stream.
pub struct ObjectStream<'a, P = fn(f64)> {
    joiner: Joiner<'a>,
    stack: Vec<Container>,
    statements: usize,
    progress: Option<P>,
    finished: bool,
}

impl<'a> ObjectStream<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            joiner: Joiner::new(input),
            stack: Vec::new(),
            statements: 0,
            progress: None,
            finished: false,
        }
    }
}

impl<'a, P: FnMut(f64)> ObjectStream<'a, P> {
    /// Reports the consumed fraction of the input every few statements.
    pub fn with_progress(input: &'a str, progress: P) -> Self {
        Self {
            joiner: Joiner::new(input),
            stack: Vec::new(),
            statements: 0,
            progress: Some(progress),
            finished: false,
        }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn report(&mut self, position: f64) {
        if let Some(progress) = self.progress.as_mut() {
            progress(position);
        }
    }

    fn handle(&mut self, statement: Statement<'_>) -> Result<Option<Container>, Error> {
        match statement.keyword() {
            "{" => {
                self.stack.push(Container::new());
                Ok(None)
            }
            "}" => {
                let finished = self.stack.pop().ok_or(Error::UnbalancedClose {
                    offset: statement.keyword.offset,
                    line: statement.keyword.line,
                })?;
                let Some(current) = self.stack.last_mut() else {
                    return Ok(Some(finished));
                };
                match current.last_mut() {
                    Some(Entry::Attribute(attribute)) => {
                        attribute.push_arg(Value::Object(finished));
                    }
                    // Two opening braces in a row.
                    _ => current.push(Entry::Block(finished)),
                }
                Ok(None)
            }
            keyword => {
                let current = self
                    .stack
                    .last_mut()
                    .ok_or_else(|| Error::StatementOutsideBlock {
                        keyword: keyword.to_string(),
                        offset: statement.keyword.offset,
                        line: statement.keyword.line,
                    })?;
                let args = statement.arg_texts().map(Value::from_raw).collect();
                current.push(Entry::Attribute(crate::Attribute::new(keyword, args)));
                Ok(None)
            }
        }
    }
}

impl<P: FnMut(f64)> Iterator for ObjectStream<'_, P> {
    type Item = Result<Container, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        while let Some(statement) = self.joiner.next_statement() {
            self.statements += 1;
            if self.statements % PROGRESS_INTERVAL == 0 {
                let position = self.joiner.position();
                log::trace!("{} statements, {:.0}%", self.statements, position * 100.0);
                self.report(position);
            }
            match self.handle(statement) {
                Ok(Some(object)) => return Some(Ok(object)),
                Ok(None) => {}
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
        self.finished = true;
        self.report(1.0);
        if self.stack.is_empty() {
            None
        } else {
            Some(Err(Error::UnclosedBlock {
                depth: self.stack.len(),
                line: self.joiner.line(),
            }))
        }
    }
}

/// All top-level objects of one PZ3/CR2 file.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(transparent))]
pub struct Document {
    pub objects: Vec<Container>,
}

impl Document {
    pub fn parse(input: &str) -> Result<Self, Error> {
        let objects = ObjectStream::new(input).collect::<Result<Vec<_>, _>>()?;
        log::debug!("parsed {} top-level object(s)", objects.len());
        Ok(Self { objects })
    }

    pub fn parse_with_progress(input: &str, progress: impl FnMut(f64)) -> Result<Self, Error> {
        let objects = ObjectStream::with_progress(input, progress).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { objects })
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &str) -> Result<Self, Error> {
        Self::parse(input)
    }

    /// Parses raw file contents; text that is not UTF-8 is read as Latin-1.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::parse(&decode_text(bytes))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// The only top-level object, or the first one if there are several.
    pub fn root(&self) -> Option<&Container> {
        self.objects.first()
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}
