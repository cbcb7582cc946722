use crate::Error;
use glam::DVec3;
use std::fmt;

/// Argument of an [`Attribute`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(untagged))]
pub enum Value {
    Number(f64),
    Text(String),
    Object(Container),
}

impl Value {
    /// Converts a raw argument token. Tokens that look numeric but fail to parse or
    /// parse to a non-finite value (`-nan`, `+inf`, `1e999`), quoted strings and
    /// everything else are kept as text.
    pub fn from_raw(raw: &str) -> Self {
        match raw.chars().next() {
            Some(c) if c.is_ascii_digit() || matches!(c, '.' | '-' | '+') => raw
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map_or_else(|| Value::Text(raw.to_string()), Value::Number),
            _ => Value::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Container> {
        match self {
            Value::Object(c) => Some(c),
            _ => None,
        }
    }
}

/// A statement inside a block: a key and its arguments.
///
/// When the last argument is a [`Container`] it is the attribute's child block, as in
/// `actor lShldr:1 { ... }`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    pub key: String,
    pub args: Vec<Value>,
}

impl Attribute {
    pub fn new(key: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            key: key.into(),
            args,
        }
    }

    pub(crate) fn push_arg(&mut self, value: Value) {
        self.args.push(value);
    }

    pub fn child(&self) -> Option<&Container> {
        self.args.last().and_then(Value::as_object)
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    pub fn number(&self, index: usize) -> Result<f64, Error> {
        match self.args.get(index) {
            Some(Value::Number(n)) => Ok(*n),
            Some(other) => Err(Error::NotANumber {
                key: self.key.clone(),
                index,
                value: describe(other),
            }),
            None => Err(Error::MissingArgument {
                key: self.key.clone(),
                index,
            }),
        }
    }

    pub fn text(&self, index: usize) -> Result<&str, Error> {
        match self.args.get(index) {
            Some(Value::Text(s)) => Ok(s),
            Some(_) => Err(Error::NotAString {
                key: self.key.clone(),
                index,
            }),
            None => Err(Error::MissingArgument {
                key: self.key.clone(),
                index,
            }),
        }
    }

    /// The first three arguments as a vector.
    pub fn vector3(&self) -> Result<DVec3, Error> {
        Ok(DVec3::new(self.number(0)?, self.number(1)?, self.number(2)?))
    }

    fn require_child(&self) -> Result<&Container, Error> {
        self.child().ok_or_else(|| Error::MissingChild {
            key: self.key.clone(),
        })
    }

    /// Looks `key` up in the child block.
    pub fn unique_attribute(&self, key: &str) -> Result<&Attribute, Error> {
        self.require_child()?.unique_attribute(key)
    }

    pub fn all_attributes<'a>(
        &'a self,
        key: &str,
    ) -> Result<impl Iterator<Item = &'a Attribute>, Error> {
        Ok(self.require_child()?.all_attributes(key))
    }

    /// True if the child block holds `key`; false when there is no child.
    pub fn contains(&self, key: &str) -> bool {
        self.child().is_some_and(|c| c.contains(key))
    }

    pub fn keys(&self) -> Result<Vec<&str>, Error> {
        Ok(self.require_child()?.keys().collect())
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(untagged))]
pub enum Entry {
    Attribute(Attribute),
    /// A block that directly follows another opening brace.
    Block(Container),
}

impl Entry {
    pub fn as_attribute(&self) -> Option<&Attribute> {
        match self {
            Entry::Attribute(a) => Some(a),
            Entry::Block(_) => None,
        }
    }
}

/// The contents of one `{ ... }` block.
///
/// Keys are not unique in general; [`Container::unique_attribute`] fails when a key is
/// missing or repeated, [`Container::all_attributes`] yields every match.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(transparent))]
pub struct Container {
    entries: Vec<Entry>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Entry> {
        self.entries.last_mut()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter().filter_map(Entry::as_attribute)
    }

    /// Entry at `index` if it is an attribute.
    pub fn attribute_at(&self, index: usize) -> Option<&Attribute> {
        self.entries.get(index).and_then(Entry::as_attribute)
    }

    pub fn unique_attribute(&self, key: &str) -> Result<&Attribute, Error> {
        let mut matches = self.all_attributes(key);
        let first = matches.next().ok_or_else(|| Error::MissingKey {
            key: key.to_string(),
        })?;
        let rest = matches.count();
        if rest > 0 {
            return Err(Error::AmbiguousKey {
                key: key.to_string(),
                count: rest + 1,
            });
        }
        Ok(first)
    }

    pub fn all_attributes<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a Attribute> {
        self.filter(move |k| k == key)
    }

    pub fn filter<'a>(
        &'a self,
        pred: impl Fn(&str) -> bool,
    ) -> impl Iterator<Item = &'a Attribute> {
        self.attributes().filter(move |a| pred(&a.key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes().any(|a| a.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes().map(|a| a.key.as_str())
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "\t".repeat(depth);
        writeln!(f, "{pad}{{")?;
        for entry in &self.entries {
            match entry {
                Entry::Attribute(attribute) => {
                    write!(f, "{pad}\t{}", attribute.key)?;
                    let mut blocks = Vec::new();
                    let mut after_ref = false;
                    for arg in &attribute.args {
                        if let Value::Object(c) = arg {
                            blocks.push(c);
                            continue;
                        }
                        // A ref runs to the end of its line.
                        if after_ref {
                            write!(f, "\n{pad}\t\t")?;
                        } else {
                            f.write_str(" ")?;
                        }
                        match arg {
                            Value::Number(n) => write!(f, "{n}")?,
                            Value::Text(s) => f.write_str(s)?,
                            Value::Object(_) => {}
                        }
                        after_ref = matches!(arg, Value::Text(s) if s.starts_with(':'));
                    }
                    writeln!(f)?;
                    for block in blocks {
                        block.write_indented(f, depth + 1)?;
                    }
                }
                Entry::Block(block) => block.write_indented(f, depth + 1)?,
            }
        }
        writeln!(f, "{pad}}}")
    }
}

/// Writes the block back out in the indented PZ3 layout.
impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::Text(s) => s.clone(),
        Value::Object(_) => "{...}".to_string(),
    }
}
