use std::fmt;

use crate::error::{Error, Result};

/// A line of the tab-separated interchange format: `id<TAB>label<TAB>text`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TabulatedLine {
    pub id: String,
    pub label: String,
    pub text: String,
}

impl TabulatedLine {
    pub fn new(id: impl Into<String>, label: impl Into<String>, text: impl Into<String>) -> Self {
        TabulatedLine {
            id: id.into(),
            label: label.into(),
            text: text.into(),
        }
    }

    /// Parse a tabulated line.
    ///
    /// `line_number` is 1-based and only used for error reporting. Fields
    /// beyond the third are ignored.
    pub fn parse(line: &str, line_number: usize) -> Result<Self> {
        let fields = line.split('\t').collect::<Vec<_>>();
        match fields.as_slice() {
            [id, label, text, ..] => Ok(TabulatedLine::new(*id, *label, *text)),
            _ => Err(Error::MalformedLine {
                line: line_number,
                fields: fields.len(),
            }),
        }
    }

    /// Tokens of the text column, split on single spaces.
    pub fn tokens(&self) -> Vec<String> {
        self.text
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}

impl fmt::Display for TabulatedLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.id, self.label, self.text)
    }
}
