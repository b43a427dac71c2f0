//! Fixed column records, shared by ANTEX and IONEX.
//! Both formats use 80 column records (value lines may be longer),
//! identified by a label in columns 61-80.
use std::{
    io::{BufRead, Seek, SeekFrom},
    str::FromStr,
};

use crate::error::ParsingError;

/// Column range `[start, end)`, 0-based.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Columns {
    pub start: usize,
    pub end: usize,
}

impl Columns {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Column range of width `width` starting at `start`.
    pub const fn width(start: usize, width: usize) -> Self {
        Self::new(start, start + width)
    }
}

/// Record content, columns 1-60.
pub(crate) const CONTENT: Columns = Columns::new(0, 60);

/// Record label, columns 61-80.
pub(crate) const LABEL: Columns = Columns::new(60, 80);

/// One record, tagged with its 1-based line number.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Line<'a> {
    text: &'a str,
    number: usize,
}

impl<'a> Line<'a> {
    pub fn new(text: &'a str, number: usize) -> Self {
        Self { text, number }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Raw (untrimmed) columns. Missing columns are considered blank.
    pub fn field(&self, columns: Columns) -> &'a str {
        let end = columns.end.min(self.text.len());
        if columns.start >= end {
            return "";
        }
        self.text.get(columns.start..end).unwrap_or("")
    }

    /// Trimmed record label.
    pub fn label(&self) -> &'a str {
        self.field(LABEL).trim()
    }

    /// Record content (label excluded).
    pub fn content(&self) -> &'a str {
        self.field(CONTENT)
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Builds a [ParsingError::MalformedRecord] pointing at this line.
    pub fn malformed<S: ToString>(&self, reason: S) -> ParsingError {
        ParsingError::malformed(self.number, reason)
    }

    /// Fails unless this record carries `label`.
    pub fn expect_label(&self, label: &str) -> Result<(), ParsingError> {
        if self.label() == label {
            Ok(())
        } else {
            Err(self.malformed(format!(
                "expecting \"{}\", found \"{}\"",
                label,
                self.label()
            )))
        }
    }

    /// Strictly parses `columns`: the field must not be blank
    /// and must be entirely consumed by the parser.
    pub fn parse<T: FromStr>(&self, columns: Columns, what: &str) -> Result<T, ParsingError> {
        let field = self.field(columns).trim();

        if field.is_empty() {
            return Err(self.malformed(format!("missing {}", what)));
        }

        field
            .parse::<T>()
            .map_err(|_| self.malformed(format!("invalid {}: \"{}\"", what, field)))
    }

    /// Parses `columns` when not blank.
    pub fn parse_optional<T: FromStr>(
        &self,
        columns: Columns,
        what: &str,
    ) -> Result<Option<T>, ParsingError> {
        if self.field(columns).trim().is_empty() {
            Ok(None)
        } else {
            self.parse(columns, what).map(Some)
        }
    }

    /// Parses `count` consecutive fields of `width` columns, starting at column `start`.
    /// Fails if a field is missing or if non blank content follows the last field.
    pub fn parse_series<T: FromStr>(
        &self,
        start: usize,
        width: usize,
        count: usize,
        what: &str,
    ) -> Result<Vec<T>, ParsingError> {
        let values = (0..count)
            .map(|i| self.parse::<T>(Columns::width(start + i * width, width), what))
            .collect::<Result<Vec<_>, _>>()?;

        let trailing = self
            .text
            .get(start + count * width..)
            .unwrap_or("")
            .trim();

        if !trailing.is_empty() {
            return Err(self.malformed(format!(
                "expecting {} {} values, found trailing \"{}\"",
                count, what, trailing
            )));
        }

        Ok(values)
    }
}

/// [LineReader] reads one record at a time into its own growable buffer.
/// The current record remains accessible through [LineReader::line]
/// until the next [LineReader::advance].
#[derive(Debug)]
pub(crate) struct LineReader<R> {
    inner: R,
    buf: String,
    number: usize,
}

impl<R: BufRead + Seek> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: String::with_capacity(128),
            number: 0,
        }
    }

    /// Reads next record. Returns false on end of stream.
    pub fn advance(&mut self) -> Result<bool, ParsingError> {
        self.buf.clear();

        if self.inner.read_line(&mut self.buf)? == 0 {
            return Ok(false);
        }

        let len = self.buf.trim_end_matches(['\n', '\r']).len();
        self.buf.truncate(len);
        self.number += 1;

        Ok(true)
    }

    /// Reads next record, end of stream is an error.
    pub fn advance_or(&mut self, expecting: &str) -> Result<(), ParsingError> {
        if self.advance()? {
            Ok(())
        } else {
            Err(ParsingError::malformed(
                self.number + 1,
                format!("end of stream while expecting {}", expecting),
            ))
        }
    }

    /// Current record.
    pub fn line(&self) -> Line<'_> {
        Line::new(&self.buf, self.number)
    }

    /// Number of records consumed so far.
    pub fn line_number(&self) -> usize {
        self.number
    }

    /// Current stream offset, which is the start of the next record.
    pub fn position(&mut self) -> Result<u64, ParsingError> {
        Ok(self.inner.stream_position()?)
    }

    /// Moves back to a previously recorded [Self::position], and the
    /// number of records that had been consumed at that point.
    pub fn seek(&mut self, offset: u64, line_number: usize) -> Result<(), ParsingError> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.number = line_number;
        self.buf.clear();
        Ok(())
    }
}
