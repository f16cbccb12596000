//! Line-oriented reader for the model stream.

use std::io::BufRead;

use model::{GridDims, LabelTable};

use crate::error::{FrameError, FrameResult};

/// Streams the model input: one header line, a label table terminated by a
/// blank line, then `y` rows per slice with an optional blank line between
/// slices.
///
/// Rows are returned through one reusable buffer; the slice handed out by
/// [`FrameReader::next_row`] is valid until the next call. The reader
/// tracks its `(z, y)` cursor so errors name the failing row.
#[derive(Debug)]
pub struct FrameReader<R> {
    input: R,
    line: Vec<u8>,
    /// Grid width; zero until the header is read.
    width: u32,
    /// Rows per slice; zero until the header is read.
    rows_per_slice: u32,
    z: u32,
    y: u32,
    at_slice_boundary: bool,
}

impl<R: BufRead> FrameReader<R> {
    /// Creates a reader over buffered input.
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: Vec::new(),
            width: 0,
            rows_per_slice: 0,
            z: 0,
            y: 0,
            at_slice_boundary: false,
        }
    }

    /// Current row cursor as `(z, y)`.
    #[must_use]
    pub const fn position(&self) -> (u32, u32) {
        (self.z, self.y)
    }

    /// Reads and validates the header line `X,Y,Z,PX,PY,PZ`.
    ///
    /// # Errors
    ///
    /// [`FrameError::HeaderFormat`] unless the line is exactly six
    /// comma-separated integers; [`FrameError::HeaderInvalid`] when the
    /// parsed dimensions fail validation.
    pub fn read_header(&mut self) -> FrameResult<GridDims> {
        let Some(_) = self.fill_line()? else {
            return Err(FrameError::HeaderFormat {
                line: String::new(),
            });
        };
        let text = String::from_utf8_lossy(&self.line).into_owned();

        let mut values = [0i64; 6];
        let mut count = 0;
        for token in text.split(',') {
            if count == 6 {
                return Err(FrameError::HeaderFormat { line: text });
            }
            match token.trim().parse::<i64>() {
                Ok(v) => {
                    values[count] = v;
                    count += 1;
                }
                Err(_) => return Err(FrameError::HeaderFormat { line: text }),
            }
        }
        if count != 6 {
            return Err(FrameError::HeaderFormat { line: text });
        }

        let dims = GridDims::from_header(values)?;
        self.width = dims.x();
        self.rows_per_slice = dims.y();
        Ok(dims)
    }

    /// Reads label lines `<tag>,<name>` until a blank line (or EOF).
    ///
    /// Duplicate tags keep their first definition. A single leading space
    /// of the name is trimmed.
    ///
    /// # Errors
    ///
    /// [`FrameError::LabelFormat`] for a line without a comma or with an
    /// empty tag; [`FrameError::NoLabels`] when the table ends empty.
    pub fn read_labels(&mut self) -> FrameResult<LabelTable> {
        let mut table = LabelTable::new();
        loop {
            let Some(len) = self.fill_line()? else {
                break;
            };
            if len == 0 {
                break;
            }

            let comma = self.line.iter().position(|&b| b == b',');
            let Some(comma) = comma else {
                return Err(FrameError::LabelFormat {
                    line: String::from_utf8_lossy(&self.line).into_owned(),
                });
            };
            let tag_part = trim_ascii(&self.line[..comma]);
            if tag_part.is_empty() {
                return Err(FrameError::LabelFormat {
                    line: String::from_utf8_lossy(&self.line).into_owned(),
                });
            }
            let tag = tag_part[0];

            let mut name = &self.line[comma + 1..];
            if name.first() == Some(&b' ') {
                name = &name[1..];
            }
            let name = String::from_utf8_lossy(name).into_owned();
            table.insert(tag, &name)?;
        }

        if table.is_empty() {
            return Err(FrameError::NoLabels);
        }
        Ok(table)
    }

    /// Returns the next row of exactly `x` tag bytes, or `None` at a clean
    /// end of stream.
    ///
    /// A trailing CR is stripped; an optional single blank line after each
    /// complete slice is consumed silently. Rows longer than the grid
    /// width are truncated; shorter rows are an error.
    ///
    /// # Errors
    ///
    /// [`FrameError::RowLength`] when a row is shorter than the width.
    pub fn next_row(&mut self) -> FrameResult<Option<&[u8]>> {
        debug_assert!(self.width > 0, "read_header must run before next_row");

        if self.y == self.rows_per_slice {
            self.y = 0;
            self.z += 1;
            self.at_slice_boundary = true;
        }

        let Some(mut len) = self.fill_line()? else {
            return Ok(None);
        };
        if self.at_slice_boundary && len == 0 {
            // One optional blank line between slices.
            match self.fill_line()? {
                Some(next_len) => len = next_len,
                None => return Ok(None),
            }
        }
        self.at_slice_boundary = false;

        let width = self.width as usize;
        if len < width {
            return Err(FrameError::RowLength {
                expected: self.width,
                got: len,
                y: self.y,
                z: self.z,
            });
        }
        self.y += 1;
        Ok(Some(&self.line[..width]))
    }

    /// Reads one line into the reusable buffer, stripping the newline and
    /// one trailing CR. Returns the visible length, or `None` at EOF.
    fn fill_line(&mut self) -> FrameResult<Option<usize>> {
        self.line.clear();
        let n = self.input.read_until(b'\n', &mut self.line)?;
        if n == 0 {
            return Ok(None);
        }
        if self.line.last() == Some(&b'\n') {
            self.line.pop();
        }
        if self.line.last() == Some(&b'\r') {
            self.line.pop();
        }
        Ok(Some(self.line.len()))
    }
}

fn trim_ascii(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if first.is_ascii_whitespace() {
            bytes = rest;
        } else {
            break;
        }
    }
    while let [rest @ .., last] = bytes {
        if last.is_ascii_whitespace() {
            bytes = rest;
        } else {
            break;
        }
    }
    bytes
}
