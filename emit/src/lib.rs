//! Buffered CSV output for cuboid records.
//!
//! One record per line: `x,y,z,dx,dy,dz,name`. Integers are base-10
//! ASCII with no locale dependence; line endings are LF unless CRLF is
//! requested. Records accumulate in an owned buffer that flushes to the
//! sink at a configurable high-water mark.

use std::fmt;
use std::io::Write;

use model::{Cuboid, LabelId, LabelTable};

/// Default flush threshold: 1 MiB.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 1 << 20;

/// Result type for emitter operations.
pub type EmitResult<T> = Result<T, EmitError>;

/// Errors raised while emitting records.
#[derive(Debug)]
#[non_exhaustive]
pub enum EmitError {
    /// Underlying I/O failure.
    Io(std::io::Error),

    /// A cuboid carried a label id absent from the table.
    UnknownLabelId {
        /// The unresolvable id.
        id: LabelId,
    },
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::UnknownLabelId { id } => {
                write!(f, "no label name for id {}", id.raw())
            }
        }
    }
}

impl std::error::Error for EmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::UnknownLabelId { .. } => None,
        }
    }
}

impl From<std::io::Error> for EmitError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Emitter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterOptions {
    /// Produce CRLF line endings instead of LF.
    pub crlf: bool,
    /// Buffer high-water mark in bytes.
    pub flush_threshold: usize,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            crlf: false,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }
}

/// Buffered CSV emitter over any byte sink.
///
/// Dropping the emitter flushes residual bytes best-effort; call
/// [`CsvEmitter::finish`] to observe the final write's result.
#[derive(Debug)]
pub struct CsvEmitter<W: Write> {
    sink: Option<W>,
    buf: Vec<u8>,
    options: EmitterOptions,
    records: u64,
    bytes_written: u64,
}

impl<W: Write> CsvEmitter<W> {
    /// Creates an emitter with default options.
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, EmitterOptions::default())
    }

    /// Creates an emitter with explicit options.
    pub fn with_options(sink: W, options: EmitterOptions) -> Self {
        Self {
            sink: Some(sink),
            buf: Vec::with_capacity(options.flush_threshold.min(DEFAULT_FLUSH_THRESHOLD)),
            options,
            records: 0,
            bytes_written: 0,
        }
    }

    /// Records emitted so far.
    #[must_use]
    pub const fn records(&self) -> u64 {
        self.records
    }

    /// Bytes emitted so far, including any still buffered.
    #[must_use]
    pub fn bytes_emitted(&self) -> u64 {
        self.bytes_written + self.buf.len() as u64
    }

    /// Appends one cuboid record, flushing if the buffer crosses the
    /// threshold.
    ///
    /// # Errors
    ///
    /// [`EmitError::UnknownLabelId`] when the cuboid's label has no name;
    /// [`EmitError::Io`] if a triggered flush fails.
    pub fn emit(&mut self, cuboid: &Cuboid, labels: &LabelTable) -> EmitResult<()> {
        let Some(name) = labels.name_of(cuboid.label) else {
            return Err(EmitError::UnknownLabelId { id: cuboid.label });
        };

        push_u32(&mut self.buf, cuboid.x);
        self.buf.push(b',');
        push_u32(&mut self.buf, cuboid.y);
        self.buf.push(b',');
        push_u32(&mut self.buf, cuboid.z);
        self.buf.push(b',');
        push_u32(&mut self.buf, cuboid.dx);
        self.buf.push(b',');
        push_u32(&mut self.buf, cuboid.dy);
        self.buf.push(b',');
        push_u32(&mut self.buf, cuboid.dz);
        self.buf.push(b',');
        self.buf.extend_from_slice(name.as_bytes());
        if self.options.crlf {
            self.buf.push(b'\r');
        }
        self.buf.push(b'\n');
        self.records += 1;

        if self.buf.len() >= self.options.flush_threshold {
            self.flush()?;
        }
        Ok(())
    }

    /// Appends a whole batch.
    ///
    /// # Errors
    ///
    /// As [`CsvEmitter::emit`]; the batch stops at the first failure.
    pub fn emit_batch(&mut self, cuboids: &[Cuboid], labels: &LabelTable) -> EmitResult<()> {
        for cuboid in cuboids {
            self.emit(cuboid, labels)?;
        }
        Ok(())
    }

    /// Writes buffered bytes to the sink.
    ///
    /// # Errors
    ///
    /// [`EmitError::Io`] when the sink write fails.
    pub fn flush(&mut self) -> EmitResult<()> {
        if let Some(sink) = self.sink.as_mut() {
            if !self.buf.is_empty() {
                sink.write_all(&self.buf)?;
                self.bytes_written += self.buf.len() as u64;
                self.buf.clear();
            }
            sink.flush()?;
        }
        Ok(())
    }

    /// Flushes residue and returns the sink.
    ///
    /// # Errors
    ///
    /// [`EmitError::Io`] when the final write fails; the sink is lost in
    /// that case, matching the drop path.
    pub fn finish(mut self) -> EmitResult<W> {
        self.flush()?;
        // Sink is always present until finish/drop.
        self.sink.take().ok_or_else(|| {
            EmitError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "emitter already finished",
            ))
        })
    }
}

impl<W: Write> Drop for CsvEmitter<W> {
    fn drop(&mut self) {
        // Best-effort final flush; errors have nowhere to go here.
        let _ = self.flush();
    }
}

/// Appends a decimal integer without going through `fmt`.
fn push_u32(buf: &mut Vec<u8>, mut value: u32) {
    let mut digits = [0u8; 10];
    let mut at = digits.len();
    loop {
        at -= 1;
        digits[at] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    buf.extend_from_slice(&digits[at..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::LabelId;

    fn table() -> LabelTable {
        let mut table = LabelTable::new();
        table.insert(b'a', "rock").unwrap();
        table.insert(b'b', "ore body").unwrap();
        table
    }

    fn emit_to_string(cuboids: &[Cuboid], options: EmitterOptions) -> String {
        let mut emitter = CsvEmitter::with_options(Vec::new(), options);
        emitter.emit_batch(cuboids, &table()).unwrap();
        let bytes = emitter.finish().unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn formats_one_record() {
        let out = emit_to_string(
            &[Cuboid::new(0, 0, 0, 2, 2, 1, LabelId::new(0))],
            EmitterOptions::default(),
        );
        assert_eq!(out, "0,0,0,2,2,1,rock\n");
    }

    #[test]
    fn names_may_contain_spaces() {
        let out = emit_to_string(
            &[Cuboid::new(1, 2, 3, 4, 5, 6, LabelId::new(1))],
            EmitterOptions::default(),
        );
        assert_eq!(out, "1,2,3,4,5,6,ore body\n");
    }

    #[test]
    fn crlf_mode() {
        let out = emit_to_string(
            &[Cuboid::unit(0, 0, 0, LabelId::new(0))],
            EmitterOptions {
                crlf: true,
                ..EmitterOptions::default()
            },
        );
        assert_eq!(out, "0,0,0,1,1,1,rock\r\n");
    }

    #[test]
    fn large_integers_format_fully() {
        let c = Cuboid::new(4_000_000_000, 0, 0, 1, 1, 1, LabelId::new(0));
        let out = emit_to_string(&[c], EmitterOptions::default());
        assert!(out.starts_with("4000000000,"));
    }

    #[test]
    fn threshold_triggers_intermediate_flush() {
        let mut emitter = CsvEmitter::with_options(
            Vec::new(),
            EmitterOptions {
                crlf: false,
                flush_threshold: 16,
            },
        );
        let labels = table();
        for i in 0..4 {
            emitter
                .emit(&Cuboid::unit(i, 0, 0, LabelId::new(0)), &labels)
                .unwrap();
        }
        // Some bytes must already be in the sink before finish.
        assert!(emitter.bytes_written > 0);
        let bytes = emitter.finish().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap().lines().count(), 4);
    }

    #[test]
    fn unknown_label_id() {
        let mut emitter = CsvEmitter::new(Vec::new());
        let err = emitter
            .emit(&Cuboid::unit(0, 0, 0, LabelId::new(9)), &table())
            .unwrap_err();
        assert!(matches!(err, EmitError::UnknownLabelId { .. }));
    }

    #[test]
    fn records_and_bytes_counters() {
        let mut emitter = CsvEmitter::new(Vec::new());
        let labels = table();
        emitter
            .emit(&Cuboid::unit(0, 0, 0, LabelId::new(0)), &labels)
            .unwrap();
        emitter
            .emit(&Cuboid::unit(1, 0, 0, LabelId::new(0)), &labels)
            .unwrap();
        assert_eq!(emitter.records(), 2);
        assert_eq!(emitter.bytes_emitted(), 2 * "0,0,0,1,1,1,rock\n".len() as u64);
    }

    #[test]
    fn push_u32_digits() {
        let mut buf = Vec::new();
        push_u32(&mut buf, 0);
        buf.push(b'|');
        push_u32(&mut buf, 10);
        buf.push(b'|');
        push_u32(&mut buf, u32::MAX);
        assert_eq!(buf, b"0|10|4294967295");
    }
}
