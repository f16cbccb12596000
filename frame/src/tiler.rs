//! Chunked parent-block enumeration.

use std::io::BufRead;

use model::{ChunkGrid, GridDims, LabelTable, ParentView};

use crate::error::{FrameError, FrameResult};
use crate::reader::FrameReader;

/// Enumerates parent blocks in `(nz, ny, nx)` order, `nx` fastest.
///
/// The tiler owns one reusable [`ChunkGrid`] holding `parent_z` slices.
/// A new chunk is loaded from the reader only when the cursor enters a new
/// `nz`; the views handed out by [`ParentTiler::next_parent`] borrow the
/// chunk, so the tiler cannot advance while a view is alive.
#[derive(Debug)]
pub struct ParentTiler<'t, R> {
    reader: FrameReader<R>,
    dims: GridDims,
    labels: &'t LabelTable,
    chunk: ChunkGrid,
    nx: u32,
    ny: u32,
    nz: u32,
    chunk_loaded: bool,
    finished: bool,
}

impl<'t, R: BufRead> ParentTiler<'t, R> {
    /// Creates a tiler over a reader whose header and labels are already
    /// consumed.
    #[must_use]
    pub fn new(reader: FrameReader<R>, dims: GridDims, labels: &'t LabelTable) -> Self {
        let chunk = ChunkGrid::new(&dims);
        Self {
            reader,
            dims,
            labels,
            chunk,
            nx: 0,
            ny: 0,
            nz: 0,
            chunk_loaded: false,
            finished: false,
        }
    }

    /// The grid dimensions this tiler iterates.
    #[must_use]
    pub const fn dims(&self) -> &GridDims {
        &self.dims
    }

    /// Returns the next parent-block view, or `None` when the stream ends.
    ///
    /// For a finite depth the iteration covers exactly
    /// `chunks_z * stripes_y * stripes_x` parents; for an unbounded stream
    /// it continues until EOF at a chunk boundary.
    ///
    /// # Errors
    ///
    /// [`FrameError::TruncatedStream`] on EOF inside a chunk,
    /// [`FrameError::UnknownTag`] for a byte absent from the label table,
    /// plus any row error from the underlying reader.
    pub fn next_parent(&mut self) -> FrameResult<Option<ParentView<'_>>> {
        if self.finished {
            return Ok(None);
        }
        if !self.chunk_loaded {
            if !self.load_chunk()? {
                self.finished = true;
                return Ok(None);
            }
            self.chunk_loaded = true;
        }

        let (nx, ny) = (self.nx, self.ny);

        // Advance the cursor before handing out the borrow.
        self.nx += 1;
        if self.nx == self.dims.stripes_x() {
            self.nx = 0;
            self.ny += 1;
            if self.ny == self.dims.stripes_y() {
                self.ny = 0;
                self.nz += 1;
                self.chunk_loaded = false;
            }
        }

        Ok(Some(ParentView::new(&self.chunk, &self.dims, nx, ny)))
    }

    /// Loads the chunk for the current `nz`. Returns `false` on a clean
    /// end of stream.
    fn load_chunk(&mut self) -> FrameResult<bool> {
        if let Some(chunks_z) = self.dims.chunks_z() {
            if self.nz >= chunks_z {
                return Ok(false);
            }
        }

        let z0 = self.nz * self.dims.parent_z();
        self.chunk.reset(z0);

        for lz in 0..self.dims.parent_z() {
            for y in 0..self.dims.y() {
                let row = match self.reader.next_row()? {
                    Some(row) => row,
                    None => {
                        if lz == 0 && y == 0 && self.dims.is_unbounded() {
                            return Ok(false);
                        }
                        return Err(FrameError::TruncatedStream { y, z: z0 + lz });
                    }
                };

                // Convert tag bytes to ids; the first unknown byte aborts
                // with its coordinates.
                let labels = self.labels;
                let dest = self.chunk.row_mut(y, lz);
                for (x, &tag) in row.iter().enumerate() {
                    match labels.id_of(tag) {
                        Some(id) => dest[x] = id,
                        None => {
                            return Err(FrameError::UnknownTag {
                                tag,
                                x: x as u32,
                                y,
                                z: z0 + lz,
                            });
                        }
                    }
                }
            }
        }
        Ok(true)
    }
}
