//! Pipeline glue for the voxpack CLI: compression, validation, and
//! inspection over byte streams.
//!
//! The compressor wires the frame reader, grouping engine, and CSV
//! emitter together; validation repaints emitted cuboids over a re-read
//! of the model and checks exact coverage; inspection summarizes a
//! cuboid stream without touching the model.

use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use emit::{CsvEmitter, EmitterOptions, DEFAULT_FLUSH_THRESHOLD};
use engine::{cover, cover_ensemble, verify_cover, Strategy, StreamRleXy};
use frame::{FrameError, FrameReader, ParentTiler};
use model::{Cuboid, GridDims, LabelTable};
use serde::Serialize;

/// Configuration for one compression run.
#[derive(Debug, Clone, Copy)]
pub struct CompressConfig {
    /// The grouping strategy.
    pub strategy: Strategy,
    /// Parallel candidates for the Smart ensemble: 0 = one thread per
    /// candidate, 1 = sequential, otherwise the thread cap.
    pub pool_size: usize,
    /// Emit CRLF line endings.
    pub crlf: bool,
    /// Output buffer high-water mark in bytes.
    pub flush_threshold: usize,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::StreamRleXy,
            pool_size: 0,
            crlf: false,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }
}

/// Counters from a compression run.
#[derive(Debug, Clone, Serialize)]
pub struct CompressStats {
    pub strategy: &'static str,
    pub labels: usize,
    pub slices: u64,
    pub cells: u64,
    pub cuboids: u64,
    pub bytes_out: u64,
}

/// Compresses a model stream into CSV cuboid records.
///
/// # Errors
///
/// Frame errors for malformed input, engine errors for unknown tags in
/// the streaming path, I/O errors from the sink.
pub fn compress<R: BufRead, W: Write>(
    input: R,
    output: W,
    config: &CompressConfig,
) -> Result<CompressStats> {
    let mut reader = FrameReader::new(input);
    let dims = reader.read_header().context("read header")?;
    let labels = reader.read_labels().context("read label table")?;

    let options = EmitterOptions {
        crlf: config.crlf,
        flush_threshold: config.flush_threshold,
    };
    let mut emitter = CsvEmitter::with_options(output, options);

    let (slices, cells) = if config.strategy.is_streaming() {
        run_streaming(&mut reader, &dims, &labels, &mut emitter)?
    } else {
        run_per_parent(reader, dims, &labels, config, &mut emitter)?
    };

    let cuboids = emitter.records();
    let bytes_out = emitter.bytes_emitted();
    emitter.finish().context("flush output")?;

    Ok(CompressStats {
        strategy: config.strategy.as_str(),
        labels: labels.len(),
        slices,
        cells,
        cuboids,
        bytes_out,
    })
}

/// Row-streaming path: no chunk materialization, all labels in one pass.
fn run_streaming<R: BufRead, W: Write>(
    reader: &mut FrameReader<R>,
    dims: &GridDims,
    labels: &LabelTable,
    emitter: &mut CsvEmitter<W>,
) -> Result<(u64, u64)> {
    let mut stream = StreamRleXy::new(dims);
    let mut batch: Vec<Cuboid> = Vec::new();
    let mut cells: u64 = 0;
    let mut slices: u64 = 0;

    let mut z: u32 = 0;
    'stream: loop {
        if let Some(depth) = dims.depth() {
            if z >= depth {
                break;
            }
        }
        for y in 0..dims.y() {
            let Some(row) = reader.next_row().context("read row")? else {
                // EOF. Truncation is only an error for a declared depth;
                // an unbounded stream simply ends here.
                if dims.depth().is_some() {
                    return Err(FrameError::TruncatedStream { y, z }.into());
                }
                if y > 0 {
                    batch.clear();
                    stream.on_slice_end(z, &mut batch);
                    emitter.emit_batch(&batch, labels).context("emit batch")?;
                }
                break 'stream;
            };
            batch.clear();
            stream
                .on_row(z, y, row, labels, &mut batch)
                .context("stream row")?;
            cells += u64::from(dims.x());
            if y + 1 == dims.y() {
                stream.on_slice_end(z, &mut batch);
            }
            emitter.emit_batch(&batch, labels).context("emit batch")?;
        }
        slices += 1;
        z += 1;
    }

    Ok((slices, cells))
}

/// Per-parent path: chunk materialization and one cover per label.
fn run_per_parent<R: BufRead, W: Write>(
    reader: FrameReader<R>,
    dims: GridDims,
    labels: &LabelTable,
    config: &CompressConfig,
    emitter: &mut CsvEmitter<W>,
) -> Result<(u64, u64)> {
    let mut tiler = ParentTiler::new(reader, dims, labels);
    let mut batch: Vec<Cuboid> = Vec::new();
    let mut parents: u64 = 0;

    while let Some(view) = tiler.next_parent().context("next parent block")? {
        parents += 1;
        for id in labels.ids() {
            batch.clear();
            if config.strategy == Strategy::Smart && config.pool_size != 1 {
                cover_ensemble(&view, id, config.pool_size, &mut batch);
            } else {
                cover(config.strategy, &view, id, &mut batch);
            }
            if cfg!(debug_assertions) {
                verify_cover(config.strategy, &view, id, &batch).context("verify cover")?;
            }
            emitter.emit_batch(&batch, labels).context("emit batch")?;
        }
    }

    let parents_per_chunk = u64::from(dims.stripes_x()) * u64::from(dims.stripes_y());
    let chunks = parents / parents_per_chunk;
    let slices = chunks * u64::from(dims.parent_z());
    let cells = slices * dims.cells_per_slice();
    Ok((slices, cells))
}

/// One parsed output record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuboidRecord {
    pub cuboid: [u32; 6],
    pub name: String,
}

/// A cuboid CSV line that did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFormatError {
    /// 1-based line number.
    pub line: u64,
    pub reason: &'static str,
}

impl fmt::Display for RecordFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record line {}: {}", self.line, self.reason)
    }
}

impl std::error::Error for RecordFormatError {}

/// Parses `x,y,z,dx,dy,dz,name` records, one per line.
///
/// # Errors
///
/// [`RecordFormatError`] with the failing line number.
pub fn parse_records<R: BufRead>(input: R) -> Result<Vec<CuboidRecord>> {
    let mut records = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line = line.context("read record line")?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.is_empty() {
            continue;
        }
        let number = idx as u64 + 1;
        let mut fields = line.splitn(7, ',');
        let mut cuboid = [0u32; 6];
        for slot in &mut cuboid {
            let field = fields.next().ok_or(RecordFormatError {
                line: number,
                reason: "fewer than 7 fields",
            })?;
            *slot = field.trim().parse().map_err(|_| RecordFormatError {
                line: number,
                reason: "non-integer coordinate field",
            })?;
        }
        let name = fields.next().ok_or(RecordFormatError {
            line: number,
            reason: "missing label name",
        })?;
        records.push(CuboidRecord {
            cuboid,
            name: name.to_owned(),
        });
    }
    Ok(records)
}

/// Result of validating a cuboid stream against its model.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateReport {
    pub cuboids: u64,
    pub cells: u64,
    pub slices: u64,
}

/// Repaints every record over a re-read of the model and checks exact
/// coverage: in-bounds, parent-contained, label-correct, no overlap, no
/// gap.
///
/// # Errors
///
/// Fails on the first violated invariant, naming the offending record or
/// cell.
pub fn validate<M: BufRead, C: BufRead>(model_input: M, cuboid_input: C) -> Result<ValidateReport> {
    let mut reader = FrameReader::new(model_input);
    let dims = reader.read_header().context("read header")?;
    let labels = reader.read_labels().context("read label table")?;
    let records = parse_records(cuboid_input)?;

    // Group records by owning parent; any boundary crosser fails now.
    let mut by_parent: HashMap<(u32, u32, u32), Vec<usize>> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        let [x, y, z, dx, dy, dz] = record.cuboid;
        if dx == 0 || dy == 0 || dz == 0 {
            bail!("record {}: zero extent", idx + 1);
        }
        // Widen before adding: hostile records may sit near u32::MAX.
        if u64::from(x) + u64::from(dx) > u64::from(dims.x())
            || u64::from(y) + u64::from(dy) > u64::from(dims.y())
        {
            bail!("record {}: outside the grid", idx + 1);
        }
        if let Some(depth) = dims.depth() {
            if u64::from(z) + u64::from(dz) > u64::from(depth) {
                bail!("record {}: beyond the declared depth", idx + 1);
            }
        } else if u64::from(z) + u64::from(dz) > u64::from(u32::MAX) {
            bail!("record {}: depth out of range", idx + 1);
        }
        let c = Cuboid::new(x, y, z, dx, dy, dz, model::LabelId::new(0));
        if !c.within_one_parent(&dims) {
            bail!("record {}: crosses a parent boundary", idx + 1);
        }
        let key = (x / dims.parent_x(), y / dims.parent_y(), z / dims.parent_z());
        by_parent.entry(key).or_default().push(idx);
    }

    let mut tiler = ParentTiler::new(reader, dims, &labels);
    let mut painted: Vec<bool> = Vec::new();
    let mut slices: u64 = 0;
    let mut covered_cells: u64 = 0;

    while let Some(view) = tiler.next_parent().context("next parent block")? {
        let volume =
            (view.size_x() as usize) * (view.size_y() as usize) * (view.size_z() as usize);
        painted.clear();
        painted.resize(volume, false);

        let key = (
            view.origin_x() / dims.parent_x(),
            view.origin_y() / dims.parent_y(),
            view.origin_z() / dims.parent_z(),
        );
        let empty = Vec::new();
        let members = by_parent.get(&key).unwrap_or(&empty);

        let mut local_covered = 0u64;
        for &idx in members {
            let record = &records[idx];
            let [x, y, z, dx, dy, dz] = record.cuboid;
            for cz in z..z + dz {
                for cy in y..y + dy {
                    for cx in x..x + dx {
                        let (lx, ly, lz) =
                            (cx - view.origin_x(), cy - view.origin_y(), cz - view.origin_z());
                        let slot = (lz as usize * view.size_y() as usize + ly as usize)
                            * view.size_x() as usize
                            + lx as usize;
                        if painted[slot] {
                            bail!("overlapping records at cell ({cx}, {cy}, {cz})");
                        }
                        painted[slot] = true;
                        local_covered += 1;

                        let cell = view.get(lx, ly, lz);
                        let cell_name = labels
                            .name_of(cell)
                            .context("cell label missing from table")?;
                        if cell_name != record.name {
                            bail!(
                                "record {} labels cell ({cx}, {cy}, {cz}) {:?}, model says {:?}",
                                idx + 1,
                                record.name,
                                cell_name
                            );
                        }
                    }
                }
            }
        }

        if local_covered != volume as u64 {
            bail!(
                "parent at ({}, {}, {}): {} of {} cells covered",
                view.origin_x(),
                view.origin_y(),
                view.origin_z(),
                local_covered,
                volume
            );
        }
        covered_cells += local_covered;
        by_parent.remove(&key);

        if key.0 == dims.stripes_x() - 1 && key.1 == dims.stripes_y() - 1 {
            slices += u64::from(dims.parent_z());
        }
    }

    if let Some(key) = by_parent.keys().next() {
        bail!(
            "records reference a parent block at ({}, {}, {}) past the model",
            key.0 * dims.parent_x(),
            key.1 * dims.parent_y(),
            key.2 * dims.parent_z()
        );
    }

    Ok(ValidateReport {
        cuboids: records.len() as u64,
        cells: covered_cells,
        slices,
    })
}

/// Per-label rollup of a cuboid stream.
#[derive(Debug, Clone, Serialize)]
pub struct LabelSummary {
    pub name: String,
    pub records: u64,
    pub volume: u64,
}

/// Summary of a cuboid stream, model-free.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub records: u64,
    pub total_volume: u64,
    pub largest_volume: u64,
    pub per_label: Vec<LabelSummary>,
}

/// Summarizes a cuboid stream: record and volume totals per label.
///
/// # Errors
///
/// [`RecordFormatError`] for unparseable lines.
pub fn inspect<C: BufRead>(cuboid_input: C) -> Result<InspectReport> {
    let records = parse_records(cuboid_input)?;

    let mut by_name: HashMap<&str, (u64, u64)> = HashMap::new();
    let mut total_volume = 0u64;
    let mut largest = 0u64;
    for record in &records {
        let [_, _, _, dx, dy, dz] = record.cuboid;
        let volume = u64::from(dx) * u64::from(dy) * u64::from(dz);
        total_volume += volume;
        largest = largest.max(volume);
        let entry = by_name.entry(&record.name).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += volume;
    }

    let mut per_label: Vec<LabelSummary> = by_name
        .into_iter()
        .map(|(name, (records, volume))| LabelSummary {
            name: name.to_owned(),
            records,
            volume,
        })
        .collect();
    per_label.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(InspectReport {
        records: records.len() as u64,
        total_volume,
        largest_volume: largest,
        per_label,
    })
}

/// Returns `true` when the error chain roots in malformed input rather
/// than an internal or I/O failure; the CLI maps this to exit code 2.
#[must_use]
pub fn is_input_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(frame) = cause.downcast_ref::<FrameError>() {
            return !matches!(frame, FrameError::Io(_));
        }
        if let Some(engine) = cause.downcast_ref::<engine::EngineError>() {
            return matches!(
                engine,
                engine::EngineError::UnknownTag { .. } | engine::EngineError::UnknownStrategy { .. }
            );
        }
        cause.downcast_ref::<RecordFormatError>().is_some()
            || cause.downcast_ref::<model::ModelError>().is_some()
    })
}
