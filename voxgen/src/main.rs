use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use engine::Strategy;
use serde::Serialize;
use voxpack_tools::{compress, validate, CompressConfig};

#[derive(Parser)]
#[command(
    name = "voxgen",
    version,
    about = "Deterministic voxel model generator"
)]
struct Cli {
    /// Grid extent along X (must divide by --px).
    #[arg(long, default_value_t = 32)]
    x: u32,
    /// Grid extent along Y (must divide by --py).
    #[arg(long, default_value_t = 32)]
    y: u32,
    /// Grid extent along Z (must divide by --pz).
    #[arg(long, default_value_t = 8)]
    z: u32,
    /// Parent-block extent along X.
    #[arg(long, default_value_t = 8)]
    px: u32,
    /// Parent-block extent along Y.
    #[arg(long, default_value_t = 8)]
    py: u32,
    /// Parent-block extent along Z.
    #[arg(long, default_value_t = 4)]
    pz: u32,
    /// RNG seed for deterministic results.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Terrain scenario.
    #[arg(long, value_enum, default_value_t = Scenario::Layers)]
    scenario: Scenario,
    /// Output directory for the model, summary, and check artifacts.
    #[arg(long, default_value = "captures")]
    out_dir: PathBuf,
    /// Compress with these strategies and validate the round trip.
    #[arg(long, value_delimiter = ',')]
    check: Vec<String>,
    /// Fail when any checked strategy emits more than this many cuboids
    /// per thousand cells.
    #[arg(long)]
    max_cuboids_per_mille: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    /// Horizontal strata with jittered boundaries.
    Layers,
    /// Random boxes over a background label.
    Blobs,
    /// Worst-case alternating checkerboard.
    Checker,
}

const LABELS: &[(u8, &str)] = &[
    (b'r', "rock"),
    (b'o', "ore"),
    (b's', "soil"),
    (b'w', "water"),
    (b'.', "air"),
];

fn main() -> Result<()> {
    let cli = Cli::parse();
    model::GridDims::finite(cli.x, cli.y, cli.z, cli.px, cli.py, cli.pz)
        .context("invalid dimensions")?;

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create output dir {}", cli.out_dir.display()))?;

    let mut rng = Rng::new(cli.seed);
    let model = generate(&cli, &mut rng);
    let model_path = cli.out_dir.join("model.txt");
    fs::write(&model_path, &model).with_context(|| format!("write {}", model_path.display()))?;

    let mut summary = Summary::new(&cli);
    count_cells(&model, &mut summary);

    for name in &cli.check {
        let strategy: Strategy = name
            .parse()
            .with_context(|| format!("unknown strategy {name:?}"))?;
        let run = check_strategy(&cli, &model, strategy)?;
        if let Some(budget) = cli.max_cuboids_per_mille {
            if run.cuboids_per_mille > budget {
                anyhow::bail!(
                    "{name}: {} cuboids per 1000 cells exceeds budget {budget}",
                    run.cuboids_per_mille
                );
            }
        }
        summary.checks.push(run);
    }

    let summary_path = cli.out_dir.join("summary.json");
    let contents = serde_json::to_string_pretty(&summary).context("serialize summary")?;
    fs::write(&summary_path, contents)
        .with_context(|| format!("write {}", summary_path.display()))?;

    Ok(())
}

fn generate(cli: &Cli, rng: &mut Rng) -> String {
    let mut out = String::with_capacity(
        (cli.x as usize + 1) * cli.y as usize * cli.z as usize + 256,
    );
    header(cli, &mut out);

    match cli.scenario {
        Scenario::Layers => layers(cli, rng, &mut out),
        Scenario::Blobs => blobs(cli, rng, &mut out),
        Scenario::Checker => checker(cli, &mut out),
    }
    out
}

fn header(cli: &Cli, out: &mut String) {
    out.push_str(&format!(
        "{},{},{},{},{},{}\n",
        cli.x, cli.y, cli.z, cli.px, cli.py, cli.pz
    ));
    for (tag, name) in LABELS {
        out.push(char::from(*tag));
        out.push(',');
        out.push_str(name);
        out.push('\n');
    }
    out.push('\n');
}

/// Horizontal strata: label picked per Z band, boundaries jittered per
/// column so runs stay long but not degenerate.
fn layers(cli: &Cli, rng: &mut Rng, out: &mut String) {
    let band = (cli.z / LABELS.len() as u32).max(1);
    for z in 0..cli.z {
        // Jitter only near band boundaries; band interiors stay uniform
        // to give the strategies something to merge.
        let in_boundary = z % band == 0 || (z + 1) % band == 0;
        for _y in 0..cli.y {
            for _x in 0..cli.x {
                let idx = if in_boundary {
                    let jitter = i64::from(rng.next_u32() % 3) - 1;
                    (i64::from(z / band) + jitter).rem_euclid(LABELS.len() as i64) as usize
                } else {
                    (z / band) as usize % LABELS.len()
                };
                out.push(char::from(LABELS[idx].0));
            }
            out.push('\n');
        }
        if z + 1 < cli.z {
            out.push('\n');
        }
    }
}

/// Random axis-aligned boxes of ore/water/soil over a rock background.
fn blobs(cli: &Cli, rng: &mut Rng, out: &mut String) {
    let (gx, gy, gz) = (cli.x as usize, cli.y as usize, cli.z as usize);
    let mut grid = vec![b'r'; gx * gy * gz];
    let boxes = ((gx * gy * gz) / 512).max(4);
    for _ in 0..boxes {
        let tag = [b'o', b'w', b's', b'.'][(rng.next_u32() % 4) as usize];
        let bx = rng.below(cli.x);
        let by = rng.below(cli.y);
        let bz = rng.below(cli.z);
        let dx = 1 + rng.below((cli.x - bx).min(cli.px));
        let dy = 1 + rng.below((cli.y - by).min(cli.py));
        let dz = 1 + rng.below((cli.z - bz).min(cli.pz));
        for z in bz..(bz + dz).min(cli.z) {
            for y in by..(by + dy).min(cli.y) {
                for x in bx..(bx + dx).min(cli.x) {
                    grid[(z as usize * gy + y as usize) * gx + x as usize] = tag;
                }
            }
        }
    }
    for z in 0..gz {
        for y in 0..gy {
            for x in 0..gx {
                out.push(char::from(grid[(z * gy + y) * gx + x]));
            }
            out.push('\n');
        }
        if z + 1 < gz {
            out.push('\n');
        }
    }
}

/// Alternating labels cell by cell; nothing merges anywhere.
fn checker(cli: &Cli, out: &mut String) {
    for z in 0..cli.z {
        for y in 0..cli.y {
            for x in 0..cli.x {
                let tag = if (x + y + z) % 2 == 0 { b'r' } else { b'.' };
                out.push(char::from(tag));
            }
            out.push('\n');
        }
        if z + 1 < cli.z {
            out.push('\n');
        }
    }
}

fn count_cells(model: &str, summary: &mut Summary) {
    // Skip header and label table: cells start after the blank line.
    let body = model.split_once("\n\n").map_or("", |(_, body)| body);
    for byte in body.bytes() {
        if byte == b'\n' {
            continue;
        }
        if let Some(entry) = summary
            .cells_per_label
            .iter_mut()
            .find(|entry| entry.tag == char::from(byte))
        {
            entry.cells += 1;
        }
        summary.total_cells += 1;
    }
}

fn check_strategy(cli: &Cli, model: &str, strategy: Strategy) -> Result<CheckRun> {
    let config = CompressConfig {
        strategy,
        ..CompressConfig::default()
    };
    let mut csv = Vec::new();
    let stats = compress(model.as_bytes(), &mut csv, &config)
        .with_context(|| format!("compress with {strategy}"))?;
    validate(model.as_bytes(), csv.as_slice())
        .with_context(|| format!("round-trip validate {strategy}"))?;

    let csv_path = cli.out_dir.join(format!("cuboids_{strategy}.csv"));
    fs::write(&csv_path, &csv).with_context(|| format!("write {}", csv_path.display()))?;

    let cuboids_per_mille = if stats.cells == 0 {
        0
    } else {
        stats.cuboids * 1000 / stats.cells
    };
    Ok(CheckRun {
        strategy: strategy.as_str(),
        cuboids: stats.cuboids,
        bytes_out: stats.bytes_out,
        cuboids_per_mille,
    })
}

struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    /// Uniform-ish value in `[0, bound)`; `bound` 0 yields 0.
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            0
        } else {
            self.next_u32() % bound
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    x: u32,
    y: u32,
    z: u32,
    px: u32,
    py: u32,
    pz: u32,
    seed: u64,
    scenario: String,
    total_cells: u64,
    cells_per_label: Vec<LabelCells>,
    checks: Vec<CheckRun>,
}

#[derive(Debug, Serialize)]
struct LabelCells {
    tag: char,
    name: &'static str,
    cells: u64,
}

#[derive(Debug, Serialize)]
struct CheckRun {
    strategy: &'static str,
    cuboids: u64,
    bytes_out: u64,
    cuboids_per_mille: u64,
}

impl Summary {
    fn new(cli: &Cli) -> Self {
        Self {
            x: cli.x,
            y: cli.y,
            z: cli.z,
            px: cli.px,
            py: cli.py,
            pz: cli.pz,
            seed: cli.seed,
            scenario: format!("{:?}", cli.scenario).to_lowercase(),
            total_cells: 0,
            cells_per_label: LABELS
                .iter()
                .map(|(tag, name)| LabelCells {
                    tag: char::from(*tag),
                    name,
                    cells: 0,
                })
                .collect(),
            checks: Vec::new(),
        }
    }
}
