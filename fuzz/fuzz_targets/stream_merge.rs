#![no_main]

use engine::StreamRleXy;
use libfuzzer_sys::fuzz_target;
use model::{Cuboid, GridDims, LabelTable};

fuzz_target!(|data: &[u8]| {
    // Fixed small geometry; the fuzzer drives row contents.
    let dims = GridDims::finite(8, 4, 0, 4, 2, 1)
        .unwrap_or_else(|_| unreachable!("static dims are valid"));
    let mut labels = LabelTable::new();
    for tag in [b'a', b'b', b'c'] {
        let _ = labels.insert(tag, "label");
    }

    let width = dims.x() as usize;
    let mut stream = StreamRleXy::new(&dims);
    let mut out: Vec<Cuboid> = Vec::new();
    let mut expected_cells = 0u64;

    let mut z = 0u32;
    let mut y = 0u32;
    for chunk in data.chunks(width) {
        if chunk.len() < width {
            break;
        }
        // Map arbitrary bytes onto the three known tags so the merge
        // logic is exercised rather than the unknown-tag bail-out.
        let row: Vec<u8> = chunk.iter().map(|b| b'a' + b % 3).collect();
        if stream.on_row(z, y, &row, &labels, &mut out).is_err() {
            return;
        }
        expected_cells += dims.x() as u64;
        y += 1;
        if y == dims.y() {
            stream.on_slice_end(z, &mut out);
            y = 0;
            z += 1;
        }
    }
    if y > 0 {
        stream.on_slice_end(z, &mut out);
    }

    // Everything consumed must come back out exactly once.
    let emitted: u64 = out.iter().map(Cuboid::volume).sum();
    assert_eq!(emitted, expected_cells);
    for c in &out {
        assert!(c.within_one_parent(&dims));
    }
});
