#![no_main]

use frame::FrameReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The reader must never panic on arbitrary bytes: errors and clean
    // EOF are the only acceptable outcomes.
    let mut reader = FrameReader::new(data);
    let Ok(dims) = reader.read_header() else {
        return;
    };
    let Ok(_labels) = reader.read_labels() else {
        return;
    };

    // Bound the walk so absurd declared extents cannot stall the fuzzer.
    let mut rows = 0u32;
    let budget = 4096 / dims.x().max(1) + 8;
    while rows < budget {
        match reader.next_row() {
            Ok(Some(_)) => rows += 1,
            Ok(None) | Err(_) => break,
        }
    }
});
