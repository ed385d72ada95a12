#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use linesplit::{MemorySink, OutputLayout, SplitConfig, Splitter};

fuzz_target!(|input: (u8, u8, Vec<u8>)| {
    let (count, workers, data) = input;
    let config = SplitConfig::new(usize::from(count % 32) + 1)
        .unwrap()
        .with_workers(usize::from(workers % 4) + 1)
        .with_queue_depth(Some(1));

    let sink = Arc::new(MemorySink::new());
    let report = Splitter::new(config)
        .with_sink(Arc::clone(&sink))
        .split_reader(&data[..], data.len() as u64, OutputLayout::new("f", "tmp_f"))
        .unwrap();

    // Verify: every record was written and the pieces rebuild the input
    let rebuilt: Vec<u8> = report
        .paths()
        .iter()
        .flat_map(|p| sink.get(p).unwrap())
        .collect();
    assert_eq!(rebuilt, data);

    // Verify: all buffers were returned
    assert_eq!(report.pool.outstanding, 0);
    assert!(report.pool.peak_outstanding <= report.peak_in_flight + 1);
});
