#![no_main]

use libfuzzer_sys::fuzz_target;
use linesplit::{ChunkPlanner, SplitConfig};

fuzz_target!(|input: (u8, u8, Vec<u8>)| {
    let (count, terminator, data) = input;
    let chunk_count = usize::from(count) + 1;
    let config = SplitConfig::new(chunk_count)
        .unwrap()
        .with_terminator(terminator);

    let chunks: Vec<Vec<u8>> = ChunkPlanner::new(&data[..], data.len() as u64, &config)
        .map(|c| c.unwrap().data().to_vec())
        .collect();

    // Verify: concatenation reproduces the input
    assert_eq!(chunks.concat(), data);

    // Verify: never more chunks than requested, none for empty input
    assert!(chunks.len() <= chunk_count);
    assert_eq!(chunks.is_empty(), data.is_empty());

    // Verify: every chunk but the last ends on a line boundary
    if let Some((_, rest)) = chunks.split_last() {
        for chunk in rest {
            assert_eq!(chunk.last(), Some(&terminator));
        }
    }
});
