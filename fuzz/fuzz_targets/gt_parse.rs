//! Fuzz target for MOT ground-truth parsing.
//!
//! Feeds arbitrary bytes as a `gt.txt` file, checking for panics or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mot2yolo::mot::gt::fuzz_parse_ground_truth;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = fuzz_parse_ground_truth(data);
});
