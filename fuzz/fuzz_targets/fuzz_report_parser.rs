//! Fuzz target for violation report and log entry parsing.
//!
//! Goal: arbitrary JSON (or non-JSON) should **never panic**, including policy generation.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_report_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        cspkit_report::fuzz_parse(text);
    }
});
