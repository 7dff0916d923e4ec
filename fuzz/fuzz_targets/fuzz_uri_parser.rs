//! Fuzz target for URI and source expression parsing.
//!
//! Goal: both parsers should **never panic**. Malformed input maps to the invalid sentinels.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_uri_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        cspkit_parser::fuzz::parse_uri(text);
        cspkit_parser::fuzz::parse_source_expression(text);
    }
});
