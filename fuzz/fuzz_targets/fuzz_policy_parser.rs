//! Fuzz target for policy parsing and the policy algebra on parsed results.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_policy_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Policies arrive in HTTP headers; keep inputs header-sized.
    if data.len() > 8192 {
        return;
    }
    if let Ok(text) = std::str::from_utf8(data) {
        cspkit_parser::fuzz::parse_policy(text);
    }
});
