//! Fuzz target for resource matching.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_policy_match
//! ```

#![no_main]

use arbitrary::Arbitrary;
use cspkit_domain::SchemePorts;
use cspkit_domain::tables::default_src_types;
use cspkit_parser::{PolicyParser, UriParser};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct MatchInput {
    policy: String,
    resource: String,
    resource_type: String,
    document: String,
}

fuzz_target!(|input: MatchInput| {
    if input.policy.len() > 4096 || input.resource.len() > 1024 || input.document.len() > 1024 {
        return;
    }

    let uris = UriParser::default();
    let policy = PolicyParser::default().parse(&input.policy);
    let resource = uris.parse(&input.resource);
    let document = uris.parse(&input.document);

    // Should never panic; the verdict itself is irrelevant here.
    let _ = policy.matches(
        &resource,
        &input.resource_type,
        &document,
        &SchemePorts::default(),
        &default_src_types(),
    );
});
