//! Fuzz target for the document parsing strategy chain.
//!
//! Malformed documents must exhaust the chain and come back empty,
//! never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    let _ = idb_core::parse_document(text);
});
