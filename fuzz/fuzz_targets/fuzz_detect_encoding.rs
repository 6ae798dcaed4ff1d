//! Fuzz target for encoding detection and decode.
//!
//! Detection must return exactly one encoding for arbitrary bytes, and
//! decoding with that encoding must be lossy rather than panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let encoding = idb_encoding::detect(data);
    let _ = encoding.decode(data);
});
