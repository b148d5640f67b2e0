//! Fuzz target for realtime envelope decoding
//!
//! This fuzzer tests both directions of the realtime channel with arbitrary
//! input to find:
//! - Parser crashes or panics
//! - Type confusion between event names and payload shapes
//! - Unbounded recursion on nested JSON
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use studenthub_proto::{ClientDirective, ServerEvent};

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        let _ = ServerEvent::decode(raw);
        let _ = ClientDirective::decode(raw);
    }
});
