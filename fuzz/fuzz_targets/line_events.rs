//! Fuzz target for session state updates
//!
//! Feeds arbitrary newline-separated input through the session engine line
//! by line. Errors are expected; panics are not.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        if input.len() > 8192 {
            return;
        }

        let mut state = slirc_state::SessionState::new();
        state.handle_line(":fuzz.example 001 me :Welcome").ok();

        for line in input.split('\n') {
            let _ = state.handle_line(line);
        }

        // Queries must also hold up after arbitrary input.
        for (name, _) in state.members().channels() {
            let _ = state.interpret_mode(name, "+ov-b", &["me", "me", "*"]);
        }
    }
});
