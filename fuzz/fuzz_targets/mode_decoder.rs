//! Fuzz target for inbound MODE handling
//!
//! Feeds arbitrary lines to the registry and arbitrary mode strings straight
//! to a channel, checking that neither panics and that a desync never leaves
//! an empty status set or list behind.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_chanstate::{
    CapabilityTable, Channel, ChannelRegistry, ConnectionId, ModeState, UserStatusMap,
};
use std::str;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };
    if input.is_empty() || input.len() > 512 {
        return;
    }

    let conn = ConnectionId::new(1);
    let caps = CapabilityTable::default();
    let mut users = UserStatusMap::new();

    let mut registry = ChannelRegistry::new(caps.clone());
    let _ = registry.add("#fuzz", conn);
    let _ = registry.handle_line(conn, input, &mut users);

    // First word is the mode string, the rest are targets.
    let mut words = input.split(' ');
    let modes = words.next().unwrap_or("");
    let targets: Vec<&str> = words.collect();

    let mut chan = Channel::new("#fuzz", conn);
    let _ = chan.apply_modes(&caps, &mut users, "fuzz", modes, targets.as_slice());

    for state in chan.modes().values() {
        match state {
            ModeState::Status(holders) => assert!(!holders.is_empty()),
            ModeState::List(entries) => assert!(!entries.is_empty()),
            ModeState::Value(_) => {}
        }
    }
});
