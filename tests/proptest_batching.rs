//! Property-based tests for MODE batching and decoding.
//!
//! Uses proptest to generate random mode requests and verify that:
//! 1. The batcher emits `ceil(N / M)` commands for N changes
//! 2. The emitted letters are the requested letters in sorted order
//! 3. Granting then revoking statuses through the decoder leaves no entry

use proptest::prelude::*;
use slirc_chanstate::{
    batch_mode_changes, CapabilityTable, Channel, Command, ConnectionId, ModeChange, UserStatusMap,
};

fn caps(modes: usize) -> CapabilityTable {
    CapabilityTable::parse("beI,k,l,imnpst", "(ohv)@%+", &modes.to_string(), "")
        .expect("valid capability table")
}

/// Valid IRC nickname, kept short.
fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,8}").expect("valid regex")
}

fn change_strategy() -> impl Strategy<Value = ModeChange> {
    (
        any::<bool>(),
        prop::sample::select(vec!['b', 'i', 'k', 'l', 'm', 'n', 'o', 'v', 't']),
        nickname_strategy(),
    )
        .prop_map(|(plus, mode, target)| {
            let change = if plus {
                ModeChange::plus(mode)
            } else {
                ModeChange::minus(mode)
            };
            change.with_target(target)
        })
}

fn letters(cmd: &Command) -> String {
    match cmd {
        Command::ChannelMODE(_, modes, _) => modes.chars().filter(|c| *c != '+' && *c != '-').collect(),
        other => panic!("unexpected command {:?}", other),
    }
}

proptest! {
    #[test]
    fn batch_count_and_order(
        changes in prop::collection::vec(change_strategy(), 1..40),
        per_command in 1usize..8,
    ) {
        let cmds = batch_mode_changes("#chat", &caps(per_command), changes.clone());
        let expected_count = (changes.len() + per_command - 1) / per_command;
        prop_assert_eq!(cmds.len(), expected_count);

        let mut expected: Vec<char> = changes.iter().map(|c| c.mode).collect();
        expected.sort();
        let emitted: String = cmds.iter().map(letters).collect();
        prop_assert_eq!(emitted, expected.into_iter().collect::<String>());

        for cmd in &cmds {
            if let Command::ChannelMODE(_, _, targets) = cmd {
                prop_assert!(targets.len() <= per_command);
            }
        }
    }

    #[test]
    fn grant_then_revoke_empties_status(
        nicks in prop::collection::btree_set(nickname_strategy(), 1..12),
        per_command in 1usize..6,
    ) {
        let caps = caps(per_command);
        let mut users = UserStatusMap::new();
        let mut chan = Channel::new("#chat", ConnectionId::new(1));

        let grants = nicks.iter().map(|n| ModeChange::plus('v').with_target(n.as_str()));
        for cmd in chan.mode(&caps, grants) {
            if let Command::ChannelMODE(_, modes, targets) = cmd {
                chan.apply_modes(&caps, &mut users, "srv", &modes, targets.as_slice()).unwrap();
            }
        }
        for nick in &nicks {
            prop_assert_eq!(chan.statuses_of(&caps, nick), vec!['v']);
        }

        let revokes = nicks.iter().map(|n| ModeChange::minus('v').with_target(n.as_str()));
        for cmd in chan.mode(&caps, revokes) {
            if let Command::ChannelMODE(_, modes, targets) = cmd {
                chan.apply_modes(&caps, &mut users, "srv", &modes, targets.as_slice()).unwrap();
            }
        }
        prop_assert!(!chan.has_mode('v'));
    }
}
