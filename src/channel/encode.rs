//! Batching of requested mode changes into MODE commands.

use tracing::{debug, warn};

use super::Channel;
use crate::capability::CapabilityTable;
use crate::command::Command;
use crate::mode::{ModeChange, Sign};

impl Channel {
    /// Build the MODE commands for a set of requested changes, at most
    /// `MODES` letters per command. An empty request produces a bare
    /// `MODE <channel>` query.
    ///
    /// Local state is not touched; it changes when the server echoes the
    /// modes back.
    pub fn mode<I>(&self, caps: &CapabilityTable, changes: I) -> Vec<Command>
    where
        I: IntoIterator<Item = ModeChange>,
    {
        batch_mode_changes(&self.name, caps, changes)
    }
}

/// Sort changes by mode letter (stable, so request order breaks ties), split
/// them into groups of `caps.modes_per_command()` and render each group as one
/// MODE command with runs of the same sign sharing a single `+`/`-`.
///
/// ```
/// use slirc_chanstate::{batch_mode_changes, CapabilityTable, ModeChange};
///
/// let caps = CapabilityTable::default();
/// let cmds = batch_mode_changes(
///     "#chat",
///     &caps,
///     vec![
///         ModeChange::plus('v').with_target("bob"),
///         ModeChange::plus('o').with_target("alice"),
///     ],
/// );
/// assert_eq!(cmds.len(), 1);
/// assert_eq!(cmds[0].to_string(), "MODE #chat +ov alice bob");
/// ```
pub fn batch_mode_changes<I>(channel: &str, caps: &CapabilityTable, changes: I) -> Vec<Command>
where
    I: IntoIterator<Item = ModeChange>,
{
    let mut changes: Vec<ModeChange> = changes.into_iter().collect();
    if changes.is_empty() {
        return vec![Command::ModeQuery(channel.to_string())];
    }

    for change in &changes {
        match (caps.classify(change.mode), change.sign) {
            (None, _) => warn!(channel, mode = %change.mode, "requesting undeclared mode"),
            (Some(class), Some(sign)) if class.takes_param(sign) && change.target.is_none() => {
                debug!(channel, change = %change, "parameterized mode requested without a target")
            }
            _ => {}
        }
    }

    changes.sort_by_key(|change| change.mode);

    changes
        .chunks(caps.modes_per_command().max(1))
        .map(|group| render_group(channel, group))
        .collect()
}

fn render_group(channel: &str, group: &[ModeChange]) -> Command {
    let mut letters = String::with_capacity(group.len() * 2);
    let mut current: Option<Sign> = None;

    for change in group {
        if let Some(sign) = change.sign {
            if current != Some(sign) {
                letters.push(sign.as_char());
                current = Some(sign);
            }
        }
        letters.push(change.mode);
    }

    let targets = group
        .iter()
        .filter_map(|change| change.target.clone())
        .collect();

    Command::ChannelMODE(channel.to_string(), letters, targets)
}
