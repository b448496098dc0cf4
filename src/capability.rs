//! Server-advertised channel mode configuration.
//!
//! A [`CapabilityTable`] holds the four ISUPPORT values the channel engine
//! depends on:
//!
//! - `PREFIX`: status modes and their display symbols, highest rank first
//! - `CHANMODES`: the four parameter categories of every other mode
//! - `MODES`: how many mode letters one outgoing MODE command may carry
//! - `STATUSMSG`: symbols that may prefix a channel name to address members
//!   holding that status
//!
//! Every mode letter is classified exactly once, into a single lookup shared
//! by the encoder and the decoder.
//!
//! # Example
//!
//! ```
//! use slirc_chanstate::{CapabilityTable, ModeClass};
//!
//! let caps = CapabilityTable::parse("beI,k,l,imnpst", "(ov)@+", "4", "@+").unwrap();
//! assert_eq!(caps.classify('o'), Some(ModeClass::Status));
//! assert_eq!(caps.classify('l'), Some(ModeClass::SetOnlyParam));
//! assert_eq!(caps.modes_per_command(), 4);
//! assert_eq!(caps.canonical_name("@#rust"), "#rust");
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{CapabilityParseError, ChanStateError, Result};
use crate::isupport::{ChanModes, Isupport, PrefixSpec};
use crate::mode::ModeClass;

/// Parsed PREFIX, CHANMODES, MODES and STATUSMSG for one connection.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapabilityTable {
    /// `(mode letter, display symbol)` in server-declared rank order.
    prefixes: Vec<(char, char)>,
    classes: BTreeMap<char, ModeClass>,
    modes_per_command: usize,
    statusmsg: Vec<char>,
}

impl Default for CapabilityTable {
    /// RFC 1459 behaviour: `PREFIX=(ov)@+ CHANMODES=b,k,l,imnpst MODES=3`.
    fn default() -> Self {
        let mut classes = BTreeMap::new();
        for (modes, class) in [
            ("ov", ModeClass::Status),
            ("b", ModeClass::List),
            ("k", ModeClass::AlwaysParam),
            ("l", ModeClass::SetOnlyParam),
            ("imnpst", ModeClass::NoParam),
        ] {
            classes.extend(modes.chars().map(|m| (m, class)));
        }

        CapabilityTable {
            prefixes: vec![('o', '@'), ('v', '+')],
            classes,
            modes_per_command: 3,
            statusmsg: Vec::new(),
        }
    }
}

impl CapabilityTable {
    /// Build a table from the raw values of the four tokens.
    ///
    /// # Errors
    ///
    /// [`ChanStateError::MalformedCapability`] if CHANMODES does not have four
    /// groups, PREFIX letters and symbols differ in length, MODES is not a
    /// positive integer, or a letter is declared in two categories.
    pub fn parse(chanmodes: &str, prefix: &str, modes: &str, statusmsg: &str) -> Result<Self> {
        let prefix_spec = PrefixSpec::parse(prefix).map_err(|e| malformed("PREFIX", prefix, e))?;
        let chanmode_spec =
            ChanModes::parse(chanmodes).map_err(|e| malformed("CHANMODES", chanmodes, e))?;

        let mut classes = BTreeMap::new();
        assign(&mut classes, prefix_spec.modes, ModeClass::Status)
            .map_err(|e| malformed("PREFIX", prefix, e))?;
        assign_chanmodes(&mut classes, &chanmode_spec)
            .map_err(|e| malformed("CHANMODES", chanmodes, e))?;

        Ok(CapabilityTable {
            prefixes: prefix_spec.pairs().collect(),
            classes,
            modes_per_command: parse_modes(modes).map_err(|e| malformed("MODES", modes, e))?,
            statusmsg: statusmsg.chars().collect(),
        })
    }

    /// Build a table from ISUPPORT tokens, starting from RFC 1459 defaults.
    pub fn from_isupport(isupport: &Isupport<'_>) -> Result<Self> {
        let mut table = Self::default();
        table.update_from_isupport(isupport)?;
        Ok(table)
    }

    /// Apply the tokens present in one RPL_ISUPPORT line. Absent tokens keep
    /// their current value; a value-less `MODES` lifts the per-command limit.
    ///
    /// The table is left untouched if any present token is malformed.
    pub fn update_from_isupport(&mut self, isupport: &Isupport<'_>) -> Result<()> {
        let mut next = self.clone();

        if let Some(prefix) = isupport.prefix() {
            let spec = PrefixSpec::parse(prefix).map_err(|e| malformed("PREFIX", prefix, e))?;
            next.classes.retain(|_, class| *class != ModeClass::Status);
            assign(&mut next.classes, spec.modes, ModeClass::Status)
                .map_err(|e| malformed("PREFIX", prefix, e))?;
            next.prefixes = spec.pairs().collect();
        }

        if let Some(chanmodes) = isupport.chanmodes() {
            let spec =
                ChanModes::parse(chanmodes).map_err(|e| malformed("CHANMODES", chanmodes, e))?;
            next.classes.retain(|_, class| *class == ModeClass::Status);
            assign_chanmodes(&mut next.classes, &spec)
                .map_err(|e| malformed("CHANMODES", chanmodes, e))?;
        }

        match isupport.modes() {
            Some(None) | Some(Some("")) => next.modes_per_command = usize::MAX,
            Some(Some(modes)) => {
                next.modes_per_command =
                    parse_modes(modes).map_err(|e| malformed("MODES", modes, e))?;
            }
            None => {}
        }

        if let Some(statusmsg) = isupport.statusmsg() {
            next.statusmsg = statusmsg.chars().collect();
        }

        debug!(
            prefixes = next.prefixes.len(),
            modes = next.classes.len(),
            modes_per_command = next.modes_per_command,
            "updated channel mode capabilities"
        );
        *self = next;
        Ok(())
    }

    /// The category of a mode letter, or `None` if the server never declared it.
    pub fn classify(&self, mode: char) -> Option<ModeClass> {
        self.classes.get(&mode).copied()
    }

    /// All letters of one category, in code point order.
    pub fn modes_in(&self, class: ModeClass) -> impl Iterator<Item = char> + '_ {
        self.classes
            .iter()
            .filter(move |(_, c)| **c == class)
            .map(|(m, _)| *m)
    }

    /// `(mode letter, display symbol)` pairs, highest rank first.
    pub fn prefixes(&self) -> &[(char, char)] {
        &self.prefixes
    }

    /// Display symbol for a status mode (`o` → `@`).
    pub fn prefix_for(&self, mode: char) -> Option<char> {
        self.prefixes
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, symbol)| *symbol)
    }

    /// Status mode for a display symbol (`@` → `o`).
    pub fn mode_for_prefix(&self, symbol: char) -> Option<char> {
        self.prefixes
            .iter()
            .find(|(_, s)| *s == symbol)
            .map(|(mode, _)| *mode)
    }

    /// Position of a status mode in PREFIX order; 0 is the highest rank.
    pub fn rank(&self, mode: char) -> Option<usize> {
        self.prefixes.iter().position(|(m, _)| *m == mode)
    }

    /// Maximum mode letters per outgoing MODE command. `usize::MAX` if unlimited.
    pub fn modes_per_command(&self) -> usize {
        self.modes_per_command
    }

    pub fn statusmsg(&self) -> &[char] {
        &self.statusmsg
    }

    pub fn is_statusmsg(&self, symbol: char) -> bool {
        self.statusmsg.contains(&symbol)
    }

    /// Strip leading STATUSMSG symbols: `@+#chat` → `#chat`.
    pub fn canonical_name<'n>(&self, name: &'n str) -> &'n str {
        name.trim_start_matches(|c: char| self.is_statusmsg(c))
    }
}

fn malformed(token: &'static str, value: &str, cause: CapabilityParseError) -> ChanStateError {
    ChanStateError::MalformedCapability {
        token,
        value: value.to_string(),
        cause,
    }
}

fn assign(
    classes: &mut BTreeMap<char, ModeClass>,
    modes: &str,
    class: ModeClass,
) -> Result<(), CapabilityParseError> {
    for mode in modes.chars() {
        match classes.insert(mode, class) {
            Some(previous) if previous != class => {
                return Err(CapabilityParseError::DuplicateMode(mode))
            }
            _ => {}
        }
    }
    Ok(())
}

fn assign_chanmodes(
    classes: &mut BTreeMap<char, ModeClass>,
    spec: &ChanModes<'_>,
) -> Result<(), CapabilityParseError> {
    assign(classes, spec.a, ModeClass::List)?;
    assign(classes, spec.b, ModeClass::AlwaysParam)?;
    assign(classes, spec.c, ModeClass::SetOnlyParam)?;
    assign(classes, spec.d, ModeClass::NoParam)
}

fn parse_modes(value: &str) -> Result<usize, CapabilityParseError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CapabilityParseError::InvalidModeCount),
    }
}
