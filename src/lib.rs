//! # slirc-chanstate
//!
//! Client-side IRC channel state and channel mode protocol handling.
//!
//! ## Features
//!
//! - Channel registry keyed by canonical name, with per-connection ownership
//! - Channel lifecycle (join/part/kick requests and their confirmations)
//! - Batching of mode change requests into MODE commands within the server's
//!   `MODES` limit
//! - Decoding of inbound MODE lines and RPL_CHANNELMODEIS replies into
//!   channel state, mirrored to a user directory
//! - Mode classification driven by `PREFIX`, `CHANMODES`, `MODES` and
//!   `STATUSMSG` from RPL_ISUPPORT
//!
//! Nothing here performs I/O. Operations return [`Command`]s; their
//! `Display` form is the line to send.

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ```rust
//! use slirc_chanstate::{
//!     CapabilityTable, ChannelRegistry, ConnectionId, ModeChange, UserStatusMap,
//! };
//!
//! let conn = ConnectionId::new(1);
//! let caps = CapabilityTable::parse("beI,k,l,imnpst", "(ov)@+", "4", "@").unwrap();
//! let mut registry = ChannelRegistry::new(caps);
//! let mut users = UserStatusMap::new();
//!
//! let chan = registry.add("#rust", conn).unwrap();
//! assert_eq!(chan.join(None).unwrap().to_string(), "JOIN #rust");
//! chan.mark_joined();
//!
//! // Ask for op and voice in one line.
//! let caps = registry.capabilities().clone();
//! let chan = registry.get("#rust").unwrap();
//! let cmds = chan.mode(
//!     &caps,
//!     vec![
//!         ModeChange::plus('o').with_target("alice"),
//!         ModeChange::plus('v').with_target("bob"),
//!     ],
//! );
//! assert_eq!(cmds[0].to_string(), "MODE #rust +ov alice bob");
//!
//! // The server echoes it back.
//! registry
//!     .handle_line(conn, ":srv MODE #rust +ov alice bob", &mut users)
//!     .unwrap();
//! assert!(users.has_status("alice", "#rust", 'o'));
//! ```

pub mod capability;
pub mod channel;
pub mod command;
pub mod context;
pub mod error;
pub mod isupport;
pub mod message;
pub mod mode;
pub mod registry;
pub mod user;

pub use self::capability::CapabilityTable;
pub use self::channel::{
    batch_mode_changes, Channel, ChannelState, ListEntry, ModeParam, ModeState,
};
pub use self::command::Command;
pub use self::context::{CanSend, ConnectionId, HasIdentity};
pub use self::error::{
    CapabilityParseError, ChanStateError, MessageParseError, ModeParseError, Result,
};
pub use self::isupport::{ChanModes, Isupport, IsupportEntry, PrefixSpec};
pub use self::message::MessageRef;
pub use self::mode::{ModeChange, ModeClass, Sign};
pub use self::registry::ChannelRegistry;
pub use self::user::{User, UserDirectory, UserRef, UserStatusMap};
