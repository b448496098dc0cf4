//! Inbound MODE decoding.
//!
//! Decoding runs in two passes. The planning pass walks the mode string,
//! classifies every letter and binds its parameter; nothing is mutated. The
//! planned changes are then applied in order, channel side first and then the
//! user directory. If planning stops early, the changes planned before the
//! failure are still applied and the failure is reported as a desync.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{Channel, ListEntry, ModeParam, ModeState};
use crate::capability::CapabilityTable;
use crate::error::{ChanStateError, ModeParseError, Result};
use crate::mode::{ModeClass, Sign};
use crate::user::{UserDirectory, UserRef};

/// One decoded change with its parameter bound.
#[derive(Debug)]
enum Op {
    /// `user` is `None` for a revocation of a status nobody holds.
    Status {
        sign: Sign,
        mode: char,
        user: Option<UserRef>,
    },
    List {
        sign: Sign,
        mode: char,
        mask: String,
    },
    Value {
        sign: Sign,
        mode: char,
        param: Option<ModeParam>,
    },
}

impl Channel {
    /// Apply a MODE change received from the server, e.g. `+ov-b` with
    /// targets `alice bob *!*@spam`. Returns the number of changes applied.
    ///
    /// # Errors
    ///
    /// [`ChanStateError::ProtocolDesync`] if a letter has no sign, is unknown
    /// to `caps`, needs a target that is missing, or names a user `users`
    /// cannot resolve. Changes before the offending letter stay applied.
    pub fn apply_modes<U, S>(
        &mut self,
        caps: &CapabilityTable,
        users: &mut U,
        sender: &str,
        modes: &str,
        targets: &[S],
    ) -> Result<usize>
    where
        U: UserDirectory + ?Sized,
        S: AsRef<str>,
    {
        self.apply_modes_at(caps, users, sender, modes, targets, Utc::now())
    }

    /// [`apply_modes`](Self::apply_modes) with an explicit set-time for new
    /// list entries.
    pub fn apply_modes_at<U, S>(
        &mut self,
        caps: &CapabilityTable,
        users: &mut U,
        sender: &str,
        modes: &str,
        targets: &[S],
        now: DateTime<Utc>,
    ) -> Result<usize>
    where
        U: UserDirectory + ?Sized,
        S: AsRef<str>,
    {
        let (ops, failure) = self.plan(caps, users, modes, targets);
        let applied = ops.len();
        for op in ops {
            self.apply_op(op, users, sender, now);
        }

        match failure {
            Some(cause) => {
                warn!(channel = %self.name, modes, applied, error = %cause, "mode desync");
                Err(ChanStateError::ProtocolDesync {
                    channel: self.name.clone(),
                    modes: modes.to_string(),
                    cause,
                })
            }
            None => Ok(applied),
        }
    }

    fn plan<U, S>(
        &self,
        caps: &CapabilityTable,
        users: &mut U,
        modes: &str,
        targets: &[S],
    ) -> (Vec<Op>, Option<ModeParseError>)
    where
        U: UserDirectory + ?Sized,
        S: AsRef<str>,
    {
        let mut ops = Vec::new();
        let mut sign = None;
        let mut next = 0;
        // Status modes granted earlier in this same string.
        let mut granted = BTreeSet::new();

        for c in modes.chars() {
            if let Some(s) = Sign::from_char(c) {
                sign = Some(s);
                continue;
            }

            match self.plan_one(caps, users, sign, c, targets, &mut next, &granted) {
                Ok(op) => {
                    if let Op::Status {
                        sign: Sign::Plus,
                        mode,
                        ..
                    } = op
                    {
                        granted.insert(mode);
                    }
                    ops.push(op);
                }
                Err(cause) => return (ops, Some(cause)),
            }
        }

        if next < targets.len() {
            debug!(
                channel = %self.name,
                modes,
                surplus = targets.len() - next,
                "ignoring surplus mode targets"
            );
        }
        (ops, None)
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_one<U, S>(
        &self,
        caps: &CapabilityTable,
        users: &mut U,
        sign: Option<Sign>,
        mode: char,
        targets: &[S],
        next: &mut usize,
        granted: &BTreeSet<char>,
    ) -> Result<Op, ModeParseError>
    where
        U: UserDirectory + ?Sized,
        S: AsRef<str>,
    {
        let sign = sign.ok_or(ModeParseError::MissingModeModifier { mode })?;
        let class = caps
            .classify(mode)
            .ok_or(ModeParseError::UnknownMode(mode))?;

        let param = if class.takes_param(sign) {
            let param = targets
                .get(*next)
                .ok_or(ModeParseError::MissingParameter {
                    mode,
                    index: *next,
                    available: targets.len(),
                })?;
            *next += 1;
            Some(param.as_ref())
        } else {
            None
        };

        let op = match (class, param) {
            (ModeClass::Status, Some(nick)) => {
                let tracked = sign == Sign::Plus
                    || self.modes.contains_key(&mode)
                    || granted.contains(&mode);
                let user = if tracked {
                    let user = users
                        .resolve(nick)
                        .ok_or_else(|| ModeParseError::UnknownUser {
                            mode,
                            nick: nick.to_string(),
                        })?;
                    Some(user)
                } else {
                    None
                };
                Op::Status { sign, mode, user }
            }
            (ModeClass::List, Some(mask)) => Op::List {
                sign,
                mode,
                mask: mask.to_string(),
            },
            (ModeClass::SetOnlyParam, Some(value)) => Op::Value {
                sign,
                mode,
                param: Some(coerce(value)),
            },
            (_, value) => Op::Value {
                sign,
                mode,
                param: value.map(|v| ModeParam::Text(v.to_string())),
            },
        };
        Ok(op)
    }

    fn apply_op<U>(&mut self, op: Op, users: &mut U, sender: &str, now: DateTime<Utc>)
    where
        U: UserDirectory + ?Sized,
    {
        match op {
            Op::Status {
                sign: Sign::Plus,
                mode,
                user: Some(user),
            } => {
                match self
                    .modes
                    .entry(mode)
                    .or_insert_with(|| ModeState::Status(BTreeSet::new()))
                {
                    ModeState::Status(holders) => {
                        holders.insert(user.clone());
                    }
                    other => *other = ModeState::Status(BTreeSet::from([user.clone()])),
                }
                users.add_status(&user, &self.name, mode);
            }
            Op::Status {
                sign: Sign::Minus,
                mode,
                user: Some(user),
            } => {
                let emptied = match self.modes.get_mut(&mode) {
                    Some(ModeState::Status(holders)) => {
                        holders.remove(&user);
                        holders.is_empty()
                    }
                    _ => false,
                };
                if emptied {
                    self.modes.remove(&mode);
                }
                users.remove_status(&user, &self.name, mode);
            }
            Op::Status { user: None, .. } => {}
            Op::List {
                sign: Sign::Plus,
                mode,
                mask,
            } => {
                let entry = ListEntry {
                    setter: sender.to_string(),
                    set_at: now,
                };
                match self
                    .modes
                    .entry(mode)
                    .or_insert_with(|| ModeState::List(BTreeMap::new()))
                {
                    ModeState::List(entries) => {
                        entries.insert(mask, entry);
                    }
                    other => *other = ModeState::List(BTreeMap::from([(mask, entry)])),
                }
            }
            Op::List {
                sign: Sign::Minus,
                mode,
                mask,
            } => {
                let emptied = match self.modes.get_mut(&mode) {
                    Some(ModeState::List(entries)) => {
                        entries.remove(&mask);
                        entries.is_empty()
                    }
                    _ => false,
                };
                if emptied {
                    self.modes.remove(&mode);
                }
            }
            Op::Value {
                sign: Sign::Plus,
                mode,
                param,
            } => {
                self.modes.insert(mode, ModeState::Value(param));
            }
            Op::Value {
                sign: Sign::Minus,
                mode,
                ..
            } => {
                self.modes.remove(&mode);
            }
        }
    }
}

/// `50` becomes a number; anything else stays text.
fn coerce(value: &str) -> ModeParam {
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = value.parse() {
            return ModeParam::Number(n);
        }
    }
    ModeParam::Text(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ConnectionId;
    use crate::user::UserStatusMap;
    use chrono::TimeZone;

    /// Directory that only knows a fixed set of nicknames.
    #[derive(Default)]
    struct KnownUsers {
        known: Vec<&'static str>,
        granted: Vec<(String, char)>,
    }

    impl UserDirectory for KnownUsers {
        fn resolve(&mut self, nick: &str) -> Option<UserRef> {
            self.known.contains(&nick).then(|| UserRef::from(nick))
        }

        fn add_status(&mut self, user: &UserRef, _channel: &str, mode: char) {
            self.granted.push((user.to_string(), mode));
        }

        fn remove_status(&mut self, user: &UserRef, _channel: &str, mode: char) {
            self.granted.retain(|(nick, m)| !(nick == user.as_str() && *m == mode));
        }
    }

    fn channel() -> Channel {
        Channel::new("#chat", ConnectionId::new(1))
    }

    fn caps() -> CapabilityTable {
        CapabilityTable::parse("beI,k,l,imnpst", "(ohv)@%+", "4", "@").unwrap()
    }

    fn desync_cause(err: ChanStateError) -> ModeParseError {
        match err {
            ChanStateError::ProtocolDesync { cause, .. } => cause,
            other => panic!("expected desync, got {:?}", other),
        }
    }

    #[test]
    fn test_status_grant_and_revoke() {
        let caps = caps();
        let mut users = UserStatusMap::new();
        let mut chan = channel();

        let n = chan
            .apply_modes(&caps, &mut users, "srv", "+oh", &["alice", "bob"])
            .unwrap();
        assert_eq!(n, 2);
        assert!(users.has_status("alice", "#chat", 'o'));
        assert!(users.has_status("bob", "#chat", 'h'));

        chan.apply_modes(&caps, &mut users, "srv", "-o", &["alice"])
            .unwrap();
        assert_eq!(chan.mode_state('o'), None);
        assert!(!users.has_status("alice", "#chat", 'o'));
    }

    #[test]
    fn test_grant_then_revoke_in_one_string() {
        let caps = caps();
        let mut users = UserStatusMap::new();
        let mut chan = channel();
        chan.apply_modes(&caps, &mut users, "srv", "+o-o", &["alice", "alice"])
            .unwrap();
        assert!(!chan.has_mode('o'));
        assert!(!users.has_status("alice", "#chat", 'o'));
    }

    #[test]
    fn test_revoke_unheld_status_skips_resolution() {
        let caps = caps();
        let mut users = KnownUsers::default();
        let mut chan = channel();
        chan.apply_modes(&caps, &mut users, "srv", "-v", &["ghost"])
            .unwrap();
        assert!(chan.modes().is_empty());
    }

    #[test]
    fn test_unknown_user_is_desync() {
        let caps = caps();
        let mut users = KnownUsers {
            known: vec!["alice"],
            ..Default::default()
        };
        let mut chan = channel();
        let err = chan
            .apply_modes(&caps, &mut users, "srv", "+oo", &["alice", "mallory"])
            .unwrap_err();
        assert_eq!(
            desync_cause(err),
            ModeParseError::UnknownUser {
                mode: 'o',
                nick: "mallory".to_string()
            }
        );
        assert_eq!(users.granted, vec![("alice".to_string(), 'o')]);
    }

    #[test]
    fn test_numeric_limit_coercion() {
        let caps = caps();
        let mut users = UserStatusMap::new();
        let mut chan = channel();

        chan.apply_modes(&caps, &mut users, "srv", "+l", &["50"]).unwrap();
        assert_eq!(
            chan.mode_state('l'),
            Some(&ModeState::Value(Some(ModeParam::Number(50))))
        );

        chan.apply_modes(&caps, &mut users, "srv", "+l", &["5x"]).unwrap();
        assert_eq!(
            chan.mode_state('l'),
            Some(&ModeState::Value(Some(ModeParam::Text("5x".to_string()))))
        );

        chan.apply_modes(&caps, &mut users, "srv", "-l", &[] as &[&str])
            .unwrap();
        assert!(!chan.has_mode('l'));
    }

    #[test]
    fn test_key_is_never_coerced() {
        let caps = caps();
        let mut users = UserStatusMap::new();
        let mut chan = channel();
        chan.apply_modes(&caps, &mut users, "srv", "+k", &["1234"]).unwrap();
        assert_eq!(
            chan.mode_state('k'),
            Some(&ModeState::Value(Some(ModeParam::Text("1234".to_string()))))
        );
    }

    #[test]
    fn test_unset_key_consumes_parameter() {
        let caps = caps();
        let mut users = UserStatusMap::new();
        let mut chan = channel();
        chan.apply_modes(&caps, &mut users, "srv", "+kn", &["secret"])
            .unwrap();
        chan.apply_modes(&caps, &mut users, "srv", "-k+l", &["secret", "10"])
            .unwrap();
        assert!(!chan.has_mode('k'));
        assert!(chan.has_mode('n'));
        assert_eq!(
            chan.mode_state('l'),
            Some(&ModeState::Value(Some(ModeParam::Number(10))))
        );
    }

    #[test]
    fn test_list_entries_record_setter() {
        let caps = caps();
        let mut users = UserStatusMap::new();
        let mut chan = channel();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        chan.apply_modes_at(
            &caps,
            &mut users,
            "op!op@host",
            "+bb",
            &["*!*@spam", "troll!*@*"],
            at,
        )
        .unwrap();

        let bans = chan.list_entries('b').unwrap();
        assert_eq!(bans.len(), 2);
        assert_eq!(
            bans["*!*@spam"],
            ListEntry {
                setter: "op!op@host".to_string(),
                set_at: at
            }
        );
    }

    #[test]
    fn test_list_removal_is_idempotent() {
        let caps = caps();
        let mut users = UserStatusMap::new();
        let mut chan = channel();
        chan.apply_modes(&caps, &mut users, "srv", "+b", &["*!*@spam"])
            .unwrap();

        chan.apply_modes(&caps, &mut users, "srv", "-b", &["*!*@spam"])
            .unwrap();
        let after_first = chan.modes().clone();
        chan.apply_modes(&caps, &mut users, "srv", "-b", &["*!*@spam"])
            .unwrap();

        assert!(!chan.has_mode('b'));
        assert_eq!(chan.modes(), &after_first);
    }

    #[test]
    fn test_missing_target_mutates_nothing() {
        let caps = caps();
        let mut users = UserStatusMap::new();
        let mut chan = channel();
        let err = chan
            .apply_modes(&caps, &mut users, "srv", "+o", &[] as &[&str])
            .unwrap_err();
        assert_eq!(
            desync_cause(err),
            ModeParseError::MissingParameter {
                mode: 'o',
                index: 0,
                available: 0
            }
        );
        assert!(chan.modes().is_empty());
    }

    #[test]
    fn test_partial_application_before_failure() {
        let caps = caps();
        let mut users = UserStatusMap::new();
        let mut chan = channel();
        let err = chan
            .apply_modes(&caps, &mut users, "srv", "+ib", &[] as &[&str])
            .unwrap_err();
        assert!(matches!(err, ChanStateError::ProtocolDesync { ref modes, .. } if modes == "+ib"));
        assert!(chan.has_mode('i'));
        assert!(!chan.has_mode('b'));
    }

    #[test]
    fn test_unknown_mode_and_missing_sign() {
        let caps = caps();
        let mut users = UserStatusMap::new();
        let mut chan = channel();

        let err = chan
            .apply_modes(&caps, &mut users, "srv", "+Z", &[] as &[&str])
            .unwrap_err();
        assert_eq!(desync_cause(err), ModeParseError::UnknownMode('Z'));

        let err = chan
            .apply_modes(&caps, &mut users, "srv", "o", &["alice"])
            .unwrap_err();
        assert_eq!(
            desync_cause(err),
            ModeParseError::MissingModeModifier { mode: 'o' }
        );
        assert!(chan.modes().is_empty());
    }

    #[test]
    fn test_surplus_targets_ignored() {
        let caps = caps();
        let mut users = UserStatusMap::new();
        let mut chan = channel();
        let n = chan
            .apply_modes(&caps, &mut users, "srv", "+nt", &["extra"])
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(chan.mode_state('n'), Some(&ModeState::Value(None)));
    }

    #[test]
    fn test_unset_missing_flag_is_noop() {
        let caps = caps();
        let mut users = UserStatusMap::new();
        let mut chan = channel();
        chan.apply_modes(&caps, &mut users, "srv", "-m", &[] as &[&str])
            .unwrap();
        assert!(chan.modes().is_empty());
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("0"), ModeParam::Number(0));
        assert_eq!(coerce("+5"), ModeParam::Text("+5".to_string()));
        assert_eq!(coerce(""), ModeParam::Text(String::new()));
        assert_eq!(
            coerce("99999999999999999999999"),
            ModeParam::Text("99999999999999999999999".to_string())
        );
    }
}
