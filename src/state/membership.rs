//! The user/channel membership graph.
//!
//! Two maps keyed by normalized name. `channels[c]` lists its members (each
//! with the permission modes they hold there) and `users[u]` lists the
//! channels it shares with us. Every mutation keeps both sides in step:
//!
//! `u ∈ channels[c].members  ⇔  c ∈ users[u].channels`
//!
//! A user disappears as soon as it shares no channel with us. A channel
//! disappears only when we leave it.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::casemap::CaseMapping;

/// What we know about one user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserState {
    /// Marked away (`G`) in the latest WHO reply.
    pub away: bool,
    channels: BTreeSet<String>,
}

impl UserState {
    /// Normalized names of the channels this user shares with us.
    pub fn channels(&self) -> &BTreeSet<String> {
        &self.channels
    }
}

/// What we know about one channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelState {
    members: BTreeMap<String, BTreeSet<char>>,
}

impl ChannelState {
    /// Normalized member nicknames.
    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Permission modes held by a member (normalized nickname).
    pub fn modes_of(&self, user: &str) -> Option<&BTreeSet<char>> {
        self.members.get(user)
    }
}

/// Owner of every [`UserState`] and [`ChannelState`] of a session.
#[derive(Clone, Debug, Default)]
pub struct MembershipStore {
    casemap: CaseMapping,
    current_nick: Option<String>,
    users: BTreeMap<String, UserState>,
    channels: BTreeMap<String, ChannelState>,
}

impl MembershipStore {
    pub fn new(casemap: CaseMapping) -> Self {
        Self {
            casemap,
            ..Self::default()
        }
    }

    /// Drop every user and channel. Our own identity is kept.
    pub fn clear(&mut self) {
        self.users.clear();
        self.channels.clear();
    }

    pub fn casemapping(&self) -> CaseMapping {
        self.casemap
    }

    fn normalize(&self, name: &str) -> String {
        self.casemap.normalize(name)
    }

    /// Our own nickname as last set.
    pub fn current_nick(&self) -> Option<&str> {
        self.current_nick.as_deref()
    }

    pub fn set_current_nick(&mut self, nick: &str) {
        self.current_nick = Some(nick.to_string());
    }

    /// Does `name` refer to us?
    pub fn is_me(&self, name: &str) -> bool {
        self.current_nick
            .as_deref()
            .is_some_and(|me| self.casemap.eq(me, name))
    }

    pub fn user(&self, name: &str) -> Option<&UserState> {
        self.users.get(&self.normalize(name))
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelState> {
        self.channels.get(&self.normalize(name))
    }

    pub fn users(&self) -> impl Iterator<Item = (&str, &UserState)> {
        self.users.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn channels(&self) -> impl Iterator<Item = (&str, &ChannelState)> {
        self.channels.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get or create a user.
    pub fn ensure_user(&mut self, name: &str) -> &mut UserState {
        let key = self.normalize(name);
        self.users.entry(key).or_default()
    }

    /// Get or create a channel.
    pub fn ensure_channel(&mut self, name: &str) -> &mut ChannelState {
        let key = self.normalize(name);
        self.channels.entry(key).or_default()
    }

    /// Record `user` as a member of `channel`, creating either side as needed.
    pub fn ensure_user_in_channel(&mut self, user: &str, channel: &str) {
        let nuser = self.normalize(user);
        let nchan = self.normalize(channel);

        self.channels
            .entry(nchan.clone())
            .or_default()
            .members
            .entry(nuser.clone())
            .or_default();
        self.users.entry(nuser).or_default().channels.insert(nchan);
    }

    /// Remove the membership both ways; a user left with no channels is
    /// dropped. When `user` is us the channel is torn down: every other
    /// member is removed from it and the channel itself is dropped.
    pub fn ensure_user_not_in_channel(&mut self, user: &str, channel: &str) {
        let nuser = self.normalize(user);
        let nchan = self.normalize(channel);

        self.unlink(&nuser, &nchan);

        if self.is_me(user) {
            // Snapshot before mutating.
            let remaining: Vec<String> = self
                .channels
                .get(&nchan)
                .map(|c| c.members.keys().cloned().collect())
                .unwrap_or_default();
            for member in remaining {
                self.unlink(&member, &nchan);
            }

            if self.channels.remove(&nchan).is_some() {
                debug!(channel = %nchan, "left channel");
            }
        }
    }

    fn unlink(&mut self, nuser: &str, nchan: &str) {
        if let Some(c) = self.channels.get_mut(nchan) {
            c.members.remove(nuser);
        }

        let now_empty = match self.users.get_mut(nuser) {
            Some(u) => {
                u.channels.remove(nchan);
                u.channels.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.users.remove(nuser);
        }
    }

    /// Re-key a user in the user table and in every channel it is in.
    ///
    /// Updating our own nickname is the caller's job. Renaming an unknown
    /// user has nothing to carry over.
    pub fn rename_user(&mut self, old: &str, new: &str) {
        let nold = self.normalize(old);
        let nnew = self.normalize(new);
        if nold == nnew {
            return;
        }

        let Some(user) = self.users.remove(&nold) else {
            debug!(old = %old, new = %new, "rename of unknown user");
            return;
        };

        for cname in &user.channels {
            if let Some(c) = self.channels.get_mut(cname) {
                if let Some(modes) = c.members.remove(&nold) {
                    c.members.entry(nnew.clone()).or_default().extend(modes);
                }
            }
        }

        match self.users.get_mut(&nnew) {
            Some(existing) => {
                existing.channels.extend(user.channels);
                existing.away = user.away;
            }
            None => {
                self.users.insert(nnew, user);
            }
        }
    }

    /// Remove a user from every channel it is in (QUIT). For us this tears
    /// down every channel we are in.
    pub fn remove_user(&mut self, name: &str) {
        let channels: Vec<String> = self
            .user(name)
            .map(|u| u.channels.iter().cloned().collect())
            .unwrap_or_default();

        for cname in channels {
            self.ensure_user_not_in_channel(name, &cname);
        }
    }

    pub fn user_in_channel(&self, user: &str, channel: &str) -> bool {
        self.channels
            .get(&self.normalize(channel))
            .is_some_and(|c| c.members.contains_key(&self.normalize(user)))
    }

    /// Replace the permission modes of an existing membership.
    pub fn set_member_modes(
        &mut self,
        user: &str,
        channel: &str,
        modes: impl IntoIterator<Item = char>,
    ) {
        if let Some(held) = self.member_modes_mut(user, channel) {
            *held = modes.into_iter().collect();
        }
    }

    /// Add one permission mode to an existing membership.
    pub fn grant_mode(&mut self, user: &str, channel: &str, mode: char) {
        if let Some(held) = self.member_modes_mut(user, channel) {
            held.insert(mode);
        }
    }

    /// Remove one permission mode from an existing membership.
    pub fn revoke_mode(&mut self, user: &str, channel: &str, mode: char) {
        if let Some(held) = self.member_modes_mut(user, channel) {
            held.remove(&mode);
        }
    }

    fn member_modes_mut(&mut self, user: &str, channel: &str) -> Option<&mut BTreeSet<char>> {
        let nuser = self.normalize(user);
        let nchan = self.normalize(channel);
        self.channels.get_mut(&nchan)?.members.get_mut(&nuser)
    }

    /// Set the away flag of a known user.
    pub fn set_away(&mut self, user: &str, away: bool) {
        let key = self.normalize(user);
        if let Some(u) = self.users.get_mut(&key) {
            u.away = away;
        }
    }

    /// Switch case mapping and re-key everything under it. Entries whose
    /// keys collide under the new mapping are merged.
    pub fn set_casemapping(&mut self, casemap: CaseMapping) {
        if casemap == self.casemap {
            return;
        }
        self.casemap = casemap;

        let users = std::mem::take(&mut self.users);
        for (name, state) in users {
            let entry = self.users.entry(casemap.normalize(&name)).or_default();
            entry.away |= state.away;
            entry
                .channels
                .extend(state.channels.iter().map(|c| casemap.normalize(c)));
        }

        let channels = std::mem::take(&mut self.channels);
        for (name, state) in channels {
            let entry = self.channels.entry(casemap.normalize(&name)).or_default();
            for (member, modes) in state.members {
                entry
                    .members
                    .entry(casemap.normalize(&member))
                    .or_default()
                    .extend(modes);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(me: &str) -> MembershipStore {
        let mut s = MembershipStore::new(CaseMapping::Rfc1459);
        s.set_current_nick(me);
        s
    }

    fn assert_cross_referenced(s: &MembershipStore) {
        for (cname, c) in s.channels() {
            for u in c.users() {
                let user = s.user(u).expect("member must have a user entry");
                assert!(user.channels().contains(cname), "{u} missing {cname}");
            }
        }
        for (uname, u) in s.users() {
            assert!(!u.channels().is_empty(), "{uname} kept with no channels");
            for cname in u.channels() {
                assert!(s.user_in_channel(uname, cname), "{cname} missing {uname}");
            }
        }
    }

    #[test]
    fn test_ensure_user_in_channel_is_idempotent() {
        let mut s = store("bot");
        s.ensure_user_in_channel("Alice", "#Test");
        let users: Vec<_> = s.users().map(|(k, v)| (k.to_string(), v.clone())).collect();
        s.ensure_user_in_channel("alice", "#test");
        let again: Vec<_> = s.users().map(|(k, v)| (k.to_string(), v.clone())).collect();
        assert_eq!(users, again);
        assert_eq!(s.channel("#TEST").unwrap().len(), 1);
        assert_cross_referenced(&s);
    }

    #[test]
    fn test_normalized_lookup() {
        let mut s = store("bot");
        s.ensure_user_in_channel("Nick[away]", "#Chan");
        assert!(s.user_in_channel("nick{AWAY}", "#chan"));
        assert!(!s.user_in_channel("nick", "#chan"));
        assert!(!s.user_in_channel("nick[away]", "#other"));
    }

    #[test]
    fn test_part_other_user() {
        let mut s = store("bot");
        s.ensure_user_in_channel("bot", "#a");
        s.ensure_user_in_channel("alice", "#a");
        s.ensure_user_in_channel("alice", "#b");

        s.ensure_user_not_in_channel("alice", "#a");
        assert!(!s.user_in_channel("alice", "#a"));
        assert!(s.user("alice").is_some());

        s.ensure_user_not_in_channel("alice", "#b");
        assert!(s.user("alice").is_none());
        // Channels are only dropped when we leave.
        assert!(s.channel("#b").is_some());
        assert_cross_referenced(&s);
    }

    #[test]
    fn test_self_part_tears_down_channel() {
        let mut s = store("bot");
        for u in ["bot", "alice", "bob"] {
            s.ensure_user_in_channel(u, "#test");
        }
        s.ensure_user_in_channel("bob", "#other");
        s.ensure_user_in_channel("bot", "#other");

        s.ensure_user_not_in_channel("BOT", "#test");
        assert!(s.channel("#test").is_none());
        assert!(s.user("alice").is_none());
        assert!(s.user("bob").unwrap().channels().contains("#other"));
        assert_cross_referenced(&s);
    }

    #[test]
    fn test_removal_does_not_create() {
        let mut s = store("bot");
        s.ensure_user_not_in_channel("ghost", "#nowhere");
        assert_eq!(s.users().count(), 0);
        assert_eq!(s.channels().count(), 0);
    }

    #[test]
    fn test_rename_self() {
        let mut s = store("old");
        s.ensure_user_in_channel("old", "#a");
        s.ensure_user_in_channel("old", "#b");
        s.grant_mode("old", "#a", 'o');

        s.set_current_nick("new");
        s.rename_user("old", "new");

        assert!(s.user("old").is_none());
        let expected: BTreeSet<String> = ["#a", "#b"].iter().map(|c| c.to_string()).collect();
        assert_eq!(s.user("new").unwrap().channels(), &expected);
        assert!(s.user_in_channel("new", "#a"));
        assert!(!s.user_in_channel("old", "#b"));
        assert!(s.channel("#a").unwrap().modes_of("new").unwrap().contains(&'o'));
        assert!(s.is_me("NEW"));
        assert_cross_referenced(&s);
    }

    #[test]
    fn test_rename_case_only_and_unknown() {
        let mut s = store("bot");
        s.ensure_user_in_channel("alice", "#a");
        s.rename_user("alice", "ALICE");
        assert!(s.user_in_channel("alice", "#a"));

        s.rename_user("nobody", "somebody");
        assert!(s.user("somebody").is_none());
    }

    #[test]
    fn test_remove_user() {
        let mut s = store("bot");
        s.ensure_user_in_channel("bot", "#a");
        s.ensure_user_in_channel("bot", "#b");
        s.ensure_user_in_channel("alice", "#a");
        s.ensure_user_in_channel("alice", "#b");

        s.remove_user("alice");
        assert!(s.user("alice").is_none());
        assert_eq!(s.channel("#a").unwrap().len(), 1);

        s.ensure_user_in_channel("carol", "#b");
        s.remove_user("bot");
        assert_eq!(s.channels().count(), 0);
        assert_eq!(s.users().count(), 0);
    }

    #[test]
    fn test_member_modes() {
        let mut s = store("bot");
        s.ensure_user_in_channel("alice", "#a");
        s.set_member_modes("alice", "#a", ['o', 'v']);
        s.revoke_mode("alice", "#a", 'o');
        let modes: Vec<char> = s.channel("#a").unwrap().modes_of("alice").unwrap().iter().copied().collect();
        assert_eq!(modes, vec!['v']);

        // No membership, nothing to change.
        s.grant_mode("bob", "#a", 'o');
        assert!(s.channel("#a").unwrap().modes_of("bob").is_none());
    }

    #[test]
    fn test_set_away_only_known_users() {
        let mut s = store("bot");
        s.ensure_user_in_channel("alice", "#a");
        s.set_away("ALICE", true);
        s.set_away("ghost", true);
        assert!(s.user("alice").unwrap().away);
        assert!(s.user("ghost").is_none());
    }

    #[test]
    fn test_set_casemapping_rekeys() {
        let mut s = MembershipStore::new(CaseMapping::Ascii);
        s.ensure_user_in_channel("Nick[1]", "#Chan");
        s.ensure_user_in_channel("nick{1}", "#chan");
        assert_eq!(s.users().count(), 2);

        s.set_casemapping(CaseMapping::Rfc1459);
        assert_eq!(s.users().count(), 1);
        assert!(s.user_in_channel("NICK[1]", "#CHAN"));
        assert_cross_referenced(&s);
    }
}
