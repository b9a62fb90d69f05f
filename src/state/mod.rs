//! Sans-IO session state for an IRC client.
//!
//! [`SessionState`] consumes protocol events (parsed lines) and keeps a
//! model of what the server supports and who is where. It does not perform
//! I/O. When it would like the host to send something (a WHO after a JOIN)
//! it returns an [`Action`]; hosts may rate-limit or drop these without
//! affecting the correctness of the membership graph.
//!
//! # Design Philosophy
//!
//! - **Sans-IO**: No network calls, timers, or blocking. Pure state transitions.
//! - **Single owner**: One state object, one event at a time. Hosts that share
//!   it across tasks wrap the whole thing in one lock.
//! - **Never fails on server input**: Malformed values degrade to a
//!   documented fallback instead of an error.
//!
//! # Example
//!
//! ```
//! use slirc_state::state::{Action, SessionState};
//!
//! let mut state = SessionState::new();
//! state.handle_line(":irc.example.net 001 bot :Welcome").unwrap();
//! state.handle_line(":irc.example.net 005 bot PREFIX=(ov)@+ :are supported").unwrap();
//!
//! let actions = state.handle_line(":bot!b@host JOIN #rust").unwrap();
//! assert_eq!(actions, vec![Action::WhoChannel("#rust".to_string())]);
//!
//! state.handle_line(":irc.example.net 353 bot = #rust :@bot +alice").unwrap();
//! assert!(state.user_in_channel("Alice", "#RUST"));
//! ```

mod membership;

pub use self::membership::{ChannelState, MembershipStore, UserState};

use std::collections::BTreeSet;

use tracing::{debug, trace, warn};

use crate::casemap::CaseMapping;
use crate::error::Result;
use crate::event::Event;
use crate::isupport::CapabilityTable;
use crate::message::MessageRef;
use crate::mode::{self, ModeChange, ModeClass, ModeClassifier, Polarity};
use crate::prefix::PrefixTable;

/// User modes assumed before the server sends `RPL_MYINFO`.
pub const DEFAULT_USER_MODES: &str = "Oiorw";

/// Capabilities a host should request for the best prefix information.
pub const REQUESTED_CAPS: &[&str] = &["multi-prefix"];

/// Requests for the host's transport.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    /// Send `WHO <channel>` to learn its members.
    WhoChannel(String),
    /// Send `WHO <nick>` to learn about one user.
    WhoNick(String),
}

/// Everything the client knows about its session.
#[derive(Clone, Debug)]
pub struct SessionState {
    isupport: CapabilityTable,
    members: MembershipStore,
    user_modes: BTreeSet<char>,
    own_modes: BTreeSet<char>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// A fresh state populated from defaults.
    #[must_use]
    pub fn new() -> Self {
        let isupport = CapabilityTable::new();
        let members = MembershipStore::new(isupport.casemapping());
        Self {
            isupport,
            members,
            user_modes: DEFAULT_USER_MODES.chars().collect(),
            own_modes: BTreeSet::new(),
        }
    }

    /// Reset everything except our own nickname.
    fn reset(&mut self) {
        self.isupport.reset();
        self.members.clear();
        self.members.set_casemapping(self.isupport.casemapping());
        self.user_modes = DEFAULT_USER_MODES.chars().collect();
        self.own_modes.clear();
    }

    /// Tokenize, convert and apply one raw line.
    pub fn handle_line(&mut self, line: &str) -> Result<Vec<Action>> {
        let msg = MessageRef::parse(line)?;
        self.handle_message(&msg)
    }

    /// Convert and apply one tokenized message.
    pub fn handle_message(&mut self, msg: &MessageRef<'_>) -> Result<Vec<Action>> {
        match Event::from_message(msg)? {
            Some(event) => Ok(self.apply(&event)),
            None => Ok(Vec::new()),
        }
    }

    /// Apply one event. Never fails; see the module docs.
    pub fn apply(&mut self, event: &Event) -> Vec<Action> {
        let mut actions = Vec::new();

        match event {
            Event::Welcome { nick } => {
                debug!(nick = %nick, "welcome, resetting session");
                self.members.set_current_nick(nick);
                self.reset();
            }
            Event::MyInfo { user_modes } => {
                self.user_modes = user_modes.chars().collect();
            }
            Event::ISupport { tokens } => {
                self.isupport.apply_directive(tokens);
                self.members.set_casemapping(self.isupport.casemapping());
            }
            Event::Join { channel, actor } => self.on_join(channel, actor, &mut actions),
            Event::Part { channel, actor } => {
                debug!(nick = %actor, channel = %channel, "part");
                self.members.ensure_user_not_in_channel(actor, channel);
            }
            Event::Kick { channel, target } => {
                debug!(nick = %target, channel = %channel, "kick");
                self.members.ensure_user_not_in_channel(target, channel);
            }
            Event::Quit { actor } => {
                if self.members.is_me(actor) {
                    warn!(nick = %actor, "own QUIT seen, dropping all channels");
                }
                self.members.remove_user(actor);
            }
            Event::Nick { actor, new_nick } => {
                debug!(old = %actor, new = %new_nick, "nick change");
                if self.members.is_me(actor) {
                    self.members.set_current_nick(new_nick);
                }
                self.members.rename_user(actor, new_nick);
            }
            Event::Mode {
                target,
                modestring,
                params,
            } => self.on_mode(target, modestring, params),
            Event::WhoReply {
                channel,
                nick,
                flags,
                ..
            } => self.on_who_reply(channel, nick, flags),
            Event::EndOfWho { mask } => trace!(mask = %mask, "end of WHO"),
            Event::NamesReply { channel, names } => self.on_names(channel, names),
            Event::EndOfNames { channel } => trace!(channel = %channel, "end of NAMES"),
        }

        actions
    }

    fn on_join(&mut self, channel: &str, actor: &str, actions: &mut Vec<Action>) {
        if self.members.is_me(actor) {
            debug!(channel = %channel, "joined channel");
            actions.push(Action::WhoChannel(channel.to_string()));
        } else {
            let in_channel = self
                .members
                .current_nick()
                .is_some_and(|me| self.members.user_in_channel(me, channel));
            if !in_channel {
                debug!(nick = %actor, channel = %channel, "ignoring JOIN to a channel we are not in");
                return;
            }
            actions.push(Action::WhoNick(actor.to_string()));
        }

        self.members.ensure_user_in_channel(actor, channel);
    }

    fn on_mode(&mut self, target: &str, modestring: &str, params: &[String]) {
        let changes = self.interpret_mode(target, modestring, params);
        let is_channel = self.is_channel(target);
        let is_me = self.members.is_me(target);

        for change in changes {
            trace!(subject = %target, change = %change, "mode");
            match (change.class, change.arg.as_deref()) {
                (ModeClass::Permission, Some(nick)) if is_channel => match change.polarity {
                    Polarity::Plus => self.members.grant_mode(nick, target, change.mode),
                    Polarity::Minus => self.members.revoke_mode(nick, target, change.mode),
                },
                _ if !is_channel && is_me => match change.polarity {
                    Polarity::Plus => {
                        self.own_modes.insert(change.mode);
                    }
                    Polarity::Minus => {
                        self.own_modes.remove(&change.mode);
                    }
                },
                _ => {}
            }
        }
    }

    fn on_who_reply(&mut self, channel: &str, nick: &str, flags: &str) {
        let (away, prefixes) = match flags.chars().next() {
            Some('H') => (Some(false), &flags[1..]),
            Some('G') => (Some(true), &flags[1..]),
            _ => (None, flags),
        };
        let modes: Vec<char> = self.prefixes().modes_for_prefixes(prefixes).collect();
        trace!(nick = %nick, channel = %channel, flags = %flags, "WHO reply");

        if self.members.channel(channel).is_some() {
            self.members.ensure_user_in_channel(nick, channel);
            self.members.set_member_modes(nick, channel, modes);
        }
        if let Some(away) = away {
            self.members.set_away(nick, away);
        }
    }

    fn on_names(&mut self, channel: &str, names: &str) {
        if self.members.channel(channel).is_none() {
            debug!(channel = %channel, "ignoring NAMES for a channel we are not in");
            return;
        }

        for token in names.split_whitespace() {
            let (prefixes, rest) = self.prefixes().split_prefixed(token);
            // userhost-in-names sends nick!user@host.
            let nick = rest.split('!').next().unwrap_or(rest);
            if nick.is_empty() {
                continue;
            }

            let modes: Vec<char> = self.prefixes().modes_for_prefixes(prefixes).collect();
            self.members.ensure_user_in_channel(nick, channel);
            self.members.set_member_modes(nick, channel, modes);
        }
    }

    /// Interpret a MODE string against the current tables without applying it.
    pub fn interpret_mode<S: AsRef<str>>(
        &self,
        target: &str,
        modestring: &str,
        params: &[S],
    ) -> Vec<ModeChange> {
        mode::interpret(self.classifier(), self.prefixes(), target, modestring, params)
    }

    /// Our own nickname, once welcomed.
    pub fn current_nick(&self) -> Option<&str> {
        self.members.current_nick()
    }

    /// Does `name` start with a channel sigil?
    pub fn is_channel(&self, name: &str) -> bool {
        self.classifier().is_channel_name(name)
    }

    pub fn user_in_channel(&self, user: &str, channel: &str) -> bool {
        self.members.user_in_channel(user, channel)
    }

    pub fn casemapping(&self) -> CaseMapping {
        self.isupport.casemapping()
    }

    pub fn normalize(&self, name: &str) -> String {
        self.casemapping().normalize(name)
    }

    pub fn to_lower(&self, name: &str) -> String {
        self.casemapping().to_lower(name)
    }

    pub fn to_upper(&self, name: &str) -> String {
        self.casemapping().to_upper(name)
    }

    /// Resolved ISUPPORT value: advertised, else default, else `None`.
    pub fn isupport(&self, key: &str) -> Option<&str> {
        self.isupport.get(key)
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.isupport
    }

    pub fn classifier(&self) -> &ModeClassifier {
        self.isupport.classifier()
    }

    pub fn prefixes(&self) -> &PrefixTable {
        self.isupport.prefixes()
    }

    /// Read access to the membership graph.
    pub fn members(&self) -> &MembershipStore {
        &self.members
    }

    /// User modes the server advertised in `RPL_MYINFO`.
    pub fn user_modes(&self) -> &BTreeSet<char> {
        &self.user_modes
    }

    /// User modes currently set on us.
    pub fn own_modes(&self) -> &BTreeSet<char> {
        &self.own_modes
    }
}
