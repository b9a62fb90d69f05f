//! # slirc-state
//!
//! Client-side session state for IRC: turns server capability
//! announcements and membership changes into a queryable model of what the
//! server supports and who is where.
//!
//! ## Features
//!
//! - ISUPPORT tracking with reset-to-default semantics
//! - `ascii`, `strict-rfc1459` and `rfc1459` case mapping
//! - Channel-mode classification from `CHANMODES` and MODE-string interpretation
//! - Prefix/permission-mode bijection from `PREFIX`
//! - User/channel membership graph with rename and cascading removal
//! - Sans-IO: the host owns the socket, this crate owns the state

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ```rust
//! use slirc_state::SessionState;
//!
//! let mut state = SessionState::new();
//! for line in [
//!     ":irc.example.net 001 bot :Welcome to the network",
//!     ":irc.example.net 005 bot CHANMODES=beI,k,l,imnst PREFIX=(qov)~@+ :are supported by this server",
//!     ":bot!bot@example.com JOIN #rust",
//!     ":irc.example.net 353 bot = #rust :~bot @alice +bob carol",
//! ] {
//!     state.handle_line(line).expect("valid line");
//! }
//!
//! assert!(state.is_channel("#rust"));
//! assert!(state.user_in_channel("ALICE", "#rust"));
//! assert_eq!(state.prefixes().mode_for_prefix('~'), Some('q'));
//!
//! let changes = state.interpret_mode("#rust", "+o-v+l", &["carol", "bob", "50"]);
//! assert_eq!(changes.len(), 3);
//! ```

pub mod casemap;
pub mod error;
pub mod event;
pub mod isupport;
pub mod message;
pub mod mode;
pub mod prefix;
pub mod state;

pub use self::casemap::CaseMapping;
pub use self::error::{EventError, IsupportError, MessageParseError, Result, StateError};
pub use self::event::Event;
pub use self::isupport::{CapabilityTable, ChanModes, Isupport, IsupportBuilder, IsupportEntry, PrefixSpec, ISUPPORT_DEFAULTS};
pub use self::message::MessageRef;
pub use self::mode::{ModeChange, ModeClass, ModeClassifier, Polarity};
pub use self::prefix::PrefixTable;
pub use self::state::{Action, ChannelState, MembershipStore, SessionState, UserState};
