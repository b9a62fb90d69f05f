//! Channel-mode classification and MODE-string interpretation.
//!
//! `CHANMODES` sorts channel modes into four classes that decide whether a
//! mode character consumes a parameter. Permission modes (`o`, `v`, ...)
//! come from `PREFIX` instead and always consume the affected nickname.

mod parse;

pub use self::parse::interpret;

use std::collections::HashSet;

use crate::isupport::ChanModes;
use crate::prefix::PrefixTable;

/// The class a mode character resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeClass {
    /// Type A, e.g. `b`. Parameter on set and unset.
    List,
    /// Type B, e.g. `k`. Parameter on set and unset.
    Key,
    /// Type C, e.g. `l`. Parameter on set only.
    Limit,
    /// Type D, e.g. `n`. Never a parameter. Also used for user modes.
    Setting,
    /// Membership prefix mode from `PREFIX`, e.g. `o`. Parameter is a nick.
    Permission,
    /// Not advertised anywhere.
    Unknown,
}

impl ModeClass {
    /// Whether a mode of this class consumes a parameter under `polarity`.
    pub fn takes_arg(self, polarity: Polarity) -> bool {
        match self {
            Self::List | Self::Key | Self::Permission => true,
            Self::Limit => polarity == Polarity::Plus,
            Self::Setting | Self::Unknown => false,
        }
    }
}

/// Whether a mode is being set or unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Polarity {
    #[default]
    Plus,
    Minus,
}

impl Polarity {
    /// `+` or `-`.
    pub fn as_char(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
        }
    }
}

/// One effect produced by a MODE command.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeChange {
    pub class: ModeClass,
    pub polarity: Polarity,
    pub mode: char,
    /// Consumed parameter, if the class took one.
    pub arg: Option<String>,
}

impl ModeChange {
    /// Is this a set (`+`) change?
    pub fn is_set(&self) -> bool {
        self.polarity == Polarity::Plus
    }
}

impl std::fmt::Display for ModeChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.polarity.as_char(), self.mode)?;
        if let Some(arg) = &self.arg {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Mode classes from `CHANMODES` and channel sigils from `CHANTYPES`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModeClassifier {
    list: HashSet<char>,
    key: HashSet<char>,
    limit: HashSet<char>,
    setting: HashSet<char>,
    chantypes: HashSet<char>,
}

impl ModeClassifier {
    /// Replace all four classes.
    pub fn set_chanmodes(&mut self, modes: ChanModes<'_>) {
        self.list = modes.a.chars().collect();
        self.key = modes.b.chars().collect();
        self.limit = modes.c.chars().collect();
        self.setting = modes.d.chars().collect();
    }

    /// Replace the channel-type set.
    pub fn set_chantypes(&mut self, types: &str) {
        self.chantypes = types.chars().collect();
    }

    /// Channel sigils in no particular order.
    pub fn chantypes(&self) -> impl Iterator<Item = char> + '_ {
        self.chantypes.iter().copied()
    }

    /// True iff the first character of `name` is a channel sigil.
    pub fn is_channel_name(&self, name: &str) -> bool {
        name.chars()
            .next()
            .is_some_and(|c| self.chantypes.contains(&c))
    }

    /// `CHANMODES` class of `mode`, probing A, B, C, D in that order.
    pub fn class_of(&self, mode: char) -> Option<ModeClass> {
        if self.list.contains(&mode) {
            Some(ModeClass::List)
        } else if self.key.contains(&mode) {
            Some(ModeClass::Key)
        } else if self.limit.contains(&mode) {
            Some(ModeClass::Limit)
        } else if self.setting.contains(&mode) {
            Some(ModeClass::Setting)
        } else {
            None
        }
    }

    /// Full classification of a channel mode character.
    pub fn classify(&self, mode: char, prefixes: &PrefixTable) -> ModeClass {
        match self.class_of(mode) {
            Some(class) => class,
            None if prefixes.is_mode(mode) => ModeClass::Permission,
            None => ModeClass::Unknown,
        }
    }
}
