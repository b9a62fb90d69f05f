//! Protocol events consumed by [`SessionState`](crate::state::SessionState).
//!
//! Each variant carries the positional fields the IRC protocol fixes for
//! that command or numeric. [`Event::from_message`] maps a tokenized line
//! onto a variant, or `None` when the line does not affect session state.

use crate::error::EventError;
use crate::message::MessageRef;

/// A state-affecting protocol event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    /// 001 RPL_WELCOME.
    Welcome { nick: String },
    /// 004 RPL_MYINFO; only the user-mode field is kept.
    MyInfo { user_modes: String },
    /// 005 RPL_ISUPPORT, tokens only.
    ISupport { tokens: Vec<String> },
    Join { channel: String, actor: String },
    Part { channel: String, actor: String },
    Kick { channel: String, target: String },
    Quit { actor: String },
    Nick { actor: String, new_nick: String },
    Mode {
        target: String,
        modestring: String,
        params: Vec<String>,
    },
    /// 352 RPL_WHOREPLY.
    WhoReply {
        channel: String,
        username: String,
        host: String,
        nick: String,
        flags: String,
    },
    /// 315 RPL_ENDOFWHO.
    EndOfWho { mask: String },
    /// 353 RPL_NAMREPLY; `names` is the space-delimited prefixed-nick list.
    NamesReply { channel: String, names: String },
    /// 366 RPL_ENDOFNAMES.
    EndOfNames { channel: String },
}

fn require(msg: &MessageRef<'_>, expected: usize) -> Result<(), EventError> {
    if msg.params.len() < expected {
        return Err(EventError::NotEnoughArguments {
            command: msg.command.to_string(),
            expected,
            got: msg.params.len(),
        });
    }
    Ok(())
}

fn actor(msg: &MessageRef<'_>) -> Result<String, EventError> {
    msg.source_nick()
        .map(str::to_string)
        .ok_or_else(|| EventError::MissingSource {
            command: msg.command.to_string(),
        })
}

impl Event {
    /// Convert a tokenized line. Unrelated commands yield `Ok(None)`.
    pub fn from_message(msg: &MessageRef<'_>) -> Result<Option<Event>, EventError> {
        let p = &msg.params;
        let event = match msg.command.to_ascii_uppercase().as_str() {
            "001" => {
                require(msg, 1)?;
                Event::Welcome {
                    nick: p[0].to_string(),
                }
            }
            "004" => {
                require(msg, 4)?;
                Event::MyInfo {
                    user_modes: p[3].to_string(),
                }
            }
            "005" => {
                require(msg, 1)?;
                // The trailing parameter is the human-readable text, never a token.
                let mut tokens = &p[1..];
                if let Some(last) = tokens.last() {
                    if msg.trailing || last.contains(' ') {
                        tokens = &tokens[..tokens.len() - 1];
                    }
                }
                Event::ISupport {
                    tokens: tokens.iter().map(|t| t.to_string()).collect(),
                }
            }
            "315" => {
                require(msg, 2)?;
                Event::EndOfWho {
                    mask: p[1].to_string(),
                }
            }
            "352" => {
                require(msg, 7)?;
                Event::WhoReply {
                    channel: p[1].to_string(),
                    username: p[2].to_string(),
                    host: p[3].to_string(),
                    nick: p[5].to_string(),
                    flags: p[6].to_string(),
                }
            }
            "353" => {
                // <me> [<symbol>] <channel> :<names>
                require(msg, 3)?;
                Event::NamesReply {
                    channel: p[p.len() - 2].to_string(),
                    names: p[p.len() - 1].to_string(),
                }
            }
            "366" => {
                require(msg, 2)?;
                Event::EndOfNames {
                    channel: p[1].to_string(),
                }
            }
            "JOIN" => {
                require(msg, 1)?;
                Event::Join {
                    channel: p[0].to_string(),
                    actor: actor(msg)?,
                }
            }
            "PART" => {
                require(msg, 1)?;
                Event::Part {
                    channel: p[0].to_string(),
                    actor: actor(msg)?,
                }
            }
            "KICK" => {
                require(msg, 2)?;
                Event::Kick {
                    channel: p[0].to_string(),
                    target: p[1].to_string(),
                }
            }
            "QUIT" => Event::Quit { actor: actor(msg)? },
            "NICK" => {
                require(msg, 1)?;
                Event::Nick {
                    actor: actor(msg)?,
                    new_nick: p[0].to_string(),
                }
            }
            "MODE" => {
                require(msg, 2)?;
                Event::Mode {
                    target: p[0].to_string(),
                    modestring: p[1].to_string(),
                    params: p[2..].iter().map(|s| s.to_string()).collect(),
                }
            }
            _ => return Ok(None),
        };

        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(line: &str) -> Result<Option<Event>, EventError> {
        let msg = MessageRef::parse(line).expect("line should tokenize");
        Event::from_message(&msg)
    }

    #[test]
    fn test_isupport_drops_trailing_text() {
        let event = convert(":s 005 bot CHANTYPES=# -EXCEPTS :are supported by this server")
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            Event::ISupport {
                tokens: vec!["CHANTYPES=#".to_string(), "-EXCEPTS".to_string()]
            }
        );
    }

    #[test]
    fn test_isupport_drops_single_word_trailing() {
        let event = convert(":s 005 bot CHANTYPES=# :supported").unwrap().unwrap();
        assert_eq!(
            event,
            Event::ISupport {
                tokens: vec!["CHANTYPES=#".to_string()]
            }
        );

        // Without a `:` the last parameter is a token.
        let event = convert(":s 005 bot CHANTYPES=# EXCEPTS").unwrap().unwrap();
        assert_eq!(
            event,
            Event::ISupport {
                tokens: vec!["CHANTYPES=#".to_string(), "EXCEPTS".to_string()]
            }
        );
    }

    #[test]
    fn test_from_parts_trailing_flag() {
        let msg = MessageRef::from_parts(Some("s"), "005", vec!["bot", "NICKLEN=30", "ok"], true);
        assert_eq!(
            Event::from_message(&msg).unwrap(),
            Some(Event::ISupport {
                tokens: vec!["NICKLEN=30".to_string()]
            })
        );
    }

    #[test]
    fn test_whoreply_fields() {
        let event = convert(
            ":kenny.chatspike.net 352 guest #test grawity broken.symlink *.chatspike.net grawity H@%+ :0 Mantas M.",
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            event,
            Event::WhoReply {
                channel: "#test".to_string(),
                username: "grawity".to_string(),
                host: "broken.symlink".to_string(),
                nick: "grawity".to_string(),
                flags: "H@%+".to_string(),
            }
        );
    }

    #[test]
    fn test_names_with_and_without_symbol() {
        let event = convert(":hades.arpa 353 guest = #tethys :~&@%+aji &@Attila")
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            Event::NamesReply {
                channel: "#tethys".to_string(),
                names: "~&@%+aji &@Attila".to_string(),
            }
        );

        let event = convert(":old.server 353 guest #tethys :aji").unwrap().unwrap();
        assert!(matches!(event, Event::NamesReply { ref channel, .. } if channel == "#tethys"));
    }

    #[test]
    fn test_mode_params() {
        let event = convert(":op!o@h MODE #chan +ov alice bob").unwrap().unwrap();
        assert_eq!(
            event,
            Event::Mode {
                target: "#chan".to_string(),
                modestring: "+ov".to_string(),
                params: vec!["alice".to_string(), "bob".to_string()],
            }
        );
    }

    #[test]
    fn test_nick_and_kick() {
        assert_eq!(
            convert(":old!u@h NICK :new").unwrap(),
            Some(Event::Nick {
                actor: "old".to_string(),
                new_nick: "new".to_string()
            })
        );
        assert_eq!(
            convert(":op!u@h KICK #chan victim :reason").unwrap(),
            Some(Event::Kick {
                channel: "#chan".to_string(),
                target: "victim".to_string()
            })
        );
    }

    #[test]
    fn test_unrelated_command() {
        assert_eq!(convert(":a!b@c PRIVMSG #chan :hi").unwrap(), None);
        assert_eq!(convert("PING :server").unwrap(), None);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            convert(":s KICK #chan"),
            Err(EventError::NotEnoughArguments {
                command: "KICK".to_string(),
                expected: 2,
                got: 1
            })
        );
        assert_eq!(
            convert("JOIN #chan"),
            Err(EventError::MissingSource {
                command: "JOIN".to_string()
            })
        );
    }
}
