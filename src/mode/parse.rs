//! MODE-string interpretation.

use tracing::trace;

use super::{ModeChange, ModeClass, ModeClassifier, Polarity};
use crate::prefix::PrefixTable;

/// Walk `modestring` for `target`, consuming `params` as each class
/// dictates.
///
/// Channel targets are classified through `classifier` and `prefixes`;
/// any other target is treated as a user and every character is a boolean
/// flag. A character whose parameter is missing is skipped without
/// affecting the rest of the string. Unknown channel modes are dropped.
pub fn interpret<S: AsRef<str>>(
    classifier: &ModeClassifier,
    prefixes: &PrefixTable,
    target: &str,
    modestring: &str,
    params: &[S],
) -> Vec<ModeChange> {
    let is_channel = classifier.is_channel_name(target);
    let mut args = params.iter().map(|p| p.as_ref());
    let mut polarity = Polarity::Plus;
    let mut res = vec![];

    for c in modestring.chars() {
        match c {
            '+' => polarity = Polarity::Plus,
            '-' => polarity = Polarity::Minus,
            _ if !is_channel => res.push(ModeChange {
                class: ModeClass::Setting,
                polarity,
                mode: c,
                arg: None,
            }),
            _ => {
                let class = classifier.classify(c, prefixes);
                if class == ModeClass::Unknown {
                    trace!(subject = %target, mode = %c, "ignoring unknown channel mode");
                    continue;
                }

                let arg = if class.takes_arg(polarity) {
                    match args.next() {
                        Some(arg) => Some(arg.to_string()),
                        None => {
                            trace!(subject = %target, mode = %c, "mode starved of parameter");
                            continue;
                        }
                    }
                } else {
                    None
                };

                res.push(ModeChange {
                    class,
                    polarity,
                    mode: c,
                    arg,
                });
            }
        }
    }

    res
}
