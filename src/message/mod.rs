//! Raw line tokenization.
//!
//! Only enough of the IRC grammar to feed [`Event`](crate::event::Event)
//! conversion: tags are kept as an opaque string, the source is split for
//! its nickname, and parameters are sliced out of the input.

mod borrowed;
mod nom_parser;

pub use self::borrowed::MessageRef;
pub use self::nom_parser::ParsedMessage;
