//! Request routing.

mod path;
mod prefix;

pub use path::canonical_path;
pub use prefix::PrefixRouter;
