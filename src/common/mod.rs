//! Miscellaneous common structs used throughout the library.

mod id;
mod value;

pub use id::*;
pub use value::*;
