// ABOUTME: Named Binary Tag (NBT) decoder for Rust.
// ABOUTME: Provides serde integration and a dynamic Value for decoding gzip, zlib or raw NBT.

//! # serde_nbt
//!
//! A decoder for the Named Binary Tag (NBT) format with serde support.
//!
//! An NBT document is a single named tag, normally a compound. Every value
//! carries a one-byte tag; compound entries also carry a name, which is how
//! they are matched to struct fields. The document may be wrapped in gzip or
//! zlib.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_nbt::{from_slice, Compression};
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Player {
//!     name: String,
//!     level: i32,
//! }
//!
//! let bytes = [
//!     0x0a, 0x00, 0x00, // compound ""
//!     0x08, 0x00, 0x04, b'n', b'a', b'm', b'e', 0x00, 0x03, b'A', b'l', b'x',
//!     0x03, 0x00, 0x05, b'l', b'e', b'v', b'e', b'l', 0x00, 0x00, 0x00, 0x07,
//!     0x00, // end
//! ];
//!
//! let player: Player = from_slice(Compression::None, &bytes).unwrap();
//! assert_eq!(player, Player { name: "Alx".into(), level: 7 });
//! ```
//!
//! ## Working with Dynamic Values
//!
//! ```rust
//! use serde_nbt::{decode_value, Compression};
//!
//! let bytes = [0x0a, 0x00, 0x01, b'r', 0x01, 0x00, 0x01, b'b', 0x05, 0x00];
//! let (name, value) = decode_value(Compression::None, &bytes[..]).unwrap();
//! assert_eq!(name, "r");
//! assert_eq!(value.get_key("b").and_then(|v| v.as_i64()), Some(5));
//! ```
//!
//! ## Type Mapping
//!
//! Scalar tags only go into destinations of the same width:
//! - `TAG_Byte`: `bool`, `i8`, `u8`
//! - `TAG_Short`: `i16`, `u16`
//! - `TAG_Int`: `i32`, `u32`
//! - `TAG_Long`: `i64`, `u64`
//! - `TAG_Float`: `f32`; `TAG_Double`: `f64`
//!
//! `usize` and `isize` are always rejected. A compound entry whose name is
//! not a field of the destination struct is an error. `TAG_Int_Array` and
//! `TAG_Long_Array` are not supported.
//!
//! ## Decoding Into Existing Values
//!
//! [`decode`] writes into a value the caller already holds. Lists refill
//! `Vec`s in place. Structs registered with [`impl_slots!`] only have the
//! fields the compound mentions written, so an empty compound leaves them
//! untouched and a repeated entry name keeps the last value. Structs using
//! `#[derive(Deserialize)]` are rebuilt by serde instead, with serde's rules
//! for missing and duplicate fields.
//!
//! ## Resource Limits
//!
//! Compounds and lists may nest at most 512 levels deep by default
//! (see [`DecoderConfig`]).

pub mod de;
pub mod decoder;
pub mod error;
pub mod reader;
pub mod slot;
pub mod types;
pub mod value;

// Re-export commonly used items at the crate root
pub use de::{
    decode, decode_with_config, from_reader, from_reader_with_config, from_slice, Deserializer,
};
pub use decoder::{Decoder, DecoderConfig};
pub use error::{Error, Result};
pub use reader::{Compression, Reader};
pub use slot::InPlace;
pub use types::{limits, Tag};
pub use value::Value;

// The compound! and impl_slots! macros are exported at crate root via #[macro_export]

#[doc(hidden)]
pub mod __private {
    pub use serde;
}

use serde::Deserialize;
use std::io::Read;

/// Decode an NBT document into a `Value`, returning the root name with it.
///
/// # Errors
///
/// Fails on a bad transport header, malformed data, or an unsupported tag.
///
/// # Example
///
/// ```rust
/// use serde_nbt::{decode_value, Compression, Value};
///
/// let bytes = [0x03, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00]; // Int "" = 256
/// let (_, value) = decode_value(Compression::None, &bytes[..]).unwrap();
/// assert_eq!(value, Value::Int(256));
/// ```
pub fn decode_value<R: Read>(compression: Compression, input: R) -> Result<(String, Value)> {
    decode_value_with_config(compression, input, DecoderConfig::default())
}

/// Decode an NBT document into a `Value` with custom configuration.
///
/// # Errors
///
/// Same as [`decode_value`], plus the configured limits.
pub fn decode_value_with_config<R: Read>(
    compression: Compression,
    input: R,
    config: DecoderConfig,
) -> Result<(String, Value)> {
    let mut de = Deserializer::from_reader_with_config(compression, input, config)?;
    let value = Value::deserialize(&mut de)?;
    de.finish()?;
    let name = de.root_name().to_owned();
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_value_nested() {
        // Compound "lvl" { "tags": List<String>[2] { "a", "bc" }, "inner": { "f": Float 1.0 } }
        let bytes = [
            0x0a, 0x00, 0x03, b'l', b'v', b'l', //
            0x09, 0x00, 0x04, b't', b'a', b'g', b's', 0x08, 0x00, 0x00, 0x00, 0x02, //
            0x00, 0x01, b'a', 0x00, 0x02, b'b', b'c', //
            0x0a, 0x00, 0x05, b'i', b'n', b'n', b'e', b'r', //
            0x05, 0x00, 0x01, b'f', 0x3f, 0x80, 0x00, 0x00, //
            0x00, //
            0x00,
        ];
        let (name, value) = decode_value(Compression::None, &bytes[..]).unwrap();
        assert_eq!(name, "lvl");
        assert_eq!(
            value,
            compound! {
                "tags" => vec!["a", "bc"],
                "inner" => compound! { "f" => 1.0f32 },
            }
        );
    }

    #[test]
    fn test_decode_value_byte_array() {
        let bytes = [0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x01, 0xfe];
        let (_, value) = decode_value(Compression::None, &bytes[..]).unwrap();
        assert_eq!(value, Value::ByteArray(vec![0x01, 0xfe]));
    }

    #[test]
    fn test_decode_value_rejects_int_array() {
        let bytes = [0x0b, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(
            decode_value(Compression::None, &bytes[..]),
            Err(Error::UnhandledTag(Tag::IntArray))
        );
    }
}
