// ABOUTME: Defines the NBT tag enumeration and default decoder limits.
// ABOUTME: Tag values map directly to the one-byte type codes found on the wire.

use num_enum::TryFromPrimitive;
use std::fmt;

use crate::error::Error;

/// The NBT tag. This does not carry the value or the name.
#[derive(Debug, TryFromPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u8)]
pub enum Tag {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl Tag {
    /// Parse a tag from its wire byte.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownTag` for bytes outside the known set.
    pub fn from_byte(byte: u8) -> Result<Tag, Error> {
        Tag::try_from(byte).map_err(|_| Error::UnknownTag(byte))
    }

    /// The conventional `TAG_*` name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Tag::End => "TAG_End",
            Tag::Byte => "TAG_Byte",
            Tag::Short => "TAG_Short",
            Tag::Int => "TAG_Int",
            Tag::Long => "TAG_Long",
            Tag::Float => "TAG_Float",
            Tag::Double => "TAG_Double",
            Tag::ByteArray => "TAG_Byte_Array",
            Tag::String => "TAG_String",
            Tag::List => "TAG_List",
            Tag::Compound => "TAG_Compound",
            Tag::IntArray => "TAG_Int_Array",
            Tag::LongArray => "TAG_Long_Array",
        }
    }

    /// Width in bytes of a fixed-size scalar payload, or `None` for
    /// variable-length and container tags.
    #[must_use]
    pub const fn scalar_width(self) -> Option<usize> {
        match self {
            Tag::Byte => Some(1),
            Tag::Short => Some(2),
            Tag::Int | Tag::Float => Some(4),
            Tag::Long | Tag::Double => Some(8),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Default resource limits.
pub mod limits {
    /// Maximum nesting depth of compounds and lists
    pub const MAX_DEPTH: usize = 512;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_from_byte() {
        assert_eq!(Tag::from_byte(0).unwrap(), Tag::End);
        assert_eq!(Tag::from_byte(3).unwrap(), Tag::Int);
        assert_eq!(Tag::from_byte(10).unwrap(), Tag::Compound);
        assert_eq!(Tag::from_byte(12).unwrap(), Tag::LongArray);
        assert_eq!(Tag::from_byte(13), Err(Error::UnknownTag(13)));
        assert_eq!(Tag::from_byte(0xff), Err(Error::UnknownTag(0xff)));
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::ByteArray.to_string(), "TAG_Byte_Array");
        assert_eq!(Tag::Compound.to_string(), "TAG_Compound");
    }

    #[test]
    fn test_scalar_width() {
        assert_eq!(Tag::Byte.scalar_width(), Some(1));
        assert_eq!(Tag::Short.scalar_width(), Some(2));
        assert_eq!(Tag::Float.scalar_width(), Some(4));
        assert_eq!(Tag::Double.scalar_width(), Some(8));
        assert_eq!(Tag::String.scalar_width(), None);
        assert_eq!(Tag::List.scalar_width(), None);
    }
}
