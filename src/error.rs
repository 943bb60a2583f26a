// ABOUTME: Error types for NBT decoding.
// ABOUTME: Every failure aborts the decode; variants carry the tag, kind or field involved.

use std::fmt;
use std::io;

use crate::types::Tag;

/// The result type for NBT operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding NBT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The compression selector does not name a known transport.
    UnknownCompression(u8),

    /// The gzip or zlib transport could not be initialized.
    Compression(String),

    /// Unexpected end of input data.
    Truncated,

    /// Any other failure of the underlying stream.
    Io(String),

    /// Unconsumed bytes after the top-level tag.
    TrailingBytes,

    /// Tag byte outside the known set.
    UnknownTag(u8),

    /// Known tag that this decoder does not handle.
    UnhandledTag(Tag),

    /// End tag where a value was expected.
    UnexpectedEnd,

    /// The destination kind cannot hold a payload of this tag.
    Mismatch {
        /// Tag read from the stream.
        tag: Tag,
        /// Destination kind that rejected it.
        kind: &'static str,
    },

    /// Architecture-width integer destination.
    UnsupportedKind(&'static str),

    /// Byte array longer than the fixed-size destination.
    ByteArrayTooLong {
        /// Length declared in the stream.
        length: u32,
        /// Capacity of the destination.
        capacity: usize,
    },

    /// Compound entry with no matching destination field.
    UnhandledField {
        /// Tag of the entry.
        tag: Tag,
        /// Name of the entry.
        name: String,
    },

    /// String payload is not valid UTF-8.
    InvalidUtf8,

    /// Compounds and lists nested too deep.
    MaxDepthExceeded,

    /// Custom error message (for serde integration).
    Custom(String),
}

impl Error {
    /// Returns a stable identifier for the error variant.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::UnknownCompression(_) => "unknown_compression",
            Error::Compression(_) => "compression",
            Error::Truncated => "truncated",
            Error::Io(_) => "io_error",
            Error::TrailingBytes => "trailing_bytes",
            Error::UnknownTag(_) => "unknown_tag",
            Error::UnhandledTag(_) => "unhandled_tag",
            Error::UnexpectedEnd => "unexpected_end",
            Error::Mismatch { .. } => "mismatch",
            Error::UnsupportedKind(_) => "unsupported_kind",
            Error::ByteArrayTooLong { .. } => "byte_array_too_long",
            Error::UnhandledField { .. } => "unhandled_field",
            Error::InvalidUtf8 => "invalid_utf8",
            Error::MaxDepthExceeded => "max_depth_exceeded",
            Error::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownCompression(code) => write!(f, "unknown compression type: {code}"),
            Error::Compression(msg) => write!(f, "compression error: {msg}"),
            Error::Truncated => write!(f, "unexpected end of input"),
            Error::Io(msg) => write!(f, "I/O error: {msg}"),
            Error::TrailingBytes => write!(f, "trailing bytes after document"),
            Error::UnknownTag(code) => write!(f, "unknown tag: 0x{code:02x}"),
            Error::UnhandledTag(tag) => write!(f, "unhandled tag: {tag}"),
            Error::UnexpectedEnd => write!(f, "TAG_End outside of a compound"),
            Error::Mismatch { tag, kind } => {
                write!(f, "tag is {tag}, but it cannot be stored in a {kind}")
            }
            Error::UnsupportedKind(kind) => write!(
                f,
                "{kind} is not supported for portability reasons, use a fixed-width integer"
            ),
            Error::ByteArrayTooLong { length, capacity } => write!(
                f,
                "byte array is of length {length}, but the destination only holds {capacity}"
            ),
            Error::UnhandledField { tag, name } => write!(f, "unhandled {tag} field {name}"),
            Error::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
            Error::MaxDepthExceeded => write!(f, "maximum nesting depth exceeded"),
            Error::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::Truncated,
            _ => Error::Io(err.to_string()),
        }
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        assert_eq!(Error::Truncated.error_type(), "truncated");
        assert_eq!(Error::UnknownTag(0x0d).error_type(), "unknown_tag");
        assert_eq!(Error::UnhandledTag(Tag::IntArray).error_type(), "unhandled_tag");
    }

    #[test]
    fn test_error_display() {
        let err = Error::Mismatch { tag: Tag::Short, kind: "i32" };
        assert_eq!(err.to_string(), "tag is TAG_Short, but it cannot be stored in a i32");

        let err = Error::UnhandledField { tag: Tag::Int, name: "Health".into() };
        assert_eq!(err.to_string(), "unhandled TAG_Int field Health");

        let err = Error::ByteArrayTooLong { length: 10, capacity: 5 };
        assert_eq!(
            err.to_string(),
            "byte array is of length 10, but the destination only holds 5"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert_eq!(Error::from(eof), Error::Truncated);

        let other = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(Error::from(other), Error::Io("boom".into()));
    }
}
