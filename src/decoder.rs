// ABOUTME: Low-level NBT decoder: tag headers, names, list headers and payload skipping.
// ABOUTME: Tracks nesting depth and owns the stream reader for a single decode.

#![allow(clippy::missing_errors_doc)]

use std::io::Read;

use crate::error::{Error, Result};
use crate::reader::{Compression, Reader};
use crate::types::{limits, Tag};

/// Validate and convert bytes to a UTF-8 string.
/// Uses simdutf8 for SIMD-accelerated validation when the feature is enabled.
#[cfg(feature = "simd-utf8")]
#[inline]
pub(crate) fn validate_utf8(bytes: &[u8]) -> Result<&str> {
    simdutf8::basic::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
}

#[cfg(not(feature = "simd-utf8"))]
#[inline]
pub(crate) fn validate_utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
}

/// Configuration options for the decoder.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Maximum nesting depth of compounds and lists
    pub max_depth: usize,
    /// Allow bytes after the top-level tag (default: true)
    pub allow_trailing_bytes: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: limits::MAX_DEPTH,
            allow_trailing_bytes: true,
        }
    }
}

/// An NBT decoder reading tag headers and payload framing from a stream.
pub struct Decoder<R: Read> {
    reader: Reader<R>,
    config: DecoderConfig,
    depth: usize,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder over an uncompressed stream.
    pub fn new(input: R) -> Self {
        Self::with_config(Reader::new_plain(input), DecoderConfig::default())
    }

    /// Create a decoder over `input` wrapped in the given transport.
    pub fn from_reader(compression: Compression, input: R) -> Result<Self> {
        Ok(Self::with_config(
            Reader::new(compression, input)?,
            DecoderConfig::default(),
        ))
    }

    /// Create a decoder with custom configuration.
    #[must_use]
    pub fn with_config(reader: Reader<R>, config: DecoderConfig) -> Self {
        Self {
            reader,
            config,
            depth: 0,
        }
    }

    /// Get the decoder configuration.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Access the underlying reader for payload reads.
    #[inline]
    pub(crate) fn reader(&mut self) -> &mut Reader<R> {
        &mut self.reader
    }

    /// Read a bare tag byte.
    #[inline]
    pub fn read_tag(&mut self) -> Result<Tag> {
        Tag::from_byte(self.reader.read_u8()?)
    }

    /// Read a tag and, unless it is End, the name that follows it.
    pub fn read_named_tag(&mut self) -> Result<(String, Tag)> {
        let tag = self.read_tag()?;
        if tag == Tag::End {
            return Ok((String::new(), tag));
        }
        let name = self.read_name()?;
        Ok((name, tag))
    }

    /// Read a `u16`-prefixed name or string payload.
    pub fn read_name(&mut self) -> Result<String> {
        let bytes = self.reader.read_u16_prefixed()?;
        Ok(validate_utf8(&bytes)?.to_owned())
    }

    /// Read the raw bytes of a string payload without validation.
    pub fn read_string_bytes(&mut self) -> Result<Vec<u8>> {
        self.reader.read_u16_prefixed()
    }

    /// Read a byte array payload.
    pub fn read_byte_array(&mut self) -> Result<Vec<u8>> {
        self.reader.read_u32_prefixed()
    }

    /// Read a list header: the element tag and the element count.
    pub fn read_list_header(&mut self) -> Result<(Tag, u32)> {
        let inner = self.read_tag()?;
        let count = self.reader.read_u32()?;
        Ok((inner, count))
    }

    /// Enter a compound or list.
    #[inline]
    pub fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(Error::MaxDepthExceeded);
        }
        self.depth += 1;
        Ok(())
    }

    /// Leave a compound or list.
    #[inline]
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Consume the payload of `tag` without materializing it.
    pub fn skip_payload(&mut self, tag: Tag) -> Result<()> {
        if let Some(width) = tag.scalar_width() {
            return self.reader.skip(width as u64);
        }
        match tag {
            Tag::ByteArray => {
                let len = self.reader.read_u32()?;
                self.reader.skip(u64::from(len))
            }
            Tag::String => {
                let len = self.reader.read_u16()?;
                self.reader.skip(u64::from(len))
            }
            Tag::List => {
                let (inner, count) = self.read_list_header()?;
                self.enter()?;
                for _ in 0..count {
                    self.skip_payload(inner)?;
                }
                self.leave();
                Ok(())
            }
            Tag::Compound => {
                self.enter()?;
                loop {
                    let (_, tag) = self.read_named_tag()?;
                    if tag == Tag::End {
                        break;
                    }
                    self.skip_payload(tag)?;
                }
                self.leave();
                Ok(())
            }
            Tag::End => Err(Error::UnexpectedEnd),
            _ => Err(Error::UnhandledTag(tag)),
        }
    }

    /// Finish decoding and check for errors.
    pub fn finish(&mut self) -> Result<()> {
        if !self.config.allow_trailing_bytes && !self.reader.is_at_end()? {
            return Err(Error::TrailingBytes);
        }
        Ok(())
    }
}
