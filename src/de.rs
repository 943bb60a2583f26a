// ABOUTME: Serde Deserializer implementation for NBT decoding.
// ABOUTME: Dispatches on the tag read from the stream and binds compound entries to fields by name.

#![allow(clippy::cast_possible_truncation)]

use std::io::Read;

use crate::decoder::{validate_utf8, Decoder, DecoderConfig};
use crate::error::{Error, Result};
use crate::reader::{Compression, Reader};
use crate::types::Tag;
use serde::de::value::StringDeserializer;
use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor};

/// A serde Deserializer that reads one NBT document.
///
/// Construction reads the top-level tag header; the payload is decoded by
/// whatever `Deserialize` implementation the caller drives it with.
pub struct Deserializer<R: Read> {
    decoder: Decoder<R>,
    /// Tag of the payload the next `deserialize_*` call consumes.
    tag: Tag,
    root_name: String,
}

impl<R: Read> Deserializer<R> {
    /// Read the top-level tag header from `decoder`.
    ///
    /// # Errors
    ///
    /// Fails if the stream cannot be read or the first tag is End.
    pub fn new(mut decoder: Decoder<R>) -> Result<Self> {
        let (root_name, tag) = decoder.read_named_tag()?;
        if tag == Tag::End {
            return Err(Error::UnexpectedEnd);
        }
        Ok(Self {
            decoder,
            tag,
            root_name,
        })
    }

    /// Create a Deserializer over `input` wrapped in the given transport.
    ///
    /// # Errors
    ///
    /// Fails on a bad transport header or an unreadable top-level tag.
    pub fn from_reader(compression: Compression, input: R) -> Result<Self> {
        Self::from_reader_with_config(compression, input, DecoderConfig::default())
    }

    /// Create a Deserializer with custom configuration.
    ///
    /// # Errors
    ///
    /// Fails on a bad transport header or an unreadable top-level tag.
    pub fn from_reader_with_config(
        compression: Compression,
        input: R,
        config: DecoderConfig,
    ) -> Result<Self> {
        Self::new(Decoder::with_config(Reader::new(compression, input)?, config))
    }

    /// Name of the top-level tag.
    #[must_use]
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Tag of the payload that will be decoded next.
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Check the stream state once the document has been decoded.
    ///
    /// # Errors
    ///
    /// Returns `Error::TrailingBytes` if trailing data is disallowed and present.
    pub fn finish(&mut self) -> Result<()> {
        self.decoder.finish()
    }

    /// Get the underlying decoder (consumes self).
    #[must_use]
    pub fn into_decoder(self) -> Decoder<R> {
        self.decoder
    }

    #[inline]
    fn expect(&self, tag: Tag, kind: &'static str) -> Result<()> {
        if self.tag == tag {
            Ok(())
        } else {
            Err(mismatch(self.tag, kind))
        }
    }

    fn read_string(&mut self) -> Result<String> {
        let bytes = self.decoder.read_string_bytes()?;
        Ok(validate_utf8(&bytes)?.to_owned())
    }

    fn visit_list<'de, V: Visitor<'de>>(&mut self, visitor: V) -> Result<V::Value> {
        let (inner, count) = self.decoder.read_list_header()?;
        self.decoder.enter()?;
        let mut access = ListAccess {
            de: &mut *self,
            inner,
            remaining: count,
        };
        let value = visitor.visit_seq(&mut access)?;
        if access.remaining != 0 {
            return Err(Error::Custom(format!(
                "list has {count} elements but the destination took {}",
                count - access.remaining
            )));
        }
        self.decoder.leave();
        Ok(value)
    }

    fn visit_compound<'de, V: Visitor<'de>>(
        &mut self,
        fields: Option<&'static [&'static str]>,
        visitor: V,
    ) -> Result<V::Value> {
        self.decoder.enter()?;
        let value = visitor.visit_map(CompoundAccess {
            de: &mut *self,
            fields,
        })?;
        self.decoder.leave();
        Ok(value)
    }
}

/// Deserialize a value from a possibly compressed NBT stream.
///
/// # Errors
///
/// Returns an error if:
/// - The transport header is invalid
/// - The data is malformed or truncated
/// - The document's shape doesn't match `T`
pub fn from_reader<R: Read, T: DeserializeOwned>(compression: Compression, input: R) -> Result<T> {
    from_reader_with_config(compression, input, DecoderConfig::default())
}

/// Deserialize a value from an NBT stream with custom configuration.
///
/// # Errors
///
/// Same as [`from_reader`], plus the configured limits.
pub fn from_reader_with_config<R: Read, T: DeserializeOwned>(
    compression: Compression,
    input: R,
    config: DecoderConfig,
) -> Result<T> {
    let mut de = Deserializer::from_reader_with_config(compression, input, config)?;
    let value = T::deserialize(&mut de)?;
    de.finish()?;
    Ok(value)
}

/// Deserialize a value from an in-memory NBT document.
///
/// # Errors
///
/// Same as [`from_reader`].
pub fn from_slice<T: DeserializeOwned>(compression: Compression, data: &[u8]) -> Result<T> {
    from_reader(compression, data)
}

/// Decode an NBT document into an existing value.
///
/// Sequences are cleared and refilled in place, reusing their capacity.
/// Structs registered with [`impl_slots!`](crate::impl_slots) only have the
/// fields named in the compound written; the rest keep their values.
/// Writes made before a failure are not rolled back.
///
/// # Errors
///
/// Same as [`from_reader`].
pub fn decode<R: Read, T: DeserializeOwned>(
    compression: Compression,
    input: R,
    value: &mut T,
) -> Result<()> {
    decode_with_config(compression, input, value, DecoderConfig::default())
}

/// Decode an NBT document into an existing value with custom configuration.
///
/// # Errors
///
/// Same as [`from_reader_with_config`].
pub fn decode_with_config<R: Read, T: DeserializeOwned>(
    compression: Compression,
    input: R,
    value: &mut T,
    config: DecoderConfig,
) -> Result<()> {
    let mut de = Deserializer::from_reader_with_config(compression, input, config)?;
    T::deserialize_in_place(&mut de, value)?;
    de.finish()
}

fn mismatch(tag: Tag, kind: &'static str) -> Error {
    match tag {
        Tag::End => Error::UnexpectedEnd,
        Tag::IntArray | Tag::LongArray => Error::UnhandledTag(tag),
        _ => Error::Mismatch { tag, kind },
    }
}

/// `usize` and `isize` destinations are refused whatever the stream holds.
///
/// serde gives no way to tell `usize` from `u64` at the `Deserializer`, so
/// the visitor's output type is identified by name. `type_name` output is
/// not guaranteed stable, hence the match on the last path segment and on
/// both spellings of the non-zero wrappers. `Wrapping`, `Saturating` and the
/// atomics deserialize through the bare integer and are caught by it. A
/// custom visitor that produces `usize` from its own type is not detected.
fn reject_arch_width<T>() -> Result<()> {
    let name = std::any::type_name::<T>();
    if is_arch_width(name) {
        return Err(Error::UnsupportedKind(name));
    }
    Ok(())
}

fn is_arch_width(type_name: &str) -> bool {
    let last = type_name.rsplit("::").next().unwrap_or(type_name);
    matches!(
        last,
        "usize"
            | "isize"
            | "NonZeroUsize"
            | "NonZeroIsize"
            | "NonZero<usize>"
            | "NonZero<isize>"
    )
}

fn name_deserializer(name: String) -> StringDeserializer<Error> {
    name.into_deserializer()
}

impl<'de, R: Read> de::Deserializer<'de> for &mut Deserializer<R> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag {
            Tag::Byte => visitor.visit_i8(self.decoder.reader().read_i8()?),
            Tag::Short => visitor.visit_i16(self.decoder.reader().read_i16()?),
            Tag::Int => visitor.visit_i32(self.decoder.reader().read_i32()?),
            Tag::Long => visitor.visit_i64(self.decoder.reader().read_i64()?),
            Tag::Float => visitor.visit_f32(self.decoder.reader().read_f32()?),
            Tag::Double => visitor.visit_f64(self.decoder.reader().read_f64()?),
            Tag::ByteArray => visitor.visit_byte_buf(self.decoder.read_byte_array()?),
            Tag::String => visitor.visit_string(self.read_string()?),
            Tag::List => self.visit_list(visitor),
            Tag::Compound => self.visit_compound(None, visitor),
            Tag::End => Err(Error::UnexpectedEnd),
            Tag::IntArray | Tag::LongArray => Err(Error::UnhandledTag(self.tag)),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect(Tag::Byte, "bool")?;
        visitor.visit_bool(self.decoder.reader().read_u8()? != 0)
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect(Tag::Byte, "i8")?;
        visitor.visit_i8(self.decoder.reader().read_i8()?)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect(Tag::Short, "i16")?;
        visitor.visit_i16(self.decoder.reader().read_i16()?)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect(Tag::Int, "i32")?;
        visitor.visit_i32(self.decoder.reader().read_i32()?)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        reject_arch_width::<V::Value>()?;
        self.expect(Tag::Long, "i64")?;
        visitor.visit_i64(self.decoder.reader().read_i64()?)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect(Tag::Byte, "u8")?;
        visitor.visit_u8(self.decoder.reader().read_u8()?)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect(Tag::Short, "u16")?;
        visitor.visit_u16(self.decoder.reader().read_u16()?)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect(Tag::Int, "u32")?;
        visitor.visit_u32(self.decoder.reader().read_u32()?)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        reject_arch_width::<V::Value>()?;
        self.expect(Tag::Long, "u64")?;
        visitor.visit_u64(self.decoder.reader().read_u64()?)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect(Tag::Float, "f32")?;
        visitor.visit_f32(self.decoder.reader().read_f32()?)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect(Tag::Double, "f64")?;
        visitor.visit_f64(self.decoder.reader().read_f64()?)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect(Tag::String, "char")?;
        let s = self.read_string()?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(Error::Custom("expected single character".into())),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect(Tag::String, "string")?;
        visitor.visit_string(self.read_string()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        // Raw capture: string payloads are not validated here
        match self.tag {
            Tag::ByteArray => visitor.visit_byte_buf(self.decoder.read_byte_array()?),
            Tag::String => visitor.visit_byte_buf(self.decoder.read_string_bytes()?),
            tag => Err(mismatch(tag, "bytes")),
        }
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        // NBT has no null; an entry that is present is always Some
        visitor.visit_some(self)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(mismatch(self.tag, "unit"))
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _visitor: V,
    ) -> Result<V::Value> {
        Err(mismatch(self.tag, name))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag {
            Tag::List => self.visit_list(visitor),
            Tag::ByteArray => {
                let bytes = self.decoder.read_byte_array()?;
                visitor.visit_seq(ByteArrayAccess::new(bytes, 0))
            }
            tag => Err(mismatch(tag, "sequence")),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        match self.tag {
            Tag::List => self.visit_list(visitor),
            Tag::ByteArray => {
                let length = self.decoder.reader().read_u32()?;
                if length as usize > len {
                    return Err(Error::ByteArrayTooLong {
                        length,
                        capacity: len,
                    });
                }
                let bytes = self.decoder.reader().read_bytes(length as usize)?;
                visitor.visit_seq(ByteArrayAccess::new(bytes, len - length as usize))
            }
            tag => Err(mismatch(tag, "tuple")),
        }
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect(Tag::Compound, "map")?;
        self.visit_compound(None, visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.expect(Tag::Compound, name)?;
        self.visit_compound(Some(fields), visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        // Unit variants only, named by a string payload
        self.expect(Tag::String, name)?;
        let variant = self.read_string()?;
        visitor.visit_enum(name_deserializer(variant))
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.decoder.skip_payload(self.tag)?;
        visitor.visit_unit()
    }
}

/// Elements of a list: unnamed payloads that all share the inner tag.
struct ListAccess<'a, R: Read> {
    de: &'a mut Deserializer<R>,
    inner: Tag,
    remaining: u32,
}

impl<'de, R: Read> SeqAccess<'de> for ListAccess<'_, R> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        self.de.tag = self.inner;
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining as usize)
    }
}

/// Entries of a compound, read until the End tag.
///
/// With `fields` set, an entry whose name is not one of them is an error
/// instead of being skipped.
struct CompoundAccess<'a, R: Read> {
    de: &'a mut Deserializer<R>,
    fields: Option<&'static [&'static str]>,
}

impl<'de, R: Read> MapAccess<'de> for CompoundAccess<'_, R> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        let (name, tag) = self.de.decoder.read_named_tag()?;
        if tag == Tag::End {
            return Ok(None);
        }
        if let Some(fields) = self.fields {
            if !fields.contains(&name.as_str()) {
                return Err(Error::UnhandledField { tag, name });
            }
        }
        self.de.tag = tag;
        seed.deserialize(name_deserializer(name)).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(&mut *self.de)
    }
}

/// Bytes of a byte array, optionally zero-padded to a fixed capacity.
struct ByteArrayAccess {
    bytes: std::vec::IntoIter<u8>,
    padding: usize,
}

impl ByteArrayAccess {
    fn new(bytes: Vec<u8>, padding: usize) -> Self {
        ByteArrayAccess {
            bytes: bytes.into_iter(),
            padding,
        }
    }
}

impl<'de> SeqAccess<'de> for ByteArrayAccess {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>> {
        let byte = match self.bytes.next() {
            Some(byte) => byte,
            None if self.padding > 0 => {
                self.padding -= 1;
                0
            }
            None => return Ok(None),
        };
        seed.deserialize(ByteDeserializer(byte)).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.bytes.len() + self.padding)
    }
}

/// One byte array element, held to the same rules as a Byte payload.
struct ByteDeserializer(u8);

impl<'de> de::Deserializer<'de> for ByteDeserializer {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i8(self.0 as i8)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_bool(self.0 != 0)
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i8(self.0 as i8)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u8(self.0)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(mismatch(Tag::Byte, "i16"))
    }

    fn deserialize_i32<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(mismatch(Tag::Byte, "i32"))
    }

    fn deserialize_i64<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        reject_arch_width::<V::Value>()?;
        Err(mismatch(Tag::Byte, "i64"))
    }

    fn deserialize_u16<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(mismatch(Tag::Byte, "u16"))
    }

    fn deserialize_u32<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(mismatch(Tag::Byte, "u32"))
    }

    fn deserialize_u64<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        reject_arch_width::<V::Value>()?;
        Err(mismatch(Tag::Byte, "u64"))
    }

    fn deserialize_f32<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(mismatch(Tag::Byte, "f32"))
    }

    fn deserialize_f64<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(mismatch(Tag::Byte, "f64"))
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    serde::forward_to_deserialize_any! {
        char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}
