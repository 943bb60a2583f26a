// ABOUTME: Name-to-slot registration for structs decoded in place.
// ABOUTME: Compound entries are written into the matching field; fields the stream omits keep their value.

use serde::de::{self, Deserialize, DeserializeSeed};

/// A seed that decodes into an existing value through
/// [`Deserialize::deserialize_in_place`].
///
/// Structs registered with [`impl_slots!`](crate::impl_slots) recurse through
/// this, so nested registered structs, `Vec`s and fixed arrays are updated in
/// place while other types are replaced.
pub struct InPlace<'a, T>(pub &'a mut T);

impl<'de, T: Deserialize<'de>> DeserializeSeed<'de> for InPlace<'_, T> {
    type Value = ();

    fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        T::deserialize_in_place(deserializer, self.0)
    }
}

/// Register the compound entries of a struct.
///
/// Implements `Deserialize` for the struct so that:
/// - each entry is written into the field registered under its name, and a
///   repeated name overwrites the earlier entry;
/// - fields the compound does not mention keep their current value
///   (`decode`) or their `Default` value (`from_reader`, `from_slice`);
/// - a name with no registered field is an error.
///
/// A field registers under its own name unless `= "Name"` is given. The
/// struct must implement `Default`.
///
/// # Examples
///
/// ```rust
/// use serde_nbt::{decode, impl_slots, Compression};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Settings {
///     difficulty: i8,
///     motd: String,
/// }
///
/// impl_slots!(Settings { difficulty, motd = "Motd" });
///
/// // Compound "" { "difficulty": Byte 3 }
/// let bytes = [
///     0x0a, 0x00, 0x00,
///     0x01, 0x00, 0x0a, b'd', b'i', b'f', b'f', b'i', b'c', b'u', b'l', b't', b'y', 0x03,
///     0x00,
/// ];
///
/// let mut settings = Settings { difficulty: 1, motd: "welcome".into() };
/// decode(Compression::None, &bytes[..], &mut settings).unwrap();
/// assert_eq!(settings, Settings { difficulty: 3, motd: "welcome".into() });
/// ```
#[macro_export]
macro_rules! impl_slots {
    ($ty:ident { $($field:ident $(= $name:literal)?),* $(,)? }) => {
        impl<'de> $crate::__private::serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let mut value = <$ty as ::core::default::Default>::default();
                Self::deserialize_in_place(deserializer, &mut value)?;
                ::core::result::Result::Ok(value)
            }

            fn deserialize_in_place<D>(
                deserializer: D,
                place: &mut Self,
            ) -> ::core::result::Result<(), D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                use $crate::__private::serde::de::{Error as _, MapAccess, Visitor};

                const FIELDS: &[&str] = &[$($crate::__slot_name!($field $(, $name)?)),*];

                struct Slots<'a>(&'a mut $ty);

                impl<'de> Visitor<'de> for Slots<'_> {
                    type Value = ();

                    fn expecting(
                        &self,
                        f: &mut ::core::fmt::Formatter<'_>,
                    ) -> ::core::fmt::Result {
                        f.write_str(::core::concat!("compound ", ::core::stringify!($ty)))
                    }

                    fn visit_map<A: MapAccess<'de>>(
                        self,
                        mut map: A,
                    ) -> ::core::result::Result<(), A::Error> {
                        let place = self.0;
                        while let ::core::option::Option::Some(key) =
                            map.next_key::<::std::string::String>()?
                        {
                            $(
                                if key == $crate::__slot_name!($field $(, $name)?) {
                                    map.next_value_seed($crate::slot::InPlace(&mut place.$field))?;
                                    continue;
                                }
                            )*
                            return ::core::result::Result::Err(A::Error::unknown_field(&key, FIELDS));
                        }
                        ::core::result::Result::Ok(())
                    }
                }

                deserializer.deserialize_struct(::core::stringify!($ty), FIELDS, Slots(place))
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __slot_name {
    ($field:ident) => {
        ::core::stringify!($field)
    };
    ($field:ident, $name:literal) => {
        $name
    };
}

#[cfg(test)]
mod tests {
    use crate::{decode, from_slice, Compression, Error, Tag};

    #[derive(Debug, Default, PartialEq)]
    struct Pos {
        x: i32,
        y: i32,
    }

    impl_slots!(Pos { x, y });

    #[derive(Debug, Default, PartialEq)]
    struct Entity {
        id: String,
        pos: Pos,
        tags: Vec<i16>,
    }

    impl_slots!(Entity { id = "Id", pos = "Pos", tags = "Tags" });

    fn int(name: &[u8], v: i32) -> Vec<u8> {
        let mut out = vec![0x03, 0x00, name.len() as u8];
        out.extend_from_slice(name);
        out.extend_from_slice(&v.to_be_bytes());
        out
    }

    fn compound(entries: &[Vec<u8>]) -> Vec<u8> {
        let mut out = vec![0x0a, 0x00, 0x00];
        for entry in entries {
            out.extend_from_slice(entry);
        }
        out.push(0x00);
        out
    }

    #[test]
    fn test_absent_fields_keep_values() {
        let mut pos = Pos { x: 5, y: 6 };
        decode(Compression::None, &compound(&[])[..], &mut pos).unwrap();
        assert_eq!(pos, Pos { x: 5, y: 6 });

        decode(Compression::None, &compound(&[int(b"y", -1)])[..], &mut pos).unwrap();
        assert_eq!(pos, Pos { x: 5, y: -1 });
    }

    #[test]
    fn test_repeated_name_last_wins() {
        let data = compound(&[int(b"x", 1), int(b"x", 2), int(b"y", 3)]);
        let pos: Pos = from_slice(Compression::None, &data).unwrap();
        assert_eq!(pos, Pos { x: 2, y: 3 });
    }

    #[test]
    fn test_owned_decode_starts_from_default() {
        let pos: Pos = from_slice(Compression::None, &compound(&[int(b"x", 9)])).unwrap();
        assert_eq!(pos, Pos { x: 9, y: 0 });
    }

    #[test]
    fn test_unregistered_name_rejected() {
        let data = compound(&[int(b"z", 1)]);
        assert_eq!(
            from_slice::<Pos>(Compression::None, &data),
            Err(Error::UnhandledField {
                tag: Tag::Int,
                name: "z".into()
            })
        );
    }

    #[test]
    fn test_nested_struct_updated_in_place() {
        // { "Pos": { "x": 10 }, "Tags": List<Short>[1] { 4 } }
        let mut data = vec![0x0a, 0x00, 0x00];
        data.extend_from_slice(&[0x0a, 0x00, 0x03, b'P', b'o', b's']);
        data.extend_from_slice(&int(b"x", 10));
        data.push(0x00);
        data.extend_from_slice(&[0x09, 0x00, 0x04, b'T', b'a', b'g', b's', 0x02, 0, 0, 0, 1, 0, 4]);
        data.push(0x00);

        let mut entity = Entity {
            id: "zombie".into(),
            pos: Pos { x: 1, y: 2 },
            tags: vec![7, 7, 7],
        };
        decode(Compression::None, &data[..], &mut entity).unwrap();
        assert_eq!(
            entity,
            Entity {
                id: "zombie".into(),
                pos: Pos { x: 10, y: 2 },
                tags: vec![4],
            }
        );
    }

    #[test]
    fn test_wrong_tag_for_struct() {
        let data = int(b"", 1);
        assert_eq!(
            from_slice::<Pos>(Compression::None, &data),
            Err(Error::Mismatch {
                tag: Tag::Int,
                kind: "Pos"
            })
        );
    }
}
