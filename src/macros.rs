// (c) Copyright 2025 Helsing GmbH. All rights reserved.
/// Convenience macro for creating [`Document`](crate::Document) literals.
///
/// Values are anything with a `From` conversion into
/// [`Value`](crate::Value); brackets nest as arrays and braces as
/// sub-documents. Wrap other expressions in parentheses.
///
/// ```rust
/// # use docmap::document;
/// let doc = document! {
///     "name" => "John",
///     "age" => 28,
///     "tags" => ["a", "b"],
///     "address" => {
///         "city" => "Lisbon"
///     }
/// };
/// assert_eq!(doc["name"], "John");
/// assert_eq!(doc["address"].as_document().unwrap()["city"], "Lisbon");
/// ```
#[macro_export]
macro_rules! document {
    () => { $crate::Document::new() };

    ($($key:literal => $value:tt),* $(,)?) => {{
        let mut doc = $crate::Document::new();
        $( doc.insert($key, $crate::document!(@value $value)); )*
        doc
    }};

    (@value [$($item:tt),* $(,)?]) => {
        $crate::Value::Array(vec![$($crate::document!(@value $item)),*])
    };

    (@value {$($key:literal => $value:tt),* $(,)?}) => {
        $crate::Value::Document($crate::document!($($key => $value),*))
    };

    (@value $expr:expr) => { $crate::Value::from($expr) };
}

/// Defines an enumeration stored as its ordinal.
///
/// Expands to the enum itself plus [`Enumeration`](crate::Enumeration),
/// [`ToValue`](crate::ToValue), and [`FromValue`](crate::FromValue) impls.
/// Members serialize as [`Value::Int32`](crate::Value::Int32) ordinals;
/// deserializing an ordinal no member carries fails with
/// [`MapperError::UnknownOrdinal`](crate::MapperError::UnknownOrdinal).
///
/// ```rust
/// # use docmap::{enumeration, Enumeration, Mapper, Value};
/// enumeration! {
///     pub enum CustomerKind {
///         Person = 0,
///         Company = 1,
///     }
/// }
///
/// let mapper = Mapper::new();
/// assert_eq!(mapper.serialize(&CustomerKind::Company).unwrap(), Value::Int32(1));
/// assert!(mapper.deserialize::<CustomerKind>(Value::Int32(9)).is_err());
/// ```
#[macro_export]
macro_rules! enumeration {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($member:ident = $ordinal:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($member = $ordinal),+
        }

        impl $crate::Enumeration for $name {
            fn ordinal(&self) -> i32 {
                *self as i32
            }

            fn from_ordinal(ordinal: i32) -> Option<Self> {
                match ordinal {
                    $(x if x == $ordinal => Some(Self::$member),)+
                    _ => None,
                }
            }
        }

        impl $crate::ToValue for $name {
            fn to_value(
                &self,
                _mapper: &$crate::Mapper,
            ) -> Result<$crate::Value, $crate::MapperError> {
                Ok($crate::Value::Int32($crate::Enumeration::ordinal(self)))
            }
        }

        impl $crate::FromValue for $name {
            fn from_value(
                value: $crate::Value,
                mapper: &$crate::Mapper,
            ) -> Result<Self, $crate::MapperError> {
                let ordinal: i32 = mapper.deserialize(value)?;
                <$name as $crate::Enumeration>::from_ordinal(ordinal).ok_or(
                    $crate::MapperError::UnknownOrdinal {
                        target: stringify!($name),
                        ordinal,
                    },
                )
            }
        }
    };
}

/// Implements [`ToValue`](crate::ToValue)/[`FromValue`](crate::FromValue)
/// for one or more [`Entity`](crate::Entity) types, so they can nest inside
/// other entities, collections, and maps as sub-documents.
///
/// ```rust
/// # use docmap::{entity_value, Entity, Mapper, TypeBuilder};
/// #[derive(Default, Debug, PartialEq)]
/// struct Address {
///     city: String,
/// }
///
/// impl Entity for Address {
///     fn describe(fields: &mut TypeBuilder<Self>) {
///         fields.field("City", |a| &a.city, |a, v| a.city = v);
///     }
/// }
///
/// entity_value!(Address);
///
/// #[derive(Default)]
/// struct Customer {
///     name: String,
///     address: Address,
/// }
///
/// impl Entity for Customer {
///     fn describe(fields: &mut TypeBuilder<Self>) {
///         fields.field("Name", |c| &c.name, |c, v| c.name = v);
///         fields.field("Address", |c| &c.address, |c, v| c.address = v);
///     }
/// }
///
/// let mapper = Mapper::new();
/// let customer = Customer {
///     name: "John".into(),
///     address: Address { city: "Lisbon".into() },
/// };
/// let doc = mapper.to_document(&customer)?;
/// assert_eq!(doc["Address"].as_document().unwrap()["City"], "Lisbon");
/// # Ok::<(), docmap::MapperError>(())
/// ```
#[macro_export]
macro_rules! entity_value {
    ($($t:ty),+ $(,)?) => {
        $(
            impl $crate::ToValue for $t {
                fn to_value(
                    &self,
                    mapper: &$crate::Mapper,
                ) -> Result<$crate::Value, $crate::MapperError> {
                    mapper.to_document(self).map($crate::Value::Document)
                }
            }

            impl $crate::FromValue for $t {
                fn from_value(
                    value: $crate::Value,
                    mapper: &$crate::Mapper,
                ) -> Result<Self, $crate::MapperError> {
                    match value {
                        $crate::Value::Document(doc) => mapper.to_object(&doc),
                        other => Err($crate::MapperError::UnexpectedKind {
                            expected: "Document",
                            found: other.kind(),
                        }),
                    }
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use crate::{Enumeration, Mapper, MapperError, Value};

    enumeration! {
        enum Suit {
            Hearts = 0,
            Spades = 3,
        }
    }

    #[test]
    fn document_literals_nest() {
        let doc = document! {
            "name" => "John",
            "scores" => [1, 2, 3],
            "nested" => { "inner" => true }
        };
        assert_eq!(doc.len(), 3);
        assert_eq!(
            doc["scores"],
            Value::Array(vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)])
        );
        assert_eq!(doc["nested"].as_document().unwrap()["inner"], true);
    }

    #[test]
    fn empty_document_literal() {
        let doc = document! {};
        assert!(doc.is_empty());
    }

    #[test]
    fn enumerations_roundtrip_by_ordinal() {
        let mapper = Mapper::new();
        assert_eq!(mapper.serialize(&Suit::Spades).unwrap(), Value::Int32(3));
        assert_eq!(
            mapper.deserialize::<Suit>(Value::Int32(3)).unwrap(),
            Suit::Spades
        );
        assert_eq!(Suit::from_ordinal(1), None);
        assert_eq!(
            mapper.deserialize::<Suit>(Value::Int32(1)),
            Err(MapperError::UnknownOrdinal {
                target: "Suit",
                ordinal: 1,
            })
        );
    }

    #[test]
    fn enumerations_accept_the_wider_integer_kind() {
        let mapper = Mapper::new();
        assert_eq!(
            mapper.deserialize::<Suit>(Value::Int64(0)).unwrap(),
            Suit::Hearts
        );
    }
}
