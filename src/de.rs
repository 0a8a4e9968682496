use serde::{
    de::{
        self,
        value::{BorrowedStrDeserializer, Error as ValueError},
        Deserialize, Deserializer, Error as DeError, Visitor,
    },
    forward_to_deserialize_any,
};

use crate::{Params, Value};

impl Params {
    /// Deserializes the parameters into `T`.
    ///
    /// Structs and maps are filled by parameter name, tuples and sequences by position, and any
    /// other type is read from the only parameter. Text values are parsed when a number is asked
    /// for; numbers are formatted when text is asked for.
    ///
    /// # Examples
    /// ```
    /// use route_rules::Rule;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Post<'a> {
    ///     user: u32,
    ///     slug: &'a str,
    /// }
    ///
    /// let route = Rule::compile("/u/<user:int>/<slug>").unwrap();
    /// let params = route.match_path("/u/7/hello").unwrap();
    /// let post: Post<'_> = params.load().unwrap();
    /// assert_eq!(post.user, 7);
    /// assert_eq!(post.slug, "hello");
    /// ```
    pub fn load<'de, T>(&'de self) -> Result<T, ValueError>
    where
        T: Deserialize<'de>,
    {
        T::deserialize(ParamsDeserializer { params: self })
    }
}

macro_rules! unsupported_type {
    ($trait_fn:ident, $name:expr) => {
        fn $trait_fn<V>(self, _: V) -> Result<V::Value, Self::Error>
        where
            V: Visitor<'de>,
        {
            Err(de::Error::custom(concat!("unsupported type: ", $name)))
        }
    };
}

macro_rules! parse_single_value {
    ($trait_fn:ident) => {
        fn $trait_fn<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: Visitor<'de>,
        {
            if self.params.len() != 1 {
                Err(ValueError::custom(format!(
                    "wrong number of parameters: {} expected 1",
                    self.params.len()
                )))
            } else {
                ValueDeserializer {
                    value: &self.params.items()[0].1,
                }
                .$trait_fn(visitor)
            }
        }
    };
}

struct ParamsDeserializer<'de> {
    params: &'de Params,
}

impl<'de> Deserializer<'de> for ParamsDeserializer<'de> {
    type Error = ValueError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(ParamsMap {
            params: self.params.items().iter(),
            current: None,
        })
    }

    fn deserialize_struct<V>(
        self,
        _: &'static str,
        _: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.params.len() != len {
            Err(ValueError::custom(format!(
                "wrong number of parameters: {} expected {}",
                self.params.len(),
                len
            )))
        } else {
            self.deserialize_seq(visitor)
        }
    }

    fn deserialize_tuple_struct<V>(
        self,
        _: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_seq(ParamsSeq {
            params: self.params.items().iter(),
        })
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.params.len() != 1 {
            return Err(ValueError::custom(format!(
                "wrong number of parameters: {} expected 1",
                self.params.len()
            )));
        }

        ValueDeserializer {
            value: &self.params.items()[0].1,
        }
        .deserialize_enum(name, variants, visitor)
    }

    unsupported_type!(deserialize_identifier, "identifier");
    unsupported_type!(deserialize_bytes, "bytes");
    unsupported_type!(deserialize_byte_buf, "byte buffer");

    parse_single_value!(deserialize_bool);
    parse_single_value!(deserialize_i8);
    parse_single_value!(deserialize_i16);
    parse_single_value!(deserialize_i32);
    parse_single_value!(deserialize_i64);
    parse_single_value!(deserialize_u8);
    parse_single_value!(deserialize_u16);
    parse_single_value!(deserialize_u32);
    parse_single_value!(deserialize_u64);
    parse_single_value!(deserialize_f32);
    parse_single_value!(deserialize_f64);
    parse_single_value!(deserialize_char);
    parse_single_value!(deserialize_str);
    parse_single_value!(deserialize_string);
    parse_single_value!(deserialize_option);

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct ParamsMap<'de> {
    params: std::slice::Iter<'de, (String, Value)>,
    current: Option<&'de Value>,
}

impl<'de> de::MapAccess<'de> for ParamsMap<'de> {
    type Error = ValueError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.params.next() {
            Some((name, value)) => {
                self.current = Some(value);
                seed.deserialize(BorrowedStrDeserializer::new(name.as_str()))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.current.take() {
            Some(value) => seed.deserialize(ValueDeserializer { value }),
            None => Err(ValueError::custom("unexpected item")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.params.len())
    }
}

struct ParamsSeq<'de> {
    params: std::slice::Iter<'de, (String, Value)>,
}

impl<'de> de::SeqAccess<'de> for ParamsSeq<'de> {
    type Error = ValueError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.params.next() {
            Some((_, value)) => seed.deserialize(ValueDeserializer { value }).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.params.len())
    }
}

macro_rules! parse_value {
    ($trait_fn:ident, $visit_fn:ident, $tp:tt) => {
        fn $trait_fn<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: Visitor<'de>,
        {
            let value = self.value;

            match value {
                Value::Str(text) => {
                    let v = text.parse().map_err(|_| {
                        ValueError::custom(format!("can not parse {:?} to a {}", text, $tp))
                    })?;

                    visitor.$visit_fn(v)
                }
                _ => self.deserialize_any(visitor),
            }
        }
    };
}

struct ValueDeserializer<'de> {
    value: &'de Value,
}

impl<'de> Deserializer<'de> for ValueDeserializer<'de> {
    type Error = ValueError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let value = self.value;

        match value {
            Value::Str(text) => visitor.visit_borrowed_str(text),
            Value::Int(val) => visitor.visit_i64(*val),
            Value::Float(val) => visitor.visit_f64(*val),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let value = self.value;

        match value {
            Value::Str(text) => visitor.visit_borrowed_str(text),
            other => visitor.visit_string(other.to_string()),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _: &'static str,
        _: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let value = self.value;

        match value {
            Value::Str(text) => visitor.visit_enum(BorrowedStrDeserializer::new(text.as_str())),
            other => Err(ValueError::custom(format!(
                "can not use {} as an enum variant",
                other
            ))),
        }
    }

    parse_value!(deserialize_bool, visit_bool, "bool");
    parse_value!(deserialize_i8, visit_i8, "i8");
    parse_value!(deserialize_i16, visit_i16, "i16");
    parse_value!(deserialize_i32, visit_i32, "i32");
    parse_value!(deserialize_i64, visit_i64, "i64");
    parse_value!(deserialize_u8, visit_u8, "u8");
    parse_value!(deserialize_u16, visit_u16, "u16");
    parse_value!(deserialize_u32, visit_u32, "u32");
    parse_value!(deserialize_u64, visit_u64, "u64");
    parse_value!(deserialize_f32, visit_f32, "f32");
    parse_value!(deserialize_f64, visit_f64, "f64");
    parse_value!(deserialize_char, visit_char, "char");

    forward_to_deserialize_any! {
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct identifier ignored_any
    }
}
