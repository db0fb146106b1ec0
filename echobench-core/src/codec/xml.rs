// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! XML through quick-xml.
//!
//! An array of `SmallItem` is written as
//!
//! ```xml
//! <ArrayOfSmallItem>
//!   <item><id>...</id></item>
//!   <item><id>...</id></item>
//! </ArrayOfSmallItem>
//! ```
//!
//! Record fields become child elements named after the camelCase field.

use serde::{Deserialize, Serialize};

use super::{deserialize_error, serialize_error, Codec, Format};
use crate::error::CodecError;
use crate::payload::Payload;

#[derive(Serialize)]
struct ArrayRef<'a, T> {
    item: &'a [T],
}

#[derive(Deserialize)]
struct ArrayOwned<T> {
    // an empty root element carries no <item> children at all
    #[serde(default = "Vec::new")]
    item: Vec<T>,
}

/// quick-xml codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl XmlCodec {
    /// Root element name for an array of `T`.
    pub fn root_name<T: Payload>() -> String {
        format!("ArrayOf{}", T::TYPE_NAME)
    }
}

impl<T: Payload> Codec<T> for XmlCodec {
    fn format(&self) -> Format {
        Format::Xml
    }

    fn serialize(&self, items: &[T]) -> Result<Vec<u8>, CodecError> {
        let root = Self::root_name::<T>();
        quick_xml::se::to_string_with_root(&root, &ArrayRef { item: items })
            .map(String::into_bytes)
            .map_err(|e| serialize_error(Format::Xml, e))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<T>, CodecError> {
        let text = std::str::from_utf8(bytes).map_err(|e| deserialize_error(Format::Xml, e))?;
        let array: ArrayOwned<T> =
            quick_xml::de::from_str(text).map_err(|e| deserialize_error(Format::Xml, e))?;
        Ok(array.item)
    }
}
