//! Header attribute table.
//!
//! An OpenEXR header is a sequence of `(name, type, size, payload)` records
//! terminated by a single zero byte. Only three attributes are decoded here:
//! `channels`, `dataWindow` and `compression`. Everything else is kept as
//! raw bytes for callers that want to inspect it.

use std::collections::BTreeMap;
use std::collections::btree_map;

use tracing::trace;

use crate::cursor::ByteCursor;
use crate::error::Error;
use crate::models::{ChannelDescriptor, Compression, DataWindow, PixelType};

/// A single raw header attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRecord {
    pub name: String,
    pub type_name: String,
    pub size: usize,
    pub data: Vec<u8>,
}

/// Header attributes keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeTable {
    records: BTreeMap<String, AttributeRecord>,
}

impl AttributeTable {
    /// Reads attribute records until the terminating zero byte.
    ///
    /// A duplicated name keeps the record that appears last in the header.
    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self, Error> {
        let mut records = BTreeMap::new();
        loop {
            if cursor.peek()? == 0 {
                cursor.advance(1)?;
                break;
            }
            let name = cursor.read_cstring()?;
            let type_name = cursor.read_cstring()?;
            let size = cursor.read_i32_le()?;
            let size = usize::try_from(size).map_err(|_| {
                Error::MalformedHeader(format!(
                    "attribute '{}' declares negative size {}",
                    name, size
                ))
            })?;
            if size > cursor.remaining() {
                return Err(Error::MalformedHeader(format!(
                    "attribute '{}' declares {} bytes, only {} remain in header region",
                    name,
                    size,
                    cursor.remaining()
                )));
            }
            let data = cursor.read(size)?.to_vec();
            trace!(name = %name, type_name = %type_name, size, "header attribute");
            records.insert(
                name.clone(),
                AttributeRecord {
                    name,
                    type_name,
                    size,
                    data,
                },
            );
        }
        Ok(Self { records })
    }

    pub fn get(&self, name: &str) -> Option<&AttributeRecord> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in name order.
    pub fn iter(&self) -> btree_map::Values<'_, String, AttributeRecord> {
        self.records.values()
    }

    fn require(&self, name: &str) -> Result<&AttributeRecord, Error> {
        self.get(name)
            .ok_or_else(|| Error::MalformedHeader(format!("missing '{}' attribute", name)))
    }

    fn require_typed(&self, name: &str, type_name: &str) -> Result<&AttributeRecord, Error> {
        let attr = self.require(name)?;
        if attr.type_name != type_name {
            return Err(Error::MalformedHeader(format!(
                "attribute '{}' has type '{}', expected '{}'",
                name, attr.type_name, type_name
            )));
        }
        Ok(attr)
    }

    /// Decodes the `channels` attribute (type `chlist`) in on-disk order.
    pub fn channels(&self) -> Result<Vec<ChannelDescriptor>, Error> {
        let attr = self.require_typed("channels", "chlist")?;
        let mut cursor = ByteCursor::new(&attr.data);
        let mut channels: Vec<ChannelDescriptor> = Vec::new();

        while cursor.remaining() > 0 && cursor.peek()? != 0 {
            let name = cursor.read_cstring()?;
            let code = cursor.read_i32_le()?;
            let pixel_type = match PixelType::from(code) {
                PixelType::Unknown => return Err(Error::UnsupportedPixelType(code)),
                known => known,
            };
            let p_linear = cursor.read_u8()? != 0;
            cursor.advance(3)?; // reserved
            let x_sampling = cursor.read_i32_le()?;
            let y_sampling = cursor.read_i32_le()?;

            if channels.iter().any(|c| c.name == name) {
                return Err(Error::MalformedHeader(format!(
                    "duplicate channel name '{}'",
                    name
                )));
            }
            channels.push(ChannelDescriptor {
                name,
                pixel_type,
                index: channels.len(),
                p_linear,
                x_sampling,
                y_sampling,
            });
        }
        Ok(channels)
    }

    /// Decodes the `dataWindow` attribute (type `box2i`).
    pub fn data_window(&self) -> Result<DataWindow, Error> {
        let attr = self.require_typed("dataWindow", "box2i")?;
        if attr.data.len() < 16 {
            return Err(Error::MalformedHeader(format!(
                "dataWindow payload is {} bytes, expected 16",
                attr.data.len()
            )));
        }
        let mut cursor = ByteCursor::new(&attr.data);
        let window = DataWindow {
            x_min: cursor.read_i32_le()?,
            y_min: cursor.read_i32_le()?,
            x_max: cursor.read_i32_le()?,
            y_max: cursor.read_i32_le()?,
        };
        if window.height() <= 0 || window.width() <= 0 {
            return Err(Error::MalformedHeader(format!(
                "dataWindow {:?} has non-positive extent",
                window
            )));
        }
        Ok(window)
    }

    /// Reads the first byte of the `compression` attribute.
    pub fn compression_mode(&self) -> Result<Compression, Error> {
        let attr = self.require("compression")?;
        let code = attr
            .data
            .first()
            .ok_or_else(|| Error::MalformedHeader("empty 'compression' attribute".into()))?;
        Ok(Compression::from(*code))
    }
}
