//! Header validation and scan line geometry.

use tracing::debug;

use crate::attributes::AttributeTable;
use crate::cursor::ByteCursor;
use crate::error::Error;
use crate::models::{
    ChannelDescriptor, Compression, ImageLayout, MAGIC, PixelType, SCAN_LINE_PROLOG,
};

/// Version flag for files with attribute names longer than 31 bytes.
pub const LONG_NAMES_FLAG: u8 = 0x04;

/// Everything derived from the header region of a file.
#[derive(Debug, Clone)]
pub struct Header {
    pub version: u8,
    pub flags: [u8; 3],
    pub attributes: AttributeTable,
    pub channels: Vec<ChannelDescriptor>,
    pub layout: ImageLayout,
}

/// Parses and validates the header region, computing the image layout.
///
/// Only single-part, uncompressed scan line files where all channels share
/// one pixel type are accepted. The cursor is left after the first entry of
/// the chunk offset table.
pub fn resolve(cursor: &mut ByteCursor<'_>) -> Result<Header, Error> {
    let magic = cursor.read_i32_le()?;
    if magic != MAGIC {
        return Err(Error::NotThisFormat { found: magic });
    }
    let version = cursor.read_u8()?;
    let flags: [u8; 3] = [cursor.read_u8()?, cursor.read_u8()?, cursor.read_u8()?];
    if (flags[0] & !LONG_NAMES_FLAG) != 0 {
        return Err(Error::UnsupportedVariant(format!(
            "version flags 0x{:02x} (tiled, deep or multi-part), expected a single-part scan line file",
            flags[0]
        )));
    }
    if flags[1] != 0 || flags[2] != 0 {
        return Err(Error::UnsupportedVariant(format!(
            "unused version flag bytes are not zero: {:?}",
            &flags[1..]
        )));
    }
    debug!(version, flags = flags[0], "OpenEXR prolog");

    let attributes = AttributeTable::parse(cursor)?;
    debug!(count = attributes.len(), "parsed header attributes");

    let compression = attributes.compression_mode()?;
    if compression != Compression::None {
        return Err(Error::UnsupportedVariant(format!(
            "compression {:?} (code {}), only uncompressed files are supported",
            compression,
            u8::from(compression)
        )));
    }

    let channels = attributes.channels()?;
    let pixel_type = shared_pixel_type(&channels)?;

    let window = attributes.data_window()?;
    let height = dimension(window.height(), "height")?;
    let width = dimension(window.width(), "width")?;
    let element_size = pixel_type.map(|p| p.byte_size()).unwrap_or(0);

    let first_offset = read_first_offset(cursor, height)?;

    let scan_line_stride = element_size
        .checked_mul(width)
        .and_then(|v| v.checked_mul(channels.len()))
        .and_then(|v| v.checked_add(SCAN_LINE_PROLOG))
        .ok_or_else(|| Error::MalformedHeader("scan line size overflows".into()))?;
    scan_line_stride
        .checked_mul(height)
        .ok_or_else(|| Error::MalformedHeader("image size overflows".into()))?;

    let layout = ImageLayout {
        height,
        channels: channels.len(),
        width,
        pixel_type,
        element_size,
        scan_line_stride,
        first_offset,
        data_window: window,
    };
    debug!(
        shape = ?layout.shape(),
        pixel_type = pixel_type.map(|p| p.as_str()).unwrap_or("none"),
        scan_line_stride,
        first_offset,
        "resolved scan line layout"
    );

    Ok(Header {
        version,
        flags,
        attributes,
        channels,
        layout,
    })
}

fn shared_pixel_type(channels: &[ChannelDescriptor]) -> Result<Option<PixelType>, Error> {
    let Some(first) = channels.first() else {
        return Ok(None);
    };
    if let Some(other) = channels.iter().find(|c| c.pixel_type != first.pixel_type) {
        return Err(Error::UnsupportedVariant(format!(
            "mixed pixel types: '{}' is {}, '{}' is {}",
            first.name,
            first.pixel_type.as_str(),
            other.name,
            other.pixel_type.as_str()
        )));
    }
    Ok(Some(first.pixel_type))
}

fn dimension(extent: i64, what: &str) -> Result<usize, Error> {
    usize::try_from(extent)
        .map_err(|_| Error::MalformedHeader(format!("data window {} {} out of range", what, extent)))
}

/// Reads the first chunk offset. Uncompressed files store one chunk per
/// scan line, so the table holds `height` entries and the first scan line
/// must start after it.
fn read_first_offset(cursor: &mut ByteCursor<'_>, height: usize) -> Result<u64, Error> {
    if cursor.remaining() < 8 {
        return Err(Error::MalformedHeader("chunk offset table is empty".into()));
    }
    let table_end = (cursor.position() as u64).saturating_add((height as u64).saturating_mul(8));
    let offset = cursor.read_u64_le()?;
    if offset < table_end {
        return Err(Error::MalformedHeader(format!(
            "first scan line offset {} lies inside the header (offset table ends at {})",
            offset, table_end
        )));
    }
    Ok(offset)
}
