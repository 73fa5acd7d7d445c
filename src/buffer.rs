//! The scan line block and its (rows, channels, columns) view.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;
use tracing::debug;

use crate::error::Error;
use crate::models::{ImageLayout, SCAN_LINE_PROLOG};
use crate::options::ReadOptions;
use crate::view::ChannelView;

/// Where the scan line bytes live.
enum Storage {
    /// Read into memory with a single bulk read.
    Owned(Vec<u8>),
    /// Zero-copy range of a file mapping.
    MmapRange { mmap: Mmap, offset: usize },
}

/// Sole owner of the raw scan line bytes of an image.
///
/// Scan lines share one element type, so consecutive lines sit a constant
/// stride apart and the whole block reads as an (H, C, W) array with byte
/// strides `(scan_line_stride, element_size * W, element_size)`.
pub struct ImageBuffer {
    storage: Storage,
    layout: ImageLayout,
}

impl std::fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.storage {
            Storage::Owned(_) => "owned",
            Storage::MmapRange { .. } => "mmap",
        };
        f.debug_struct("ImageBuffer")
            .field("storage", &kind)
            .field("len", &self.as_bytes().len())
            .field("layout", &self.layout)
            .finish()
    }
}

impl ImageBuffer {
    /// Seeks to the first scan line and reads the whole block at once.
    pub fn read<R: Read + Seek>(
        reader: &mut R,
        layout: ImageLayout,
        options: &ReadOptions,
    ) -> Result<Self, Error> {
        if layout.num_elements() == 0 {
            return Ok(Self::empty(layout));
        }
        let len = checked_body_len(&layout, options)?;

        // Check the source length before allocating.
        let source_len = reader.seek(SeekFrom::End(0))?;
        check_first_offset(layout.first_offset, source_len)?;
        let remaining = source_len - layout.first_offset;
        if remaining < len as u64 {
            return Err(Error::TruncatedInput {
                requested: len,
                remaining: remaining as usize,
            });
        }

        reader.seek(SeekFrom::Start(layout.first_offset))?;
        let mut data = vec![0u8; len];
        reader.read_exact(&mut data).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => Error::TruncatedInput {
                requested: len,
                remaining: 0,
            },
            _ => Error::Io(e),
        })?;
        debug!(bytes = len, offset = layout.first_offset, "read scan line block");

        Self::finish(Storage::Owned(data), layout, options)
    }

    /// Copies the scan line block out of an in-memory file.
    pub fn from_bytes(
        bytes: &[u8],
        layout: ImageLayout,
        options: &ReadOptions,
    ) -> Result<Self, Error> {
        if layout.num_elements() == 0 {
            return Ok(Self::empty(layout));
        }
        let (offset, len) = body_range(bytes.len(), &layout, options)?;
        debug!(bytes = len, offset, "copied scan line block");
        Self::finish(
            Storage::Owned(bytes[offset..offset + len].to_vec()),
            layout,
            options,
        )
    }

    /// Borrows the scan line block from a file mapping without copying.
    pub fn from_mmap(mmap: Mmap, layout: ImageLayout, options: &ReadOptions) -> Result<Self, Error> {
        if layout.num_elements() == 0 {
            return Ok(Self::empty(layout));
        }
        let (offset, len) = body_range(mmap.len(), &layout, options)?;
        debug!(bytes = len, offset, "mapped scan line block");
        Self::finish(Storage::MmapRange { mmap, offset }, layout, options)
    }

    fn empty(layout: ImageLayout) -> Self {
        debug!(shape = ?layout.shape(), "zero-sized image, skipping scan line read");
        Self {
            storage: Storage::Owned(Vec::new()),
            layout,
        }
    }

    fn finish(storage: Storage, layout: ImageLayout, options: &ReadOptions) -> Result<Self, Error> {
        let buffer = Self { storage, layout };
        if options.verify_scan_lines {
            buffer.verify_scan_lines()?;
        }
        Ok(buffer)
    }

    pub fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    /// The raw scan line block, per-line prologs included.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(data) => data.as_slice(),
            Storage::MmapRange { mmap, offset } => {
                &mmap[*offset..*offset + self.layout.body_len()]
            }
        }
    }

    /// The full image as a (H, C, W) view aliasing the block.
    pub fn view(&self) -> ChannelView<'_> {
        let data = self.as_bytes();
        // Element [0, 0, 0] sits right after the first scan line prolog;
        // the row stride skips every later prolog.
        let offset = if data.is_empty() { 0 } else { SCAN_LINE_PROLOG };
        ChannelView::new(
            data,
            offset,
            self.layout.shape(),
            self.layout.strides(),
            self.layout.pixel_type,
            self.layout.element_size,
        )
    }

    /// Checks each scan line prolog against the expected y and data size.
    pub fn verify_scan_lines(&self) -> Result<(), Error> {
        let data = self.as_bytes();
        let stride = self.layout.scan_line_stride;
        let expected_size = stride - SCAN_LINE_PROLOG;
        for (row, line) in data.chunks_exact(stride).enumerate() {
            let y = LittleEndian::read_i32(&line[..4]);
            let size = LittleEndian::read_i32(&line[4..8]);
            let expected_y = self.layout.data_window.y_min as i64 + row as i64;
            if y as i64 != expected_y {
                return Err(Error::MalformedHeader(format!(
                    "scan line {} has y-coordinate {}, expected {}",
                    row, y, expected_y
                )));
            }
            if usize::try_from(size).ok() != Some(expected_size) {
                return Err(Error::MalformedHeader(format!(
                    "scan line {} declares {} data bytes, expected {}",
                    row, size, expected_size
                )));
            }
        }
        Ok(())
    }
}

fn checked_body_len(layout: &ImageLayout, options: &ReadOptions) -> Result<usize, Error> {
    let len = layout.body_len();
    if let Some(limit) = options.max_image_bytes {
        if len as u64 > limit {
            return Err(Error::LimitExceeded {
                what: "scan line block size",
                actual: len as u64,
                limit,
            });
        }
    }
    Ok(len)
}

/// A first scan line past the end of the file means the offset table itself
/// is bogus, typically a terminator where the first offset should be.
fn check_first_offset(first_offset: u64, source_len: u64) -> Result<(), Error> {
    if first_offset > source_len {
        return Err(Error::MalformedHeader(format!(
            "first scan line offset {} is past the end of the file ({} bytes)",
            first_offset, source_len
        )));
    }
    Ok(())
}

fn body_range(
    source_len: usize,
    layout: &ImageLayout,
    options: &ReadOptions,
) -> Result<(usize, usize), Error> {
    let len = checked_body_len(layout, options)?;
    check_first_offset(layout.first_offset, source_len as u64)?;
    let offset = usize::try_from(layout.first_offset).unwrap_or(usize::MAX);
    let remaining = source_len.saturating_sub(offset);
    if remaining < len {
        return Err(Error::TruncatedInput {
            requested: len,
            remaining,
        });
    }
    Ok((offset, len))
}
