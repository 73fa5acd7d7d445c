use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use memmap2::MmapOptions;
use tracing::debug;

use crate::attributes::AttributeTable;
use crate::buffer::ImageBuffer;
use crate::cursor::ByteCursor;
use crate::error::Error;
use crate::layout::{self, Header};
use crate::models::{ChannelDescriptor, ImageLayout};
use crate::options::ReadOptions;
use crate::select::{self, Selection};
use crate::view::ChannelView;

/// A parsed single-part, uncompressed scan line OpenEXR image.
///
/// Opening reads the header and then the whole scan line block in one go.
/// [`ExrReader::select`] extracts channels from that block, returning views
/// into it whenever the requested channel order allows.
#[derive(Debug)]
pub struct ExrReader {
    header: Header,
    channel_map: BTreeMap<String, usize>,
    buffer: ImageBuffer,
}

impl ExrReader {
    /// Opens an OpenEXR file from the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::open_with_options(path, ReadOptions::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: ReadOptions) -> Result<Self, Error> {
        let file = File::open(path)?;
        Self::with_options(BufReader::new(file), options)
    }

    /// Opens an OpenEXR file using memory mapping.
    ///
    /// The scan line block is not copied; views borrow the mapping.
    pub fn open_mmap(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::open_mmap_with_options(path, ReadOptions::default())
    }

    pub fn open_mmap_with_options(
        path: impl AsRef<Path>,
        options: ReadOptions,
    ) -> Result<Self, Error> {
        let file = File::open(path)?;
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        let header = parse_header(header_region(&mmap, &options))?;
        let buffer = ImageBuffer::from_mmap(mmap, header.layout, &options)?;
        Ok(Self::assemble(header, buffer))
    }

    /// Parses an in-memory file; the scan line block is copied once.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_bytes_with_options(bytes, ReadOptions::default())
    }

    pub fn from_bytes_with_options(bytes: &[u8], options: ReadOptions) -> Result<Self, Error> {
        let header = parse_header(header_region(bytes, &options))?;
        let buffer = ImageBuffer::from_bytes(bytes, header.layout, &options)?;
        Ok(Self::assemble(header, buffer))
    }

    /// Parses from a `Read + Seek` source positioned anywhere.
    pub fn new<R: Read + Seek>(reader: R) -> Result<Self, Error> {
        Self::with_options(reader, ReadOptions::default())
    }

    pub fn with_options<R: Read + Seek>(mut reader: R, options: ReadOptions) -> Result<Self, Error> {
        reader.seek(SeekFrom::Start(0))?;
        let mut region = Vec::new();
        reader
            .by_ref()
            .take(options.header_limit as u64)
            .read_to_end(&mut region)?;
        debug!(bytes = region.len(), "read header region");

        let header = parse_header(&region)?;
        let buffer = ImageBuffer::read(&mut reader, header.layout, &options)?;
        Ok(Self::assemble(header, buffer))
    }

    fn assemble(header: Header, buffer: ImageBuffer) -> Self {
        let channel_map = header
            .channels
            .iter()
            .map(|c| (c.name.clone(), c.index))
            .collect();
        Self {
            header,
            channel_map,
            buffer,
        }
    }

    /// Image shape in (rows, channels, columns) order.
    pub fn shape(&self) -> (usize, usize, usize) {
        let [h, c, w] = self.header.layout.shape();
        (h, c, w)
    }

    /// Channel names in on-disk order.
    pub fn channel_names(&self) -> Vec<&str> {
        self.header.channels.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn channels(&self) -> &[ChannelDescriptor] {
        &self.header.channels
    }

    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.channel_map.get(name).copied()
    }

    pub fn attributes(&self) -> &AttributeTable {
        &self.header.attributes
    }

    pub fn layout(&self) -> &ImageLayout {
        &self.header.layout
    }

    pub fn version(&self) -> u8 {
        self.header.version
    }

    pub fn buffer(&self) -> &ImageBuffer {
        &self.buffer
    }

    /// The full (H, C, W) image as a view.
    pub fn image(&self) -> ChannelView<'_> {
        self.buffer.view()
    }

    /// Returns an image composed only of the given channels, in that order.
    ///
    /// Single channels and channels with a constant index step (such as
    /// `R, G, B` or `B, G, R`) are views into the image buffer; other
    /// orders are copied. With `channels_last` the result is (H, W, C).
    pub fn select(&self, names: &[&str], channels_last: bool) -> Result<Selection<'_>, Error> {
        let indices = select::channel_indices(names, &self.channel_map)?;
        Ok(select::select(self.buffer.view(), &indices, channels_last))
    }
}

/// Parses an OpenEXR image from a `Read + Seek` source.
pub fn load<R: Read + Seek>(reader: R) -> Result<ExrReader, Error> {
    ExrReader::new(reader)
}

fn header_region<'a>(bytes: &'a [u8], options: &ReadOptions) -> &'a [u8] {
    &bytes[..bytes.len().min(options.header_limit)]
}

fn parse_header(region: &[u8]) -> Result<Header, Error> {
    let mut cursor = ByteCursor::new(region);
    layout::resolve(&mut cursor)
}
