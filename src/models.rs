use num_enum::{FromPrimitive, IntoPrimitive};

/// OpenEXR magic number, stored little-endian in the first four bytes.
pub const MAGIC: i32 = 20_000_630;

/// Size of the (y-coordinate, data size) prolog preceding every scan line.
pub const SCAN_LINE_PROLOG: usize = 8;

/// Channel element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive)]
#[repr(i32)]
pub enum PixelType {
    Uint = 0,
    Half = 1,
    Float = 2,

    #[num_enum(default)]
    Unknown = -1,
}

impl PixelType {
    pub fn byte_size(&self) -> usize {
        match self {
            PixelType::Uint | PixelType::Float => 4,
            PixelType::Half => 2,
            PixelType::Unknown => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PixelType::Uint => "uint",
            PixelType::Half => "half",
            PixelType::Float => "float",
            PixelType::Unknown => "unknown",
        }
    }
}

/// Scan line compression, as stored in the `compression` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Compression {
    None = 0,
    Rle = 1,
    Zips = 2,
    Zip = 3,
    Piz = 4,
    Pxr24 = 5,
    B44 = 6,
    B44a = 7,
    Dwaa = 8,
    Dwab = 9,

    #[num_enum(default)]
    Unknown = 0xFF,
}

/// One entry of the `channels` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDescriptor {
    pub name: String,
    pub pixel_type: PixelType,
    /// Position in on-disk channel order.
    pub index: usize,
    pub p_linear: bool,
    pub x_sampling: i32,
    pub y_sampling: i32,
}

/// The `dataWindow` attribute (inclusive bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataWindow {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl DataWindow {
    pub fn height(&self) -> i64 {
        self.y_max as i64 - self.y_min as i64 + 1
    }

    pub fn width(&self) -> i64 {
        self.x_max as i64 - self.x_min as i64 + 1
    }
}

/// Geometry of the scan line block, derived from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLayout {
    pub height: usize,
    pub channels: usize,
    pub width: usize,
    /// Shared channel type; `None` when the file declares no channels.
    pub pixel_type: Option<PixelType>,
    pub element_size: usize,
    /// Bytes from one scan line to the next, prolog included.
    pub scan_line_stride: usize,
    /// File position of the first scan line.
    pub first_offset: u64,
    pub data_window: DataWindow,
}

impl ImageLayout {
    /// Logical shape in (rows, channels, columns) order.
    pub fn shape(&self) -> [usize; 3] {
        [self.height, self.channels, self.width]
    }

    pub fn num_elements(&self) -> usize {
        self.height * self.channels * self.width
    }

    /// Total size of all scan lines on disk.
    pub fn body_len(&self) -> usize {
        self.scan_line_stride * self.height
    }

    /// Byte strides over the body for (rows, channels, columns).
    pub fn strides(&self) -> [isize; 3] {
        [
            self.scan_line_stride as isize,
            (self.element_size * self.width) as isize,
            self.element_size as isize,
        ]
    }
}
