//! Minimal OpenEXR reader for single-part, uncompressed scan line files.
//!
//! Only files where every channel shares one pixel type are supported. That
//! restriction gives every scan line the same size, so the whole scan line
//! block can be read at once and addressed as an (H, C, W) array without
//! copying. [`ExrReader::select`] picks channels out of that array, returning
//! views whenever the requested channels are evenly spaced.
//!
//! ```no_run
//! use minexr::ExrReader;
//!
//! let reader = ExrReader::open("render0001.exr")?;
//! let (h, c, w) = reader.shape();
//! let rgba = reader.select(&["Color.R", "Color.G", "Color.B", "Color.A"], true)?;
//! assert_eq!(rgba.shape(), [h, w, 4]);
//! let pixels: Vec<f32> = rgba.to_f32_vec();
//! # let _ = (c, pixels);
//! # Ok::<(), minexr::Error>(())
//! ```

pub mod attributes;
pub mod buffer;
pub mod cursor;
pub mod error;
pub mod layout;
pub mod models;
pub mod options;
pub mod reader;
pub mod select;
pub mod view;

pub use attributes::{AttributeRecord, AttributeTable};
pub use buffer::ImageBuffer;
pub use cursor::ByteCursor;
pub use error::Error;
pub use layout::Header;
pub use models::{ChannelDescriptor, Compression, DataWindow, ImageLayout, PixelType};
pub use options::ReadOptions;
pub use reader::{ExrReader, load};
pub use select::Selection;
pub use view::{ChannelArray, ChannelView, Sample};
