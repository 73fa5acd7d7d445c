//! Strided (rows, channels, columns) views over raw little-endian samples.
//!
//! A [`ChannelView`] never owns pixel bytes. It borrows a byte region and
//! addresses elements through a start offset plus one signed byte stride per
//! axis, so reordering channels or swapping axes only rewrites metadata.

use byteorder::{ByteOrder, LittleEndian};
use half::f16;

use crate::error::Error;
use crate::models::PixelType;

/// Element types that can be decoded from channel samples.
pub trait Sample: Copy + Default + 'static {
    const PIXEL_TYPE: PixelType;
    fn from_le_bytes(bytes: &[u8]) -> Self;
}

impl Sample for u32 {
    const PIXEL_TYPE: PixelType = PixelType::Uint;
    fn from_le_bytes(bytes: &[u8]) -> Self {
        LittleEndian::read_u32(bytes)
    }
}

impl Sample for f32 {
    const PIXEL_TYPE: PixelType = PixelType::Float;
    fn from_le_bytes(bytes: &[u8]) -> Self {
        LittleEndian::read_f32(bytes)
    }
}

impl Sample for f16 {
    const PIXEL_TYPE: PixelType = PixelType::Half;
    fn from_le_bytes(bytes: &[u8]) -> Self {
        f16::from_bits(LittleEndian::read_u16(bytes))
    }
}

/// Widens one raw sample of `pixel_type` to `f32`.
pub fn widen_to_f32(pixel_type: PixelType, bytes: &[u8]) -> f32 {
    match pixel_type {
        PixelType::Uint => LittleEndian::read_u32(bytes) as f32,
        PixelType::Half => f16::from_bits(LittleEndian::read_u16(bytes)).to_f32(),
        PixelType::Float => LittleEndian::read_f32(bytes),
        PixelType::Unknown => f32::NAN,
    }
}

/// A borrowed, strided 3-D view of channel samples.
#[derive(Debug, Clone, Copy)]
pub struct ChannelView<'a> {
    data: &'a [u8],
    offset: usize,
    shape: [usize; 3],
    strides: [isize; 3],
    pixel_type: Option<PixelType>,
    element_size: usize,
}

impl<'a> ChannelView<'a> {
    /// Builds a view; `offset` is the byte position of element `[0, 0, 0]`.
    ///
    /// Callers guarantee every addressable element lies inside `data`.
    pub(crate) fn new(
        data: &'a [u8],
        offset: usize,
        shape: [usize; 3],
        strides: [isize; 3],
        pixel_type: Option<PixelType>,
        element_size: usize,
    ) -> Self {
        let view = Self {
            data,
            offset,
            shape,
            strides,
            pixel_type,
            element_size,
        };
        debug_assert!(view.in_bounds());
        view
    }

    fn in_bounds(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        let mut lo = self.offset as isize;
        let mut hi = self.offset as isize;
        for (&n, &s) in self.shape.iter().zip(self.strides.iter()) {
            let span = (n as isize - 1) * s;
            if span < 0 {
                lo += span;
            } else {
                hi += span;
            }
        }
        lo >= 0 && (hi as usize) + self.element_size <= self.data.len()
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Byte strides per axis; may be negative along the channel axis.
    pub fn strides(&self) -> [isize; 3] {
        self.strides
    }

    pub fn pixel_type(&self) -> Option<PixelType> {
        self.pixel_type
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start of the borrowed byte region.
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    /// True if this view addresses bytes inside `region`.
    pub fn aliases(&self, region: &[u8]) -> bool {
        let start = self.data.as_ptr() as usize;
        let end = start + self.data.len();
        let other_start = region.as_ptr() as usize;
        let other_end = other_start + region.len();
        !self.data.is_empty() && start < other_end && other_start < end
    }

    fn byte_offset(&self, index: [usize; 3]) -> usize {
        let rel: isize = index
            .iter()
            .zip(self.strides.iter())
            .map(|(&i, &s)| i as isize * s)
            .sum();
        (self.offset as isize + rel) as usize
    }

    /// Raw little-endian bytes of one element, `None` when out of bounds.
    pub fn raw(&self, index: [usize; 3]) -> Option<&'a [u8]> {
        if index.iter().zip(self.shape.iter()).any(|(&i, &n)| i >= n) {
            return None;
        }
        let start = self.byte_offset(index);
        self.data.get(start..start + self.element_size)
    }

    /// Decodes one element, `None` when out of bounds or `T` does not match.
    pub fn get<T: Sample>(&self, index: [usize; 3]) -> Option<T> {
        if self.pixel_type != Some(T::PIXEL_TYPE) {
            return None;
        }
        self.raw(index).map(T::from_le_bytes)
    }

    /// One element widened to `f32`.
    pub fn get_f32(&self, index: [usize; 3]) -> Option<f32> {
        let pixel_type = self.pixel_type?;
        self.raw(index).map(|b| widen_to_f32(pixel_type, b))
    }

    /// Iterates raw elements in logical row-major order of the current shape.
    pub fn iter_raw(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        let [_, d1, d2] = self.shape;
        (0..self.len()).map(move |flat| {
            let index = [flat / (d1 * d2), (flat / d2) % d1, flat % d2];
            let start = self.byte_offset(index);
            &self.data[start..start + self.element_size]
        })
    }

    /// Appends the samples of one (row, channel) line to `out`.
    pub(crate) fn extend_line(&self, row: usize, channel: usize, out: &mut Vec<u8>) {
        for col in 0..self.shape[2] {
            let start = self.byte_offset([row, channel, col]);
            out.extend_from_slice(&self.data[start..start + self.element_size]);
        }
    }

    /// Decodes all elements in logical order.
    pub fn to_vec<T: Sample>(&self) -> Result<Vec<T>, Error> {
        self.check_type::<T>()?;
        Ok(self.iter_raw().map(T::from_le_bytes).collect())
    }

    /// Widens all elements to `f32` in logical order.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self.pixel_type {
            Some(pixel_type) => self
                .iter_raw()
                .map(|b| widen_to_f32(pixel_type, b))
                .collect(),
            None => Vec::new(),
        }
    }

    fn check_type<T: Sample>(&self) -> Result<(), Error> {
        match self.pixel_type {
            Some(p) if p == T::PIXEL_TYPE => Ok(()),
            // Nothing to decode.
            None if self.is_empty() => Ok(()),
            other => Err(Error::TypeMismatch {
                expected: other.map(|p| p.as_str()).unwrap_or("none").to_string(),
                found: std::any::type_name::<T>().to_string(),
            }),
        }
    }

    /// Swaps two axes without touching the samples.
    pub fn swap_axes(mut self, a: usize, b: usize) -> Self {
        self.shape.swap(a, b);
        self.strides.swap(a, b);
        self
    }

    /// (rows, channels, columns) -> (rows, columns, channels).
    pub fn channels_last(self) -> Self {
        self.swap_axes(1, 2)
    }

    /// Takes `count` channels starting at `start`, advancing by `step`.
    ///
    /// Returns `None` if any selected channel falls outside the view.
    pub fn slice_channels(&self, start: usize, count: usize, step: isize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        let last = start as isize + (count as isize - 1) * step;
        if start >= self.shape[1] || last < 0 || last as usize >= self.shape[1] {
            return None;
        }
        let mut view = *self;
        view.offset = (self.offset as isize + start as isize * self.strides[1]) as usize;
        view.shape[1] = count;
        view.strides[1] = self.strides[1] * step;
        Some(view)
    }

    /// Single channel plane at `index`.
    pub fn channel(&self, index: usize) -> Option<Self> {
        self.slice_channels(index, 1, 1)
    }
}

/// An owned, densely packed channel array.
///
/// Produced when the requested channels cannot be expressed as a strided view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelArray {
    data: Vec<u8>,
    shape: [usize; 3],
    strides: [isize; 3],
    pixel_type: Option<PixelType>,
    element_size: usize,
}

impl ChannelArray {
    /// Packs `data` as (rows, channels, columns) in row-major order.
    pub(crate) fn new(
        data: Vec<u8>,
        shape: [usize; 3],
        pixel_type: Option<PixelType>,
        element_size: usize,
    ) -> Self {
        let [_, c, w] = shape;
        let strides = [
            (c * w * element_size) as isize,
            (w * element_size) as isize,
            element_size as isize,
        ];
        debug_assert_eq!(data.len(), shape.iter().product::<usize>() * element_size);
        Self {
            data,
            shape,
            strides,
            pixel_type,
            element_size,
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn swap_axes(mut self, a: usize, b: usize) -> Self {
        self.shape.swap(a, b);
        self.strides.swap(a, b);
        self
    }

    pub fn view(&self) -> ChannelView<'_> {
        ChannelView::new(
            &self.data,
            0,
            self.shape,
            self.strides,
            self.pixel_type,
            self.element_size,
        )
    }
}
