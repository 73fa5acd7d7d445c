use std::io::Write;

use tempfile::NamedTempFile;

use super::data_generators::{element_size, encode_samples, make_line};

const MAGIC: i32 = 20_000_630;

/// Builds synthetic single-part scan line OpenEXR files.
///
/// Pixel data defaults to `data_generators::sample_value`, encoded per
/// channel in that channel's pixel type.
pub struct ExrBuilder {
    magic: i32,
    flags: [u8; 3],
    channels: Vec<(String, i32)>,
    compression: u8,
    data_window: [i32; 4],
    extra: Vec<(String, String, Vec<u8>)>,
    pixels: Option<Vec<u8>>,
}

impl ExrBuilder {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            magic: MAGIC,
            flags: [0, 0, 0],
            channels: Vec::new(),
            compression: 0,
            data_window: [0, 0, width - 1, height - 1],
            extra: Vec::new(),
            pixels: None,
        }
    }

    pub fn channel(mut self, name: &str, pixel_type: i32) -> Self {
        self.channels.push((name.to_string(), pixel_type));
        self
    }

    pub fn channels(mut self, names: &[&str], pixel_type: i32) -> Self {
        for name in names {
            self.channels.push((name.to_string(), pixel_type));
        }
        self
    }

    pub fn magic(mut self, magic: i32) -> Self {
        self.magic = magic;
        self
    }

    pub fn flags(mut self, flags: [u8; 3]) -> Self {
        self.flags = flags;
        self
    }

    pub fn compression(mut self, compression: u8) -> Self {
        self.compression = compression;
        self
    }

    pub fn data_window(mut self, x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        self.data_window = [x_min, y_min, x_max, y_max];
        self
    }

    pub fn attribute(mut self, name: &str, type_name: &str, data: Vec<u8>) -> Self {
        self.extra
            .push((name.to_string(), type_name.to_string(), data));
        self
    }

    /// Raw pixel bytes in (H, C, W) order, replacing the generated ones.
    pub fn pixels(mut self, bytes: Vec<u8>) -> Self {
        self.pixels = Some(bytes);
        self
    }

    pub fn width(&self) -> usize {
        (self.data_window[2] - self.data_window[0] + 1) as usize
    }

    pub fn height(&self) -> usize {
        (self.data_window[3] - self.data_window[1] + 1) as usize
    }

    fn line_bytes(&self) -> usize {
        self.channels
            .iter()
            .map(|(_, t)| element_size(*t) * self.width())
            .sum()
    }

    /// Pixel bytes of one scan line.
    fn line(&self, row: usize) -> Vec<u8> {
        let len = self.line_bytes();
        if let Some(pixels) = &self.pixels {
            return pixels[row * len..(row + 1) * len].to_vec();
        }
        self.channels
            .iter()
            .enumerate()
            .flat_map(|(ch, (_, t))| encode_samples(*t, &make_line(row, ch, self.width())))
            .collect()
    }

    /// Header bytes up to, not including, the offset table.
    pub fn header(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.push(2);
        out.extend_from_slice(&self.flags);

        let mut chlist = Vec::new();
        for (name, pixel_type) in &self.channels {
            chlist.extend_from_slice(name.as_bytes());
            chlist.push(0);
            chlist.extend_from_slice(&pixel_type.to_le_bytes());
            chlist.extend_from_slice(&[0, 0, 0, 0]);
            chlist.extend_from_slice(&1i32.to_le_bytes());
            chlist.extend_from_slice(&1i32.to_le_bytes());
        }
        chlist.push(0);
        push_attribute(&mut out, "channels", "chlist", &chlist);
        push_attribute(&mut out, "compression", "compression", &[self.compression]);

        let window: Vec<u8> = self
            .data_window
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        push_attribute(&mut out, "dataWindow", "box2i", &window);
        push_attribute(&mut out, "displayWindow", "box2i", &window);
        push_attribute(&mut out, "lineOrder", "lineOrder", &[0]);
        push_attribute(
            &mut out,
            "pixelAspectRatio",
            "float",
            &1.0f32.to_le_bytes(),
        );
        for (name, type_name, data) in &self.extra {
            push_attribute(&mut out, name, type_name, data);
        }
        out.push(0);
        out
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.header();
        let height = self.height();
        let stride = 8 + self.line_bytes();
        let body_start = out.len() + 8 * height;
        for row in 0..height {
            out.extend_from_slice(&((body_start + row * stride) as u64).to_le_bytes());
        }
        for row in 0..height {
            out.extend_from_slice(&(self.data_window[1] + row as i32).to_le_bytes());
            out.extend_from_slice(&(self.line_bytes() as i32).to_le_bytes());
            out.extend_from_slice(&self.line(row));
        }
        out
    }

    pub fn build_file(&self) -> NamedTempFile {
        write_file(&self.build())
    }
}

pub fn push_attribute(out: &mut Vec<u8>, name: &str, type_name: &str, data: &[u8]) {
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    out.extend_from_slice(type_name.as_bytes());
    out.push(0);
    out.extend_from_slice(&(data.len() as i32).to_le_bytes());
    out.extend_from_slice(data);
}

pub fn write_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}
