use half::f16;

/// Deterministic sample value for (row, channel, column).
pub fn sample_value(row: usize, channel: usize, col: usize) -> f32 {
    (row * 100 + channel * 10 + col) as f32 * 0.5
}

/// Samples of one channel across a scan line.
pub fn make_line(row: usize, channel: usize, width: usize) -> Vec<f32> {
    (0..width).map(|col| sample_value(row, channel, col)).collect()
}

/// The whole image as f32 in (H, C, W) order.
pub fn make_image(height: usize, channels: usize, width: usize) -> Vec<f32> {
    (0..height)
        .flat_map(|row| (0..channels).flat_map(move |ch| make_line(row, ch, width)))
        .collect()
}

/// Encodes f32 samples with the given OpenEXR pixel type code.
pub fn encode_samples(pixel_type: i32, values: &[f32]) -> Vec<u8> {
    match pixel_type {
        0 => values.iter().flat_map(|v| (*v as u32).to_le_bytes()).collect(),
        1 => values
            .iter()
            .flat_map(|v| f16::from_f32(*v).to_le_bytes())
            .collect(),
        2 => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        other => panic!("no encoding for pixel type {}", other),
    }
}

pub fn element_size(pixel_type: i32) -> usize {
    match pixel_type {
        1 => 2,
        _ => 4,
    }
}
