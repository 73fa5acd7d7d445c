#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Write;
use minexr::ExrReader;

fuzz_target!(|data: &[u8]| {
    let reader = match ExrReader::from_bytes(data) {
        Ok(r) => r,
        Err(_) => return,
    };
    let names = reader.channel_names();
    let _ = reader.select(&names, false).map(|s| s.to_f32_vec());
    let reversed: Vec<&str> = names.iter().rev().copied().collect();
    let _ = reader.select(&reversed, true).map(|s| s.to_f32_vec());
    let _ = reader.buffer().verify_scan_lines();

    let mut tmp = tempfile::Builder::new().suffix(".exr").tempfile().unwrap();
    tmp.write_all(data).unwrap();
    let mapped = ExrReader::open_mmap(tmp.path()).unwrap();
    assert_eq!(mapped.buffer().as_bytes(), reader.buffer().as_bytes());
});
