#![no_main]
use libfuzzer_sys::fuzz_target;
use minexr::{AttributeTable, ByteCursor};

fuzz_target!(|data: &[u8]| {
    let mut cursor = ByteCursor::new(data);
    let table = match AttributeTable::parse(&mut cursor) {
        Ok(t) => t,
        Err(_) => return,
    };
    assert!(cursor.position() <= data.len());
    let _ = table.channels();
    let _ = table.data_window();
    let _ = table.compression_mode();
});
