pub mod data_generators;
pub mod exr_builder;

/// Routes `tracing` output through the test harness so `--nocapture` shows it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
