/// Runs `f`, logging how long it took.
#[cfg(feature = "metrics")]
pub fn measure<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let started_at = std::time::Instant::now();
    let result = f();

    log::info!(
        "{}: {}",
        label,
        humantime::format_duration(started_at.elapsed())
    );

    result
}

/// Runs `f`.
#[cfg(not(feature = "metrics"))]
pub fn measure<T>(_: &str, f: impl FnOnce() -> T) -> T {
    f()
}
