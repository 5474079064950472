/// Runs `f`, logging how long it took when the `metrics` feature is on.
#[cfg(feature = "metrics")]
pub fn measure<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let started_at = std::time::Instant::now();
    let result = f();

    log::trace!(
        "{label}: {}",
        humantime::format_duration(started_at.elapsed())
    );

    result
}

#[cfg(not(feature = "metrics"))]
pub fn measure<T>(_label: &str, f: impl FnOnce() -> T) -> T {
    f()
}
