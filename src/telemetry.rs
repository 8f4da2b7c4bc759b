//! Opt-in tracing setup for applications embedding `chart-layout`.
//!
//! The crate only emits `tracing` events. Hosts either call one of these
//! helpers or install their own subscriber. Axis range adoption and layout
//! retries log at `debug`, tick cache misses and dataset lock counts at
//! `trace`.

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `info`.
///
/// Returns `false` when the `telemetry` feature is disabled or a global
/// subscriber is already set.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_default_filter("info")
}

/// Like [`init_default_tracing`] with a caller-chosen fallback directive,
/// e.g. `"chart_layout=trace"`.
#[must_use]
pub fn init_tracing_with_default_filter(default_directive: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = default_directive;
        false
    }
}
