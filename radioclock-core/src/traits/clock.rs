//! Monotonic time source

/// Free-running microsecond clock
///
/// Must never go backwards. The firmware implements this on top of the
/// embassy time driver; tests use a manually advanced counter.
pub trait Monotonic {
    /// Microseconds since an arbitrary fixed epoch
    fn now_us(&self) -> u64;
}
