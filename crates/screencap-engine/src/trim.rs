//! Trim marker state over a finalized recording.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use screencap_ipc::{TrimRange, MIN_TRIM_SPAN_SECS};

use crate::error::TrimError;

/// Result type for trim operations.
pub type TrimResult<T> = Result<T, TrimError>;

/// Holds the trim range of the current recording.
///
/// Setters clamp instead of rejecting: a start pushed past the end lands
/// `MIN_TRIM_SPAN_SECS` before the end, and vice versa.
#[derive(Debug, Default)]
pub struct TrimSelector {
    duration: f64,
    range: Arc<RwLock<Option<TrimRange>>>,
}

impl TrimSelector {
    /// Create an uninitialized selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the whole recording.
    ///
    /// Recordings shorter than `MIN_TRIM_SPAN_SECS` cannot hold a valid
    /// range and are rejected; the selector stays detached.
    pub fn initialize(&mut self, duration: f64) -> TrimResult<TrimRange> {
        if !duration.is_finite() || duration < MIN_TRIM_SPAN_SECS {
            self.clear();
            return Err(TrimError::InvalidDuration(duration));
        }

        let range = TrimRange {
            start: 0.0,
            end: duration,
        };
        self.duration = duration;
        *self.range.write() = Some(range);
        debug!(duration, "Trim range initialized");
        Ok(range)
    }

    /// Move the start marker. Returns the applied position.
    pub fn set_start(&self, value: f64) -> TrimResult<f64> {
        if !value.is_finite() {
            return Err(TrimError::InvalidPosition(value));
        }
        let mut guard = self.range.write();
        let range = guard.as_mut().ok_or(TrimError::NotInitialized)?;

        let limit = (range.end - MIN_TRIM_SPAN_SECS).max(0.0);
        let start = value.clamp(0.0, self.duration).min(limit);

        range.start = start;
        Ok(start)
    }

    /// Move the end marker. Returns the applied position.
    pub fn set_end(&self, value: f64) -> TrimResult<f64> {
        if !value.is_finite() {
            return Err(TrimError::InvalidPosition(value));
        }
        let mut guard = self.range.write();
        let range = guard.as_mut().ok_or(TrimError::NotInitialized)?;

        let limit = (range.start + MIN_TRIM_SPAN_SECS).min(self.duration);
        let end = value.clamp(0.0, self.duration).max(limit);

        range.end = end;
        Ok(end)
    }

    /// Current range, if a recording is attached.
    pub fn range(&self) -> Option<TrimRange> {
        *self.range.read()
    }

    /// Read-only view for UI binding.
    pub fn view(&self) -> TrimView {
        TrimView {
            range: Arc::clone(&self.range),
        }
    }

    /// Detach from the current recording.
    pub fn clear(&mut self) {
        self.duration = 0.0;
        *self.range.write() = None;
    }
}

/// Lazy read-only view of a [`TrimSelector`]'s range.
///
/// Every read observes the selector's latest state.
#[derive(Debug, Clone)]
pub struct TrimView {
    range: Arc<RwLock<Option<TrimRange>>>,
}

impl TrimView {
    pub fn current(&self) -> Option<TrimRange> {
        *self.range.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn selector(duration: f64) -> TrimSelector {
        let mut selector = TrimSelector::new();
        selector.initialize(duration).unwrap();
        selector
    }

    #[test]
    fn test_initialize_selects_everything() {
        let selector = selector(12.5);
        assert_eq!(selector.range(), Some(TrimRange { start: 0.0, end: 12.5 }));
    }

    #[test]
    fn test_invalid_duration() {
        let mut selector = TrimSelector::new();
        assert_eq!(
            selector.initialize(-1.0),
            Err(TrimError::InvalidDuration(-1.0))
        );
        assert!(selector.initialize(f64::NAN).is_err());
        assert_eq!(selector.set_start(1.0), Err(TrimError::NotInitialized));
    }

    #[test]
    fn test_too_short_to_trim() {
        for duration in [0.0, 0.05] {
            let mut selector = TrimSelector::new();
            assert_eq!(
                selector.initialize(duration),
                Err(TrimError::InvalidDuration(duration))
            );
            assert_eq!(selector.range(), None);
            assert_eq!(selector.set_start(0.02), Err(TrimError::NotInitialized));
            assert_eq!(selector.set_end(0.02), Err(TrimError::NotInitialized));
        }
    }

    #[test]
    fn test_shortest_trimmable_recording() {
        let selector = selector(MIN_TRIM_SPAN_SECS);
        selector.set_start(0.05).unwrap();
        selector.set_end(0.05).unwrap();

        let range = selector.range().unwrap();
        assert_eq!(range.start, 0.0);
        assert!(range.span() >= MIN_TRIM_SPAN_SECS - EPS);
    }

    #[test]
    fn test_start_past_end_is_clamped() {
        let selector = selector(10.0);
        selector.set_end(5.0).unwrap();

        let applied = selector.set_start(7.0).unwrap();

        assert!((applied - 4.9).abs() < EPS);
        let range = selector.range().unwrap();
        assert!(range.end - range.start >= MIN_TRIM_SPAN_SECS - EPS);
    }

    #[test]
    fn test_end_before_start_is_clamped() {
        let selector = selector(10.0);
        selector.set_start(6.0).unwrap();

        let applied = selector.set_end(2.0).unwrap();

        assert!((applied - 6.1).abs() < EPS);
    }

    #[test]
    fn test_equal_start_and_end_keep_minimum_span() {
        for x in [0.0, 0.05, 3.0, 9.95, 10.0, 42.0, -3.0] {
            let selector = selector(10.0);
            selector.set_start(x).unwrap();
            selector.set_end(x).unwrap();

            let range = selector.range().unwrap();
            assert!(range.start < range.end, "x = {x}: {range:?}");
            assert!(range.span() >= MIN_TRIM_SPAN_SECS - EPS, "x = {x}: {range:?}");
            assert!(range.start >= 0.0 && range.end <= 10.0, "x = {x}: {range:?}");
        }
    }

    #[test]
    fn test_values_clamped_to_duration() {
        let selector = selector(10.0);
        assert_eq!(selector.set_start(-2.0).unwrap(), 0.0);
        assert_eq!(selector.set_end(99.0).unwrap(), 10.0);
        assert!(selector.set_end(f64::INFINITY).is_err());
    }

    #[test]
    fn test_view_follows_updates() {
        let mut selector = selector(10.0);
        let view = selector.view();

        selector.set_start(2.0).unwrap();
        assert_eq!(view.current().map(|r| r.start), Some(2.0));

        selector.set_end(5.0).unwrap();
        assert_eq!(view.clone().current(), Some(TrimRange { start: 2.0, end: 5.0 }));

        selector.clear();
        assert_eq!(view.current(), None);
    }
}
