//! Shared time base of the interpolators.

/// Interpolation times below this are instantaneous.
pub const MIN_INTERPOLATION_TIME: f64 = 1.0e-4;

/// Consumed and total time of the current interpolation.
///
/// `0 <= consumed <= total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InterpolatorTime {
    total: f64,
    consumed: f64,
}

impl InterpolatorTime {
    /// Fresh interpolation lasting `total` seconds.
    #[must_use]
    pub fn new(total: f64) -> Self {
        let mut time = Self::default();
        time.reset_time(total);
        time
    }

    /// Restart with a new total; negative or `NaN` totals count as zero.
    pub fn reset_time(&mut self, total: f64) {
        self.total = if total > 0.0 { total } else { 0.0 };
        self.consumed = 0.0;
    }

    /// Consume `dt` seconds and return the part that did not fit.
    pub fn add_time(&mut self, dt: f64) -> f64 {
        let dt = dt.max(0.0);
        let wanted = self.consumed + dt;
        if wanted > self.total {
            self.consumed = self.total;
            wanted - self.total
        } else {
            self.consumed = wanted;
            0.0
        }
    }

    /// Total time (seconds).
    #[must_use]
    pub fn total_time(&self) -> f64 {
        self.total
    }

    /// Consumed time (seconds).
    #[must_use]
    pub fn consumed_time(&self) -> f64 {
        self.consumed
    }

    /// Time left (seconds).
    #[must_use]
    pub fn remaining_time(&self) -> f64 {
        self.total - self.consumed
    }

    /// Whether the interpolation has finished.
    #[must_use]
    pub fn done(&self) -> bool {
        self.total < MIN_INTERPOLATION_TIME || self.consumed >= self.total
    }

    /// Interpolation parameter in `[0, 1]`.
    #[must_use]
    pub fn interpolation_parameter(&self) -> f64 {
        if self.total < MIN_INTERPOLATION_TIME {
            1.0
        } else {
            (self.consumed / self.total).min(1.0)
        }
    }
}
