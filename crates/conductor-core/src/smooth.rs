//! Smoothed values for zipper-free parameter changes.
//!
//! Three smoothing curves share one API:
//! - [`Ramp`]: linear, reaches the target after exactly the lag time.
//! - [`ExpRamp`]: exponential, suited to long volume fades.
//! - [`Filter`]: one-pole low-pass, the lag time is the 90% rise time.
//!
//! # Example
//!
//! ```
//! use conductor_core::ValueSmootherRamp;
//! use std::time::Duration;
//!
//! // 10ms ramp at 48kHz
//! let mut gain = ValueSmootherRamp::new(Duration::from_millis(10), 48000.0, 1.0);
//! gain.set(0.5);
//!
//! # let mut buffer = [1.0f32; 64];
//! for sample in buffer.iter_mut() {
//!     *sample *= gain.next_value();
//! }
//! assert!(!gain.stationary());
//! ```

use std::marker::PhantomData;
use std::time::Duration;

/// Values closer than this are considered equal (-80dB).
pub const STATIONARY_LIMIT: f32 = 0.0001;

/// Time constants a one-pole filter needs to rise from 10% to 90%.
const RISE_TIME_CONSTANTS: f32 = 2.19;

/// Smoothing curve of a [`ValueSmoother`].
pub trait SmoothingMode {
    #[doc(hidden)]
    fn update_internals(smoother: &mut ValueSmoother<Self>, lag_time: Duration, sample_rate: f32)
    where
        Self: Sized;

    #[doc(hidden)]
    fn start(smoother: &mut ValueSmoother<Self>)
    where
        Self: Sized;

    #[doc(hidden)]
    fn advance(smoother: &mut ValueSmoother<Self>) -> f32
    where
        Self: Sized;

    #[doc(hidden)]
    fn stationary(smoother: &ValueSmoother<Self>) -> bool
    where
        Self: Sized;

    /// Lowest value the smoother may hold.
    #[doc(hidden)]
    fn floor(value: f32) -> f32 {
        value
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ramp;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpRamp;

#[derive(Debug, Clone, Copy, Default)]
pub struct Filter;

fn steps_for(lag_time: Duration, sample_rate: f32) -> u32 {
    ((lag_time.as_secs_f32() * sample_rate).round() as u32).max(1)
}

impl SmoothingMode for Ramp {
    fn update_internals(smoother: &mut ValueSmoother<Self>, lag_time: Duration, sample_rate: f32) {
        smoother.steps = steps_for(lag_time, sample_rate);
    }

    fn start(smoother: &mut ValueSmoother<Self>) {
        smoother.step = (smoother.target - smoother.current) / smoother.steps as f32;
        smoother.count = smoother.steps;
    }

    #[inline]
    fn advance(smoother: &mut ValueSmoother<Self>) -> f32 {
        if smoother.count > 0 {
            smoother.count -= 1;
            smoother.current = if smoother.count == 0 {
                smoother.target
            } else {
                smoother.current + smoother.step
            };
            return smoother.current;
        }
        smoother.target
    }

    fn stationary(smoother: &ValueSmoother<Self>) -> bool {
        smoother.count == 0
    }
}

impl SmoothingMode for ExpRamp {
    fn update_internals(smoother: &mut ValueSmoother<Self>, lag_time: Duration, sample_rate: f32) {
        smoother.steps = steps_for(lag_time, sample_rate);
    }

    fn start(smoother: &mut ValueSmoother<Self>) {
        let target = smoother.target.max(STATIONARY_LIMIT).ln();
        let current = smoother.current.max(STATIONARY_LIMIT).ln();
        smoother.step = ((target - current) / smoother.steps as f32).exp();
        smoother.count = smoother.steps;
    }

    #[inline]
    fn advance(smoother: &mut ValueSmoother<Self>) -> f32 {
        if smoother.count > 0 {
            smoother.count -= 1;
            smoother.current *= smoother.step;
            return smoother.current;
        }
        smoother.target
    }

    fn stationary(smoother: &ValueSmoother<Self>) -> bool {
        smoother.count == 0
    }

    fn floor(value: f32) -> f32 {
        value.max(STATIONARY_LIMIT)
    }
}

impl SmoothingMode for Filter {
    fn update_internals(smoother: &mut ValueSmoother<Self>, lag_time: Duration, sample_rate: f32) {
        let samples = (lag_time.as_secs_f32() * sample_rate).max(f32::MIN_POSITIVE);
        smoother.step = (-RISE_TIME_CONSTANTS / samples).exp();
    }

    fn start(_smoother: &mut ValueSmoother<Self>) {}

    #[inline]
    fn advance(smoother: &mut ValueSmoother<Self>) -> f32 {
        let coeff = smoother.step;
        smoother.current = (1.0 - coeff) * smoother.target + coeff * smoother.current;
        smoother.current
    }

    fn stationary(smoother: &ValueSmoother<Self>) -> bool {
        (smoother.target - smoother.current).abs() < STATIONARY_LIMIT
    }
}

/// A value that moves towards its target one sample at a time.
#[derive(Debug, Clone)]
pub struct ValueSmoother<M: SmoothingMode> {
    current: f32,
    target: f32,
    /// Per-sample increment, multiplier or filter coefficient depending on mode.
    step: f32,
    count: u32,
    steps: u32,
    _mode: PhantomData<M>,
}

pub type ValueSmootherRamp = ValueSmoother<Ramp>;
pub type ValueSmootherExpRamp = ValueSmoother<ExpRamp>;
pub type ValueSmootherFilter = ValueSmoother<Filter>;

impl<M: SmoothingMode> ValueSmoother<M> {
    pub fn new(lag_time: Duration, sample_rate: f32, initial: f32) -> Self {
        let initial = M::floor(initial);
        let mut smoother = Self {
            current: initial,
            target: initial,
            step: 0.0,
            count: 0,
            steps: 1,
            _mode: PhantomData,
        };
        M::update_internals(&mut smoother, lag_time, sample_rate);
        smoother
    }

    /// Starts moving towards `value`.
    pub fn set(&mut self, value: f32) {
        if value != self.target {
            self.target = value;
            M::start(self);
        }
    }

    /// Jumps to `value` without smoothing.
    pub fn set_direct(&mut self, value: f32) {
        self.target = value;
        self.current = M::floor(value);
        self.count = 0;
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Advances one sample and returns the new value.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        M::advance(self)
    }

    pub fn stationary(&self) -> bool {
        M::stationary(self)
    }

    pub fn set_lag_time(&mut self, lag_time: Duration, sample_rate: f32) {
        M::update_internals(self, lag_time, sample_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SAMPLE_RATE: f32 = 1000.0;

    #[test]
    fn test_ramp_reaches_target_in_exact_steps() {
        let mut smoother = ValueSmootherRamp::new(Duration::from_millis(10), SAMPLE_RATE, 0.0);
        assert!(smoother.stationary());
        smoother.set(1.0);
        assert!(!smoother.stationary());

        for i in 1..10 {
            assert_abs_diff_eq!(smoother.next_value(), i as f32 * 0.1, epsilon = 1e-5);
        }
        assert_eq!(smoother.next_value(), 1.0);
        assert!(smoother.stationary());
        assert_eq!(smoother.next_value(), 1.0);
    }

    #[test]
    fn test_ramp_set_direct() {
        let mut smoother = ValueSmootherRamp::new(Duration::from_millis(10), SAMPLE_RATE, 0.0);
        smoother.set(1.0);
        smoother.next_value();
        smoother.set_direct(0.25);
        assert!(smoother.stationary());
        assert_eq!(smoother.value(), 0.25);
        assert_eq!(smoother.next_value(), 0.25);
    }

    #[test]
    fn test_ramp_minimum_one_step() {
        let mut smoother = ValueSmootherRamp::new(Duration::ZERO, SAMPLE_RATE, 0.0);
        smoother.set(2.0);
        assert_eq!(smoother.next_value(), 2.0);
        assert!(smoother.stationary());
    }

    #[test]
    fn test_exp_ramp_is_monotonic() {
        let mut smoother = ValueSmootherExpRamp::new(Duration::from_millis(20), SAMPLE_RATE, 1.0);
        smoother.set(0.0);
        let mut previous = smoother.value();
        for _ in 0..20 {
            let value = smoother.next_value();
            assert!(value < previous);
            previous = value;
        }
        assert!(smoother.stationary());
        assert_abs_diff_eq!(previous, STATIONARY_LIMIT, epsilon = 1e-6);
    }

    #[test]
    fn test_exp_ramp_floor() {
        let smoother = ValueSmootherExpRamp::new(Duration::from_millis(20), SAMPLE_RATE, 0.0);
        assert_eq!(smoother.value(), STATIONARY_LIMIT);
    }

    #[test]
    fn test_filter_rise_time() {
        let mut smoother = ValueSmootherFilter::new(Duration::from_millis(100), SAMPLE_RATE, 0.0);
        smoother.set(1.0);
        let mut value = 0.0;
        for _ in 0..100 {
            value = smoother.next_value();
        }
        assert!(value > 0.85 && value < 0.92);
        assert!(!smoother.stationary());

        for _ in 0..1000 {
            smoother.next_value();
        }
        assert!(smoother.stationary());
    }

    #[test]
    fn test_set_lag_time() {
        let mut smoother = ValueSmootherRamp::new(Duration::from_millis(10), SAMPLE_RATE, 0.0);
        smoother.set_lag_time(Duration::from_millis(2), SAMPLE_RATE);
        smoother.set(1.0);
        smoother.next_value();
        assert_eq!(smoother.next_value(), 1.0);
    }
}
