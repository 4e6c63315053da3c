use std::collections::VecDeque;

use crate::error::{ControlError, ControlResult};

/// Upper bound on the samples a window may hold.
pub const MAX_FILTER_SAMPLES: usize = 1 << 20;

/// Moving average over the last `capacity` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxcarFilter {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl BoxcarFilter {
    pub fn new(capacity: usize) -> ControlResult<Self> {
        if capacity == 0 {
            return Err(ControlError::InvalidArg {
                what: "boxcar filter needs at least one sample",
            });
        }
        if capacity > MAX_FILTER_SAMPLES {
            return Err(ControlError::InvalidArg {
                what: "filter window holds too many samples",
            });
        }
        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Filter holding `floor(window_s / sample_dt)` samples (at least one).
    pub fn for_window(window_s: f64, sample_dt: f64) -> ControlResult<Self> {
        if !(sample_dt.is_finite() && sample_dt > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "filter sample period must be positive",
            });
        }
        if !(window_s.is_finite() && window_s >= 0.0) {
            return Err(ControlError::InvalidArg {
                what: "filter window must be non-negative",
            });
        }
        let n = (window_s / sample_dt).floor();
        if n > MAX_FILTER_SAMPLES as f64 {
            return Err(ControlError::InvalidArg {
                what: "filter window holds too many samples",
            });
        }
        Self::new((n as usize).max(1))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Add a sample and return the updated mean.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Mean of the samples currently held.
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_available_samples_while_filling() {
        let mut f = BoxcarFilter::new(4).unwrap();
        assert_eq!(f.mean(), None);
        assert_eq!(f.push(70.0), 70.0);
        assert_eq!(f.push(72.0), 71.0);
    }

    #[test]
    fn drops_oldest_sample() {
        let mut f = BoxcarFilter::new(2).unwrap();
        f.push(1.0);
        f.push(3.0);
        assert_eq!(f.push(5.0), 4.0);
        assert_eq!(f.len(), 2);
    }

    #[test]
    fn window_sizing() {
        assert_eq!(BoxcarFilter::for_window(60.0, 5.0).unwrap().capacity(), 12);
        assert_eq!(BoxcarFilter::for_window(7.0, 5.0).unwrap().capacity(), 1);
        assert_eq!(BoxcarFilter::for_window(0.0, 5.0).unwrap().capacity(), 1);
        assert!(BoxcarFilter::for_window(60.0, 0.0).is_err());
        assert!(BoxcarFilter::new(0).is_err());
    }

    #[test]
    fn huge_window_is_refused_without_allocating() {
        assert!(matches!(
            BoxcarFilter::for_window(1e30, 5.0),
            Err(ControlError::InvalidArg { .. })
        ));
        assert!(BoxcarFilter::new(MAX_FILTER_SAMPLES + 1).is_err());
        let widest = BoxcarFilter::for_window(MAX_FILTER_SAMPLES as f64 * 5.0, 5.0).unwrap();
        assert_eq!(widest.capacity(), MAX_FILTER_SAMPLES);
    }
}
