// src/generator/range.rs

use crate::error::GenerationError;
use serde::{Deserialize, Serialize};

/// Upper bound on points per axis; the Cartesian product explodes long before this.
const MAX_AXIS_POINTS: f64 = 50_000_000.0;

/// How points are spread between `min` and `max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StepScale {
    /// `min, min + step, min + 2·step, …` up to and including `max`.
    Linear,
    /// `points` values spaced evenly in log space from `min` to `max` inclusive.
    Log { points: usize },
}

/// One axis of the candidate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    #[serde(default = "linear")]
    pub scale: StepScale,
}

fn linear() -> StepScale {
    StepScale::Linear
}

impl AxisRange {
    pub fn linear(min: f64, max: f64, step: f64) -> Self {
        Self {
            min,
            max,
            step,
            scale: StepScale::Linear,
        }
    }

    pub fn log(min: f64, max: f64, points: usize) -> Self {
        Self {
            min,
            max,
            step: 1.0,
            scale: StepScale::Log { points },
        }
    }

    /// Materialize the axis. `axis` names the axis in errors.
    pub fn values(&self, axis: &'static str) -> Result<Vec<f64>, GenerationError> {
        match self.scale {
            StepScale::Linear => linear_range(axis, self.min, self.max, self.step),
            StepScale::Log { points } => log_range(axis, self.min, self.max, points),
        }
    }
}

/// Ascending closed-interval sequence `min, min + step, …` of values `<= max`.
pub fn generate_range(min: f64, max: f64, step: f64) -> Result<Vec<f64>, GenerationError> {
    linear_range("range", min, max, step)
}

fn check_bounds(axis: &'static str, min: f64, max: f64) -> Result<(), GenerationError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(GenerationError::InvalidAxis {
            axis,
            message: format!("bounds must be finite, got [{}, {}]", min, max),
        });
    }
    if min > max {
        return Err(GenerationError::InvalidAxis {
            axis,
            message: format!("min {} exceeds max {}", min, max),
        });
    }
    Ok(())
}

fn linear_range(
    axis: &'static str,
    min: f64,
    max: f64,
    step: f64,
) -> Result<Vec<f64>, GenerationError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(GenerationError::InvalidStep { axis, step });
    }
    check_bounds(axis, min, max)?;

    let span = (max - min) / step;
    if span >= MAX_AXIS_POINTS {
        return Err(GenerationError::InvalidAxis {
            axis,
            message: format!("step {} yields more than {} points", step, MAX_AXIS_POINTS),
        });
    }

    // Multiplying instead of accumulating keeps float drift from dropping the endpoint.
    let tolerance = step * 1e-9;
    let mut values = Vec::with_capacity(span as usize + 1);
    let mut i = 0u64;
    loop {
        let value = min + i as f64 * step;
        if value > max + tolerance {
            break;
        }
        values.push(value.min(max));
        i += 1;
    }
    Ok(values)
}

fn log_range(
    axis: &'static str,
    min: f64,
    max: f64,
    points: usize,
) -> Result<Vec<f64>, GenerationError> {
    check_bounds(axis, min, max)?;
    if min <= 0.0 || min >= max {
        return Err(GenerationError::InvalidAxis {
            axis,
            message: format!("log scale needs 0 < min < max, got [{}, {}]", min, max),
        });
    }
    if points < 2 || points as f64 > MAX_AXIS_POINTS {
        return Err(GenerationError::InvalidAxis {
            axis,
            message: format!("log scale needs at least 2 points, got {}", points),
        });
    }

    let ratio = max / min;
    let last = points - 1;
    let values = (0..points)
        .map(|i| {
            if i == last {
                max
            } else {
                min * ratio.powf(i as f64 / last as f64)
            }
        })
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_that_divides_range() {
        assert_eq!(generate_range(1.0, 10.0, 3.0).unwrap(), vec![1.0, 4.0, 7.0, 10.0]);
    }

    #[test]
    fn test_step_that_does_not_divide_range() {
        let values = generate_range(1.0, 10.0, 4.0).unwrap();
        assert_eq!(values, vec![1.0, 5.0, 9.0]);
        assert!(values.last().unwrap() + 4.0 > 10.0);
    }

    #[test]
    fn test_fractional_step_keeps_endpoint() {
        let values = generate_range(0.1, 0.4, 0.1).unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(*values.last().unwrap(), 0.4);
    }

    #[test]
    fn test_single_point() {
        assert_eq!(generate_range(5.0, 5.0, 1.0).unwrap(), vec![5.0]);
    }

    #[test]
    fn test_range_properties() {
        for (min, max, step) in [(1.0, 10_000.0, 10.0), (2.0, 100_000.0, 7.5), (0.5, 3.3, 0.7)] {
            let values = generate_range(min, max, step).unwrap();
            assert_eq!(values[0], min);
            assert!(values.windows(2).all(|w| w[0] < w[1]));
            let last = *values.last().unwrap();
            assert!(last <= max);
            assert!(last + step > max);
        }
    }

    #[test]
    fn test_non_positive_step_is_an_error() {
        assert_eq!(
            generate_range(1.0, 10.0, 0.0),
            Err(GenerationError::InvalidStep {
                axis: "range",
                step: 0.0
            })
        );
        assert!(generate_range(1.0, 10.0, -1.0).is_err());
        assert!(generate_range(1.0, 10.0, f64::NAN).is_err());
    }

    #[test]
    fn test_inverted_bounds_are_an_error() {
        assert!(matches!(
            AxisRange::linear(10.0, 1.0, 1.0).values("price"),
            Err(GenerationError::InvalidAxis { axis: "price", .. })
        ));
    }

    #[test]
    fn test_log_scale() {
        let values = AxisRange::log(1.0, 1_000.0, 4).values("weight").unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(values[0], 1.0);
        assert!((values[1] - 10.0).abs() < 1e-9);
        assert!((values[2] - 100.0).abs() < 1e-9);
        assert_eq!(values[3], 1_000.0);

        assert!(AxisRange::log(0.0, 10.0, 4).values("weight").is_err());
        assert!(AxisRange::log(1.0, 10.0, 1).values("weight").is_err());
    }
}
