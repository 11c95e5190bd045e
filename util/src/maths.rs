//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, Num};

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Return the euclidian norm (distance between) of two points.
///
/// If the points do not have the same number of dimentions then `None` is
/// returned.
pub fn norm<T>(point_0: &[T], point_1: &[T]) -> Option<T>
where
    T: Float + std::ops::AddAssign
{
    // Check that the dimentions match
    if point_0.len() != point_1.len() {
        return None;
    }

    let mut sum = T::zero();

    for (a, b) in point_0.iter().zip(point_1.iter()) {
        sum += (*a - *b).powi(2);
    }

    Some(sum.sqrt())
}

/// Clamp a value into `[min, max]`.
///
/// Works for both integer and floating point values. If `min > max` the
/// result is `max`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Num + PartialOrd + Copy
{
    let mut ret = *value;

    if ret < *min {
        ret = *min
    }
    if ret > *max {
        ret = *max
    }

    ret
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&5, &0, &10), 5);
        assert_eq!(clamp(&-5, &0, &10), 0);
        assert_eq!(clamp(&15, &0, &10), 10);
        assert_eq!(clamp(&1.5f64, &-1.0, &1.0), 1.0);
        assert_eq!(clamp(&-0.25f64, &-1.0, &1.0), -0.25);
    }

    #[test]
    fn test_norm_and_map() {
        assert_eq!(norm(&[0.0f64, 0.0], &[3.0, 4.0]), Some(5.0));
        assert_eq!(norm(&[0.0f64, 0.0], &[3.0]), None);

        assert_eq!(lin_map((0.0f64, 640.0), (0.0, 320.0), 320.0), 160.0);
    }
}
