use num_traits::Float;
use serde::{Deserialize, Serialize};

/// How subvector-to-codeword distances are compared.
///
/// Both modes select the same codeword up to floating point rounding; `Euclidean` takes the
/// square root of every distance before comparing, which matches reference encoders bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMode {
    #[default]
    Squared,
    Euclidean,
}

impl DistanceMode {
    #[inline]
    pub fn distance<T: Float>(&self, a: &[T], b: &[T]) -> T {
        let squared = squared_l2(a, b);
        match self {
            DistanceMode::Squared => squared,
            DistanceMode::Euclidean => squared.sqrt(),
        }
    }
}

#[inline]
pub fn squared_l2<T: Float>(a: &[T], b: &[T]) -> T {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (&x, &y)| {
            let diff = x - y;
            acc + diff * diff
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distances() {
        let a = [1.0f32, 2.0, 3.0];
        let b = [4.0f32, 6.0, 3.0];
        assert_eq!(squared_l2(&a, &b), 25.0);
        assert_eq!(DistanceMode::Squared.distance(&a, &b), 25.0);
        assert_eq!(DistanceMode::Euclidean.distance(&a, &b), 5.0);
        assert_eq!(DistanceMode::Squared.distance(&a, &a), 0.0);
    }

    #[test]
    fn test_f64() {
        let a = [0.5f64, -0.5];
        let b = [-0.5f64, 0.5];
        assert_eq!(squared_l2(&a, &b), 2.0);
    }
}
