//! Geometric midpoint of a set of positions.

use geo::{BoundingRect, Centroid, MultiPoint, Point};

use crate::GeoPoint;

/// Arithmetic mean of the latitudes and longitudes of `points`.
///
/// The average is planar, not great-circle. It only seeds the travel-time
/// optimiser, and at metropolitan scale the difference is negligible.
/// Returns `None` for an empty slice.
///
/// # Examples
/// ```
/// use rendezvous_core::{GeoPoint, midpoint::centroid};
///
/// # fn main() -> Result<(), rendezvous_core::GeoPointError> {
/// let points = [GeoPoint::new(25.0, 121.0)?, GeoPoint::new(25.2, 121.2)?];
/// let middle = centroid(&points).expect("non-empty input");
/// assert!((middle.lat - 25.1).abs() < 1e-9);
/// assert!((middle.lng - 121.1).abs() < 1e-9);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn centroid(points: &[GeoPoint]) -> Option<GeoPoint> {
    let cloud: MultiPoint<f64> = points.iter().copied().map(Point::<f64>::from).collect();
    let mean = cloud.centroid()?;
    let bounds = cloud.bounding_rect()?;
    // Rounding can push the mean a few ulps outside the inputs' extent.
    let (min, max) = (bounds.min(), bounds.max());
    Some(GeoPoint {
        lat: mean.y().clamp(min.y, max.y),
        lng: mean.x().clamp(min.x, max.x),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    fn empty_input_has_no_centroid() {
        assert_eq!(centroid(&[]), None);
    }

    #[rstest]
    fn single_point_is_its_own_centroid() {
        let point = GeoPoint::new(-33.86, 151.21).expect("valid");
        assert_eq!(centroid(&[point]), Some(point));
    }

    #[rstest]
    fn collinear_points_average_to_middle() {
        let points = [
            GeoPoint::new(25.03, 121.56).expect("valid"),
            GeoPoint::new(25.04, 121.55).expect("valid"),
            GeoPoint::new(25.02, 121.57).expect("valid"),
        ];
        let middle = centroid(&points).expect("non-empty");
        assert!((middle.lat - 25.03).abs() < 1e-9);
        assert!((middle.lng - 121.56).abs() < 1e-9);
    }

    fn point_strategy() -> impl Strategy<Value = GeoPoint> {
        (-90.0_f64..=90.0, -180.0_f64..=180.0).prop_map(|(lat, lng)| GeoPoint { lat, lng })
    }

    proptest! {
        #[test]
        fn centroid_lies_within_bounding_box(points in prop::collection::vec(point_strategy(), 2..32)) {
            let middle = centroid(&points).expect("non-empty input");
            let min_lat = points.iter().map(|p| p.lat).fold(f64::INFINITY, f64::min);
            let max_lat = points.iter().map(|p| p.lat).fold(f64::NEG_INFINITY, f64::max);
            let min_lng = points.iter().map(|p| p.lng).fold(f64::INFINITY, f64::min);
            let max_lng = points.iter().map(|p| p.lng).fold(f64::NEG_INFINITY, f64::max);
            prop_assert!((min_lat..=max_lat).contains(&middle.lat));
            prop_assert!((min_lng..=max_lng).contains(&middle.lng));
        }

        #[test]
        fn identical_points_have_that_point_as_centroid(point in point_strategy(), count in 2_usize..16) {
            let points = vec![point; count];
            prop_assert_eq!(centroid(&points), Some(point));
        }
    }
}
