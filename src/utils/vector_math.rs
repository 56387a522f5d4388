/// Vector math utilities for separation calculations
///
/// This module provides helper functions for vector operations used in
/// sky-geometry calculations, including coordinate conversions and
/// angular separation calculations.
use ndarray::{Array1, ArrayView1};

/// Convert longitude/latitude (RA/Dec) coordinates to a unit vector
///
/// # Arguments
/// * `lon_deg` - Longitude (right ascension) in degrees
/// * `lat_deg` - Latitude (declination) in degrees
///
/// # Returns
/// Unit vector [x, y, z] in the frame the angles are expressed in
pub fn radec_to_unit_vector(lon_deg: f64, lat_deg: f64) -> [f64; 3] {
    let lon_rad = lon_deg.to_radians();
    let lat_rad = lat_deg.to_radians();
    let cos_lat = lat_rad.cos();
    [
        cos_lat * lon_rad.cos(),
        cos_lat * lon_rad.sin(),
        lat_rad.sin(),
    ]
}

/// Calculate the dot product of two 3D vectors
pub fn dot_product(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Calculate the cross product of two 3D vectors
pub fn cross_product(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Calculate the magnitude (length) of a 3D vector
pub fn vector_magnitude(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Angle in degrees between two unit vectors
///
/// Uses atan2(|a×b|, a·b), which stays accurate for both tiny and
/// near-antipodal separations where acos loses precision.
#[inline]
pub fn unit_vector_separation_deg(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let cross = cross_product(a, b);
    vector_magnitude(&cross)
        .atan2(dot_product(a, b))
        .to_degrees()
}

/// Angular separation between two sky positions (Vincenty formula)
///
/// # Arguments
/// * `lon1_deg`, `lat1_deg` - First position in degrees
/// * `lon2_deg`, `lat2_deg` - Second position in degrees
///
/// # Returns
/// Separation in degrees, in [0, 180]
pub fn angular_separation_deg(lon1_deg: f64, lat1_deg: f64, lon2_deg: f64, lat2_deg: f64) -> f64 {
    let (sin_lat1, cos_lat1) = lat1_deg.to_radians().sin_cos();
    let (sin_lat2, cos_lat2) = lat2_deg.to_radians().sin_cos();
    let (sin_dlon, cos_dlon) = (lon2_deg - lon1_deg).to_radians().sin_cos();

    let num1 = cos_lat2 * sin_dlon;
    let num2 = cos_lat1 * sin_lat2 - sin_lat1 * cos_lat2 * cos_dlon;
    let denominator = sin_lat1 * sin_lat2 + cos_lat1 * cos_lat2 * cos_dlon;

    num1.hypot(num2).atan2(denominator).to_degrees()
}

// ============================================================================
// Vectorized batch operations
// ============================================================================

/// Angular separations between paired position series (element-wise)
///
/// All four views must have the same length; the result has that length.
pub fn angular_separations_paired(
    lons1_deg: ArrayView1<f64>,
    lats1_deg: ArrayView1<f64>,
    lons2_deg: ArrayView1<f64>,
    lats2_deg: ArrayView1<f64>,
) -> Array1<f64> {
    let mut result = Array1::<f64>::zeros(lons1_deg.len());
    ndarray::Zip::from(&mut result)
        .and(&lons1_deg)
        .and(&lats1_deg)
        .and(&lons2_deg)
        .and(&lats2_deg)
        .for_each(|out, &lon1, &lat1, &lon2, &lat2| {
            *out = angular_separation_deg(lon1, lat1, lon2, lat2);
        });
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separation_along_equator() {
        assert!((angular_separation_deg(0.0, 0.0, 10.0, 0.0) - 10.0).abs() < 1e-12);
        assert!((angular_separation_deg(-170.0, 0.0, 170.0, 0.0) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_separation_pole_and_antipode() {
        assert!((angular_separation_deg(45.0, 90.0, 0.0, 0.0) - 90.0).abs() < 1e-12);
        assert!((angular_separation_deg(0.0, 0.0, 180.0, 0.0) - 180.0).abs() < 1e-12);
        assert_eq!(angular_separation_deg(12.0, 34.0, 12.0, 34.0), 0.0);
    }

    #[test]
    fn test_unit_vector_separation_matches_vincenty() {
        let cases = [(0.0, 0.0, 3.0, 4.0), (100.0, -45.0, -60.0, 30.0), (10.0, 89.0, 190.0, 89.0)];
        for (lon1, lat1, lon2, lat2) in cases {
            let a = radec_to_unit_vector(lon1, lat1);
            let b = radec_to_unit_vector(lon2, lat2);
            let expected = angular_separation_deg(lon1, lat1, lon2, lat2);
            assert!((unit_vector_separation_deg(&a, &b) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_paired_separations() {
        let lons1 = Array1::from(vec![0.0, 0.0]);
        let lats1 = Array1::from(vec![0.0, 0.0]);
        let lons2 = Array1::from(vec![5.0, 0.0]);
        let lats2 = Array1::from(vec![0.0, -7.0]);
        let seps =
            angular_separations_paired(lons1.view(), lats1.view(), lons2.view(), lats2.view());
        assert!((seps[0] - 5.0).abs() < 1e-12);
        assert!((seps[1] - 7.0).abs() < 1e-12);
    }
}
