/// Separation strategies for sky-grid rendering
///
/// Both strategies compute the angular separation between one sky position
/// and every grid point; they differ only in how the work is carried out.
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use super::grid::SkyGrid;
use crate::ephemeris::SkyPosition;
use crate::utils::vector_math::{
    angular_separation_deg, radec_to_unit_vector, unit_vector_separation_deg,
};

/// Separation of one position from every grid point
pub trait SeparationStrategy: Send + Sync {
    /// Separations in degrees, shaped like the grid (n_lat, n_lon)
    fn separations(&self, grid: &SkyGrid, center: SkyPosition) -> Array2<f64>;

    fn name(&self) -> &'static str;
}

/// Strategy selector used in renderer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparationKind {
    #[default]
    Reference,
    Accelerated,
}

impl SeparationKind {
    pub fn strategy(self) -> Box<dyn SeparationStrategy> {
        match self {
            SeparationKind::Reference => Box::new(ReferenceSeparation),
            SeparationKind::Accelerated => Box::new(AcceleratedSeparation),
        }
    }
}

/// Element-wise Vincenty separation over the grid meshes
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceSeparation;

impl SeparationStrategy for ReferenceSeparation {
    fn separations(&self, grid: &SkyGrid, center: SkyPosition) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros(grid.shape());
        Zip::from(&mut out)
            .and(grid.lon_mesh())
            .and(grid.lat_mesh())
            .for_each(|sep, &lon, &lat| {
                *sep = angular_separation_deg(center.lon_deg, center.lat_deg, lon, lat);
            });
        out
    }

    fn name(&self) -> &'static str {
        "reference"
    }
}

/// Parallel separation over the grid's precomputed unit vectors
///
/// Uses atan2(|a×b|, a·b) on unit vectors and spreads grid rows over the
/// rayon thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceleratedSeparation;

impl SeparationStrategy for AcceleratedSeparation {
    fn separations(&self, grid: &SkyGrid, center: SkyPosition) -> Array2<f64> {
        let center_vec = radec_to_unit_vector(center.lon_deg, center.lat_deg);
        let mut out = Array2::<f64>::zeros(grid.shape());
        Zip::from(&mut out)
            .and(grid.unit_vectors())
            .par_for_each(|sep, point| {
                *sep = unit_vector_separation_deg(&center_vec, point);
            });
        out
    }

    fn name(&self) -> &'static str {
        "accelerated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategies_agree() {
        let grid = SkyGrid::new((73, 37)).unwrap();
        for center in [
            SkyPosition::new(0.0, 0.0),
            SkyPosition::new(123.4, -56.7),
            SkyPosition::new(-179.0, 89.0),
        ] {
            let reference = ReferenceSeparation.separations(&grid, center);
            let accelerated = AcceleratedSeparation.separations(&grid, center);
            assert_eq!(reference.shape(), accelerated.shape());
            for (a, b) in reference.iter().zip(accelerated.iter()) {
                assert!((a - b).abs() < 1e-9, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_reference_values_on_axes() {
        let grid = SkyGrid::new((5, 3)).unwrap();
        let seps = ReferenceSeparation.separations(&grid, SkyPosition::new(0.0, 0.0));
        // row 1 is the equator: lon -180, -90, 0, 90, 180
        assert!((seps[[1, 0]] - 180.0).abs() < 1e-12);
        assert!((seps[[1, 1]] - 90.0).abs() < 1e-12);
        assert_eq!(seps[[1, 2]], 0.0);
        assert!((seps[[0, 2]] - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_kind_selects_strategy() {
        assert_eq!(SeparationKind::default().strategy().name(), "reference");
        assert_eq!(SeparationKind::Accelerated.strategy().name(), "accelerated");
        let kind: SeparationKind = serde_json::from_str("\"accelerated\"").unwrap();
        assert_eq!(kind, SeparationKind::Accelerated);
    }
}
