/// Fixed angular sample grid over the whole sky
use std::sync::Arc;

use ndarray::{Array1, Array2};
use once_cell::sync::Lazy;

use crate::error::{Result, VisibilityError};
use crate::utils::config::DEFAULT_GRID_NPIX;
use crate::utils::vector_math::radec_to_unit_vector;

static DEFAULT_GRID: Lazy<Arc<SkyGrid>> = Lazy::new(|| Arc::new(SkyGrid::build(DEFAULT_GRID_NPIX)));

/// Sky grid sampling longitude over [-180°, 180°] and latitude over [-90°, 90°]
///
/// Grid arrays have shape (n_lat, n_lon): rows run along latitude, columns
/// along longitude.
#[derive(Debug, Clone)]
pub struct SkyGrid {
    lon_deg: Array1<f64>,
    lat_deg: Array1<f64>,
    lon_mesh: Array2<f64>,
    lat_mesh: Array2<f64>,
    unit_vectors: Array2<[f64; 3]>,
}

impl SkyGrid {
    /// Grid with `npix = (longitude samples, latitude samples)`
    ///
    /// # Errors
    /// `InvalidConfiguration` if either dimension has fewer than two samples.
    pub fn new(npix: (usize, usize)) -> Result<Self> {
        if npix.0 < 2 || npix.1 < 2 {
            return Err(VisibilityError::InvalidConfiguration(format!(
                "sky grid needs at least 2 samples per axis, got {npix:?}"
            )));
        }
        Ok(Self::build(npix))
    }

    /// Grid for `npix`, reusing the cached default-resolution grid when possible
    pub fn shared(npix: (usize, usize)) -> Result<Arc<Self>> {
        if npix == DEFAULT_GRID_NPIX {
            Ok(Arc::clone(&DEFAULT_GRID))
        } else {
            Ok(Arc::new(Self::new(npix)?))
        }
    }

    fn build((n_lon, n_lat): (usize, usize)) -> Self {
        let lon_deg = Array1::linspace(-180.0, 180.0, n_lon);
        let lat_deg = Array1::linspace(-90.0, 90.0, n_lat);
        let lon_mesh = Array2::from_shape_fn((n_lat, n_lon), |(_, j)| lon_deg[j]);
        let lat_mesh = Array2::from_shape_fn((n_lat, n_lon), |(i, _)| lat_deg[i]);
        let unit_vectors = Array2::from_shape_fn((n_lat, n_lon), |(i, j)| {
            radec_to_unit_vector(lon_deg[j], lat_deg[i])
        });
        SkyGrid {
            lon_deg,
            lat_deg,
            lon_mesh,
            lat_mesh,
            unit_vectors,
        }
    }

    /// Bitmap shape (n_lat, n_lon)
    pub fn shape(&self) -> (usize, usize) {
        (self.lat_deg.len(), self.lon_deg.len())
    }

    pub fn n_points(&self) -> usize {
        self.unit_vectors.len()
    }

    pub fn lon_deg(&self) -> &Array1<f64> {
        &self.lon_deg
    }

    pub fn lat_deg(&self) -> &Array1<f64> {
        &self.lat_deg
    }

    pub fn lon_mesh(&self) -> &Array2<f64> {
        &self.lon_mesh
    }

    pub fn lat_mesh(&self) -> &Array2<f64> {
        &self.lat_mesh
    }

    /// Unit vector of every grid point
    pub fn unit_vectors(&self) -> &Array2<[f64; 3]> {
        &self.unit_vectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_axes_and_shape() {
        let grid = SkyGrid::new((5, 3)).unwrap();
        assert_eq!(grid.shape(), (3, 5));
        assert_eq!(grid.n_points(), 15);
        assert_eq!(grid.lon_deg().to_vec(), vec![-180.0, -90.0, 0.0, 90.0, 180.0]);
        assert_eq!(grid.lat_deg().to_vec(), vec![-90.0, 0.0, 90.0]);
        assert_eq!(grid.lon_mesh()[[2, 3]], 90.0);
        assert_eq!(grid.lat_mesh()[[2, 3]], 90.0);
    }

    #[test]
    fn test_default_grid_is_shared() {
        let a = SkyGrid::shared(DEFAULT_GRID_NPIX).unwrap();
        let b = SkyGrid::shared(DEFAULT_GRID_NPIX).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.shape(), (361, 721));
    }

    #[test]
    fn test_degenerate_grid_rejected() {
        assert!(SkyGrid::new((1, 10)).is_err());
        assert!(SkyGrid::shared((10, 0)).is_err());
    }
}
