//! Splitting the global `z` range into per-rank slabs.

use azimuth_core::{Boundaries, ConfigError};

/// Global geometry shared by all ranks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DomainDecomposition {
    /// Local rank.
    pub rank: usize,
    /// Number of ranks.
    pub size: usize,
    /// Global number of physical cells along `z`.
    pub nz_global: usize,
    /// Guard cells on each side of an interior boundary.
    pub n_guard: usize,
    /// Extra absorbing cells at an open global edge.
    pub n_damp: usize,
    /// Behaviour at the global edges.
    pub boundaries: Boundaries,
}

/// The slab owned by one rank, including guard and damping cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalDomain {
    /// Physical cells owned by this rank.
    pub nz_domain: usize,
    /// Index of the first owned cell in the global grid.
    pub iz_start: usize,
    /// Cells below the owned region.
    pub n_left: usize,
    /// Cells above the owned region.
    pub n_right: usize,
    /// Lower edge of the local grid, guards included.
    pub zmin: f64,
    /// Upper edge of the local grid, guards included.
    pub zmax: f64,
    /// Cell length.
    pub dz: f64,
    /// Length of the global physical box.
    pub global_length: f64,
    /// Lower loading bound clipped to the owned region.
    pub p_zmin: f64,
    /// Upper loading bound clipped to the owned region.
    pub p_zmax: f64,
}

impl LocalDomain {
    /// Total local cells, guards included.
    pub fn nz(&self) -> usize {
        self.n_left + self.nz_domain + self.n_right
    }
}

impl DomainDecomposition {
    /// Rank that receives particles and guard data across the lower
    /// edge. On a periodic box this wraps, possibly to this rank itself.
    pub fn left_peer(&self) -> Option<usize> {
        match (self.rank, self.boundaries) {
            (0, Boundaries::Open) => None,
            (0, Boundaries::Periodic) => Some(self.size - 1),
            (r, _) => Some(r - 1),
        }
    }

    /// Rank that receives particles and guard data across the upper
    /// edge.
    pub fn right_peer(&self) -> Option<usize> {
        if !self.is_last() {
            return Some(self.rank + 1);
        }
        match self.boundaries {
            Boundaries::Open => None,
            Boundaries::Periodic => Some(0),
        }
    }

    /// Whether this rank owns the lower global edge.
    pub fn is_first(&self) -> bool {
        self.rank == 0
    }

    /// Whether this rank owns the upper global edge.
    pub fn is_last(&self) -> bool {
        self.rank + 1 == self.size
    }

    /// Cells below the owned region of this rank.
    pub fn n_left(&self) -> usize {
        match (self.is_first(), self.boundaries) {
            (true, Boundaries::Open) => self.n_guard + self.n_damp,
            _ => self.n_guard,
        }
    }

    /// Cells above the owned region of this rank.
    pub fn n_right(&self) -> usize {
        match (self.is_last(), self.boundaries) {
            (true, Boundaries::Open) => self.n_guard + self.n_damp,
            _ => self.n_guard,
        }
    }

    /// Carve this rank's slab out of the global box `[zmin, zmax]` and
    /// clip the plasma bounds `[p_zmin, p_zmax]` to it.
    ///
    /// Each rank owns `nz_global / size` cells; the last rank also takes
    /// the remainder.
    pub fn divide(
        &self,
        zmin: f64,
        zmax: f64,
        p_zmin: f64,
        p_zmax: f64,
    ) -> Result<LocalDomain, ConfigError> {
        if self.size == 0 || self.rank >= self.size {
            return Err(ConfigError::InvalidDomain {
                reason: format!("rank {} out of range for {} ranks", self.rank, self.size),
            });
        }
        let per_rank = self.nz_global / self.size;
        if per_rank == 0 {
            return Err(ConfigError::InvalidDomain {
                reason: format!(
                    "{} cells cannot be split over {} ranks",
                    self.nz_global, self.size
                ),
            });
        }
        if self.size > 1 && per_rank < self.n_guard {
            return Err(ConfigError::InvalidDomain {
                reason: format!(
                    "{per_rank} cells per rank is fewer than the {} guard cells",
                    self.n_guard
                ),
            });
        }
        if zmin.is_nan() || zmax.is_nan() || zmax <= zmin {
            return Err(ConfigError::InvalidGrid {
                reason: format!("zmax ({zmax}) must exceed zmin ({zmin})"),
            });
        }

        let dz = (zmax - zmin) / self.nz_global as f64;
        let iz_start = self.rank * per_rank;
        let nz_domain = if self.is_last() {
            self.nz_global - iz_start
        } else {
            per_rank
        };
        let owned_min = zmin + iz_start as f64 * dz;
        let owned_max = owned_min + nz_domain as f64 * dz;
        let n_left = self.n_left();
        let n_right = self.n_right();

        Ok(LocalDomain {
            nz_domain,
            iz_start,
            n_left,
            n_right,
            zmin: owned_min - n_left as f64 * dz,
            zmax: owned_max + n_right as f64 * dz,
            dz,
            global_length: zmax - zmin,
            p_zmin: p_zmin.max(owned_min),
            p_zmax: p_zmax.min(owned_max),
        })
    }
}
