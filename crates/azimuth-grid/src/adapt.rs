//! Snapping particle loading bounds onto grid cell edges.

use crate::error::GridError;

/// Loading bounds aligned with cell edges and the resulting particle
/// count along one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadingRange {
    /// Lower loading bound.
    pub min: f64,
    /// Upper loading bound.
    pub max: f64,
    /// Number of particles along the axis.
    pub count: usize,
}

/// Align `[p_min, p_max]` with the cells centred on the points `x`.
///
/// Loading is clamped to start no lower than half a cell below the first
/// point and to stop `ncells_empty` cells short of the last one. The
/// count is `p_n` per grid point strictly inside the clamped interval;
/// when that is non-zero the bounds snap to the outer edges of the
/// selected cells. With nothing selected the clamped bounds are returned
/// unchanged with a zero count.
pub fn adapt_to_grid(
    x: &[f64],
    p_min: f64,
    p_max: f64,
    p_n: usize,
    ncells_empty: usize,
) -> Result<LoadingRange, GridError> {
    if x.len() < 2 {
        return Err(GridError::TooFewPoints { len: x.len() });
    }
    if let Some(index) = x.windows(2).position(|w| w[1] <= w[0]) {
        return Err(GridError::NotIncreasing { index: index + 1 });
    }

    let x_min = x[0];
    let x_max = x[x.len() - 1];
    let dx = x[1] - x[0];

    let p_min = p_min.max(x_min - 0.5 * dx);
    let p_max = p_max.min(x_max + (0.5 - ncells_empty as f64) * dx);

    let mut selected = x.iter().copied().filter(|&xi| xi > p_min && xi < p_max);
    let Some(first) = selected.next() else {
        return Ok(LoadingRange {
            min: p_min,
            max: p_max,
            count: 0,
        });
    };
    let (n, last) = selected.fold((1usize, first), |(n, _), xi| (n + 1, xi));

    Ok(LoadingRange {
        min: first - 0.5 * dx,
        max: last + 0.5 * dx,
        count: n * p_n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn centres(n: usize, xmin: f64, dx: f64) -> Vec<f64> {
        (0..n).map(|i| xmin + (i as f64 + 0.5) * dx).collect()
    }

    #[test]
    fn rejects_short_or_unsorted_grids() {
        assert_eq!(
            adapt_to_grid(&[1.0], 0.0, 1.0, 1, 0),
            Err(GridError::TooFewPoints { len: 1 })
        );
        assert_eq!(
            adapt_to_grid(&[0.0, 1.0, 1.0], 0.0, 1.0, 1, 0),
            Err(GridError::NotIncreasing { index: 2 })
        );
    }

    #[test]
    fn snaps_to_cell_edges() {
        let x = centres(10, 0.0, 1.0);
        let r = adapt_to_grid(&x, 2.2, 6.7, 2, 0).unwrap();
        assert_eq!(r.min, 2.0);
        assert_eq!(r.max, 7.0);
        assert_eq!(r.count, 10);
    }

    #[test]
    fn clamps_to_box_and_empty_cells() {
        let x = centres(10, 0.0, 1.0);
        let r = adapt_to_grid(&x, -5.0, 50.0, 1, 2).unwrap();
        assert_eq!(r.min, 0.0);
        assert_eq!(r.max, 8.0);
        assert_eq!(r.count, 8);
    }

    #[test]
    fn empty_selection_returns_clamped_bounds() {
        let x = centres(10, 0.0, 1.0);
        let r = adapt_to_grid(&x, 3.6, 4.4, 4, 0).unwrap();
        assert_eq!(r.count, 0);
        assert_eq!((r.min, r.max), (3.6, 4.4));
    }

    proptest! {
        #[test]
        fn snapping_is_idempotent(
            n in 2usize..64,
            dx in 0.01f64..10.0,
            a in -0.2f64..1.2,
            b in -0.2f64..1.2,
            p_n in 1usize..8,
            empty in 0usize..3,
        ) {
            let x = centres(n, -3.0, dx);
            let span = n as f64 * dx;
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            let first = adapt_to_grid(&x, -3.0 + lo * span, -3.0 + hi * span, p_n, empty).unwrap();
            prop_assume!(first.count > 0);
            let second = adapt_to_grid(&x, first.min, first.max, p_n, empty).unwrap();
            prop_assert_eq!(second.count, first.count);
            prop_assert!((second.min - first.min).abs() <= 1e-9 * dx);
            prop_assert!((second.max - first.max).abs() <= 1e-9 * dx);
        }

        #[test]
        fn doubling_density_doubles_count(
            n in 2usize..64,
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
            p_n in 1usize..8,
        ) {
            let x = centres(n, 0.0, 1.0);
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            let one = adapt_to_grid(&x, lo * n as f64, hi * n as f64, p_n, 0).unwrap();
            let two = adapt_to_grid(&x, lo * n as f64, hi * n as f64, 2 * p_n, 0).unwrap();
            prop_assert_eq!(two.count, 2 * one.count);
            prop_assert_eq!((two.min, two.max), (one.min, one.max));
        }
    }
}
