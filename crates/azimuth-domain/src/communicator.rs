//! Guard-cell and particle exchange between neighbouring domains.
//!
//! Every exchange follows the same two-phase protocol: pack both
//! outgoing payloads, send the upward one to the right peer and the
//! downward one to the left peer, then receive from the left peer and
//! from the right peer, in that order. With per-pair FIFO delivery this
//! pairs messages correctly even when both peers are the same rank.

use azimuth_core::{Boundaries, ConfigError, ExchangeError, ExchangeKind, StencilOrder};
use azimuth_grid::{Complex64, Component, InterpGrid};
use azimuth_particles::{ParticleArrays, Species};

use crate::decomposition::{DomainDecomposition, LocalDomain};
use crate::transport::{Message, Transport};
use crate::window::{MovingWindow, WindowConfig, WindowGeometry};

/// Cross-domain operations the step loop relies on.
pub trait Communicator: Send {
    /// Local rank.
    fn rank(&self) -> usize;

    /// Number of ranks.
    fn size(&self) -> usize;

    /// Guard cells at each interior boundary.
    fn n_guard(&self) -> usize;

    /// Absorbing cells added at open global edges.
    fn n_damp(&self) -> usize;

    /// Behaviour at the global edges.
    fn boundaries(&self) -> Boundaries;

    /// Compute this rank's slab of the global box.
    fn divide_into_domain(
        &mut self,
        zmin: f64,
        zmax: f64,
        p_zmin: f64,
        p_zmax: f64,
    ) -> Result<LocalDomain, ConfigError>;

    /// Synchronise guard cells of `kind` with the neighbours.
    fn exchange_fields(
        &mut self,
        grids: &mut [InterpGrid],
        kind: ExchangeKind,
    ) -> Result<(), ExchangeError>;

    /// Migrate particles that left the owned slab, drop those that left
    /// the global box, and refill cells exposed by the moving window.
    fn exchange_particles(
        &mut self,
        species: &mut dyn Species,
        grids: &[InterpGrid],
        time: f64,
    ) -> Result<(), ExchangeError>;

    /// Attenuate E and B in the guard and damping cells at open edges.
    fn damp_guard_eb(&mut self, grids: &mut [InterpGrid]);

    /// Advance the moving window, if any. Returns cells moved.
    fn move_grids(&mut self, grids: &mut [InterpGrid], dt: f64, time: f64) -> usize;

    /// Attach a moving window. `grid_v` is the drift velocity the grid
    /// boundaries already have (Galilean frame), or zero.
    fn set_moving_window(
        &mut self,
        config: &WindowConfig,
        grids: &[InterpGrid],
        grid_v: f64,
        exchange_period: u64,
        dt: f64,
        time: f64,
    ) -> Result<(), ConfigError>;

    /// The moving window, if attached.
    fn moving_window(&self) -> Option<&MovingWindow>;

    /// Mutable moving window, if attached.
    fn moving_window_mut(&mut self) -> Option<&mut MovingWindow>;
}

// ── BoundaryCommunicator ───────────────────────────────────────────

/// [`Communicator`] over any [`Transport`].
#[derive(Debug)]
pub struct BoundaryCommunicator<T: Transport> {
    transport: T,
    decomp: DomainDecomposition,
    stencil: StencilOrder,
    window: Option<MovingWindow>,
}

impl<T: Transport> BoundaryCommunicator<T> {
    /// Communicator for a box of `nz_global` cells.
    ///
    /// Without an explicit `n_guard` the guard width follows the
    /// stencil order. A single periodic rank never needs guard cells.
    pub fn new(
        transport: T,
        nz_global: usize,
        n_guard: Option<usize>,
        stencil: StencilOrder,
        n_damp: usize,
        boundaries: Boundaries,
    ) -> Self {
        let (rank, size) = (transport.rank(), transport.size());
        let n_guard = if size == 1 && boundaries == Boundaries::Periodic {
            0
        } else {
            n_guard.unwrap_or_else(|| stencil.default_guard_cells())
        };
        Self {
            transport,
            decomp: DomainDecomposition {
                rank,
                size,
                nz_global,
                n_guard,
                n_damp,
                boundaries,
            },
            stencil,
            window: None,
        }
    }

    /// Global decomposition parameters.
    pub fn decomposition(&self) -> &DomainDecomposition {
        &self.decomp
    }

    /// Stencil order the guard width was derived from.
    pub fn stencil(&self) -> StencilOrder {
        self.stencil
    }

    /// Physical (owned) extent of the local grid right now.
    fn owned_bounds(&self, grid: &InterpGrid) -> (f64, f64) {
        let dz = grid.dz();
        (
            grid.zmin() + self.decomp.n_left() as f64 * dz,
            grid.zmax() - self.decomp.n_right() as f64 * dz,
        )
    }

    fn send_both(
        &mut self,
        upward: Option<Message>,
        downward: Option<Message>,
    ) -> Result<(Option<Message>, Option<Message>), ExchangeError> {
        let left = self.decomp.left_peer();
        let right = self.decomp.right_peer();
        if let (Some(peer), Some(msg)) = (right, upward) {
            self.transport.send(peer, msg)?;
        }
        if let (Some(peer), Some(msg)) = (left, downward) {
            self.transport.send(peer, msg)?;
        }
        let from_left = left.map(|p| self.transport.recv(p)).transpose()?;
        let from_right = right.map(|p| self.transport.recv(p)).transpose()?;
        Ok((from_left, from_right))
    }
}

fn components(kind: ExchangeKind) -> &'static [Component] {
    match kind {
        ExchangeKind::EB => &Component::EB,
        ExchangeKind::Rho => &[Component::Rho],
        ExchangeKind::J => &Component::J,
    }
}

fn pack_rows(grids: &[InterpGrid], comps: &[Component], iz: usize, rows: usize) -> Vec<Complex64> {
    let mut out = Vec::new();
    for grid in grids {
        for &c in comps {
            out.extend_from_slice(grid.slab(c, iz, rows));
        }
    }
    out
}

fn unpack_rows(
    grids: &mut [InterpGrid],
    comps: &[Component],
    iz: usize,
    rows: usize,
    data: &[Complex64],
    additive: bool,
    peer: usize,
) -> Result<(), ExchangeError> {
    let per_slab = rows * grids.first().map_or(0, |g| g.nr());
    let expected = per_slab * comps.len() * grids.len();
    if data.len() != expected {
        return Err(ExchangeError::PayloadMismatch {
            peer,
            expected,
            found: data.len(),
        });
    }
    let mut chunks = data.chunks_exact(per_slab.max(1));
    for grid in grids.iter_mut() {
        for &c in comps {
            let Some(src) = chunks.next() else {
                return Ok(());
            };
            let dst = grid.slab_mut(c, iz, rows);
            if additive {
                for (d, s) in dst.iter_mut().zip(src) {
                    *d += *s;
                }
            } else {
                dst.copy_from_slice(src);
            }
        }
    }
    Ok(())
}

fn field_payload(msg: Message, peer: usize) -> Result<Vec<Complex64>, ExchangeError> {
    match msg {
        Message::Fields(v) => Ok(v),
        Message::Particles(_) => Err(ExchangeError::UnexpectedMessage {
            peer,
            expected: "fields",
        }),
    }
}

fn particle_payload(msg: Message, peer: usize) -> Result<ParticleArrays, ExchangeError> {
    match msg {
        Message::Particles(v) => {
            ParticleArrays::from_packed(&v).map_err(|_| ExchangeError::PayloadMismatch {
                peer,
                expected: v.len() / ParticleArrays::PACKED_WIDTH * ParticleArrays::PACKED_WIDTH,
                found: v.len(),
            })
        }
        Message::Fields(_) => Err(ExchangeError::UnexpectedMessage {
            peer,
            expected: "particles",
        }),
    }
}

/// `sin^2` ramp rising from the outer edge of the damping region.
fn damping_factor(i: usize, n_damp: usize) -> f64 {
    let s = (0.5 * std::f64::consts::PI * (i as f64 + 0.5) / n_damp as f64).sin();
    s * s
}

impl<T: Transport> Communicator for BoundaryCommunicator<T> {
    fn rank(&self) -> usize {
        self.decomp.rank
    }

    fn size(&self) -> usize {
        self.decomp.size
    }

    fn n_guard(&self) -> usize {
        self.decomp.n_guard
    }

    fn n_damp(&self) -> usize {
        self.decomp.n_damp
    }

    fn boundaries(&self) -> Boundaries {
        self.decomp.boundaries
    }

    fn divide_into_domain(
        &mut self,
        zmin: f64,
        zmax: f64,
        p_zmin: f64,
        p_zmax: f64,
    ) -> Result<LocalDomain, ConfigError> {
        self.decomp.divide(zmin, zmax, p_zmin, p_zmax)
    }

    fn exchange_fields(
        &mut self,
        grids: &mut [InterpGrid],
        kind: ExchangeKind,
    ) -> Result<(), ExchangeError> {
        let ng = self.decomp.n_guard;
        let Some(nz) = grids.first().map(InterpGrid::nz) else {
            return Ok(());
        };
        if ng == 0 {
            return Ok(());
        }
        let comps = components(kind);
        let additive = kind.is_additive();

        // (first row sent up, first row sent down, rows, first row
        //  written from below, first row written from above)
        let (up, down, rows, from_below, from_above) = if additive {
            (nz - 2 * ng, 0, 2 * ng, 0, nz - 2 * ng)
        } else {
            (nz - 2 * ng, ng, ng, 0, nz - ng)
        };

        let upward = Message::Fields(pack_rows(grids, comps, up, rows));
        let downward = Message::Fields(pack_rows(grids, comps, down, rows));
        let (from_left, from_right) = self.send_both(Some(upward), Some(downward))?;

        if let (Some(msg), Some(peer)) = (from_left, self.decomp.left_peer()) {
            let data = field_payload(msg, peer)?;
            unpack_rows(grids, comps, from_below, rows, &data, additive, peer)?;
        }
        if let (Some(msg), Some(peer)) = (from_right, self.decomp.right_peer()) {
            let data = field_payload(msg, peer)?;
            unpack_rows(grids, comps, from_above, rows, &data, additive, peer)?;
        }
        Ok(())
    }

    fn exchange_particles(
        &mut self,
        species: &mut dyn Species,
        grids: &[InterpGrid],
        time: f64,
    ) -> Result<(), ExchangeError> {
        let Some(grid) = grids.first() else {
            return Ok(());
        };
        let (lo, hi) = self.owned_bounds(grid);
        let global_length = self.decomp.nz_global as f64 * grid.dz();

        let arrays = species.arrays_mut();
        let mut downward = arrays.split_off_where(|z| z < lo);
        let mut upward = arrays.split_off_where(|z| z >= hi);
        let (n_down, n_up) = (downward.len(), upward.len());

        // Crossing a periodic global edge re-enters at the far end.
        if self.decomp.is_last() {
            upward.translate_z(-global_length);
        }
        if self.decomp.is_first() {
            downward.translate_z(global_length);
        }

        let mut dropped = 0;
        if self.decomp.right_peer().is_none() {
            dropped += n_up;
        }
        if self.decomp.left_peer().is_none() {
            dropped += n_down;
        }

        let (from_left, from_right) = self.send_both(
            Some(Message::Particles(upward.to_packed())),
            Some(Message::Particles(downward.to_packed())),
        )?;

        let mut received = 0;
        for (msg, peer) in [
            (from_left, self.decomp.left_peer()),
            (from_right, self.decomp.right_peer()),
        ] {
            if let (Some(msg), Some(peer)) = (msg, peer) {
                let incoming = particle_payload(msg, peer)?;
                received += incoming.len();
                species.arrays_mut().extend(incoming);
            }
        }

        let injected = match self.window.as_mut() {
            Some(w) => w.inject(species, hi, time),
            None => 0,
        };

        if n_down + n_up + received + injected > 0 {
            species.set_sorted(false);
        }
        log::debug!(
            "rank {}: {} sent {}, received {received}, dropped {dropped}, injected {injected}",
            self.decomp.rank,
            species.name(),
            n_down + n_up - dropped,
        );
        Ok(())
    }

    fn damp_guard_eb(&mut self, grids: &mut [InterpGrid]) {
        if self.decomp.boundaries != Boundaries::Open {
            return;
        }
        let ng = self.decomp.n_guard;
        let nd = self.decomp.n_damp;
        for grid in grids.iter_mut() {
            let nz = grid.nz();
            if self.decomp.is_first() {
                for iz in 0..ng.min(nz) {
                    grid.scale_eb_row(iz, 0.0);
                }
                for i in 0..nd {
                    if ng + i < nz {
                        grid.scale_eb_row(ng + i, damping_factor(i, nd));
                    }
                }
            }
            if self.decomp.is_last() {
                for iz in nz.saturating_sub(ng)..nz {
                    grid.scale_eb_row(iz, 0.0);
                }
                for i in 0..nd {
                    if let Some(iz) = nz.checked_sub(ng + 1 + i) {
                        grid.scale_eb_row(iz, damping_factor(i, nd));
                    }
                }
            }
        }
    }

    fn move_grids(&mut self, grids: &mut [InterpGrid], dt: f64, _time: f64) -> usize {
        match self.window.as_mut() {
            Some(w) => w.move_grids(grids, dt),
            None => 0,
        }
    }

    fn set_moving_window(
        &mut self,
        config: &WindowConfig,
        grids: &[InterpGrid],
        grid_v: f64,
        exchange_period: u64,
        dt: f64,
        time: f64,
    ) -> Result<(), ConfigError> {
        if self.decomp.boundaries == Boundaries::Periodic {
            return Err(ConfigError::WindowRequiresOpenBoundaries);
        }
        let grid = grids.first().ok_or_else(|| ConfigError::InvalidWindow {
            reason: "no field grid to attach to".into(),
        })?;
        let geometry = WindowGeometry {
            n_right: self.decomp.n_right(),
            is_last: self.decomp.is_last(),
        };
        self.window = Some(MovingWindow::new(
            config,
            grid,
            geometry,
            grid_v,
            exchange_period,
            dt,
            time,
        )?);
        Ok(())
    }

    fn moving_window(&self) -> Option<&MovingWindow> {
        self.window.as_ref()
    }

    fn moving_window_mut(&mut self) -> Option<&mut MovingWindow> {
        self.window.as_mut()
    }
}
