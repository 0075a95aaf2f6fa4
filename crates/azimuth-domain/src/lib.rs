//! Domain decomposition and inter-domain exchange for the azimuth
//! particle-in-cell engine.
//!
//! The global box is cut along `z` into one slab per rank. Each slab is
//! padded with guard cells that mirror (E, B) or share (rho, J) the
//! neighbours' data, plus absorbing cells at open global edges. The
//! [`Communicator`] trait is what the step loop drives;
//! [`BoundaryCommunicator`] implements it over any [`Transport`].
//!
//! Also home to the [`MovingWindow`] and the [`BoostConverter`] used to
//! set up boosted-frame runs.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boost;
pub mod communicator;
pub mod decomposition;
pub mod transport;
pub mod window;

pub use boost::BoostConverter;
pub use communicator::{BoundaryCommunicator, Communicator};
pub use decomposition::{DomainDecomposition, LocalDomain};
pub use transport::{ChannelTransport, Loopback, Message, Transport};
pub use window::{MovingWindow, WindowConfig, WindowGeometry};
