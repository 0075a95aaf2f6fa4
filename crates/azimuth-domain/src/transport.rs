//! Point-to-point message transport between ranks.
//!
//! Exchanges are written as "send to both neighbours, then receive from
//! both", so sends must never block. Messages between one ordered pair
//! of ranks arrive in the order they were sent.

use std::collections::VecDeque;

use azimuth_core::ExchangeError;
use azimuth_grid::Complex64;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// One exchange payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// Guard-cell field values.
    Fields(Vec<Complex64>),
    /// Packed particle records.
    Particles(Vec<f64>),
}

impl Message {
    /// Short name used in error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fields(_) => "fields",
            Self::Particles(_) => "particles",
        }
    }
}

/// Connection from one rank to every other rank.
pub trait Transport: Send {
    /// Local rank.
    fn rank(&self) -> usize;

    /// Number of ranks.
    fn size(&self) -> usize;

    /// Queue `msg` for `peer` without blocking.
    fn send(&mut self, peer: usize, msg: Message) -> Result<(), ExchangeError>;

    /// Block until the next message from `peer` arrives.
    fn recv(&mut self, peer: usize) -> Result<Message, ExchangeError>;
}

// ── Loopback ───────────────────────────────────────────────────────

/// Single-rank transport; messages to rank 0 come straight back.
#[derive(Debug, Default)]
pub struct Loopback {
    queue: VecDeque<Message>,
}

impl Loopback {
    /// Empty loopback.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for Loopback {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn send(&mut self, peer: usize, msg: Message) -> Result<(), ExchangeError> {
        if peer != 0 {
            return Err(ExchangeError::Disconnected { rank: 0, peer });
        }
        self.queue.push_back(msg);
        Ok(())
    }

    fn recv(&mut self, peer: usize) -> Result<Message, ExchangeError> {
        if peer != 0 {
            return Err(ExchangeError::Disconnected { rank: 0, peer });
        }
        self.queue
            .pop_front()
            .ok_or(ExchangeError::Disconnected { rank: 0, peer: 0 })
    }
}

// ── ChannelTransport ───────────────────────────────────────────────

/// In-process transport linking ranks that run on separate threads.
///
/// Every ordered pair of ranks gets its own unbounded channel, so
/// messages from different peers never interleave.
#[derive(Debug)]
pub struct ChannelTransport {
    rank: usize,
    outbox: Vec<Sender<Message>>,
    inbox: Vec<Receiver<Message>>,
}

impl ChannelTransport {
    /// Create `size` connected endpoints, indexed by rank.
    pub fn cluster(size: usize) -> Vec<ChannelTransport> {
        // senders[from][to] and receivers[to][from] share one channel.
        let mut senders: Vec<Vec<Sender<Message>>> = Vec::with_capacity(size);
        let mut receivers: Vec<Vec<Receiver<Message>>> = (0..size).map(|_| Vec::new()).collect();
        for _from in 0..size {
            let mut row = Vec::with_capacity(size);
            for inbox in receivers.iter_mut() {
                let (tx, rx) = unbounded();
                row.push(tx);
                inbox.push(rx);
            }
            senders.push(row);
        }
        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (outbox, inbox))| ChannelTransport {
                rank,
                outbox,
                inbox,
            })
            .collect()
    }
}

impl Transport for ChannelTransport {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.outbox.len()
    }

    fn send(&mut self, peer: usize, msg: Message) -> Result<(), ExchangeError> {
        let rank = self.rank;
        self.outbox
            .get(peer)
            .ok_or(ExchangeError::Disconnected { rank, peer })?
            .send(msg)
            .map_err(|_| ExchangeError::Disconnected { rank, peer })
    }

    fn recv(&mut self, peer: usize) -> Result<Message, ExchangeError> {
        let rank = self.rank;
        self.inbox
            .get(peer)
            .ok_or(ExchangeError::Disconnected { rank, peer })?
            .recv()
            .map_err(|_| ExchangeError::Disconnected { rank, peer })
    }
}
