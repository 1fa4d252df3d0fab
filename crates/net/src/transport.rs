//! Room broadcast transport.
//!
//! A room is a broadcast domain: every frame a peer sends reaches every other
//! connected peer, never the sender. The in-process [`LoopbackHub`] backs the
//! headless runner and the multi-peer tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, trace};

use crate::channel::ChannelType;
use crate::protocol::PeerId;

/// A frame received from another peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    /// Sending peer.
    pub from: PeerId,
    /// Channel the frame was broadcast on.
    pub channel: ChannelType,
    /// Encoded frame.
    pub frame: Vec<u8>,
}

/// Broadcast transport for one peer in a room.
pub trait Transport {
    /// Identifier of this peer.
    fn local_peer(&self) -> PeerId;

    /// Send `frame` to every other peer in the room.
    fn broadcast(&mut self, channel: ChannelType, frame: Vec<u8>);

    /// Drain frames received since the last poll, in arrival order.
    fn poll(&mut self) -> Vec<Inbound>;
}

/// Delivery counters for a hub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    /// Frames queued for a receiver.
    pub delivered: u64,
    /// Frames discarded by the simulated loss.
    pub dropped: u64,
}

#[derive(Debug)]
struct HubState {
    queues: BTreeMap<PeerId, VecDeque<Inbound>>,
    drop_rate: f64,
    rng: StdRng,
    stats: HubStats,
}

/// In-process broadcast room.
///
/// Cloning the hub yields another handle to the same room.
#[derive(Debug, Clone)]
pub struct LoopbackHub {
    state: Rc<RefCell<HubState>>,
}

impl Default for LoopbackHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackHub {
    /// Lossless room.
    pub fn new() -> Self {
        Self::lossy(0.0, 0)
    }

    /// Room that drops unreliable frames with probability `drop_rate`.
    ///
    /// Presence frames are never dropped.
    pub fn lossy(drop_rate: f64, seed: u64) -> Self {
        Self {
            state: Rc::new(RefCell::new(HubState {
                queues: BTreeMap::new(),
                drop_rate: drop_rate.clamp(0.0, 1.0),
                rng: StdRng::seed_from_u64(seed),
                stats: HubStats::default(),
            })),
        }
    }

    /// Join the room as `peer`. Reconnecting an existing id resets its queue.
    pub fn connect(&self, peer: PeerId) -> LoopbackPeer {
        self.state
            .borrow_mut()
            .queues
            .insert(peer, VecDeque::new());
        debug!(peer, "peer connected to loopback room");
        LoopbackPeer {
            peer,
            hub: self.clone(),
        }
    }

    /// Connected peers in id order.
    pub fn peers(&self) -> Vec<PeerId> {
        self.state.borrow().queues.keys().copied().collect()
    }

    /// Delivery counters so far.
    pub fn stats(&self) -> HubStats {
        self.state.borrow().stats
    }

    fn disconnect(&self, peer: PeerId) {
        self.state.borrow_mut().queues.remove(&peer);
        debug!(peer, "peer left loopback room");
    }

    fn broadcast(&self, from: PeerId, channel: ChannelType, frame: Vec<u8>) {
        let mut state = self.state.borrow_mut();
        let HubState {
            queues,
            drop_rate,
            rng,
            stats,
        } = &mut *state;
        for (&peer, queue) in queues.iter_mut() {
            if peer == from {
                continue;
            }
            if channel.is_unreliable() && *drop_rate > 0.0 && rng.gen_bool(*drop_rate) {
                stats.dropped += 1;
                trace!(from, to = peer, channel = channel.name(), "frame dropped");
                continue;
            }
            stats.delivered += 1;
            queue.push_back(Inbound {
                from,
                channel,
                frame: frame.clone(),
            });
        }
    }

    fn drain(&self, peer: PeerId) -> Vec<Inbound> {
        self.state
            .borrow_mut()
            .queues
            .get_mut(&peer)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }
}

/// One peer's handle into a [`LoopbackHub`]. Dropping it leaves the room.
#[derive(Debug)]
pub struct LoopbackPeer {
    peer: PeerId,
    hub: LoopbackHub,
}

impl Transport for LoopbackPeer {
    fn local_peer(&self) -> PeerId {
        self.peer
    }

    fn broadcast(&mut self, channel: ChannelType, frame: Vec<u8>) {
        self.hub.broadcast(self.peer, channel, frame);
    }

    fn poll(&mut self) -> Vec<Inbound> {
        self.hub.drain(self.peer)
    }
}

impl Drop for LoopbackPeer {
    fn drop(&mut self) {
        self.hub.disconnect(self.peer);
    }
}
