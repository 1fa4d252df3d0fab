//! Typed peer messaging over a [`Transport`].

use tracing::{trace, warn};

use crate::codec::{decode_message, encode_message};
use crate::protocol::{PeerId, PeerMessage};
use crate::transport::Transport;
use crate::NetError;

/// Traffic counters for one link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Messages broadcast.
    pub sent: u64,
    /// Messages accepted.
    pub received: u64,
    /// Inbound frames that failed decoding or validation.
    pub rejected: u64,
    /// Encoded bytes broadcast.
    pub bytes_sent: u64,
}

/// Encodes outbound messages and validates inbound ones.
#[derive(Debug)]
pub struct PeerLink<T> {
    transport: T,
    stats: LinkStats,
}

impl<T: Transport> PeerLink<T> {
    /// Wrap a transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            stats: LinkStats::default(),
        }
    }

    /// Identifier of the local peer.
    pub fn local_peer(&self) -> PeerId {
        self.transport.local_peer()
    }

    /// Counters so far.
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Validate, encode and broadcast `msg` on its channel.
    pub fn send(&mut self, msg: &PeerMessage) -> Result<(), NetError> {
        msg.verify().map_err(NetError::Invalid)?;
        let frame = encode_message(msg)?;
        self.stats.sent += 1;
        self.stats.bytes_sent += frame.len() as u64;
        trace!(peer = self.local_peer(), channel = msg.channel().name(), "send");
        self.transport.broadcast(msg.channel(), frame);
        Ok(())
    }

    /// Drain and decode pending messages. Malformed frames are logged and
    /// skipped.
    pub fn receive(&mut self) -> Vec<(PeerId, PeerMessage)> {
        let mut accepted = Vec::new();
        for inbound in self.transport.poll() {
            let decoded = decode_message(&inbound.frame).and_then(|msg| {
                msg.verify().map_err(NetError::Invalid)?;
                if msg.channel() != inbound.channel {
                    return Err(NetError::ChannelMismatch {
                        tag: inbound.channel.name(),
                        message: msg.channel().name(),
                    });
                }
                Ok(msg)
            });
            match decoded {
                Ok(msg) => {
                    self.stats.received += 1;
                    accepted.push((inbound.from, msg));
                }
                Err(err) => {
                    self.stats.rejected += 1;
                    warn!(from = inbound.from, %err, "rejected inbound frame");
                }
            }
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelType;
    use crate::transport::LoopbackHub;

    #[test]
    fn messages_cross_the_hub() {
        let hub = LoopbackHub::new();
        let mut a = PeerLink::new(hub.connect(1));
        let mut b = PeerLink::new(hub.connect(2));

        let msg = PeerMessage::Leave { player: 1 };
        a.send(&msg).expect("send");
        assert_eq!(b.receive(), vec![(1, msg)]);
        assert_eq!(a.stats().sent, 1);
        assert_eq!(b.stats().received, 1);
    }

    #[test]
    fn invalid_outbound_is_refused() {
        let hub = LoopbackHub::new();
        let mut a = PeerLink::new(hub.connect(1));
        let msg = PeerMessage::PlayerState {
            player: 1,
            x: f32::INFINITY,
            y: 0.0,
            crouching: false,
        };
        assert!(matches!(a.send(&msg), Err(NetError::Invalid(_))));
        assert_eq!(a.stats().sent, 0);
    }

    #[test]
    fn garbage_frames_are_counted_and_skipped() {
        let hub = LoopbackHub::new();
        let mut raw = hub.connect(1);
        let mut b = PeerLink::new(hub.connect(2));
        raw.broadcast(ChannelType::VoxelDamage, vec![3, 0, 0, 0, 2, 0xFF, 0xFF]);
        raw.broadcast(
            ChannelType::VoxelDamage,
            encode_message(&PeerMessage::Leave { player: 1 }).expect("encode"),
        );
        assert!(b.receive().is_empty());
        assert_eq!(b.stats().rejected, 2);
    }
}
