use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

use crate::error::{ClientError, Result};
use crate::transport::buffer::BufferPool;

/// Per-buffer capacity. One UDP datagram carrying one RTP frame fits
/// comfortably; anything larger would exceed a typical path MTU anyway.
const READ_BUFFER_CAPACITY: usize = 2048;

/// How often a blocked receive rechecks the closed flag.
const READ_POLL_INTERVAL: Duration = Duration::from_millis(50);

fn closed_error() -> ClientError {
    ClientError::Io(io::Error::new(
        io::ErrorKind::NotConnected,
        "listener closed",
    ))
}

/// Shareable side of a [`UdpPeerListener`]: sending, peer management,
/// and shutdown.
///
/// Clones are cheap (a few `Arc`s) and safe to move across threads. The
/// usual arrangement is one thread blocked in
/// [`UdpPeerListener::read`] while a handle held elsewhere writes
/// outbound datagrams or closes the listener to end the session.
/// Concurrent `write` calls are not internally serialized; callers
/// sharing a handle across writers must serialize themselves.
#[derive(Clone)]
pub struct UdpPeerHandle {
    socket: Arc<UdpSocket>,
    peer: Arc<RwLock<Option<SocketAddr>>>,
    closed: Arc<AtomicBool>,
}

impl UdpPeerHandle {
    /// Record the single remote endpoint this listener exchanges
    /// datagrams with.
    ///
    /// The peer is late-bound but write-once: it is typically learned
    /// shortly after construction, when transport negotiation completes
    /// elsewhere, and stays fixed for the session. A second call is
    /// ignored. Matching is exact `SocketAddr` equality, which covers
    /// address, port, and the IPv6 scope id.
    pub fn set_peer(&self, peer: SocketAddr) {
        let mut slot = self.peer.write();
        if let Some(existing) = *slot {
            tracing::warn!(%existing, rejected = %peer, "remote peer already set");
            return;
        }
        *slot = Some(peer);
        tracing::debug!(%peer, "remote peer set");
    }

    /// The expected remote endpoint, if already learned.
    pub fn peer(&self) -> Option<SocketAddr> {
        *self.peer.read()
    }

    /// Local address of the bound socket.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Send one datagram to the expected peer.
    ///
    /// No retry and no fragmentation: callers must keep payloads under
    /// the path MTU. Fails with [`ClientError::PeerNotSet`] before the
    /// peer is learned, and with the closed-endpoint I/O error after
    /// [`close`](Self::close).
    pub fn write(&self, payload: &[u8]) -> Result<usize> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(closed_error());
        }
        let peer = self.peer().ok_or(ClientError::PeerNotSet)?;
        Ok(self.socket.send_to(payload, peer)?)
    }

    /// Shut the listener down.
    ///
    /// A read blocked on the listener unblocks with an error within the
    /// poll interval; subsequent reads and writes fail immediately. The
    /// socket itself is released once the listener and every handle
    /// clone have been dropped.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("UDP peer listener closed");
        }
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// UDP endpoint dedicated to a single remote peer.
///
/// Owns one bound socket and a ring of reusable read buffers. The
/// receive path accepts datagrams only from the expected peer; traffic
/// from any other source is routine noise during a media session (stray
/// relay packets, NAT keepalives, spoofing) and is discarded without
/// surfacing an error.
///
/// ## Buffer ownership
///
/// [`read`](Self::read) returns a slice into the listener's own buffer
/// ring, sized to the received datagram. The borrow is tied to the
/// listener, so the datagram must be consumed or copied out before the
/// next call on the listener. This is the contract that lets the ring
/// rotate without copying.
pub struct UdpPeerListener {
    shared: UdpPeerHandle,
    read_buffers: BufferPool,
}

impl UdpPeerListener {
    /// Bind `0.0.0.0:port` with `read_buffer_count` reusable read
    /// buffers. Fails if the port is unavailable.
    pub fn bind(port: u16, read_buffer_count: usize) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port))?;
        Self::from_socket(socket, read_buffer_count)
    }

    /// Wrap an already-bound socket.
    ///
    /// For callers with their own socket policy (specific interface,
    /// IPv6, port-pair allocation). The listener takes exclusive
    /// ownership and installs its internal read timeout; per-call read
    /// deadlines are not supported, [`close`](Self::close) is the
    /// cancellation primitive.
    pub fn from_socket(socket: UdpSocket, read_buffer_count: usize) -> Result<Self> {
        socket.set_read_timeout(Some(READ_POLL_INTERVAL))?;
        let local_addr = socket.local_addr()?;
        tracing::debug!(%local_addr, read_buffer_count, "UDP peer listener bound");

        Ok(Self {
            shared: UdpPeerHandle {
                socket: Arc::new(socket),
                peer: Arc::new(RwLock::new(None)),
                closed: Arc::new(AtomicBool::new(false)),
            },
            read_buffers: BufferPool::new(read_buffer_count, READ_BUFFER_CAPACITY),
        })
    }

    /// A cloneable handle for writing and shutdown from other threads.
    pub fn handle(&self) -> UdpPeerHandle {
        self.shared.clone()
    }

    /// Receive the next datagram from the expected peer. Blocks.
    ///
    /// Datagrams from any other source, or arriving before the peer is
    /// set, are discarded and the receive continues; mismatches never
    /// surface as errors. The call ends only with a matching datagram,
    /// an I/O failure from the socket, or the closed-endpoint error
    /// after [`close`](Self::close).
    ///
    /// The returned slice borrows one slot of the listener's buffer
    /// ring and is valid until the listener is used again.
    pub fn read(&mut self) -> Result<&[u8]> {
        let slot = self.read_buffers.acquire();
        let len = loop {
            if self.shared.closed.load(Ordering::SeqCst) {
                return Err(closed_error());
            }

            let buf = self.read_buffers.get_mut(slot);
            let (len, source) = match self.shared.socket.recv_from(buf) {
                Ok(received) => received,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            match *self.shared.peer.read() {
                Some(peer) if peer == source => break len,
                _ => {
                    tracing::trace!(%source, len, "discarding datagram from unexpected source");
                }
            }
        };

        Ok(&self.read_buffers.get(slot)[..len])
    }

    /// Send one datagram to the expected peer.
    pub fn write(&self, payload: &[u8]) -> Result<usize> {
        self.shared.write(payload)
    }

    /// Record the single remote endpoint; write-once.
    pub fn set_peer(&self, peer: SocketAddr) {
        self.shared.set_peer(peer);
    }

    /// The expected remote endpoint, if already learned.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.shared.peer()
    }

    /// Local address of the bound socket.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.shared.local_addr()
    }

    /// Shut the listener down; see [`UdpPeerHandle::close`].
    pub fn close(&self) {
        self.shared.close();
    }

    /// Whether the listener has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind_listener() -> UdpPeerListener {
        UdpPeerListener::bind(0, 2).expect("bind listener")
    }

    #[test]
    fn peer_is_write_once() {
        let listener = bind_listener();
        let first: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let second: SocketAddr = "127.0.0.1:9001".parse().unwrap();
        listener.set_peer(first);
        listener.set_peer(second);
        assert_eq!(listener.peer(), Some(first));
    }

    #[test]
    fn write_without_peer_fails() {
        let listener = bind_listener();
        assert!(matches!(
            listener.write(b"x").unwrap_err(),
            ClientError::PeerNotSet
        ));
    }

    #[test]
    fn closed_listener_rejects_io() {
        let mut listener = bind_listener();
        listener.set_peer("127.0.0.1:9000".parse().unwrap());
        listener.close();
        assert!(listener.is_closed());
        assert!(matches!(listener.read().unwrap_err(), ClientError::Io(_)));
        assert!(matches!(
            listener.write(b"x").unwrap_err(),
            ClientError::Io(_)
        ));
    }

    #[test]
    fn handle_shares_state() {
        let listener = bind_listener();
        let handle = listener.handle();
        handle.set_peer("127.0.0.1:9000".parse().unwrap());
        assert_eq!(listener.peer(), handle.peer());
        handle.close();
        assert!(listener.is_closed());
    }

    #[test]
    fn bind_reports_local_addr() {
        let listener = bind_listener();
        let addr = listener.local_addr().expect("local addr");
        assert_ne!(addr.port(), 0);
    }
}
