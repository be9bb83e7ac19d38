//! UDP transport for RTP media.
//!
//! An RTSP client negotiates a pair of UDP ports per stream and then
//! exchanges datagrams with exactly one server endpoint. [`udp`]
//! provides that socket: reads are filtered down to the single expected
//! peer, and read buffers come from a fixed ring ([`buffer`]) so
//! steady-state traffic allocates nothing.

pub mod buffer;
pub mod udp;

pub use udp::{UdpPeerHandle, UdpPeerListener};
