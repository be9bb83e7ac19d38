//! AAC packetization for RTP media delivery.
//!
//! Converts AAC access units into RTP wire frames ready for a UDP
//! transport:
//!
//! - [`config`]: decodes the MPEG-4 AudioSpecificConfig advertised in
//!   SDP, yielding the profile and media clock rate.
//! - [`rtp`]: the 12-byte fixed header of RFC 3550 and its wire codec.
//! - [`aac`]: the aac-hbr payload format of RFC 3640, one access unit
//!   per frame.
//!
//! Every frame carries a 12-byte fixed header ([`rtp::RtpHeader`])
//! containing:
//!
//! - **Sequence number** (16-bit, wrapping) — for reordering and loss detection.
//! - **Timestamp** (32-bit) — media clock at the stream's sampling rate.
//! - **SSRC** (32-bit) — randomly chosen to identify the sender.
//! - **Marker bit** — always set here, since one frame carries one whole
//!   access unit.

pub mod aac;
pub mod config;
pub mod rtp;
