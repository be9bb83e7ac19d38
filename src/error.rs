//! Error types for the RTSP client media library.

use std::fmt;

/// Errors that can occur in the client media library.
///
/// Variants map to specific failure modes across the stack:
///
/// - **Transport**: [`Io`](Self::Io) — socket/network failures, including
///   the closed-endpoint condition after
///   [`close`](crate::UdpPeerListener::close);
///   [`PeerNotSet`](Self::PeerNotSet).
/// - **Configuration**: [`AudioConfig`](Self::AudioConfig),
///   [`InvalidPayloadType`](Self::InvalidPayloadType).
/// - **Packetization**: [`AccessUnitTooLarge`](Self::AccessUnitTooLarge).
/// - **Wire parsing**: [`Parse`](Self::Parse).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Underlying I/O or socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// [`write`](crate::UdpPeerListener::write) was called before the
    /// remote peer was learned via
    /// [`set_peer`](crate::UdpPeerListener::set_peer).
    #[error("remote peer not set")]
    PeerNotSet,

    /// Malformed or unsupported AAC configuration at packetizer
    /// construction. No packetizer instance is produced.
    #[error("invalid audio config: {kind}")]
    AudioConfig { kind: AudioConfigErrorKind },

    /// A single access unit exceeded the per-packet payload budget.
    /// Packetizer state is unchanged; the stream can continue with the
    /// next access unit.
    #[error("access unit too large: {size} bytes (max {max})")]
    AccessUnitTooLarge { size: usize, max: usize },

    /// Payload type does not fit the 7-bit dynamic RTP range (RFC 3551 §6).
    /// Carries the absolute payload type, after any dynamic-range offset.
    #[error("payload type {0} outside the dynamic RTP range")]
    InvalidPayloadType(u16),

    /// Failed to parse RTP wire data (RFC 3550 §5.1 / RFC 3640 §3).
    #[error("RTP parse error: {kind}")]
    Parse { kind: ParseErrorKind },
}

/// Specific kind of AAC configuration failure.
#[derive(Debug)]
pub enum AudioConfigErrorKind {
    /// Config ends before the fixed AudioSpecificConfig fields do.
    TooShort,
    /// Audio object type outside the known AAC profiles.
    UnsupportedObjectType(u8),
    /// Sampling frequency index 13 or 14 (reserved by ISO/IEC 14496-3).
    ReservedFrequencyIndex(u8),
}

impl fmt::Display for AudioConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "config too short"),
            Self::UnsupportedObjectType(t) => write!(f, "unsupported audio object type {t}"),
            Self::ReservedFrequencyIndex(i) => write!(f, "reserved sampling frequency index {i}"),
        }
    }
}

/// Specific kind of RTP wire-format parse failure.
#[derive(Debug)]
pub enum ParseErrorKind {
    /// Packet shorter than the 12-byte fixed header, or than its declared
    /// CSRC/extension/padding lengths.
    PacketTooShort,
    /// RTP version field was not 2.
    UnsupportedVersion(u8),
    /// Payload ends inside the AU-header-section.
    AuHeadersTruncated,
    /// AU-headers-length is zero or not a whole number of 16-bit headers.
    InvalidAuHeadersLength(u16),
    /// An AU-header declares more bytes than the payload carries.
    AuDataTruncated,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PacketTooShort => write!(f, "packet too short"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported RTP version {v}"),
            Self::AuHeadersTruncated => write!(f, "AU header section truncated"),
            Self::InvalidAuHeadersLength(bits) => {
                write!(f, "invalid AU-headers-length: {bits} bits")
            }
            Self::AuDataTruncated => write!(f, "AU data truncated"),
        }
    }
}

/// Convenience alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;
