use std::time::Duration;

use rand::RngExt;

use crate::error::{ClientError, ParseErrorKind, Result};
use crate::media::config::AudioSpecificConfig;
use crate::media::rtp::{RtpHeader, RtpPacket};

/// First payload type of the dynamic range (RFC 3551 §6).
pub const DYNAMIC_PAYLOAD_TYPE_BASE: u8 = 96;

/// Largest access unit that still fits a single packet on a standard
/// 1500-byte Ethernet path: 1500 minus 20 (IP) minus 8 (UDP) minus 12
/// (RTP header).
pub const MAX_ACCESS_UNIT_SIZE: usize = 1460;

/// AU-headers-length value for exactly one AU-header per packet:
/// 13-bit AU-size plus 3-bit AU-index (RFC 3640 §3.2.1).
const AU_HEADERS_LENGTH_BITS: u16 = 16;

/// Packs AAC access units into RTP frames using the aac-hbr mode of
/// RFC 3640.
///
/// Every access unit becomes exactly one frame:
///
/// ```text
/// +--------------+----------------+--------------+
/// | RTP header   | AU-header-     | access unit  |
/// | (12 bytes)   | section (4 B)  |              |
/// +--------------+----------------+--------------+
/// ```
///
/// Sequence number, SSRC, and the initial timestamp are randomized at
/// construction (RFC 3550 §8.1). The media clock starts at the
/// presentation time of the first access unit; later timestamps are
/// derived from the distance to that origin at the stream's sampling
/// rate.
pub struct AacPacketizer {
    payload_type: u8,
    clock_rate: u32,
    ssrc: u32,
    sequence_number: u16,
    initial_timestamp: u32,
    session_start: Option<Duration>,
}

impl AacPacketizer {
    /// Build a packetizer for the stream described by `audio_config`,
    /// the raw AudioSpecificConfig bytes from the SDP `fmtp` line.
    ///
    /// `relative_payload_type` is an offset into the dynamic payload
    /// type range; 0 maps to payload type 96.
    pub fn new(relative_payload_type: u8, audio_config: &[u8]) -> Result<Self> {
        if relative_payload_type > 0x7F - DYNAMIC_PAYLOAD_TYPE_BASE {
            return Err(ClientError::InvalidPayloadType(
                u16::from(DYNAMIC_PAYLOAD_TYPE_BASE) + u16::from(relative_payload_type),
            ));
        }
        let config = AudioSpecificConfig::parse(audio_config)?;

        let mut rng = rand::rng();
        let packetizer = Self {
            payload_type: DYNAMIC_PAYLOAD_TYPE_BASE + relative_payload_type,
            clock_rate: config.sampling_frequency,
            ssrc: rng.random::<u32>(),
            sequence_number: rng.random::<u16>(),
            initial_timestamp: rng.random::<u32>(),
            session_start: None,
        };
        tracing::debug!(
            payload_type = packetizer.payload_type,
            clock_rate = packetizer.clock_rate,
            ssrc = packetizer.ssrc,
            profile = %config.profile,
            "AAC packetizer ready"
        );
        Ok(packetizer)
    }

    /// Pack one access unit presented at `pts` into RTP wire frames.
    ///
    /// Returns a single marshalled frame per call. An access unit
    /// larger than [`MAX_ACCESS_UNIT_SIZE`] is rejected before any
    /// state changes, so the caller may drop it and keep going.
    pub fn packetize(&mut self, access_unit: &[u8], pts: Duration) -> Result<Vec<Vec<u8>>> {
        if access_unit.len() > MAX_ACCESS_UNIT_SIZE {
            return Err(ClientError::AccessUnitTooLarge {
                size: access_unit.len(),
                max: MAX_ACCESS_UNIT_SIZE,
            });
        }

        let start = match self.session_start {
            Some(start) => start,
            None => {
                tracing::debug!(?pts, "media clock started at first access unit");
                *self.session_start.insert(pts)
            }
        };

        let mut payload = Vec::with_capacity(4 + access_unit.len());
        payload.extend_from_slice(&AU_HEADERS_LENGTH_BITS.to_be_bytes());
        // 13-bit AU-size; the low 3 bits are the AU-index, zero for the
        // first (and only) unit of the packet.
        payload.extend_from_slice(&((access_unit.len() as u16) << 3).to_be_bytes());
        payload.extend_from_slice(access_unit);

        let packet = RtpPacket {
            header: RtpHeader {
                payload_type: self.payload_type,
                // each packet carries a whole access unit
                marker: true,
                sequence_number: self.sequence_number,
                timestamp: self.rtp_timestamp(start, pts),
                ssrc: self.ssrc,
            },
            payload,
        };

        let frame = packet.marshal()?;
        self.sequence_number = self.sequence_number.wrapping_add(1);
        Ok(vec![frame])
    }

    /// Payload type carried by every emitted frame.
    pub fn payload_type(&self) -> u8 {
        self.payload_type
    }

    /// Media clock rate in Hz, taken from the AudioSpecificConfig.
    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    /// Synchronization source identifier of this stream.
    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    /// Sequence number the next frame will carry.
    pub fn next_sequence(&self) -> u16 {
        self.sequence_number
    }

    /// Recover the access units carried by the payload of an aac-hbr
    /// frame.
    ///
    /// Walks the AU-header-section and splits the trailing data at each
    /// declared AU-size. The interleaving AU-index fields are ignored.
    pub fn extract_access_units(payload: &[u8]) -> Result<Vec<Vec<u8>>> {
        if payload.len() < 2 {
            return Err(ClientError::Parse {
                kind: ParseErrorKind::AuHeadersTruncated,
            });
        }

        let headers_length_bits = u16::from_be_bytes([payload[0], payload[1]]);
        if headers_length_bits == 0 || headers_length_bits % AU_HEADERS_LENGTH_BITS != 0 {
            return Err(ClientError::Parse {
                kind: ParseErrorKind::InvalidAuHeadersLength(headers_length_bits),
            });
        }

        let headers_length = (headers_length_bits / 8) as usize;
        if payload.len() < 2 + headers_length {
            return Err(ClientError::Parse {
                kind: ParseErrorKind::AuHeadersTruncated,
            });
        }

        let headers = &payload[2..2 + headers_length];
        let mut data = &payload[2 + headers_length..];
        let mut access_units = Vec::with_capacity(headers_length / 2);
        for header in headers.chunks_exact(2) {
            let size = (u16::from_be_bytes([header[0], header[1]]) >> 3) as usize;
            if data.len() < size {
                return Err(ClientError::Parse {
                    kind: ParseErrorKind::AuDataTruncated,
                });
            }
            let (unit, rest) = data.split_at(size);
            access_units.push(unit.to_vec());
            data = rest;
        }
        Ok(access_units)
    }

    fn rtp_timestamp(&self, start: Duration, pts: Duration) -> u32 {
        // A pts before the session origin comes from a non-monotonic
        // source clock; step the timestamp backwards instead of
        // panicking on Duration underflow.
        match pts.checked_sub(start) {
            Some(elapsed) => self
                .initial_timestamp
                .wrapping_add(clock_ticks(elapsed, self.clock_rate)),
            None => self
                .initial_timestamp
                .wrapping_sub(clock_ticks(start - pts, self.clock_rate)),
        }
    }
}

fn clock_ticks(elapsed: Duration, clock_rate: u32) -> u32 {
    (elapsed.as_secs_f64() * f64::from(clock_rate)).round() as u64 as u32
}
