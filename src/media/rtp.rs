use crate::error::{ClientError, ParseErrorKind, Result};

/// RTP fixed header length in bytes (RFC 3550 §5.1).
pub const HEADER_SIZE: usize = 12;

const VERSION: u8 = 2;

/// RTP fixed header fields (RFC 3550 §5.1).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|X|  CC   |M|     PT      |       Sequence Number         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             SSRC                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// A plain value type: sequence and timestamp state belongs to the
/// packetizer that emits frames, not to the header itself. Version is
/// always 2; padding, extension, and CSRC count are always 0 on emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpHeader {
    /// RTP payload type (7-bit, RFC 3551).
    pub payload_type: u8,
    /// Last packet of the logical unit at this timestamp (RFC 3550 §5.1).
    pub marker: bool,
    /// 16-bit wrapping sequence number.
    pub sequence_number: u16,
    /// Media clock timestamp.
    pub timestamp: u32,
    /// Synchronization source identifier (RFC 3550 §8.1).
    pub ssrc: u32,
}

impl RtpHeader {
    /// Serialize the 12-byte fixed header.
    ///
    /// Fails only when the payload type does not fit its 7-bit field,
    /// which would corrupt the marker bit on the wire.
    pub fn marshal(&self) -> Result<[u8; HEADER_SIZE]> {
        if self.payload_type > 0x7F {
            return Err(ClientError::InvalidPayloadType(u16::from(self.payload_type)));
        }

        let mut header = [0u8; HEADER_SIZE];
        header[0] = VERSION << 6;
        header[1] = ((self.marker as u8) << 7) | self.payload_type;
        header[2..4].copy_from_slice(&self.sequence_number.to_be_bytes());
        header[4..8].copy_from_slice(&self.timestamp.to_be_bytes());
        header[8..12].copy_from_slice(&self.ssrc.to_be_bytes());
        Ok(header)
    }
}

/// One RTP frame: fixed header plus opaque payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpPacket {
    pub header: RtpHeader,
    pub payload: Vec<u8>,
}

impl RtpPacket {
    /// Serialize to wire bytes: 12-byte header followed by the payload.
    pub fn marshal(&self) -> Result<Vec<u8>> {
        let header = self.header.marshal()?;
        let mut frame = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        frame.extend_from_slice(&header);
        frame.extend_from_slice(&self.payload);
        Ok(frame)
    }

    /// Parse wire bytes into header fields and payload.
    ///
    /// CSRC entries, a header extension, and padding are consumed and
    /// discarded; the returned packet keeps only the fields this crate
    /// emits. Fails on truncated input or an RTP version other than 2.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(ClientError::Parse {
                kind: ParseErrorKind::PacketTooShort,
            });
        }

        let version = data[0] >> 6;
        if version != VERSION {
            return Err(ClientError::Parse {
                kind: ParseErrorKind::UnsupportedVersion(version),
            });
        }

        let padding = data[0] & 0x20 != 0;
        let extension = data[0] & 0x10 != 0;
        let csrc_count = (data[0] & 0x0F) as usize;

        let mut payload_start = HEADER_SIZE + csrc_count * 4;
        if data.len() < payload_start {
            return Err(ClientError::Parse {
                kind: ParseErrorKind::PacketTooShort,
            });
        }

        if extension {
            // 2-byte profile id + 2-byte length in 32-bit words
            if data.len() < payload_start + 4 {
                return Err(ClientError::Parse {
                    kind: ParseErrorKind::PacketTooShort,
                });
            }
            let words =
                u16::from_be_bytes([data[payload_start + 2], data[payload_start + 3]]) as usize;
            payload_start += 4 + words * 4;
            if data.len() < payload_start {
                return Err(ClientError::Parse {
                    kind: ParseErrorKind::PacketTooShort,
                });
            }
        }

        let mut payload_end = data.len();
        if padding {
            let pad = data[payload_end - 1] as usize;
            if pad == 0 || pad > payload_end - payload_start {
                return Err(ClientError::Parse {
                    kind: ParseErrorKind::PacketTooShort,
                });
            }
            payload_end -= pad;
        }

        Ok(Self {
            header: RtpHeader {
                payload_type: data[1] & 0x7F,
                marker: data[1] & 0x80 != 0,
                sequence_number: u16::from_be_bytes([data[2], data[3]]),
                timestamp: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
                ssrc: u32::from_be_bytes([data[8], data[9], data[10], data[11]]),
            },
            payload: data[payload_start..payload_end].to_vec(),
        })
    }
}
