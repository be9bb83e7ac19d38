use std::fmt;

use crate::error::{AudioConfigErrorKind, ClientError, Result};

/// Sampling rates by samplingFrequencyIndex (ISO/IEC 14496-3 Table 1.18).
/// Indices 13 and 14 are reserved, 15 escapes to a 24-bit explicit rate.
const SAMPLING_FREQUENCIES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

const EXPLICIT_FREQUENCY_INDEX: u8 = 0x0F;

/// AAC profile, signalled by the audioObjectType field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AacProfile {
    Main,
    LowComplexity,
    ScalableSampleRate,
    LongTermPrediction,
    HighEfficiency,
    HighEfficiencyV2,
}

impl AacProfile {
    fn from_object_type(object_type: u8) -> Option<Self> {
        match object_type {
            1 => Some(Self::Main),
            2 => Some(Self::LowComplexity),
            3 => Some(Self::ScalableSampleRate),
            4 => Some(Self::LongTermPrediction),
            5 => Some(Self::HighEfficiency),
            29 => Some(Self::HighEfficiencyV2),
            _ => None,
        }
    }
}

impl fmt::Display for AacProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "AAC Main"),
            Self::LowComplexity => write!(f, "AAC-LC"),
            Self::ScalableSampleRate => write!(f, "AAC SSR"),
            Self::LongTermPrediction => write!(f, "AAC LTP"),
            Self::HighEfficiency => write!(f, "HE-AAC"),
            Self::HighEfficiencyV2 => write!(f, "HE-AACv2"),
        }
    }
}

/// Decoded MPEG-4 AudioSpecificConfig (ISO/IEC 14496-3 §1.6.2.1).
///
/// Carried out-of-band in SDP `fmtp` lines as a hex string; the first
/// bytes are enough to recover the profile, clock rate, and channel
/// layout of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpecificConfig {
    pub profile: AacProfile,
    /// Media clock rate in Hz.
    pub sampling_frequency: u32,
    /// channelConfiguration field; 2 means stereo.
    pub channel_configuration: u8,
    /// 960 when the frameLengthFlag is set, 1024 otherwise.
    pub samples_per_frame: u32,
}

impl AudioSpecificConfig {
    /// Parse the leading fields of an AudioSpecificConfig bitstream.
    ///
    /// The layout is bit-packed:
    ///
    /// ```text
    /// audioObjectType          5 bits
    /// samplingFrequencyIndex   4 bits
    /// [samplingFrequency      24 bits, only when the index is 15]
    /// channelConfiguration     4 bits
    /// frameLengthFlag          1 bit
    /// ```
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(ClientError::AudioConfig {
                kind: AudioConfigErrorKind::TooShort,
            });
        }

        let object_type = (data[0] >> 3) & 0x1F;
        let profile =
            AacProfile::from_object_type(object_type).ok_or(ClientError::AudioConfig {
                kind: AudioConfigErrorKind::UnsupportedObjectType(object_type),
            })?;

        let frequency_index = ((data[0] & 0x07) << 1) | ((data[1] >> 7) & 0x01);

        // The channel and frame-length fields trail the frequency, so
        // their byte shifts by the 24-bit explicit rate when present.
        let (sampling_frequency, trailer) = if frequency_index == EXPLICIT_FREQUENCY_INDEX {
            if data.len() < 5 {
                return Err(ClientError::AudioConfig {
                    kind: AudioConfigErrorKind::TooShort,
                });
            }
            let frequency = (u32::from(data[1] & 0x7F) << 17)
                | (u32::from(data[2]) << 9)
                | (u32::from(data[3]) << 1)
                | u32::from(data[4] >> 7);
            (frequency, data[4])
        } else if let Some(&frequency) = SAMPLING_FREQUENCIES.get(frequency_index as usize) {
            (frequency, data[1])
        } else {
            return Err(ClientError::AudioConfig {
                kind: AudioConfigErrorKind::ReservedFrequencyIndex(frequency_index),
            });
        };

        Ok(Self {
            profile,
            sampling_frequency,
            channel_configuration: (trailer >> 3) & 0x0F,
            samples_per_frame: if trailer & 0x04 != 0 { 960 } else { 1024 },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lc_44100_stereo() {
        let config = AudioSpecificConfig::parse(&[0x12, 0x10]).unwrap();
        assert_eq!(config.profile, AacProfile::LowComplexity);
        assert_eq!(config.sampling_frequency, 44100);
        assert_eq!(config.channel_configuration, 2);
        assert_eq!(config.samples_per_frame, 1024);
    }

    #[test]
    fn parses_lc_48000() {
        let stereo = AudioSpecificConfig::parse(&[0x11, 0x90]).unwrap();
        assert_eq!(stereo.sampling_frequency, 48000);
        assert_eq!(stereo.channel_configuration, 2);

        let mono = AudioSpecificConfig::parse(&[0x11, 0x88]).unwrap();
        assert_eq!(mono.sampling_frequency, 48000);
        assert_eq!(mono.channel_configuration, 1);
    }

    #[test]
    fn parses_he_aac() {
        let config = AudioSpecificConfig::parse(&[0x29, 0x90]).unwrap();
        assert_eq!(config.profile, AacProfile::HighEfficiency);
        assert_eq!(config.sampling_frequency, 48000);
    }

    #[test]
    fn parses_explicit_frequency() {
        let config = AudioSpecificConfig::parse(&[0x17, 0x80, 0x5D, 0xC0, 0x10]).unwrap();
        assert_eq!(config.profile, AacProfile::LowComplexity);
        assert_eq!(config.sampling_frequency, 48000);
        assert_eq!(config.channel_configuration, 2);
        assert_eq!(config.samples_per_frame, 1024);
    }

    #[test]
    fn frame_length_flag_selects_short_frames() {
        let config = AudioSpecificConfig::parse(&[0x12, 0x14]).unwrap();
        assert_eq!(config.samples_per_frame, 960);
    }

    #[test]
    fn rejects_short_input() {
        assert!(matches!(
            AudioSpecificConfig::parse(&[0x12]),
            Err(ClientError::AudioConfig {
                kind: AudioConfigErrorKind::TooShort
            })
        ));
    }

    #[test]
    fn rejects_truncated_explicit_frequency() {
        assert!(matches!(
            AudioSpecificConfig::parse(&[0x17, 0x80, 0x5D]),
            Err(ClientError::AudioConfig {
                kind: AudioConfigErrorKind::TooShort
            })
        ));
    }

    #[test]
    fn rejects_reserved_frequency_index() {
        assert!(matches!(
            AudioSpecificConfig::parse(&[0x16, 0x90]),
            Err(ClientError::AudioConfig {
                kind: AudioConfigErrorKind::ReservedFrequencyIndex(13)
            })
        ));
    }

    #[test]
    fn rejects_unsupported_object_type() {
        assert!(matches!(
            AudioSpecificConfig::parse(&[0x32, 0x10]),
            Err(ClientError::AudioConfig {
                kind: AudioConfigErrorKind::UnsupportedObjectType(6)
            })
        ));
    }
}
