pub mod error;
pub mod media;
pub mod transport;

pub use error::{ClientError, Result};
pub use media::aac::AacPacketizer;
pub use media::config::AudioSpecificConfig;
pub use media::rtp::RtpPacket;
pub use transport::{UdpPeerHandle, UdpPeerListener};
