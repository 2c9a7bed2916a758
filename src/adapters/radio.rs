//! Radio adapter: topic/value telemetry over a connectionless link.
//!
//! Every publication becomes one self-contained [`RadioFrame`] carrying
//! the sender's device id, the topic and a typed payload, serialised with
//! `postcard`.  Frames are broadcast; there is no session and no
//! acknowledgement, so a receiver can decode any frame on its own.
//!
//! ```text
//!  RadioPort ──▶ Radio<T> ──encode──▶ FrameTransport
//!                                      ├─ EspNowTransport (device, broadcast)
//!                                      └─ SimTransport    (host, records)
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use crate::app::ports::RadioPort;
use crate::error::RadioError;

/// ESP-NOW payload limit.
pub const MAX_FRAME_LEN: usize = 250;

/// Topic used for the pairing announcement.
pub const TOPIC_PAIRING: &str = "pairing";

/// Typed frame payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Payload<'a> {
    Float(f32),
    Int(i32),
    Str(&'a str),
    Pairing { name: &'a str, version: &'a str },
}

/// One broadcast frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadioFrame<'a> {
    pub device: &'a str,
    pub topic: &'a str,
    #[serde(borrow)]
    pub payload: Payload<'a>,
}

impl<'a> RadioFrame<'a> {
    /// Serialise into `buf`, returning the used prefix.
    pub fn encode<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], RadioError> {
        postcard::to_slice(self, buf).map_err(|e| match e {
            postcard::Error::SerializeBufferFull => RadioError::FrameTooLarge,
            _ => RadioError::Encode,
        })
    }

    /// Parse a received frame.  The result borrows from `bytes`.
    pub fn decode(bytes: &'a [u8]) -> Result<Self, RadioError> {
        postcard::from_bytes(bytes).map_err(|_| RadioError::Decode)
    }
}

// ───────────────────────────────────────────────────────────────
// Transports
// ───────────────────────────────────────────────────────────────

/// Moves encoded frames onto the medium.
pub trait FrameTransport {
    fn send(&mut self, frame: &[u8]) -> Result<(), RadioError>;
}

/// Records frames in memory.  Used by the host build and by tests.
#[derive(Debug, Default)]
pub struct SimTransport {
    frames: Vec<Vec<u8>>,
    offline: bool,
}

impl SimTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every send fails with [`RadioError::NotReady`].
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Encoded frames in send order.
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// Decoded view of every recorded frame.
    pub fn decoded(&self) -> Vec<RadioFrame<'_>> {
        self.frames
            .iter()
            .filter_map(|f| RadioFrame::decode(f).ok())
            .collect()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl FrameTransport for SimTransport {
    fn send(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        if self.offline {
            return Err(RadioError::NotReady);
        }
        self.frames.push(frame.to_vec());
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
pub use esp::EspNowTransport;

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_svc::espnow::{EspNow, PeerInfo};
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_hal::modem::Modem;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{ClientConfiguration, Configuration, EspWifi};
    use log::info;

    use super::FrameTransport;
    use crate::error::RadioError;

    const BROADCAST: [u8; 6] = [0xFF; 6];

    /// ESP-NOW broadcast on the station interface.  WiFi is started but
    /// never associated; it only provides the radio.
    pub struct EspNowTransport {
        _wifi: EspWifi<'static>,
        espnow: EspNow<'static>,
    }

    impl EspNowTransport {
        pub fn new(
            modem: Modem,
            sysloop: EspSystemEventLoop,
            nvs: Option<EspDefaultNvsPartition>,
        ) -> Result<Self, RadioError> {
            let mut wifi = EspWifi::new(modem, sysloop, nvs).map_err(|_| RadioError::NotReady)?;
            wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))
                .map_err(|_| RadioError::NotReady)?;
            wifi.start().map_err(|_| RadioError::NotReady)?;

            let espnow = EspNow::take().map_err(|_| RadioError::NotReady)?;
            let peer = PeerInfo {
                peer_addr: BROADCAST,
                channel: 0,
                encrypt: false,
                ..Default::default()
            };
            espnow
                .add_peer(peer)
                .map_err(|e| RadioError::SendFailed(e.code()))?;
            info!("radio: ESP-NOW broadcast ready");
            Ok(Self {
                _wifi: wifi,
                espnow,
            })
        }
    }

    impl FrameTransport for EspNowTransport {
        fn send(&mut self, frame: &[u8]) -> Result<(), RadioError> {
            self.espnow
                .send(BROADCAST, frame)
                .map_err(|e| RadioError::SendFailed(e.code()))
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Radio (RadioPort implementation)
// ───────────────────────────────────────────────────────────────

/// Frames publications and hands them to a transport.
pub struct Radio<T: FrameTransport> {
    transport: T,
    device: heapless::String<32>,
    buf: [u8; MAX_FRAME_LEN],
}

impl<T: FrameTransport> Radio<T> {
    /// `device` is truncated to 32 bytes if longer.
    pub fn new(transport: T, device: &str) -> Self {
        let mut id = heapless::String::new();
        for c in device.chars() {
            if id.push(c).is_err() {
                break;
            }
        }
        Self {
            transport,
            device: id,
            buf: [0u8; MAX_FRAME_LEN],
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn send(&mut self, topic: &str, payload: Payload<'_>) -> Result<(), RadioError> {
        let frame = RadioFrame {
            device: &self.device,
            topic,
            payload,
        };
        let bytes = frame.encode(&mut self.buf)?;
        debug!("radio: {} ({} bytes)", topic, bytes.len());
        self.transport.send(bytes)
    }
}

impl<T: FrameTransport> RadioPort for Radio<T> {
    fn publish_float(&mut self, topic: &str, value: f32) -> Result<(), RadioError> {
        self.send(topic, Payload::Float(value))
    }

    fn publish_int(&mut self, topic: &str, value: i32) -> Result<(), RadioError> {
        self.send(topic, Payload::Int(value))
    }

    fn publish_str(&mut self, topic: &str, value: &str) -> Result<(), RadioError> {
        self.send(topic, Payload::Str(value))
    }

    fn pairing_request(&mut self, name: &str, version: &str) -> Result<(), RadioError> {
        self.send(TOPIC_PAIRING, Payload::Pairing { name, version })
    }
}
