//! Device identity derived from the ESP32 factory MAC address.
//!
//! The 6-byte eFuse MAC is rendered as 12 uppercase hex characters
//! (e.g. `DEADBEEFCAFE`).  The id is:
//! - Deterministic across reboots (factory-burned eFuse MAC)
//! - Logged once at startup
//! - Published with every reading under the `device-id` topic
//! - Carried in the header of every radio frame

use core::fmt::Write;

/// Length of the raw identifier in bytes.
pub const DEVICE_ID_LEN: usize = 6;

/// Raw identifier bytes.
pub type DeviceIdBytes = [u8; DEVICE_ID_LEN];

/// Hex rendering: two characters per byte.
pub type DeviceIdString = heapless::String<{ DEVICE_ID_LEN * 2 }>;

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_device_id() -> DeviceIdBytes {
    let mut mac: DeviceIdBytes = [0u8; DEVICE_ID_LEN];
    // SAFETY: writes exactly 6 bytes into a 6-byte buffer.
    let ret = unsafe { esp_idf_sys::esp_efuse_mac_get_default(mac.as_mut_ptr()) };
    if ret != esp_idf_sys::ESP_OK {
        log::warn!("device_id: eFuse MAC read failed (rc={})", ret);
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_device_id() -> DeviceIdBytes {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Render `id` as uppercase hex.
pub fn to_hex(id: &DeviceIdBytes) -> DeviceIdString {
    let mut s = DeviceIdString::new();
    for b in id {
        // Capacity is exactly two characters per byte.
        let _ = write!(s, "{:02X}", b);
    }
    s
}
