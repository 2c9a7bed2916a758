//! Fuzz target: `RadioFrame::decode`
//!
//! Feeds arbitrary bytes to the frame decoder.  Whatever decodes must
//! re-encode into a single ESP-NOW payload and decode back to itself.
//!
//! cargo fuzz run fuzz_radio_frame

#![no_main]

use co2monitor::adapters::radio::{MAX_FRAME_LEN, RadioFrame};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(frame) = RadioFrame::decode(data) else {
        return;
    };

    let mut buf = [0u8; MAX_FRAME_LEN];
    // Oversized frames are legal to decode but must be refused on encode.
    let Ok(bytes) = frame.encode(&mut buf) else {
        return;
    };
    assert!(bytes.len() <= MAX_FRAME_LEN);

    let again = RadioFrame::decode(bytes).expect("own encoding must decode");
    assert_eq!(again.device, frame.device);
    assert_eq!(again.topic, frame.topic);
});
