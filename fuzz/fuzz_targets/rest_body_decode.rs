//! Fuzz target for REST body decoding
//!
//! The backend is inconsistent about response shapes (nested rooms, missing
//! fields, null history), so the decoders must tolerate any JSON without
//! panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use studenthub_proto::rest::{ChatRoomResponse, MessageHistory, ReceivedRequests, UnreadCount};

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Ok(room) = ChatRoomResponse::decode(raw) {
            let _ = room.room_id();
        }
        let _ = MessageHistory::decode(raw);
        let _ = ReceivedRequests::decode(raw);
        let _ = UnreadCount::decode(raw);
    }
});
