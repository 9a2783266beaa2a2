#![no_main]

use bitstream::BitReader;
use libfuzzer_sys::fuzz_target;
use wire::{read_cstring, read_sized_string, Direction, FrameIter, Guid, Limits};

fuzz_target!(|data: &[u8]| {
    let limits = Limits::for_testing();
    let direction = match data.first() {
        Some(b) if b & 1 == 1 => Direction::ClientToServer,
        _ => Direction::ServerToClient,
    };
    let body = data.get(1..).unwrap_or_default();

    for frame in FrameIter::new(body, direction, &limits).take(256) {
        let Ok(frame) = frame else { break };
        let mut reader = BitReader::new(frame.payload);
        let _ = Guid::read_packed(&mut reader);
        let _ = read_sized_string(&mut reader, 9, &limits);
        reader.reset_bit_pos();
        let _ = read_cstring(&mut reader, &limits);
    }
});
