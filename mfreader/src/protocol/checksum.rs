// mfreader/src/protocol/checksum.rs

/// Fold `data` into a running CRC-8 (reflected polynomial 0x8C, the
/// Dallas/Maxim variant used by GEP frames).
pub fn crc8_update(mut crc: u8, data: &[u8]) -> u8 {
    for &byte in data {
        let mut in_byte = byte;
        for _ in 0..8 {
            let mix = (crc ^ in_byte) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            in_byte >>= 1;
        }
    }
    crc
}

/// CRC-8 of a GEP frame body: destination id, message bytes and, when
/// present, the two tag bytes.
pub fn frame_crc(destination_id: u8, message: &[u8], tag: Option<u16>) -> u8 {
    let crc = crc8_update(0, &[destination_id]);
    let crc = crc8_update(crc, message);
    match tag {
        Some(t) => crc8_update(crc, &t.to_be_bytes()),
        None => crc,
    }
}
