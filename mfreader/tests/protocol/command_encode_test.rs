use crate::common::fixtures::{sample_block, sample_trailer};
use mfreader::protocol::{Command, SectorTrailer};
use mfreader::{Error, KeyKind};

#[test]
fn every_command_encodes_code_first() {
    let block = sample_block(0x5A);
    let cases = vec![
        (Command::reset(), vec![0x01]),
        (
            Command::set_key(KeyKind::B, &[1, 2, 3, 4, 5, 6]).unwrap(),
            vec![0x02, 0x02, 1, 2, 3, 4, 5, 6],
        ),
        (Command::read_block(5).unwrap(), vec![0x03, 0x05]),
        (Command::read_sector_trailer(15).unwrap(), vec![0x05, 0x0F]),
    ];
    for (command, expected) in cases {
        assert_eq!(command.encode(), expected, "{:?}", command);
    }

    let write = Command::write_block(255, &block).unwrap().encode();
    assert_eq!(&write[..2], &[0x04, 0xFF]);
    assert_eq!(&write[2..], &block);
}

#[test]
fn write_sector_trailer_layout() {
    let encoded = Command::write_sector_trailer(2, &sample_trailer())
        .unwrap()
        .encode();
    assert_eq!(encoded.len(), 2 + 17);
    assert_eq!(&encoded[..2], &[0x06, 0x02]);
    // access flags, key A, key B, general purpose byte
    assert_eq!(&encoded[2..6], &[0xFF, 0x07, 0x80, 0x69]);
    assert_eq!(&encoded[6..12], &[0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5]);
    assert_eq!(&encoded[12..18], &[0xB0, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5]);
    assert_eq!(encoded[18], 0x00);
}

#[test]
fn trailer_written_then_read_back_is_identical() {
    let trailer = sample_trailer();
    let encoded = Command::write_sector_trailer(1, &trailer).unwrap().encode();
    // A read response carries exactly the 17 trailer bytes
    let decoded = SectorTrailer::decode(&encoded[2..]).unwrap();
    assert_eq!(decoded, trailer);
}

#[test]
fn out_of_range_addresses_are_rejected() {
    for bad in [256u32, 1_000, u32::MAX] {
        assert!(matches!(Command::read_block(bad), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            Command::read_sector_trailer(bad),
            Err(Error::InvalidArgument(_))
        ));
    }
    assert!(Command::read_block(0).is_ok());
    assert!(Command::read_block(255).is_ok());
}
