//! CRC checksums shared by both protocol codecs.

use crc::{CRC_8_SMBUS, CRC_16_ARC, CRC_16_IBM_3740, Crc};

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_ARC);
const CRC16_CCITT_FALSE: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Named checksum algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcAlgorithm {
    /// CRC-8 (poly 0x07, init 0x00). EGTS header checksum.
    Crc8,
    /// CRC-16/ARC (poly 0x8005 reflected, init 0x0000). Wialon frame checksum.
    Crc16,
    /// CRC-16/CCITT-FALSE (poly 0x1021, init 0xFFFF). EGTS payload checksum.
    Crc16CcittFalse,
}

/// Compute `algorithm` over `data`. 8-bit results are widened.
pub fn checksum(data: &[u8], algorithm: CrcAlgorithm) -> u16 {
    match algorithm {
        CrcAlgorithm::Crc8 => u16::from(CRC8.checksum(data)),
        CrcAlgorithm::Crc16 => CRC16.checksum(data),
        CrcAlgorithm::Crc16CcittFalse => CRC16_CCITT_FALSE.checksum(data),
    }
}

/// EGTS header checksum.
pub fn crc8(data: &[u8]) -> u8 {
    CRC8.checksum(data)
}
