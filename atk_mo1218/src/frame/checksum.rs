use crate::error::ProtocolError;

/// XOR-fold checksum over the payload bytes of a binary frame, seeded at zero.
///
/// Two flips of the same bit position cancel out and go unnoticed; the
/// receiver protocol accepts that weakness.
#[derive(Default)]
pub(crate) struct XorChecksumCalc {
    cs: u8,
}

impl XorChecksumCalc {
    pub(crate) const fn new() -> Self {
        Self { cs: 0 }
    }

    /// Update checksum with new bytes
    pub(crate) const fn update(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            self.update_byte(bytes[i]);
            i += 1;
        }
    }

    pub(crate) const fn update_byte(&mut self, byte: u8) {
        self.cs ^= byte;
    }

    pub(crate) const fn result(self) -> u8 {
        self.cs
    }

    /// Compare against the checksum byte carried by the frame
    pub(crate) const fn validate_result(self, received: u8) -> Result<(), ProtocolError> {
        if self.cs == received {
            Ok(())
        } else {
            Err(ProtocolError::InvalidChecksum {
                expect: received,
                got: self.cs,
            })
        }
    }
}

/// Single-shot checksum of a payload
pub(crate) const fn xor_checksum(payload: &[u8]) -> u8 {
    let mut calc = XorChecksumCalc::new();
    calc.update(payload);
    calc.result()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Query software version: A0 A1 00 02 02 01 03 0D 0A
    const VERSION_QUERY_PAYLOAD: [u8; 2] = [0x02, 0x01];
    const VERSION_QUERY_CS: u8 = 0x03;

    // Configure NMEA intervals, GGA/GSA/GSV/GLL/RMC/VTG on, ZDA off, SRAM
    const NMEA_CFG_PAYLOAD: [u8; 9] = [0x08, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x00, 0x00];

    #[test]
    fn test_empty_payload_is_zero() {
        assert_eq!(xor_checksum(&[]), 0);
        assert_eq!(XorChecksumCalc::default().result(), 0);
    }

    #[test]
    fn test_known_payload() {
        assert_eq!(xor_checksum(&VERSION_QUERY_PAYLOAD), VERSION_QUERY_CS);
        // six ones cancel, leaving only the message ID
        assert_eq!(xor_checksum(&NMEA_CFG_PAYLOAD), 0x08);
    }

    #[test]
    fn test_streaming_matches_single_shot() {
        let mut calc = XorChecksumCalc::new();
        for b in NMEA_CFG_PAYLOAD.iter() {
            calc.update_byte(*b);
        }
        assert_eq!(calc.result(), xor_checksum(&NMEA_CFG_PAYLOAD));

        let mut calc = XorChecksumCalc::new();
        calc.update(&NMEA_CFG_PAYLOAD[..4]);
        calc.update(&NMEA_CFG_PAYLOAD[4..]);
        assert_eq!(calc.result(), xor_checksum(&NMEA_CFG_PAYLOAD));
    }

    #[test]
    fn test_validate_result() {
        let mut calc = XorChecksumCalc::new();
        calc.update(&VERSION_QUERY_PAYLOAD);
        assert_eq!(calc.validate_result(VERSION_QUERY_CS), Ok(()));

        let mut calc = XorChecksumCalc::new();
        calc.update(&VERSION_QUERY_PAYLOAD);
        assert_eq!(
            calc.validate_result(0x04),
            Err(ProtocolError::InvalidChecksum {
                expect: 0x04,
                got: VERSION_QUERY_CS
            })
        );
    }

    #[test]
    fn test_single_bit_flip_detected() {
        let mut payload = VERSION_QUERY_PAYLOAD;
        payload[1] ^= 0x10;
        assert_ne!(xor_checksum(&payload), VERSION_QUERY_CS);
    }

    #[test]
    fn test_paired_bit_flips_cancel() {
        let mut payload = NMEA_CFG_PAYLOAD;
        payload[2] ^= 0x04;
        payload[5] ^= 0x04;
        assert_eq!(xor_checksum(&payload), xor_checksum(&NMEA_CFG_PAYLOAD));
    }
}
