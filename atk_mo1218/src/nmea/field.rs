//! Field access and fixed-point conversion for single NMEA sentences

use num_traits::FromPrimitive;

use crate::{
    constants::{NMEA_ADDRESS_LEN, NMEA_CHECKSUM_SEPARATOR, NMEA_END_CHAR_1, NMEA_FIELD_SEPARATOR},
    error::{Error, ProtocolError, Result},
};

/// Integer carrying `shift` decimal digits: `value = 12345678, shift = 3`
/// stands for 12345.678
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedPoint {
    pub value: i64,
    pub shift: u8,
}

impl FixedPoint {
    /// Value expressed with `shift` decimal digits, see [`rescale`]
    pub fn rescaled(self, shift: u8) -> i64 {
        rescale(self.value, self.shift, shift)
    }
}

/// Returns field `index` of `sentence`.
///
/// Fields are split on `,` and `*`, the scan stops at `<CR>`. Field 0 is the
/// address, `$` included. An empty field is an empty slice; an index past
/// the last field is [`ProtocolError::MissingField`].
pub fn field_at(sentence: &[u8], index: usize) -> core::result::Result<&[u8], ProtocolError> {
    let end = sentence
        .iter()
        .position(|&b| b == NMEA_END_CHAR_1 || b == 0)
        .unwrap_or(sentence.len());
    sentence[..end]
        .split(|&b| b == NMEA_FIELD_SEPARATOR || b == NMEA_CHECKSUM_SEPARATOR)
        .nth(index)
        .ok_or(ProtocolError::MissingField { index })
}

/// Parses an optional `-` followed by digits and at most one `.`.
///
/// Digits on both sides of the point are concatenated, `shift` counts those
/// after it. Parsing stops at the first other character.
pub fn text_to_fixed_point(text: &[u8]) -> Result<FixedPoint> {
    let (negative, digits) = match text.first() {
        Some(b'-') => (true, &text[1..]),
        Some(b) if b.is_ascii_digit() => (false, text),
        _ => {
            return Err(Error::InvalidArgument(
                "number must start with a digit or '-'",
            ))
        },
    };

    if !digits.first().is_some_and(u8::is_ascii_digit) {
        return Err(Error::InvalidArgument("number has no digits"));
    }

    let mut value: i64 = 0;
    let mut shift = 0u8;
    let mut seen_point = false;
    for &b in digits {
        match b {
            b'0'..=b'9' => {
                value = value
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(i64::from(b - b'0')))
                    .ok_or(Error::InvalidArgument("number out of range"))?;
                if seen_point {
                    shift = shift
                        .checked_add(1)
                        .ok_or(Error::InvalidArgument("too many decimal digits"))?;
                }
            },
            b'.' if !seen_point => seen_point = true,
            _ => break,
        }
    }

    Ok(FixedPoint {
        value: if negative { -value } else { value },
        shift,
    })
}

/// Changes the decimal shift of `value` one digit at a time, truncating
/// toward zero when digits are dropped
pub fn rescale(mut value: i64, mut from_shift: u8, to_shift: u8) -> i64 {
    while from_shift > to_shift {
        value /= 10;
        from_shift -= 1;
    }
    while from_shift < to_shift {
        value = value.saturating_mul(10);
        from_shift += 1;
    }
    value
}

/// Typed access to the fields of one sentence, with errors naming the
/// sentence and the field
pub(crate) struct Sentence<'a> {
    message: &'static str,
    data: &'a [u8],
}

impl<'a> Sentence<'a> {
    /// Checks that the address ends with `kind` (the part after the talker)
    pub(crate) fn new(data: &'a [u8], message: &'static str, kind: &[u8; 3]) -> Result<Self> {
        let address = field_at(data, 0)?;
        if address.len() != NMEA_ADDRESS_LEN + 1 || !address.ends_with(kind) {
            return Err(Error::InvalidArgument("sentence type mismatch"));
        }
        Ok(Self { message, data })
    }

    /// Two-letter talker identifier
    pub(crate) fn talker(&self) -> core::result::Result<&'a [u8], ProtocolError> {
        Ok(&field_at(self.data, 0)?[1..3])
    }

    pub(crate) fn data(&self) -> &'a [u8] {
        self.data
    }

    pub(crate) fn invalid(&self, field: &'static str) -> ProtocolError {
        ProtocolError::InvalidField {
            message: self.message,
            field,
        }
    }

    pub(crate) fn field(&self, index: usize) -> core::result::Result<&'a [u8], ProtocolError> {
        field_at(self.data, index)
    }

    pub(crate) fn number(
        &self,
        index: usize,
        name: &'static str,
    ) -> core::result::Result<FixedPoint, ProtocolError> {
        text_to_fixed_point(self.field(index)?).map_err(|_| self.invalid(name))
    }

    fn narrow<T: FromPrimitive>(
        &self,
        value: i64,
        name: &'static str,
    ) -> core::result::Result<T, ProtocolError> {
        T::from_i64(value).ok_or(self.invalid(name))
    }

    /// Whole number, a fractional part is an error
    pub(crate) fn integer<T: FromPrimitive>(
        &self,
        index: usize,
        name: &'static str,
    ) -> core::result::Result<T, ProtocolError> {
        let n = self.number(index, name)?;
        if n.shift != 0 {
            return Err(self.invalid(name));
        }
        self.narrow(n.value, name)
    }

    /// Whole number, `T::default()` when the field is empty
    pub(crate) fn optional_integer<T: FromPrimitive + Default>(
        &self,
        index: usize,
        name: &'static str,
    ) -> core::result::Result<T, ProtocolError> {
        if self.field(index)?.is_empty() {
            return Ok(T::default());
        }
        self.integer(index, name)
    }

    /// Number rescaled to `shift` decimal digits
    pub(crate) fn scaled<T: FromPrimitive>(
        &self,
        index: usize,
        name: &'static str,
        shift: u8,
    ) -> core::result::Result<T, ProtocolError> {
        let n = self.number(index, name)?;
        self.narrow(n.rescaled(shift), name)
    }

    /// Number that must carry exactly `shift` decimal digits
    pub(crate) fn exact<T: FromPrimitive>(
        &self,
        index: usize,
        name: &'static str,
        shift: u8,
    ) -> core::result::Result<T, ProtocolError> {
        let n = self.number(index, name)?;
        if n.shift != shift {
            return Err(self.invalid(name));
        }
        self.narrow(n.value, name)
    }

    /// Like [`Sentence::scaled`], `T::default()` when the field is empty
    pub(crate) fn optional_scaled<T: FromPrimitive + Default>(
        &self,
        index: usize,
        name: &'static str,
        shift: u8,
    ) -> core::result::Result<T, ProtocolError> {
        if self.field(index)?.is_empty() {
            return Ok(T::default());
        }
        self.scaled(index, name, shift)
    }

    /// First character of a one-letter field
    pub(crate) fn letter(
        &self,
        index: usize,
        name: &'static str,
    ) -> core::result::Result<u8, ProtocolError> {
        self.field(index)?
            .first()
            .copied()
            .ok_or(self.invalid(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GGA: &[u8] =
        b"$GNGGA,092725.000,4717.11399,N,00833.91590,E,1,08,1.0,499.6,M,48.0,M,,*5B\r\n";

    #[test]
    fn test_field_at() {
        assert_eq!(field_at(GGA, 0), Ok(&b"$GNGGA"[..]));
        assert_eq!(field_at(GGA, 1), Ok(&b"092725.000"[..]));
        assert_eq!(field_at(GGA, 13), Ok(&b""[..]));
        assert_eq!(field_at(GGA, 14), Ok(&b""[..]));
        assert_eq!(field_at(GGA, 15), Ok(&b"5B"[..]));
        assert_eq!(
            field_at(GGA, 16),
            Err(ProtocolError::MissingField { index: 16 })
        );
    }

    #[test]
    fn test_field_at_stops_at_cr() {
        let two = b"$GNVTG,1*00\r\n$GNZDA,2*00\r\n";
        assert_eq!(field_at(two, 2), Ok(&b"00"[..]));
        assert!(field_at(two, 3).is_err());
    }

    #[test]
    fn test_text_to_fixed_point() {
        assert_eq!(
            text_to_fixed_point(b"12345.678"),
            Ok(FixedPoint {
                value: 12_345_678,
                shift: 3
            })
        );
        assert_eq!(
            text_to_fixed_point(b"-12.5,M"),
            Ok(FixedPoint {
                value: -125,
                shift: 1
            })
        );
        assert_eq!(
            text_to_fixed_point(b"7"),
            Ok(FixedPoint { value: 7, shift: 0 })
        );
        assert!(matches!(
            text_to_fixed_point(b".5"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            text_to_fixed_point(b""),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_text_to_fixed_point_sign_needs_digits() {
        for text in [&b"-"[..], b"-,M", b"-.5"] {
            assert_eq!(
                text_to_fixed_point(text),
                Err(Error::InvalidArgument("number has no digits"))
            );
        }
        assert_eq!(
            text_to_fixed_point(b"-0.5"),
            Ok(FixedPoint {
                value: -5,
                shift: 1
            })
        );
    }

    #[test]
    fn test_text_to_fixed_point_single_point() {
        assert_eq!(
            text_to_fixed_point(b"1.2.3"),
            Ok(FixedPoint {
                value: 12,
                shift: 1
            })
        );
    }

    #[test]
    fn test_rescale_truncates() {
        assert_eq!(rescale(12_345_678, 3, 1), 123_456);
        assert_eq!(rescale(-129, 1, 0), -12);
        assert_eq!(rescale(4_807_038, 3, 5), 480_703_800);
        assert_eq!(rescale(5, 0, 0), 5);
    }

    #[test]
    fn test_sentence_checks_address() {
        assert!(Sentence::new(GGA, "GGA", b"GGA").is_ok());
        assert_eq!(
            Sentence::new(GGA, "RMC", b"RMC").err(),
            Some(Error::InvalidArgument("sentence type mismatch"))
        );
    }

    #[test]
    fn test_sentence_typed_fields() {
        let s = Sentence::new(GGA, "GGA", b"GGA").unwrap();
        assert_eq!(s.talker(), Ok(&b"GN"[..]));
        assert_eq!(s.integer::<u8>(7, "satellites"), Ok(8));
        assert_eq!(s.scaled::<i32>(9, "altitude", 1), Ok(4996));
        assert_eq!(s.optional_integer::<u16>(14, "dgps"), Ok(0));
        assert_eq!(s.exact::<i32>(9, "altitude", 1), Ok(4996));
        assert_eq!(
            s.exact::<u32>(2, "latitude", 3),
            Err(ProtocolError::InvalidField {
                message: "GGA",
                field: "latitude"
            })
        );
        assert_eq!(
            s.integer::<u8>(8, "hdop"),
            Err(ProtocolError::InvalidField {
                message: "GGA",
                field: "hdop"
            })
        );
        assert_eq!(s.letter(3, "ns"), Ok(b'N'));
        assert!(s.letter(13, "age").is_err());
    }
}
