//! Binary persistence of [`ParameterState`].
//!
//! Layout, all little-endian:
//!
//! | Field | Type | Notes |
//! |-------|------|-------|
//! | tag   | `u32` | `b"LVCT"` |
//! | count | `u32` | values that follow, at most [`PARAM_COUNT`] |
//! | values | `f64 × count` | normalized, in index order |
//!
//! Parameters past `count` keep their defaults, so states written before a
//! parameter was appended still load.

use std::io::{Read, Write};

use crate::error::StateError;
use crate::params::{PARAM_COUNT, ParameterState};

/// Leading tag of an encoded state.
pub const FORMAT_TAG: u32 = u32::from_le_bytes(*b"LVCT");

/// Write `state` to `writer`.
pub fn encode_state<W: Write + ?Sized>(state: &ParameterState, writer: &mut W) -> Result<(), StateError> {
    writer.write_all(&FORMAT_TAG.to_le_bytes())?;
    writer.write_all(&(PARAM_COUNT as u32).to_le_bytes())?;
    for value in state.values() {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Read a state from `reader`.
///
/// Stored values are clamped to `[0, 1]`; NaN becomes the default.
pub fn decode_state<R: Read + ?Sized>(reader: &mut R) -> Result<ParameterState, StateError> {
    let tag = read_u32(reader)?;
    if tag != FORMAT_TAG {
        return Err(StateError::unknown_format(tag));
    }
    let count = read_u32(reader)?;
    if count as usize > PARAM_COUNT {
        return Err(StateError::too_many(count, PARAM_COUNT));
    }

    let mut state = ParameterState::default();
    for index in 0..count as usize {
        let mut bytes = [0u8; 8];
        reader.read_exact(&mut bytes)?;
        state.set_value(index, f64::from_le_bytes(bytes));
    }
    Ok(state)
}

fn read_u32<R: Read + ?Sized>(reader: &mut R) -> Result<u32, StateError> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterId;

    fn header(count: u32) -> Vec<u8> {
        let mut bytes = FORMAT_TAG.to_le_bytes().to_vec();
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes
    }

    #[test]
    fn test_layout() {
        let mut bytes = Vec::new();
        encode_state(&ParameterState::default(), &mut bytes).unwrap();
        assert_eq!(bytes.len(), 8 + PARAM_COUNT * 8);
        assert_eq!(&bytes[..4], b"LVCT");
        assert_eq!(bytes[4..8], (PARAM_COUNT as u32).to_le_bytes());
        let min_pan = 8 + ParameterId::MinPan.index() * 8;
        assert_eq!(bytes[min_pan..min_pan + 8], 0.4f64.to_le_bytes());
    }

    #[test]
    fn test_roundtrip_non_default() {
        let mut state = ParameterState::default();
        state.set(ParameterId::CutProc, 1.0);
        state.set(ParameterId::Ritard, 0.123_456_789);
        state.set(ParameterId::Bypass, 1.0);
        let mut bytes = Vec::new();
        encode_state(&state, &mut bytes).unwrap();
        assert_eq!(decode_state(&mut bytes.as_slice()).unwrap(), state);
    }

    #[test]
    fn test_short_state_keeps_defaults() {
        let mut bytes = header(2);
        bytes.extend_from_slice(&1.0f64.to_le_bytes());
        bytes.extend_from_slice(&0.5f64.to_le_bytes());
        let state = decode_state(&mut bytes.as_slice()).unwrap();
        assert_eq!(state.get(ParameterId::CutProc), 1.0);
        assert_eq!(state.get(ParameterId::SubDiv), 0.5);
        assert_eq!(state.get(ParameterId::MaxPan), 0.6);
    }

    #[test]
    fn test_values_sanitized() {
        let mut bytes = header(3);
        bytes.extend_from_slice(&7.0f64.to_le_bytes());
        bytes.extend_from_slice(&(-1.0f64).to_le_bytes());
        bytes.extend_from_slice(&f64::NAN.to_le_bytes());
        let state = decode_state(&mut bytes.as_slice()).unwrap();
        assert_eq!(state.get(ParameterId::CutProc), 1.0);
        assert_eq!(state.get(ParameterId::SubDiv), 0.0);
        assert_eq!(state.get(ParameterId::Seed), 0.0);
    }

    #[test]
    fn test_errors() {
        let bad_tag = [0u8; 8];
        assert!(matches!(
            decode_state(&mut bad_tag.as_slice()),
            Err(StateError::UnknownFormat { found: 0 })
        ));

        let too_many = header(PARAM_COUNT as u32 + 1);
        assert!(matches!(
            decode_state(&mut too_many.as_slice()),
            Err(StateError::TooManyParameters { .. })
        ));

        let mut truncated = header(4);
        truncated.extend_from_slice(&0.5f64.to_le_bytes());
        assert!(matches!(
            decode_state(&mut truncated.as_slice()),
            Err(StateError::Io(_))
        ));

        assert!(matches!(decode_state(&mut [0x4c_u8].as_slice()), Err(StateError::Io(_))));
    }
}
