//! Composite wire value types shared by several message families.
//!
//! Each type here owns one fixed bit layout and round-trips exactly between
//! its semantic form and its wire form, including the reserved sentinel
//! values, which are preserved rather than normalized.

use serde::{Deserialize, Serialize};

use crate::core::bits::{reversed, BitReader, BitWriter};
use crate::error::{ProtocolError, Result};

/// Resolution selector of a [`TransitionTime`], the high 2 bits of its byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionResolution {
    HundredMilliseconds,
    Second,
    TenSeconds,
    TenMinutes,
}

impl TransitionResolution {
    /// Decode from a 2-bit pattern. All four patterns are assigned, so the
    /// fallback to one second can never trigger, but decode stays total.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::HundredMilliseconds,
            0b10 => Self::TenSeconds,
            0b11 => Self::TenMinutes,
            _ => Self::Second,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::HundredMilliseconds => 0b00,
            Self::Second => 0b01,
            Self::TenSeconds => 0b10,
            Self::TenMinutes => 0b11,
        }
    }

    /// Duration of a single step at this resolution, in milliseconds.
    pub fn step_millis(self) -> u64 {
        match self {
            Self::HundredMilliseconds => 100,
            Self::Second => 1_000,
            Self::TenSeconds => 10_000,
            Self::TenMinutes => 600_000,
        }
    }
}

/// Step count of a [`TransitionTime`], the low 6 bits of its byte.
///
/// Step 0 is the reserved "immediate" value and step 63 the reserved
/// "unknown" value; an element reports 63 when a transition exceeds 62 steps
/// or cannot be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionStep {
    Immediate,
    Specific(u8),
    Unknown,
}

impl TransitionStep {
    pub fn from_value(value: u8) -> Self {
        match value & 0x3F {
            0x00 => Self::Immediate,
            0x3F => Self::Unknown,
            n => Self::Specific(n),
        }
    }

    pub fn value(self) -> u8 {
        match self {
            Self::Immediate => 0x00,
            Self::Specific(n) => n,
            Self::Unknown => 0x3F,
        }
    }
}

/// Transition time state: a resolution and a 6-bit step count packed into a
/// single byte (low 6 bits steps, high 2 bits resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionTime {
    pub resolution: TransitionResolution,
    pub step: TransitionStep,
}

pub const TRANSITION_TIME_BITS: usize = 8;

impl TransitionTime {
    /// Build a transition time from explicit parts.
    ///
    /// # Errors
    /// `Specific` steps must lie in 1..=62; 0 and 63 are only reachable
    /// through their named sentinels.
    pub fn new(resolution: TransitionResolution, step: TransitionStep) -> Result<Self> {
        if let TransitionStep::Specific(n) = step {
            if n == 0 || n >= 0x3F {
                return Err(ProtocolError::ValueOutOfRange {
                    field: "transition steps",
                    value: i64::from(n),
                });
            }
        }
        Ok(Self { resolution, step })
    }

    pub fn from_byte(value: u8) -> Self {
        Self {
            resolution: TransitionResolution::from_bits(value >> 6),
            step: TransitionStep::from_value(value & 0x3F),
        }
    }

    pub fn to_byte(self) -> u8 {
        (self.step.value() & 0x3F) | (self.resolution.bits() << 6)
    }

    /// Total transition duration in milliseconds, `None` for the unknown
    /// sentinel.
    pub fn total_millis(self) -> Option<u64> {
        match self.step {
            TransitionStep::Unknown => None,
            step => Some(u64::from(step.value()) * self.resolution.step_millis()),
        }
    }
}

/// The 16 single-bit slot flags of a schedule register, in slot order.
///
/// Decoded from a byte-reversed 16-bit field; a set flag marks a defined
/// entry in the corresponding register slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRegister {
    slots: [bool; Self::SLOT_COUNT],
}

impl ScheduleRegister {
    pub const SLOT_COUNT: usize = 16;

    pub fn new(slots: [bool; Self::SLOT_COUNT]) -> Self {
        Self { slots }
    }

    /// Parse from raw status parameters.
    pub fn from_parameters(parameters: &[u8]) -> Result<Self> {
        let bytes = reversed(parameters);
        let mut reader = BitReader::new(&bytes);
        let mut slots = [false; Self::SLOT_COUNT];
        for slot in &mut slots {
            *slot = reader.read(1)? == 1;
        }
        Ok(Self { slots })
    }

    pub fn to_parameters(self) -> Vec<u8> {
        let mut writer = BitWriter::new();
        for slot in self.slots {
            writer.write(u64::from(slot), 1);
        }
        reversed(&writer.finish())
    }

    /// Whether the register entry at `slot` is defined.
    pub fn is_defined(self, slot: usize) -> bool {
        self.slots[slot]
    }

    pub fn slots(&self) -> &[bool; Self::SLOT_COUNT] {
        &self.slots
    }
}

/// Mesh time state in its fixed 80-bit layout.
///
/// TAI seconds is a 40-bit count since 2000-01-01T00:00:00 TAI; the raw value
/// 0 is the "time unknown" sentinel, modeled as `None` so the encoding stays
/// bijective. Uncertainty is in 10 ms steps and saturates at 255 ("2.55 s or
/// more"), which is preserved as-is. The TAI-UTC delta is a 15-bit signed
/// value; the zone offset counts 15-minute increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeState {
    tai_seconds: Option<u64>,
    subsecond: u8,
    uncertainty: u8,
    authority: bool,
    tai_utc_delta: i16,
    zone_offset: u8,
}

pub const TIME_STATE_BITS: usize = 80;

const TAI_SECONDS_MAX: u64 = (1 << 40) - 1;
const TAI_UTC_DELTA_MIN: i16 = -(1 << 14);
const TAI_UTC_DELTA_MAX: i16 = (1 << 14) - 1;

impl TimeState {
    /// Build a time state from explicit parts.
    ///
    /// # Errors
    /// `tai_seconds` must fit 40 bits and may not be `Some(0)` (raw zero is
    /// the unknown sentinel, spelled `None`); the delta must fit 15 signed
    /// bits.
    pub fn new(
        tai_seconds: Option<u64>,
        subsecond: u8,
        uncertainty: u8,
        authority: bool,
        tai_utc_delta: i16,
        zone_offset: u8,
    ) -> Result<Self> {
        if let Some(seconds) = tai_seconds {
            if seconds == 0 || seconds > TAI_SECONDS_MAX {
                return Err(ProtocolError::ValueOutOfRange {
                    field: "TAI seconds",
                    value: seconds as i64,
                });
            }
        }
        if !(TAI_UTC_DELTA_MIN..=TAI_UTC_DELTA_MAX).contains(&tai_utc_delta) {
            return Err(ProtocolError::ValueOutOfRange {
                field: "TAI-UTC delta",
                value: i64::from(tai_utc_delta),
            });
        }
        Ok(Self {
            tai_seconds,
            subsecond,
            uncertainty,
            authority,
            tai_utc_delta,
            zone_offset,
        })
    }

    /// The "time unknown" state: all-zero on the wire.
    pub fn unknown() -> Self {
        Self {
            tai_seconds: None,
            subsecond: 0,
            uncertainty: 0,
            authority: false,
            tai_utc_delta: 0,
            zone_offset: 0,
        }
    }

    pub fn tai_seconds(&self) -> Option<u64> {
        self.tai_seconds
    }

    pub fn subsecond(&self) -> u8 {
        self.subsecond
    }

    pub fn uncertainty(&self) -> u8 {
        self.uncertainty
    }

    pub fn is_authority(&self) -> bool {
        self.authority
    }

    pub fn tai_utc_delta(&self) -> i16 {
        self.tai_utc_delta
    }

    pub fn zone_offset(&self) -> u8 {
        self.zone_offset
    }

    /// Pack into the 80-bit wire layout (little-endian on the wire).
    pub fn to_parameters(self) -> Vec<u8> {
        let mut writer = BitWriter::new();
        writer.write(self.tai_seconds.unwrap_or(0), 40);
        writer.write(u64::from(self.subsecond), 8);
        writer.write(u64::from(self.uncertainty), 8);
        writer.write(u64::from(self.authority), 1);
        writer.write(u64::from(self.tai_utc_delta as u16) & 0x7FFF, 15);
        writer.write(u64::from(self.zone_offset), 8);
        reversed(&writer.finish())
    }

    /// Unpack from raw status parameters, the exact inverse of
    /// [`TimeState::to_parameters`].
    pub fn from_parameters(parameters: &[u8]) -> Result<Self> {
        let bytes = reversed(parameters);
        let mut reader = BitReader::new(&bytes);
        let raw_seconds = reader.read(40)?;
        let subsecond = reader.read(8)? as u8;
        let uncertainty = reader.read(8)? as u8;
        let authority = reader.read(1)? == 1;
        let raw_delta = reader.read(15)? as u16;
        let zone_offset = reader.read(8)? as u8;
        Ok(Self {
            tai_seconds: (raw_seconds != 0).then_some(raw_seconds),
            subsecond,
            uncertainty,
            authority,
            tai_utc_delta: sign_extend_15(raw_delta),
            zone_offset,
        })
    }
}

fn sign_extend_15(raw: u16) -> i16 {
    if raw & 0x4000 != 0 {
        (raw | 0x8000) as i16
    } else {
        raw as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_time_round_trips_every_byte() {
        for value in 0..=0xFFu16 {
            let value = value as u8;
            assert_eq!(TransitionTime::from_byte(value).to_byte(), value);
        }
    }

    #[test]
    fn transition_sentinels_decode_as_sentinels() {
        assert_eq!(TransitionTime::from_byte(0x00).step, TransitionStep::Immediate);
        assert_eq!(TransitionTime::from_byte(0x3F).step, TransitionStep::Unknown);
        assert_eq!(
            TransitionTime::from_byte(0x7F).step,
            TransitionStep::Unknown
        );
    }

    #[test]
    fn transition_byte_0x61_is_one_second_33_steps() {
        let time = TransitionTime::from_byte(0x61);
        assert_eq!(time.resolution, TransitionResolution::Second);
        assert_eq!(time.step, TransitionStep::Specific(0x21));
    }

    #[test]
    fn transition_new_rejects_sentinel_collisions() {
        let bad =
            TransitionTime::new(TransitionResolution::Second, TransitionStep::Specific(0));
        assert!(bad.is_err());
        let bad =
            TransitionTime::new(TransitionResolution::Second, TransitionStep::Specific(63));
        assert!(bad.is_err());
    }

    #[test]
    fn transition_total_millis() {
        let time = TransitionTime::from_byte(0x73);
        assert_eq!(time.total_millis(), Some(51 * 1_000));
        let unknown = TransitionTime::from_byte(0x3F);
        assert_eq!(unknown.total_millis(), None);
    }

    #[test]
    fn schedule_register_all_zero_and_all_one() {
        let zero = ScheduleRegister::from_parameters(&[0x00, 0x00]).unwrap();
        assert!(zero.slots().iter().all(|slot| !slot));
        let one = ScheduleRegister::from_parameters(&[0xFF, 0xFF]).unwrap();
        assert!(one.slots().iter().all(|slot| *slot));
    }

    #[test]
    fn schedule_register_reports_slot_order() {
        // Slot 0 is the first bit of the reversed buffer.
        let register = ScheduleRegister::from_parameters(&[0x00, 0x80]).unwrap();
        assert!(register.is_defined(0));
        assert!((1..16).all(|slot| !register.is_defined(slot)));
        assert_eq!(register.to_parameters(), vec![0x00, 0x80]);
    }

    #[test]
    fn schedule_register_short_buffer_fails() {
        assert!(ScheduleRegister::from_parameters(&[0x00]).is_err());
    }

    #[test]
    fn time_state_round_trips() {
        let state = TimeState::new(Some(0x20E5_369D), 0x12, 0x34, true, -37, 0x44).unwrap();
        let parameters = state.to_parameters();
        assert_eq!(parameters.len(), 10);
        assert_eq!(TimeState::from_parameters(&parameters).unwrap(), state);
    }

    #[test]
    fn time_state_unknown_is_all_zero() {
        let parameters = TimeState::unknown().to_parameters();
        assert!(parameters.iter().all(|byte| *byte == 0));
        let decoded = TimeState::from_parameters(&parameters).unwrap();
        assert_eq!(decoded.tai_seconds(), None);
    }

    #[test]
    fn time_state_uncertainty_sentinel_preserved() {
        let state = TimeState::new(Some(1), 0, 255, false, 37, 0).unwrap();
        let decoded = TimeState::from_parameters(&state.to_parameters()).unwrap();
        assert_eq!(decoded.uncertainty(), 255);
    }

    #[test]
    fn time_state_rejects_explicit_zero_seconds() {
        assert!(TimeState::new(Some(0), 0, 0, false, 0, 0).is_err());
    }

    #[test]
    fn time_state_short_buffer_fails() {
        assert!(TimeState::from_parameters(&[0u8; 9]).is_err());
    }
}
