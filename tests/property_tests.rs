//! Property-based tests using proptest
//!
//! These tests validate codec invariants across a wide range of randomly
//! generated inputs: every wire layout must decode to exactly the fields it
//! was assembled from, including reserved sentinel values.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use mesh_protocol::core::bits::{reversed, BitReader, BitWriter};
use mesh_protocol::core::pdu::AccessPdu;
use mesh_protocol::core::values::{ScheduleRegister, TimeState, TransitionTime};
use proptest::prelude::*;

// Property: every transition time byte round-trips
proptest! {
    #[test]
    fn prop_transition_time_roundtrip(value in any::<u8>()) {
        prop_assert_eq!(TransitionTime::from_byte(value).to_byte(), value);
    }
}

// Property: decoding never panics for any byte, including reserved patterns
proptest! {
    #[test]
    fn prop_transition_time_decode_total(value in any::<u8>()) {
        let _ = TransitionTime::from_byte(value);
    }
}

// Property: schedule register round-trips and keeps slot order
proptest! {
    #[test]
    fn prop_schedule_register_roundtrip(slots in prop::array::uniform16(any::<bool>())) {
        let register = ScheduleRegister::new(slots);
        let decoded = ScheduleRegister::from_parameters(&register.to_parameters())
            .expect("two bytes always decode");
        prop_assert_eq!(decoded, register);
        for (slot, expected) in slots.iter().enumerate() {
            prop_assert_eq!(decoded.is_defined(slot), *expected);
        }
    }
}

fn tai_seconds() -> impl Strategy<Value = Option<u64>> {
    prop_oneof![Just(None), (1u64..(1 << 40)).prop_map(Some)]
}

// Property: the 80-bit time state layout round-trips, sentinels included
proptest! {
    #[test]
    fn prop_time_state_roundtrip(
        tai in tai_seconds(),
        subsecond in any::<u8>(),
        uncertainty in any::<u8>(),
        authority in any::<bool>(),
        delta in -16384i16..=16383,
        zone_offset in any::<u8>(),
    ) {
        let state = TimeState::new(tai, subsecond, uncertainty, authority, delta, zone_offset)
            .expect("fields in range");
        let parameters = state.to_parameters();
        prop_assert_eq!(parameters.len(), 10);
        prop_assert_eq!(TimeState::from_parameters(&parameters).expect("decode"), state);
    }
}

// Property: the bit stream is its own inverse for arbitrary field sequences
proptest! {
    #[test]
    fn prop_bit_stream_roundtrip(fields in prop::collection::vec((any::<u64>(), 1usize..=64), 1..12)) {
        let mut writer = BitWriter::new();
        for (value, width) in &fields {
            writer.write(*value, *width);
        }
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        for (value, width) in &fields {
            let mask = if *width == 64 { u64::MAX } else { (1u64 << width) - 1 };
            prop_assert_eq!(reader.read(*width).expect("enough bits"), value & mask);
        }
    }
}

// Property: byte reversal is an involution
proptest! {
    #[test]
    fn prop_reverse_involution(data in prop::collection::vec(any::<u8>(), 0..64)) {
        prop_assert_eq!(reversed(&reversed(&data)), data);
    }
}

fn valid_opcode() -> impl Strategy<Value = u32> {
    prop_oneof![
        (0x00u32..=0x7E),
        (0x8000u32..=0xBFFF),
        (0xC0_0000u32..=0xFF_FFFF),
    ]
}

// Property: PDU framing round-trips for every encodable opcode
proptest! {
    #[test]
    fn prop_access_pdu_roundtrip(
        opcode in valid_opcode(),
        parameters in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let pdu = AccessPdu::new(opcode, parameters);
        let bytes = pdu.to_bytes().expect("encodable opcode");
        prop_assert_eq!(AccessPdu::from_bytes(&bytes).expect("decode"), pdu);
    }
}
