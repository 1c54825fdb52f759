use super::{to_midi_data_byte, MAX_VALUE, PITCH_BEND_MIDDLE};
use crate::types::MidiDataByte;
use midi_msg::{Channel, ChannelVoiceMsg, ControlChange, MidiMsg, SystemRealTimeMsg};

const DATA_MASK: u8 = 0x7F;
const MAX_PITCH_BEND_RAW: f32 = 16383.0;

/// Quantizes a normalized value to 7 bits.
#[inline]
fn to_7_bit(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * MAX_VALUE as f32).round() as u8
}

fn channel_voice(channel: u8, msg: ChannelVoiceMsg) -> MidiDataByte {
    let msg = MidiMsg::ChannelVoice {
        channel: Channel::from_u8(channel & 0x0F),
        msg,
    };
    to_midi_data_byte(&msg.to_midi())
}

fn real_time(msg: SystemRealTimeMsg) -> MidiDataByte {
    to_midi_data_byte(&MidiMsg::SystemRealTime { msg }.to_midi())
}

pub fn encode_note_on(channel: u8, note: u8, velocity: f32) -> MidiDataByte {
    channel_voice(
        channel,
        ChannelVoiceMsg::NoteOn {
            note: note & DATA_MASK,
            velocity: to_7_bit(velocity),
        },
    )
}

pub fn encode_note_off(channel: u8, note: u8, velocity: f32) -> MidiDataByte {
    channel_voice(
        channel,
        ChannelVoiceMsg::NoteOff {
            note: note & DATA_MASK,
            velocity: to_7_bit(velocity),
        },
    )
}

pub fn encode_poly_key_pressure(channel: u8, note: u8, pressure: f32) -> MidiDataByte {
    channel_voice(
        channel,
        ChannelVoiceMsg::PolyPressure {
            note: note & DATA_MASK,
            pressure: to_7_bit(pressure),
        },
    )
}

pub fn encode_control_change(channel: u8, controller: u8, value: f32) -> MidiDataByte {
    channel_voice(
        channel,
        ChannelVoiceMsg::ControlChange {
            control: ControlChange::CC {
                control: controller & DATA_MASK,
                value: to_7_bit(value),
            },
        },
    )
}

pub fn encode_channel_pressure(channel: u8, value: f32) -> MidiDataByte {
    channel_voice(
        channel,
        ChannelVoiceMsg::ChannelPressure {
            pressure: to_7_bit(value),
        },
    )
}

/// `value` in `[-1, 1]`, 0.0 encodes to the 8192 center.
pub fn encode_pitch_bend(channel: u8, value: f32) -> MidiDataByte {
    let bend = ((value + 1.0) * PITCH_BEND_MIDDLE as f32).clamp(0.0, MAX_PITCH_BEND_RAW) as u16;
    channel_voice(channel, ChannelVoiceMsg::PitchBend { bend })
}

pub fn encode_program_change(channel: u8, program: u8) -> MidiDataByte {
    channel_voice(
        channel,
        ChannelVoiceMsg::ProgramChange {
            program: program & DATA_MASK,
        },
    )
}

pub fn encode_start_message() -> MidiDataByte {
    real_time(SystemRealTimeMsg::Start)
}

pub fn encode_stop_message() -> MidiDataByte {
    real_time(SystemRealTimeMsg::Stop)
}

pub fn encode_continue_message() -> MidiDataByte {
    real_time(SystemRealTimeMsg::Continue)
}

pub fn encode_timing_clock() -> MidiDataByte {
    real_time(SystemRealTimeMsg::TimingClock)
}

pub fn encode_active_sensing() -> MidiDataByte {
    real_time(SystemRealTimeMsg::ActiveSensing)
}

pub fn encode_reset_message() -> MidiDataByte {
    real_time(SystemRealTimeMsg::SystemReset)
}

#[cfg(test)]
mod tests {
    use super::super::*;
    use midi_msg::{Channel, ChannelVoiceMsg, ControlChange, MidiMsg};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_encode_note_on() {
        assert_eq!(encode_note_on(5, 60, 0.8), [0x95, 60, 102, 0]);
        assert_eq!(encode_note_on(0, 60, 1.0), [0x90, 60, 127, 0]);
    }

    #[test]
    fn test_encode_channel_messages() {
        assert_eq!(encode_note_off(1, 48, 0.0), [0x81, 48, 0, 0]);
        assert_eq!(encode_poly_key_pressure(2, 50, 0.5), [0xA2, 50, 64, 0]);
        assert_eq!(encode_control_change(15, 1, 1.0), [0xBF, 1, 127, 0]);
        assert_eq!(encode_channel_pressure(3, 1.0), [0xD3, 127, 0, 0]);
        assert_eq!(encode_program_change(4, 17), [0xC4, 17, 0, 0]);
    }

    #[test]
    fn test_encode_pitch_bend() {
        assert_eq!(encode_pitch_bend(0, 0.0), [0xE0, 0, 64, 0]);
        assert_eq!(encode_pitch_bend(0, -1.0), [0xE0, 0, 0, 0]);
        assert_eq!(encode_pitch_bend(0, 1.0), [0xE0, 0x7F, 0x7F, 0]);
        assert_eq!(decode_pitch_bend(encode_pitch_bend(7, 0.0)).unwrap().value, 8192);
    }

    #[test]
    fn test_encode_realtime_messages() {
        assert_eq!(encode_start_message()[0], 0xFA);
        assert_eq!(encode_stop_message()[0], 0xFC);
        assert_eq!(encode_continue_message()[0], 0xFB);
        assert_eq!(encode_timing_clock()[0], 0xF8);
        assert_eq!(encode_active_sensing()[0], 0xFE);
        assert_eq!(encode_reset_message()[0], 0xFF);
        assert_eq!(decode_message_type(encode_timing_clock()), MessageType::TimingClock);
    }

    #[test]
    fn test_encoded_bytes_parse_with_midi_msg() {
        let (msg, len) = MidiMsg::from_midi(&encode_control_change(9, 74, 0.5)).unwrap();
        assert_eq!(len, 3);
        match msg {
            MidiMsg::ChannelVoice { channel, msg } => {
                assert_eq!(channel, Channel::Ch10);
                assert_eq!(
                    msg,
                    ChannelVoiceMsg::ControlChange {
                        control: ControlChange::CC { control: 74, value: 64 },
                    }
                );
            }
            other => panic!("expected channel voice, got {other:?}"),
        }
    }

    #[test]
    fn test_note_on_round_trip() {
        let msg = decode_note_on(encode_note_on(3, 64, 1.0)).unwrap();
        assert_eq!((msg.channel, msg.note), (3, 64));
        assert_abs_diff_eq!(msg.velocity as f32 / 127.0, 1.0);
    }

    proptest! {
        #[test]
        fn test_seven_bit_round_trip(channel in 0u8..16, note in 0u8..128, value in 0.0f32..=1.0) {
            let tolerance = 0.5 / 127.0 + 1e-6;

            let on = decode_note_on(encode_note_on(channel, note, value)).unwrap();
            prop_assert_eq!((on.channel, on.note), (channel, note));
            prop_assert!((on.velocity as f32 / 127.0 - value).abs() <= tolerance);

            let off = decode_note_off(encode_note_off(channel, note, value)).unwrap();
            prop_assert!((off.velocity as f32 / 127.0 - value).abs() <= tolerance);

            let pressure = decode_poly_key_pressure(encode_poly_key_pressure(channel, note, value)).unwrap();
            prop_assert!((pressure.pressure as f32 / 127.0 - value).abs() <= tolerance);

            // 120 and up are channel mode messages.
            let controller = note % (MAX_CONTROLLER_NO + 1);
            let cc = decode_control_change(encode_control_change(channel, controller, value)).unwrap();
            prop_assert_eq!(cc.controller, controller);
            prop_assert!((cc.value as f32 / 127.0 - value).abs() <= tolerance);

            let at = decode_channel_pressure(encode_channel_pressure(channel, value)).unwrap();
            prop_assert_eq!(at.channel, channel);
            prop_assert!((at.pressure as f32 / 127.0 - value).abs() <= tolerance);
        }
    }
}
