use crate::types::MidiDataByte;
use midi_msg::{
    ChannelModeMsg, ChannelVoiceMsg, ControlChange, MidiMsg, PolyMode, SystemCommonMsg,
    SystemRealTimeMsg,
};

const SYSTEM_EXCLUSIVE: u8 = 0xF0;
const END_OF_EXCLUSIVE: u8 = 0xF7;

const DATA_MASK: u8 = 0x7F;
const CHANNEL_MASK: u8 = 0x0F;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    // Channel voice
    NoteOff,
    NoteOn,
    PolyKeyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
    // Channel mode
    AllSoundOff,
    ResetAllControllers,
    LocalControlOn,
    LocalControlOff,
    AllNotesOff,
    OmniModeOff,
    OmniModeOn,
    MonoModeOn,
    PolyModeOn,
    // System common
    SystemExclusive,
    TimeCode,
    SongPosition,
    SongSelect,
    TuneRequest,
    EndOfExclusive,
    // System realtime
    TimingClock,
    Start,
    Continue,
    Stop,
    ActiveSensing,
    Reset,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteOffMessage {
    pub channel: u8,
    pub note: u8,
    pub velocity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteOnMessage {
    pub channel: u8,
    pub note: u8,
    pub velocity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolyKeyPressureMessage {
    pub channel: u8,
    pub note: u8,
    pub pressure: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChangeMessage {
    pub channel: u8,
    pub controller: u8,
    pub value: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramChangeMessage {
    pub channel: u8,
    pub program: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPressureMessage {
    pub channel: u8,
    pub pressure: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchBendMessage {
    pub channel: u8,
    /// 14-bit, 8192 is center.
    pub value: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeCodeMessage {
    pub message_type: u8,
    pub value: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongPositionMessage {
    /// Beats since song start; one beat is 6 MIDI clocks.
    pub beats: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongSelectMessage {
    pub index: u8,
}

/// Parses the message at the start of `data`. Data bytes are masked to
/// 7 bits first, trailing padding is ignored.
fn parse(data: MidiDataByte) -> Option<MidiMsg> {
    let mut word = data;
    for byte in &mut word[1..] {
        *byte &= DATA_MASK;
    }
    match MidiMsg::from_midi(&word) {
        Ok((msg, _len)) => Some(msg),
        Err(_) => None,
    }
}

fn parse_channel_voice(data: MidiDataByte) -> Option<(u8, ChannelVoiceMsg)> {
    match parse(data)? {
        MidiMsg::ChannelVoice { channel, msg } => Some((channel as u8, msg)),
        _ => None,
    }
}

pub fn decode_message_type(data: MidiDataByte) -> MessageType {
    // A 4-byte word never holds a complete exclusive message, only its framing.
    match data[0] {
        SYSTEM_EXCLUSIVE => return MessageType::SystemExclusive,
        END_OF_EXCLUSIVE => return MessageType::EndOfExclusive,
        _ => {}
    }

    match parse(data) {
        Some(MidiMsg::ChannelVoice { msg, .. }) => match msg {
            ChannelVoiceMsg::NoteOff { .. } | ChannelVoiceMsg::HighResNoteOff { .. } => {
                MessageType::NoteOff
            }
            ChannelVoiceMsg::NoteOn { .. } | ChannelVoiceMsg::HighResNoteOn { .. } => {
                MessageType::NoteOn
            }
            ChannelVoiceMsg::PolyPressure { .. } => MessageType::PolyKeyPressure,
            ChannelVoiceMsg::ControlChange { .. } => MessageType::ControlChange,
            ChannelVoiceMsg::ProgramChange { .. } => MessageType::ProgramChange,
            ChannelVoiceMsg::ChannelPressure { .. } => MessageType::ChannelPressure,
            ChannelVoiceMsg::PitchBend { .. } => MessageType::PitchBend,
        },
        Some(MidiMsg::ChannelMode { msg, .. }) => match msg {
            ChannelModeMsg::AllSoundOff => MessageType::AllSoundOff,
            ChannelModeMsg::ResetAllControllers => MessageType::ResetAllControllers,
            // Only 0 and 127 are defined for local control.
            ChannelModeMsg::LocalControl(_) => match data[2] & DATA_MASK {
                0 => MessageType::LocalControlOff,
                127 => MessageType::LocalControlOn,
                _ => MessageType::Unknown,
            },
            ChannelModeMsg::AllNotesOff => MessageType::AllNotesOff,
            ChannelModeMsg::OmniMode(false) => MessageType::OmniModeOff,
            ChannelModeMsg::OmniMode(true) => MessageType::OmniModeOn,
            ChannelModeMsg::PolyMode(PolyMode::Mono(_)) => MessageType::MonoModeOn,
            ChannelModeMsg::PolyMode(PolyMode::Poly) => MessageType::PolyModeOn,
        },
        Some(MidiMsg::SystemCommon { msg }) => match msg {
            SystemCommonMsg::SongPosition(_) => MessageType::SongPosition,
            SystemCommonMsg::SongSelect(_) => MessageType::SongSelect,
            SystemCommonMsg::TuneRequest => MessageType::TuneRequest,
            // The remaining variants are the eight MTC quarter frames.
            _ => MessageType::TimeCode,
        },
        Some(MidiMsg::SystemRealTime { msg }) => match msg {
            SystemRealTimeMsg::TimingClock => MessageType::TimingClock,
            SystemRealTimeMsg::Start => MessageType::Start,
            SystemRealTimeMsg::Continue => MessageType::Continue,
            SystemRealTimeMsg::Stop => MessageType::Stop,
            SystemRealTimeMsg::ActiveSensing => MessageType::ActiveSensing,
            SystemRealTimeMsg::SystemReset => MessageType::Reset,
        },
        _ => MessageType::Unknown,
    }
}

/// Channel (0-15) of a channel voice or channel mode message.
#[inline]
pub fn decode_channel(data: MidiDataByte) -> u8 {
    data[0] & CHANNEL_MASK
}

/// Upper 7 bits of a 14-bit high resolution velocity.
#[inline]
fn coarse_velocity(velocity: u16) -> u8 {
    (velocity >> 7) as u8
}

pub fn decode_note_off(data: MidiDataByte) -> Option<NoteOffMessage> {
    match parse_channel_voice(data)? {
        (channel, ChannelVoiceMsg::NoteOff { note, velocity }) => Some(NoteOffMessage {
            channel,
            note,
            velocity,
        }),
        (channel, ChannelVoiceMsg::HighResNoteOff { note, velocity }) => Some(NoteOffMessage {
            channel,
            note,
            velocity: coarse_velocity(velocity),
        }),
        _ => None,
    }
}

pub fn decode_note_on(data: MidiDataByte) -> Option<NoteOnMessage> {
    match parse_channel_voice(data)? {
        (channel, ChannelVoiceMsg::NoteOn { note, velocity }) => Some(NoteOnMessage {
            channel,
            note,
            velocity,
        }),
        (channel, ChannelVoiceMsg::HighResNoteOn { note, velocity }) => Some(NoteOnMessage {
            channel,
            note,
            velocity: coarse_velocity(velocity),
        }),
        _ => None,
    }
}

pub fn decode_poly_key_pressure(data: MidiDataByte) -> Option<PolyKeyPressureMessage> {
    match parse_channel_voice(data)? {
        (channel, ChannelVoiceMsg::PolyPressure { note, pressure }) => {
            Some(PolyKeyPressureMessage { channel, note, pressure })
        }
        _ => None,
    }
}

pub fn decode_control_change(data: MidiDataByte) -> Option<ControlChangeMessage> {
    match parse_channel_voice(data)? {
        (channel, ChannelVoiceMsg::ControlChange { control: ControlChange::CC { control, value } }) => {
            Some(ControlChangeMessage {
                channel,
                controller: control,
                value,
            })
        }
        _ => None,
    }
}

pub fn decode_program_change(data: MidiDataByte) -> Option<ProgramChangeMessage> {
    match parse_channel_voice(data)? {
        (channel, ChannelVoiceMsg::ProgramChange { program }) => {
            Some(ProgramChangeMessage { channel, program })
        }
        _ => None,
    }
}

pub fn decode_channel_pressure(data: MidiDataByte) -> Option<ChannelPressureMessage> {
    match parse_channel_voice(data)? {
        (channel, ChannelVoiceMsg::ChannelPressure { pressure }) => {
            Some(ChannelPressureMessage { channel, pressure })
        }
        _ => None,
    }
}

pub fn decode_pitch_bend(data: MidiDataByte) -> Option<PitchBendMessage> {
    match parse_channel_voice(data)? {
        (channel, ChannelVoiceMsg::PitchBend { bend }) => Some(PitchBendMessage {
            channel,
            value: bend,
        }),
        _ => None,
    }
}

/// Quarter frames are reported piece by piece. Assembling a full time code
/// takes all eight pieces, so the raw nibbles are read directly.
pub fn decode_time_code(data: MidiDataByte) -> TimeCodeMessage {
    TimeCodeMessage {
        message_type: (data[1] & 0x70) >> 4,
        value: data[1] & 0x0F,
    }
}

pub fn decode_song_position(data: MidiDataByte) -> Option<SongPositionMessage> {
    match parse(data)? {
        MidiMsg::SystemCommon {
            msg: SystemCommonMsg::SongPosition(beats),
        } => Some(SongPositionMessage { beats }),
        _ => None,
    }
}

pub fn decode_song_select(data: MidiDataByte) -> Option<SongSelectMessage> {
    match parse(data)? {
        MidiMsg::SystemCommon {
            msg: SystemCommonMsg::SongSelect(index),
        } => Some(SongSelectMessage { index }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midi_msg::Channel;

    #[test]
    fn test_channel_voice_types() {
        assert_eq!(decode_message_type([0x80, 60, 0, 0]), MessageType::NoteOff);
        assert_eq!(decode_message_type([0x9F, 60, 100, 0]), MessageType::NoteOn);
        assert_eq!(decode_message_type([0xA0, 60, 10, 0]), MessageType::PolyKeyPressure);
        assert_eq!(decode_message_type([0xB3, 7, 100, 0]), MessageType::ControlChange);
        assert_eq!(decode_message_type([0xC0, 5, 0, 0]), MessageType::ProgramChange);
        assert_eq!(decode_message_type([0xD0, 50, 0, 0]), MessageType::ChannelPressure);
        assert_eq!(decode_message_type([0xE0, 0, 64, 0]), MessageType::PitchBend);
        assert_eq!(decode_message_type([0x40, 0, 0, 0]), MessageType::Unknown);
    }

    #[test]
    fn test_channel_mode_types() {
        assert_eq!(decode_message_type([0xB0, 119, 0, 0]), MessageType::ControlChange);
        assert_eq!(decode_message_type([0xB0, 120, 0, 0]), MessageType::AllSoundOff);
        assert_eq!(decode_message_type([0xB0, 121, 0, 0]), MessageType::ResetAllControllers);
        assert_eq!(decode_message_type([0xB0, 122, 0, 0]), MessageType::LocalControlOff);
        assert_eq!(decode_message_type([0xB0, 122, 127, 0]), MessageType::LocalControlOn);
        assert_eq!(decode_message_type([0xB0, 122, 5, 0]), MessageType::Unknown);
        assert_eq!(decode_message_type([0xB0, 123, 0, 0]), MessageType::AllNotesOff);
        assert_eq!(decode_message_type([0xB0, 124, 0, 0]), MessageType::OmniModeOff);
        assert_eq!(decode_message_type([0xB0, 125, 0, 0]), MessageType::OmniModeOn);
        assert_eq!(decode_message_type([0xB0, 126, 0, 0]), MessageType::MonoModeOn);
        assert_eq!(decode_message_type([0xB0, 127, 0, 0]), MessageType::PolyModeOn);
    }

    #[test]
    fn test_system_types() {
        assert_eq!(decode_message_type([0xF0, 0, 0, 0]), MessageType::SystemExclusive);
        assert_eq!(decode_message_type([0xF1, 0, 0, 0]), MessageType::TimeCode);
        assert_eq!(decode_message_type([0xF2, 0, 0, 0]), MessageType::SongPosition);
        assert_eq!(decode_message_type([0xF3, 0, 0, 0]), MessageType::SongSelect);
        assert_eq!(decode_message_type([0xF4, 0, 0, 0]), MessageType::Unknown);
        assert_eq!(decode_message_type([0xF6, 0, 0, 0]), MessageType::TuneRequest);
        assert_eq!(decode_message_type([0xF7, 0, 0, 0]), MessageType::EndOfExclusive);
        assert_eq!(decode_message_type([0xF8, 0, 0, 0]), MessageType::TimingClock);
        assert_eq!(decode_message_type([0xFA, 0, 0, 0]), MessageType::Start);
        assert_eq!(decode_message_type([0xFB, 0, 0, 0]), MessageType::Continue);
        assert_eq!(decode_message_type([0xFC, 0, 0, 0]), MessageType::Stop);
        assert_eq!(decode_message_type([0xFE, 0, 0, 0]), MessageType::ActiveSensing);
        assert_eq!(decode_message_type([0xFF, 0, 0, 0]), MessageType::Reset);
    }

    #[test]
    fn test_decode_messages() {
        assert_eq!(
            decode_note_on([0x93, 64, 127, 0]),
            Some(NoteOnMessage { channel: 3, note: 64, velocity: 127 })
        );
        assert_eq!(
            decode_control_change([0xB1, 67, 64, 0]),
            Some(ControlChangeMessage { channel: 1, controller: 67, value: 64 })
        );
        assert_eq!(
            decode_program_change([0xC2, 12, 0, 0]),
            Some(ProgramChangeMessage { channel: 2, program: 12 })
        );
        assert_eq!(
            decode_channel_pressure([0xD5, 33, 0, 0]),
            Some(ChannelPressureMessage { channel: 5, pressure: 33 })
        );
    }

    #[test]
    fn test_decode_wrong_kind_is_none() {
        assert!(decode_note_on([0x80, 60, 0, 0]).is_none());
        assert!(decode_control_change([0x90, 60, 100, 0]).is_none());
        assert!(decode_pitch_bend([0xF8, 0, 0, 0]).is_none());
    }

    #[test]
    fn test_velocity_zero_note_on_stays_note_on() {
        assert_eq!(decode_message_type([0x90, 60, 0, 0]), MessageType::NoteOn);
        assert_eq!(decode_note_on([0x90, 60, 0, 0]).map(|m| m.velocity), Some(0));
    }

    #[test]
    fn test_decodes_library_encoded_bytes() {
        let bytes = MidiMsg::ChannelVoice {
            channel: Channel::Ch10,
            msg: ChannelVoiceMsg::PolyPressure { note: 42, pressure: 99 },
        }
        .to_midi();
        let msg = decode_poly_key_pressure(crate::midi::to_midi_data_byte(&bytes)).unwrap();
        assert_eq!((msg.channel, msg.note, msg.pressure), (9, 42, 99));
    }

    #[test]
    fn test_data_bytes_are_masked() {
        let msg = decode_note_off([0x80, 0xBC, 0xFF, 0]).unwrap();
        assert_eq!(msg.note, 0x3C);
        assert_eq!(msg.velocity, 0x7F);
    }

    #[test]
    fn test_decode_pitch_bend() {
        assert_eq!(decode_pitch_bend([0xE0, 0, 64, 0]).unwrap().value, 8192);
        assert_eq!(decode_pitch_bend([0xE1, 0x7F, 0x7F, 0]).unwrap().value, 16383);
        assert_eq!(decode_pitch_bend([0xE1, 0, 0, 0]).unwrap().channel, 1);
    }

    #[test]
    fn test_decode_system_common() {
        let tc = decode_time_code([0xF1, 0x35, 0, 0]);
        assert_eq!(tc.message_type, 3);
        assert_eq!(tc.value, 5);
        assert_eq!(decode_song_position([0xF2, 0x01, 0x01, 0]).unwrap().beats, 129);
        assert_eq!(decode_song_select([0xF3, 7, 0, 0]).unwrap().index, 7);
    }
}
