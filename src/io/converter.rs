use crate::{
    io::midi::MidiEvent,
    params::ParamId,
    synth::message::SynthMessage,
};

const CC_MOD_WHEEL: u8 = 1;
const CC_VOLUME: u8 = 7;
const CC_EXPRESSION: u8 = 11;
const CC_SUSTAIN: u8 = 64;
const CC_SOSTENUTO: u8 = 66;
const CC_SOFT: u8 = 67;
const CC_ALL_NOTES_OFF: u8 = 123;

fn normalized(value: u8) -> f64 {
    value as f64 / 127.0
}

fn switch(value: u8) -> f64 {
    if value >= 64 {
        1.0
    } else {
        0.0
    }
}

fn param(id: ParamId, value: f64) -> Option<SynthMessage> {
    Some(SynthMessage::Param { id, value })
}

/// Translate a MIDI message on `channel_filter` into a synth message.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    if midi.channel() != channel_filter {
        return None;
    }
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if velocity > 0 => Some(SynthMessage::NoteOn {
            channel,
            pitch: key,
            velocity: normalized(velocity),
        }),
        MidiEvent::NoteOn { channel, key, .. } => Some(SynthMessage::NoteOff {
            channel,
            pitch: key,
            velocity: 0.0,
        }),
        MidiEvent::NoteOff {
            channel,
            key,
            velocity,
        } => Some(SynthMessage::NoteOff {
            channel,
            pitch: key,
            velocity: normalized(velocity),
        }),
        MidiEvent::PitchBend { value, .. } => {
            param(ParamId::PitchBend, (value as f64 / 16384.0).min(1.0))
        }
        MidiEvent::ControlChange {
            controller, value, ..
        } => match controller {
            CC_MOD_WHEEL => param(ParamId::ModWheel, normalized(value)),
            CC_VOLUME => param(ParamId::Volume, normalized(value)),
            CC_EXPRESSION => param(ParamId::Expression, normalized(value)),
            CC_SUSTAIN => param(ParamId::SustainPedal, switch(value)),
            CC_SOSTENUTO => param(ParamId::SostenutoPedal, switch(value)),
            CC_SOFT => param(ParamId::SoftPedal, normalized(value)),
            CC_ALL_NOTES_OFF => Some(SynthMessage::AllNotesOff),
            _ => None,
        },
        MidiEvent::ProgramChange { .. } => None,
    }
}
