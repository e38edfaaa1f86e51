/// Channel-voice MIDI messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// 14-bit wheel position, centre 8192.
    PitchBend { channel: u8, value: u16 },
    ProgramChange { channel: u8, program: u8 },
}

pub const PITCH_BEND_CENTER: u16 = 8192;

impl MidiEvent {
    /// Parse one raw message. System and unknown messages return `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0F;
        let data_byte = |i: usize| data.get(i).map(|b| b & 0x7F);

        let event = match status & 0xF0 {
            0x80 => MidiEvent::NoteOff {
                channel,
                key: data_byte(0)?,
                velocity: data_byte(1)?,
            },
            0x90 => MidiEvent::NoteOn {
                channel,
                key: data_byte(0)?,
                velocity: data_byte(1)?,
            },
            0xB0 => MidiEvent::ControlChange {
                channel,
                controller: data_byte(0)?,
                value: data_byte(1)?,
            },
            0xC0 => MidiEvent::ProgramChange {
                channel,
                program: data_byte(0)?,
            },
            0xE0 => {
                let lsb = data_byte(0)? as u16;
                let msb = data_byte(1)? as u16;
                MidiEvent::PitchBend {
                    channel,
                    value: (msb << 7) | lsb,
                }
            }
            _ => return None,
        };
        Some(event)
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}
