#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::params::ParamId;

/// Control messages sent to the audio thread from the UI or MIDI input.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { channel: u8, pitch: u8, velocity: f64 },
    NoteOff { channel: u8, pitch: u8, velocity: f64 },
    /// Normalized parameter value in [0, 1].
    Param { id: ParamId, value: f64 },
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

#[cfg(all(test, feature = "rtrb"))]
mod tests {
    use super::*;
    use rtrb::RingBuffer;

    #[test]
    fn test_ring_delivers_in_order() {
        let (mut tx, mut rx) = RingBuffer::<SynthMessage>::new(4);
        tx.push(SynthMessage::AllNotesOff).unwrap();
        tx.push(SynthMessage::Param {
            id: ParamId::Volume,
            value: 0.5,
        })
        .unwrap();

        assert_eq!(MessageReceiver::pop(&mut rx), Some(SynthMessage::AllNotesOff));
        assert!(matches!(
            MessageReceiver::pop(&mut rx),
            Some(SynthMessage::Param { id: ParamId::Volume, .. })
        ));
        assert_eq!(MessageReceiver::pop(&mut rx), None);
    }
}
