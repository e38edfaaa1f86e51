/// Note events of one block, timestamped in samples from the block start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub sample_offset: usize,
    pub kind: NoteEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEventKind {
    NoteOn { channel: u8, pitch: i32, velocity: f64 },
    NoteOff { channel: u8, pitch: i32, velocity: f64 },
}

impl NoteEvent {
    pub fn note_on(sample_offset: usize, pitch: i32, velocity: f64) -> Self {
        Self {
            sample_offset,
            kind: NoteEventKind::NoteOn {
                channel: 0,
                pitch,
                velocity,
            },
        }
    }

    pub fn note_off(sample_offset: usize, pitch: i32) -> Self {
        Self {
            sample_offset,
            kind: NoteEventKind::NoteOff {
                channel: 0,
                pitch,
                velocity: 0.0,
            },
        }
    }
}

/// Offset-ordered event queue for a single block.
///
/// Storage is reserved up front; events beyond the capacity are dropped
/// rather than growing the buffer on the audio thread. Events with equal
/// offsets keep their arrival order.
pub struct EventScheduler {
    events: Vec<NoteEvent>,
    cursor: usize,
    capacity: usize,
}

impl EventScheduler {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// Queue an event, clamping its offset into a block of `block_len`
    /// samples. Returns false if the queue is full.
    pub fn schedule(&mut self, mut event: NoteEvent, block_len: usize) -> bool {
        if self.events.len() >= self.capacity {
            return false;
        }
        event.sample_offset = event.sample_offset.min(block_len.saturating_sub(1));
        let at = self
            .events
            .partition_point(|queued| queued.sample_offset <= event.sample_offset);
        self.events.insert(at, event);
        true
    }

    /// Next event due at or before `sample`.
    #[inline]
    pub fn pop_due(&mut self, sample: usize) -> Option<NoteEvent> {
        let event = *self.events.get(self.cursor)?;
        if event.sample_offset <= sample {
            self.cursor += 1;
            Some(event)
        } else {
            None
        }
    }

    /// Next undispatched event, regardless of its offset.
    pub fn pop_remaining(&mut self) -> Option<NoteEvent> {
        let event = *self.events.get(self.cursor)?;
        self.cursor += 1;
        Some(event)
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.events.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
