use crate::effects::StereoEffect;

/// Sample-and-hold downsampler.
///
/// Captures the first frame of every `division`-frame window and repeats it
/// for the rest of the window. A division of 1 or less passes audio through.
#[derive(Debug, Clone)]
pub struct SampleDivider {
    division: usize,
    counter: usize,
    held: (f64, f64),
}

impl SampleDivider {
    pub fn new() -> Self {
        Self {
            division: 1,
            counter: 0,
            held: (0.0, 0.0),
        }
    }

    pub fn set_division(&mut self, division: usize) {
        self.division = division.max(1);
        self.counter %= self.division;
    }

    pub fn division(&self) -> usize {
        self.division
    }
}

impl Default for SampleDivider {
    fn default() -> Self {
        Self::new()
    }
}

impl StereoEffect for SampleDivider {
    fn set_sample_rate(&mut self, _sample_rate: f64) {
        self.reset();
    }

    #[inline]
    fn process(&mut self, left: f64, right: f64) -> (f64, f64) {
        if self.division <= 1 {
            return (left, right);
        }
        if self.counter == 0 {
            self.held = (left, right);
        }
        self.counter += 1;
        if self.counter >= self.division {
            self.counter = 0;
        }
        self.held
    }

    fn reset(&mut self) {
        self.counter = 0;
        self.held = (0.0, 0.0);
    }
}
