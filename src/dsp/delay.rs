/// Fixed-capacity circular delay line.
///
/// The head points at the newest sample. `read(0)` is the sample just pushed,
/// `tail()` the oldest one still stored. Storage is only (re)allocated by
/// `new` and `resize`, never by the per-sample methods.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f64>,
    head: usize,
}

impl DelayLine {
    pub fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)],
            head: 0,
        }
    }

    /// Change capacity and clear. Allocates; call outside the audio path.
    pub fn resize(&mut self, len: usize) {
        self.buffer.clear();
        self.buffer.resize(len.max(1), 0.0);
        self.head = 0;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn push(&mut self, sample: f64) {
        self.head = (self.head + 1) % self.buffer.len();
        self.buffer[self.head] = sample;
    }

    /// Oldest stored sample, `len - 1` pushes ago.
    #[inline]
    pub fn tail(&self) -> f64 {
        self.buffer[(self.head + 1) % self.buffer.len()]
    }

    /// Sample pushed `delay` pushes ago. Out-of-range delays read silence.
    #[inline]
    pub fn read(&self, delay: usize) -> f64 {
        let len = self.buffer.len();
        if delay >= len {
            return 0.0;
        }
        self.buffer[(self.head + len - delay) % len]
    }

    /// Linear interpolation between the two samples around a fractional delay.
    /// Delays at or past the capacity read silence.
    #[inline]
    pub fn read_interpolated(&self, delay: f64) -> f64 {
        let delay = delay.max(0.0);
        if delay >= self.buffer.len() as f64 {
            return 0.0;
        }
        let whole = delay.floor();
        let frac = delay - whole;
        let index = whole as usize;
        let a = self.read(index);
        let b = self.read((index + 1).min(self.buffer.len() - 1));
        a + frac * (b - a)
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.head = 0;
    }
}
