/*
ADSR Envelope Implementation
============================

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0).

  stage       Attack, Decay, Sustain, Release or Stop. Stop is terminal: the
              envelope reports "finished" and the owning voice may be reused.

  remaining   Fraction of the current timed stage still to run. Starts at 1.0
              and falls by the stage rate each sample.

  rate        Per-sample decrement of `remaining`:

                  rate = 1 / max(1, time_ms * 1e-3 * sample_rate)

              The max() guarantees every stage lasts at least one sample.


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release  Stop

Every timed stage interpolates linearly between a start and a target level as
a function of the elapsed fraction (1 - remaining):

  Attack   start → 1.0     start = level at note_on
  Decay    1.0   → S
  Release  start → 0.0     start = level at note_off


Retriggering
------------

note_on captures the current level as the attack start instead of jumping to
zero. Retriggering a voice that is still releasing therefore continues from
where it is, and the first attack sample moves by at most one attack step.

note_off only acts on stages before Release, so a second note_off (or a
note_off on a stopped envelope) is ignored.
*/

/// The current stage of the envelope state machine.
///
/// Ordered: everything `>= Release` is past the key-up point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnvelopeState {
    Attack,
    Decay,
    Sustain,
    Release,
    Stop,
}

/// Stage times in milliseconds plus the sustain level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeTimes {
    pub attack_ms: f64,
    pub decay_ms: f64,
    pub sustain: f64,
    pub release_ms: f64,
}

impl Default for EnvelopeTimes {
    fn default() -> Self {
        Self {
            attack_ms: 20.0,
            decay_ms: 500.0,
            sustain: 0.8,
            release_ms: 1500.0,
        }
    }
}

/// Per-sample decrement for a stage lasting `time_ms`.
#[inline]
pub fn rate_from_ms(time_ms: f64, sample_rate: f64) -> f64 {
    1.0 / (time_ms * 1e-3 * sample_rate).max(1.0)
}

#[derive(Debug, Clone)]
pub struct EnvelopeGenerator {
    attack_rate: f64,
    decay_rate: f64,
    sustain_level: f64,
    release_rate: f64,

    state: EnvelopeState,
    remaining: f64,
    level: f64,
    attack_start: f64,
    release_start: f64,
}

impl EnvelopeGenerator {
    pub fn new(times: &EnvelopeTimes, sample_rate: f64) -> Self {
        let mut env = Self {
            attack_rate: 1.0,
            decay_rate: 1.0,
            sustain_level: 1.0,
            release_rate: 1.0,
            state: EnvelopeState::Stop,
            remaining: 0.0,
            level: 0.0,
            attack_start: 0.0,
            release_start: 0.0,
        };
        env.configure(times, sample_rate);
        env
    }

    /// Re-derive all stage rates. The running stage is left untouched.
    pub fn configure(&mut self, times: &EnvelopeTimes, sample_rate: f64) {
        self.set_attack(times.attack_ms, sample_rate);
        self.set_decay(times.decay_ms, sample_rate);
        self.set_sustain(times.sustain);
        self.set_release(times.release_ms, sample_rate);
    }

    pub fn set_attack(&mut self, time_ms: f64, sample_rate: f64) {
        self.attack_rate = rate_from_ms(time_ms, sample_rate);
    }

    pub fn set_decay(&mut self, time_ms: f64, sample_rate: f64) {
        self.decay_rate = rate_from_ms(time_ms, sample_rate);
    }

    pub fn set_sustain(&mut self, level: f64) {
        // NaN falls through max() to 0
        self.sustain_level = level.max(0.0).min(1.0);
    }

    pub fn set_release(&mut self, time_ms: f64, sample_rate: f64) {
        self.release_rate = rate_from_ms(time_ms, sample_rate);
    }

    /// Gate high: restart from the current level.
    pub fn note_on(&mut self) {
        self.state = EnvelopeState::Attack;
        self.remaining = 1.0;
        self.attack_start = self.level;
    }

    /// Gate low: release from the current level, unless already releasing.
    pub fn note_off(&mut self) {
        if self.state >= EnvelopeState::Release {
            return;
        }
        self.state = EnvelopeState::Release;
        self.remaining = 1.0;
        self.release_start = self.level;
    }

    /// Advance one sample. Returns `None` once the envelope has reached Stop,
    /// including the sample on which it enters Stop.
    #[inline]
    pub fn next_sample(&mut self) -> Option<f64> {
        match self.state {
            EnvelopeState::Attack => {
                self.remaining -= self.attack_rate;
                if self.remaining <= 0.0 {
                    self.state = EnvelopeState::Decay;
                    self.remaining = 1.0;
                    self.level = 1.0;
                } else {
                    self.level =
                        self.attack_start + (1.0 - self.attack_start) * (1.0 - self.remaining);
                }
            }
            EnvelopeState::Decay => {
                self.remaining -= self.decay_rate;
                if self.remaining <= 0.0 {
                    self.state = EnvelopeState::Sustain;
                    self.level = self.sustain_level;
                } else {
                    self.level =
                        self.sustain_level + (1.0 - self.sustain_level) * self.remaining;
                }
            }
            EnvelopeState::Sustain => {}
            EnvelopeState::Release => {
                self.remaining -= self.release_rate;
                if self.remaining <= 0.0 {
                    self.state = EnvelopeState::Stop;
                    self.level = 0.0;
                    return None;
                }
                self.level = self.release_start * self.remaining;
            }
            EnvelopeState::Stop => {
                self.level = 0.0;
                return None;
            }
        }

        Some(self.level)
    }

    /// Force the idle state without a release tail.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Stop;
        self.remaining = 0.0;
        self.level = 0.0;
        self.attack_start = 0.0;
        self.release_start = 0.0;
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn is_finished(&self) -> bool {
        self.state == EnvelopeState::Stop
    }

    pub fn attack_rate(&self) -> f64 {
        self.attack_rate
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    pub fn sustain_level(&self) -> f64 {
        self.sustain_level
    }

    pub fn release_rate(&self) -> f64 {
        self.release_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 1_000.0;

    fn envelope(attack_ms: f64, decay_ms: f64, sustain: f64, release_ms: f64) -> EnvelopeGenerator {
        let times = EnvelopeTimes {
            attack_ms,
            decay_ms,
            sustain,
            release_ms,
        };
        EnvelopeGenerator::new(&times, SAMPLE_RATE)
    }

    /// Run until the state changes away from `state`, returning the levels seen in it.
    fn collect_stage(env: &mut EnvelopeGenerator, state: EnvelopeState) -> Vec<f64> {
        let mut levels = Vec::new();
        while env.state() == state {
            match env.next_sample() {
                Some(level) if env.state() == state => levels.push(level),
                _ => break,
            }
        }
        levels
    }

    #[test]
    fn test_created_idle() {
        let mut env = envelope(10.0, 10.0, 0.5, 10.0);
        assert_eq!(env.state(), EnvelopeState::Stop);
        assert_eq!(env.next_sample(), None);
    }

    #[test]
    fn test_rate_floor_is_one_sample() {
        assert_eq!(rate_from_ms(0.0, 48_000.0), 1.0);
        assert_eq!(rate_from_ms(-5.0, 48_000.0), 1.0);
        assert!((rate_from_ms(10.0, 48_000.0) - 1.0 / 480.0).abs() < 1e-15);
    }

    #[test]
    fn test_stages_are_monotonic() {
        let mut env = envelope(50.0, 80.0, 0.4, 60.0);
        env.note_on();

        let attack = collect_stage(&mut env, EnvelopeState::Attack);
        assert!(attack.windows(2).all(|w| w[1] >= w[0]), "attack not rising");
        assert_eq!(env.state(), EnvelopeState::Decay);
        assert_eq!(env.level(), 1.0);

        let decay = collect_stage(&mut env, EnvelopeState::Decay);
        assert!(decay.windows(2).all(|w| w[1] <= w[0]), "decay not falling");
        assert_eq!(env.state(), EnvelopeState::Sustain);

        let sustain: Vec<f64> = (0..100).filter_map(|_| env.next_sample()).collect();
        assert!(sustain.iter().all(|&l| l == 0.4), "sustain drifted");

        env.note_off();
        let release = collect_stage(&mut env, EnvelopeState::Release);
        assert!(release.windows(2).all(|w| w[1] <= w[0]), "release not falling");
        assert_eq!(env.state(), EnvelopeState::Stop);
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn test_finished_signal_on_entering_stop() {
        let mut env = envelope(1.0, 1.0, 1.0, 4.0);
        env.note_on();
        for _ in 0..10 {
            assert!(env.next_sample().is_some());
        }
        env.note_off();
        let mut samples = 0;
        while env.next_sample().is_some() {
            samples += 1;
            assert!(samples < 100, "release never finished");
        }
        // 4 ms at 1 kHz is four decrements of 0.25, the fourth lands on Stop
        assert_eq!(samples, 3);
        assert!(env.is_finished());
        assert_eq!(env.next_sample(), None);
    }

    #[test]
    fn test_note_off_ignored_when_releasing_or_stopped() {
        let mut env = envelope(1.0, 1.0, 0.5, 100.0);
        env.note_off();
        assert_eq!(env.state(), EnvelopeState::Stop);

        env.note_on();
        for _ in 0..20 {
            env.next_sample();
        }
        env.note_off();
        for _ in 0..10 {
            env.next_sample();
        }
        let level = env.level();
        env.note_off();
        env.next_sample();
        assert!(env.level() < level, "second note_off restarted the release");
    }

    #[test]
    fn test_retrigger_mid_release_is_continuous() {
        let mut env = envelope(30.0, 30.0, 0.8, 200.0);
        env.note_on();
        for _ in 0..100 {
            env.next_sample();
        }
        env.note_off();
        for _ in 0..50 {
            env.next_sample();
        }
        assert_eq!(env.state(), EnvelopeState::Release);

        let before = env.level();
        env.note_on();
        let after = env.next_sample().unwrap_or(f64::NAN);
        let attack_step = env.attack_rate();
        assert!(after >= before);
        assert!(
            after - before <= attack_step + 1e-12,
            "retrigger jumped from {} to {}",
            before,
            after
        );
    }

    #[test]
    fn test_sustain_is_clamped() {
        let mut env = envelope(1.0, 1.0, 0.5, 1.0);
        env.set_sustain(-1.0);
        assert_eq!(env.sustain_level(), 0.0);
        env.set_sustain(3.0);
        assert_eq!(env.sustain_level(), 1.0);
    }

    #[test]
    fn test_reset_returns_to_stop() {
        let mut env = envelope(10.0, 10.0, 0.5, 10.0);
        env.note_on();
        env.next_sample();
        env.reset();
        assert!(env.is_finished());
        assert_eq!(env.level(), 0.0);
    }
}
