//! TUI for inharmonic
//!
//! Keyboard piano, parameter editing and live views of the output.

mod params;
mod spectrum;
pub mod state;
mod voices;
mod waveform;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use inharmonic_dsp::{
    params::{PARAMETERS, PARAM_COUNT},
    synth::message::SynthMessage,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use params::{nudge, render_params};
use spectrum::{render_spectrum, SpectrumAnalyzer};
use state::VoiceSnapshot;
use voices::render_voices;
use waveform::render_waveform;

/// Samples kept for the scope and the FFT (power of two)
pub const VIS_BUFFER_SIZE: usize = 1024;

/// Terminals report key presses but not releases, so notes end on a timer.
const NOTE_LENGTH: Duration = Duration::from_millis(400);

/// Piano layout on the home row, semitones above the octave root.
const PIANO_KEYS: [(char, u8); 13] = [
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
];

pub struct UiApp {
    control_tx: Producer<SynthMessage>,
    audio_rx: Consumer<f32>,
    snapshot_rx: Consumer<VoiceSnapshot>,
    audio_buffer: Vec<f32>,
    snapshot: VoiceSnapshot,
    spectrum: SpectrumAnalyzer,
    values: [f64; PARAM_COUNT],
    selected: usize,
    octave: i32,
    held: Vec<(u8, Instant)>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        control_tx: Producer<SynthMessage>,
        audio_rx: Consumer<f32>,
        snapshot_rx: Consumer<VoiceSnapshot>,
        values: [f64; PARAM_COUNT],
        sample_rate: f64,
    ) -> Self {
        Self {
            control_tx,
            audio_rx,
            snapshot_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            snapshot: VoiceSnapshot::default(),
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            values,
            selected: 0,
            octave: 4,
            held: Vec::new(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_snapshots();
            self.expire_notes();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.send(SynthMessage::AllNotesOff);
        Ok(())
    }

    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(..excess);
        }
        if received {
            self.spectrum.update(&self.audio_buffer);
        }
    }

    fn poll_snapshots(&mut self) {
        while let Ok(snapshot) = self.snapshot_rx.pop() {
            self.snapshot = snapshot;
        }
    }

    fn expire_notes(&mut self) {
        let now = Instant::now();
        let mut i = 0;
        while i < self.held.len() {
            let (pitch, started) = self.held[i];
            if now.duration_since(started) >= NOTE_LENGTH {
                self.held.swap_remove(i);
                self.send(SynthMessage::NoteOff {
                    channel: 0,
                    pitch,
                    velocity: 0.0,
                });
            } else {
                i += 1;
            }
        }
    }

    fn send(&mut self, message: SynthMessage) {
        if self.control_tx.push(message).is_err() {
            tracing::warn!("Control queue full, dropped {:?}", message);
        }
    }

    fn play(&mut self, semitone: u8) {
        let pitch = (self.octave + 1) * 12 + semitone as i32;
        if !(0..=127).contains(&pitch) {
            return;
        }
        let pitch = pitch as u8;
        // retrigger: end the previous press of this key first
        if let Some(pos) = self.held.iter().position(|&(p, _)| p == pitch) {
            self.held.swap_remove(pos);
            self.send(SynthMessage::NoteOff {
                channel: 0,
                pitch,
                velocity: 0.0,
            });
        }
        self.send(SynthMessage::NoteOn {
            channel: 0,
            pitch,
            velocity: 0.8,
        });
        self.held.push((pitch, Instant::now()));
    }

    fn adjust(&mut self, direction: f64) {
        let info = &PARAMETERS[self.selected];
        let value = nudge(info, self.values[self.selected], direction);
        self.values[self.selected] = value;
        self.send(SynthMessage::Param { id: info.id, value });
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => {
                self.held.clear();
                self.send(SynthMessage::AllNotesOff);
            }
            KeyCode::Char('z') => self.octave = (self.octave - 1).max(-1),
            KeyCode::Char('x') => self.octave = (self.octave + 1).min(9),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(PARAM_COUNT - 1),
            KeyCode::Left => self.adjust(-1.0),
            KeyCode::Right => self.adjust(1.0),
            KeyCode::Char(c) => {
                if let Some(&(_, semitone)) = PIANO_KEYS.iter().find(|(k, _)| *k == c) {
                    self.play(semitone);
                }
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(40)])
            .split(rows[0]);

        render_params(frame, columns[0], &self.values, self.selected);

        let views = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8),      // Voices
                Constraint::Percentage(50), // Scope
                Constraint::Min(6),         // Spectrum
            ])
            .split(columns[1]);

        render_voices(frame, views[0], &self.snapshot);
        render_waveform(frame, views[1], &self.audio_buffer);
        render_spectrum(frame, views[2], &self.spectrum);

        let help = Paragraph::new(format!(
            " [a-k] Play  [z/x] Octave {}  [↑↓] Select  [←→] Adjust  [Space] All off  [Q] Quit",
            self.octave
        ))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, rows[1]);
    }
}
