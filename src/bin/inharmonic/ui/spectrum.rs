//! Spectrum view
//!
//! Hann-windowed FFT of the scope buffer, plotted on a log-frequency axis so
//! the stretched partial spacing of inharmonic patches is easy to see.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

const MIN_FREQ: f64 = 20.0;
const MAX_FREQ: f64 = 20_000.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    sample_rate: f64,
    /// (log10 frequency, dB) per FFT bin inside the audible range
    points: Vec<(f64, f64)>,
    peak_hz: f64,
}

impl SpectrumAnalyzer {
    pub fn new(size: usize, sample_rate: f64) -> Self {
        let size = size.max(2);
        let fft = FftPlanner::new().plan_fft_forward(size);
        let window = (0..size)
            .map(|i| {
                let x = i as f32 / (size - 1) as f32;
                0.5 - 0.5 * (std::f32::consts::TAU * x).cos()
            })
            .collect();

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); size],
            sample_rate,
            points: Vec::with_capacity(size / 2),
            peak_hz: 0.0,
        }
    }

    /// Recompute from the latest samples. Buffers of the wrong size are
    /// ignored.
    pub fn update(&mut self, samples: &[f32]) {
        if samples.len() != self.window.len() {
            return;
        }
        for ((bin, &s), &w) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            *bin = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let size = self.scratch.len();
        let hz_per_bin = self.sample_rate / size as f64;
        // window gain of a Hann is 0.5
        let norm = 2.0 / (0.5 * size as f64);

        self.points.clear();
        let mut peak_db = FLOOR_DB;
        self.peak_hz = 0.0;
        for (k, bin) in self.scratch.iter().enumerate().take(size / 2).skip(1) {
            let freq = k as f64 * hz_per_bin;
            if !(MIN_FREQ..=MAX_FREQ).contains(&freq) {
                continue;
            }
            let magnitude = bin.norm() as f64 * norm;
            let db = (20.0 * magnitude.max(1e-9).log10()).max(FLOOR_DB);
            if db > peak_db {
                peak_db = db;
                self.peak_hz = freq;
            }
            self.points.push((freq.log10(), db));
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn peak_hz(&self) -> f64 {
        self.peak_hz
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, analyzer: &SpectrumAnalyzer) {
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(analyzer.points());

    let title = if analyzer.peak_hz() > 0.0 {
        format!(" Spectrum (peak {:.0} Hz) ", analyzer.peak_hz())
    } else {
        " Spectrum ".to_string()
    };

    let chart = Chart::new(vec![dataset])
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([MIN_FREQ.log10(), MAX_FREQ.log10()])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
