//! Audio device setup and the render callback

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use inharmonic_dsp::{
    synth::message::SynthMessage, ProcessSetup, Processor, SampleSize, MAX_BLOCK_SIZE,
};

use crate::ui::{state::VoiceSnapshot, UiApp, VIS_BUFFER_SIZE};

const CONTROL_QUEUE: usize = 256;
const SNAPSHOT_QUEUE: usize = 16;

/// Open the default output device, start the synth and hand the terminal
/// to the UI until it quits.
pub fn run() -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f64;
    let channels = (config.channels() as usize).max(1);
    tracing::info!("Audio: {} Hz, {} channels", sample_rate, channels);

    let mut processor = Processor::new(sample_rate);
    processor.set_bus_arrangements(&[], &[2])?;
    processor.setup_processing(ProcessSetup {
        sample_rate,
        max_block_size: MAX_BLOCK_SIZE,
        sample_size: SampleSize::Float32,
    })?;
    let initial_values = *processor.parameter_values();

    let (control_tx, mut control_rx) = RingBuffer::<SynthMessage>::new(CONTROL_QUEUE);
    let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(VIS_BUFFER_SIZE * 4);
    let (mut snapshot_tx, snapshot_rx) = RingBuffer::<VoiceSnapshot>::new(SNAPSHOT_QUEUE);

    let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            processor.drain_messages(&mut control_rx);

            let total_frames = data.len() / channels;
            let mut frames_written = 0;
            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let (l, r) = (&mut left[..frames], &mut right[..frames]);
                processor.process_32(&[], &[], l, r);

                let out = &mut data[frames_written * channels..(frames_written + frames) * channels];
                for (frame, (&sl, &sr)) in out.chunks_exact_mut(channels).zip(l.iter().zip(r.iter())) {
                    match frame {
                        [mono] => *mono = 0.5 * (sl + sr),
                        [fl, fr, rest @ ..] => {
                            *fl = sl;
                            *fr = sr;
                            rest.fill(0.0);
                        }
                        [] => {}
                    }
                }

                // the scope only needs what fits; drop the rest
                for &sample in l.iter() {
                    if audio_tx.push(sample).is_err() {
                        break;
                    }
                }
                frames_written += frames;
            }

            let _ = snapshot_tx.push(VoiceSnapshot::capture(processor.synth()));
        },
        |err| tracing::error!("Audio stream error: {}", err),
        None,
    )?;
    stream.play()?;

    let mut terminal = ratatui::init();
    let result = UiApp::new(control_tx, audio_rx, snapshot_rx, initial_values, sample_rate)
        .run(&mut terminal);
    ratatui::restore();

    drop(stream);
    tracing::info!("Shut down");
    result
}
