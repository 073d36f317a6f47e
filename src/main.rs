// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use polysynth::config::RenderConfig;
use polysynth::midi::MidiSequence;
use polysynth::sequencer::{Sequence, Sequencer};
use polysynth::soundbank::{SampleKit, SineBank, Soundbank};
use polysynth::synth::Synth;
use polysynth::wav::render_to_file;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "An offline polyphonic wavetable synthesizer."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Renders a MIDI file to a stereo 16-bit WAV file.
    Render {
        /// The MIDI file to render.
        midi: PathBuf,
        /// The WAV file to write.
        output: PathBuf,
        /// A YAML render configuration.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// A YAML sample kit to play with instead of sine waves.
        #[arg(short, long)]
        kit: Option<PathBuf>,
        /// The output sample rate in Hz.
        #[arg(short, long)]
        sample_rate: Option<u32>,
        /// The size of the voice pool.
        #[arg(short, long)]
        max_voices: Option<usize>,
        /// The MIDI channel (0-15) whose program changes select the drum program.
        #[arg(short, long)]
        drum_channel: Option<u32>,
    },
    /// Prints information about a MIDI file.
    Info {
        /// The MIDI file to inspect.
        midi: PathBuf,
    },
    /// Prints the default render configuration.
    Defaults {},
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            midi,
            output,
            config,
            kit,
            sample_rate,
            max_voices,
            drum_channel,
        } => {
            let mut render_config = match config {
                Some(path) => RenderConfig::deserialize(&path)?,
                None => RenderConfig::default(),
            };
            if let Some(kit) = kit {
                render_config.set_kit(&kit);
            }
            if let Some(sample_rate) = sample_rate {
                render_config.set_sample_rate(sample_rate);
            }
            if let Some(max_voices) = max_voices {
                render_config.set_max_voices(max_voices);
            }
            if let Some(drum_channel) = drum_channel {
                render_config.set_drum_channel(drum_channel);
            }
            render_config.validate()?;

            let sequence = MidiSequence::load(&midi)?;
            let soundbank: Box<dyn Soundbank> = match render_config.kit() {
                Some(kit) => Box::new(SampleKit::load(&kit)?),
                None => Box::new(SineBank::new()),
            };
            let synth = Synth::new(
                soundbank,
                render_config.sample_rate(),
                render_config.max_voices(),
            )
            .with_max_pitch_bend(render_config.max_pitch_bend_semitones());

            let mut sequencer =
                Sequencer::new(sequence, synth).with_buffer_size(render_config.buffer_size());
            sequencer.set_tempo(render_config.tempo_bpm());
            if let Some((channel, program)) = render_config.drum_remap() {
                sequencer = sequencer.with_drum_remap(channel, program);
            }

            let frames = render_to_file(&mut sequencer, &output)?;
            println!(
                "Rendered {} frames ({:.2}s) to {}.",
                frames,
                frames as f64 / f64::from(render_config.sample_rate()),
                output.display()
            );
        }
        Commands::Info { midi } => {
            let sequence = MidiSequence::load(&midi)?;
            println!("File: {}", midi.display());
            println!("Ticks per beat: {}", sequence.resolution());
            println!("Tracks: {}", sequence.track_count());
            println!("Events: {}", sequence.event_count());
            println!("Tempo changes: {}", sequence.tempo_changes().len());
            println!("Duration: {:.2}s", sequence.duration().as_secs_f64());
        }
        Commands::Defaults {} => {
            print!("{}", RenderConfig::with_defaults().to_yaml()?);
        }
    }

    Ok(())
}
