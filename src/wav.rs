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

//! Writes rendered audio to WAV files.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use crate::sequencer::{Sequence, Sequencer, CHANNELS};
use crate::synth::SynthError;

/// Error types for rendering to a file.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Synth error: {0}")]
    Synth(#[from] SynthError),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

/// Streams interleaved stereo 16-bit chunks into a WAV file.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    path: PathBuf,
    frames: usize,
}

impl WavSink {
    /// Creates a WAV file at the given path.
    pub fn create(path: &Path, sample_rate: u32) -> Result<WavSink, RenderError> {
        let spec = WavSpec {
            channels: CHANNELS as u16,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        Ok(WavSink {
            writer: WavWriter::create(path, spec)?,
            path: path.to_path_buf(),
            frames: 0,
        })
    }

    /// Appends a chunk of interleaved samples.
    pub fn write_chunk(&mut self, chunk: &[i16]) -> Result<(), RenderError> {
        let mut writer = self.writer.get_i16_writer(chunk.len() as u32);
        for &sample in chunk {
            writer.write_sample(sample);
        }
        writer.flush()?;
        self.frames += chunk.len() / CHANNELS;
        Ok(())
    }

    /// Gets the number of frames written so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Completes the WAV header and closes the file.
    pub fn finalize(self) -> Result<usize, RenderError> {
        self.writer.finalize()?;
        info!(path = ?self.path, frames = self.frames, "WAV file written");
        Ok(self.frames)
    }
}

/// Renders a sequence straight into a WAV file, one chunk at a time. Returns the
/// number of frames written.
pub fn render_to_file<Q: Sequence>(
    sequencer: &mut Sequencer<Q>,
    path: &Path,
) -> Result<usize, RenderError> {
    let mut sink = WavSink::create(path, sequencer.synth().sample_rate())?;
    sequencer.render_chunked(|chunk| sink.write_chunk(chunk))?;
    sink.finalize()
}
