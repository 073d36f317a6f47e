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
use std::io::Write;
use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ConfigError;
use crate::sequencer::{DEFAULT_BUFFER_SIZE, DEFAULT_DRUM_PROGRAM};
use crate::synth::{DEFAULT_MAX_PITCH_BEND_SEMITONES, DEFAULT_MAX_VOICES, DEFAULT_SAMPLE_RATE};

/// Default starting tempo in beats per minute.
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// The configuration for a render. Every field is optional.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct RenderConfig {
    /// The output sample rate in Hz.
    sample_rate: Option<u32>,

    /// The size of the voice pool.
    max_voices: Option<usize>,

    /// The pitch bend range in semitones.
    max_pitch_bend_semitones: Option<f32>,

    /// Frames rendered per chunk.
    buffer_size: Option<usize>,

    /// The tempo in beats per minute until the timeline sets one.
    tempo_bpm: Option<f64>,

    /// The MIDI channel whose program changes are remapped to the drum program.
    drum_channel: Option<u32>,

    /// The program drum channel program changes are remapped to.
    drum_program: Option<u32>,

    /// A sample kit file to play with instead of the built-in sine bank. Relative
    /// paths are resolved against the directory of this config file.
    kit: Option<String>,

    /// The directory this config was loaded from.
    #[serde(skip)]
    base_path: Option<PathBuf>,
}

impl RenderConfig {
    /// Deserializes a file from the path into a render configuration struct.
    pub fn deserialize(path: &Path) -> Result<RenderConfig, ConfigError> {
        let mut config = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<RenderConfig>()?;
        config.base_path = path.parent().map(Path::to_path_buf);
        config.validate()?;
        Ok(config)
    }

    /// Serialize and save a render configuration struct to a file at given path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let serialized = self.to_yaml()?;
        info!(path = ?path, "Saving render config");

        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        let mut file = std::fs::File::create(path).map_err(write_err)?;
        file.write_all(serialized.as_bytes()).map_err(write_err)
    }

    /// Serializes the configuration to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yml::to_string(self)?)
    }

    /// A configuration with every default filled in.
    pub fn with_defaults() -> RenderConfig {
        RenderConfig {
            sample_rate: Some(DEFAULT_SAMPLE_RATE),
            max_voices: Some(DEFAULT_MAX_VOICES),
            max_pitch_bend_semitones: Some(DEFAULT_MAX_PITCH_BEND_SEMITONES),
            buffer_size: Some(DEFAULT_BUFFER_SIZE),
            tempo_bpm: Some(DEFAULT_TEMPO_BPM),
            drum_channel: None,
            drum_program: Some(DEFAULT_DRUM_PROGRAM),
            kit: None,
            base_path: None,
        }
    }

    /// Checks that every set value is usable for rendering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == Some(0) {
            return Err(ConfigError::Invalid("sample_rate must be positive".into()));
        }
        if self.buffer_size == Some(0) {
            return Err(ConfigError::Invalid("buffer_size must be positive".into()));
        }
        if self.tempo_bpm.is_some_and(|tempo| tempo <= 0.0) {
            return Err(ConfigError::Invalid("tempo_bpm must be positive".into()));
        }
        Ok(())
    }

    /// Returns the output sample rate (default: 44100).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    /// Returns the voice pool size (default: 28).
    pub fn max_voices(&self) -> usize {
        self.max_voices.unwrap_or(DEFAULT_MAX_VOICES)
    }

    /// Returns the pitch bend range in semitones (default: 2).
    pub fn max_pitch_bend_semitones(&self) -> f32 {
        self.max_pitch_bend_semitones
            .unwrap_or(DEFAULT_MAX_PITCH_BEND_SEMITONES)
    }

    /// Returns the number of frames rendered per chunk (default: 2048).
    pub fn buffer_size(&self) -> usize {
        self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE)
    }

    /// Returns the starting tempo in beats per minute (default: 120).
    pub fn tempo_bpm(&self) -> f64 {
        self.tempo_bpm.unwrap_or(DEFAULT_TEMPO_BPM)
    }

    /// Returns the drum remapping as (channel, program), if a drum channel is set.
    pub fn drum_remap(&self) -> Option<(u32, u32)> {
        self.drum_channel
            .map(|channel| (channel, self.drum_program.unwrap_or(DEFAULT_DRUM_PROGRAM)))
    }

    /// Returns the sample kit path, resolved against the config's directory.
    pub fn kit(&self) -> Option<PathBuf> {
        self.kit.as_ref().map(|kit| match &self.base_path {
            Some(base) if Path::new(kit).is_relative() => base.join(kit),
            _ => PathBuf::from(kit),
        })
    }

    /// Overrides the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = Some(sample_rate);
    }

    /// Overrides the voice pool size.
    pub fn set_max_voices(&mut self, max_voices: usize) {
        self.max_voices = Some(max_voices);
    }

    /// Overrides the drum channel.
    pub fn set_drum_channel(&mut self, channel: u32) {
        self.drum_channel = Some(channel);
    }

    /// Overrides the sample kit path.
    pub fn set_kit(&mut self, kit: &Path) {
        self.kit = Some(kit.to_string_lossy().into_owned());
        self.base_path = None;
    }
}
