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

//! Wavetable loading and caching for sample kits.
//!
//! Samples are loaded entirely into memory as mono 16-bit wavetables. Only the
//! first channel of multi-channel files is kept.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use hound::{SampleFormat, WavReader};
use tracing::{debug, info};

use super::error::SoundbankError;
use crate::sampler::WavetableSampler;

/// A loaded wavetable. The data is shared between every sampler playing it.
#[derive(Clone, Debug)]
pub struct LoadedWavetable {
    data: Arc<[i16]>,
    sample_rate: u32,
}

impl LoadedWavetable {
    /// Creates a loaded wavetable from raw data.
    pub fn new(data: impl Into<Arc<[i16]>>, sample_rate: u32) -> LoadedWavetable {
        LoadedWavetable {
            data: data.into(),
            sample_rate,
        }
    }

    /// Gets the wavetable data.
    pub fn data(&self) -> &Arc<[i16]> {
        &self.data
    }

    /// Gets the sample rate of the data.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Creates a sampler over this wavetable.
    pub fn sampler(&self) -> WavetableSampler {
        WavetableSampler::new(self.data.clone(), self.sample_rate)
    }

    /// Returns a copy of this wavetable converted to the given sample rate. Returns
    /// a cheap clone when the rate already matches.
    pub fn resampled(&self, sample_rate_hz: u32) -> LoadedWavetable {
        if sample_rate_hz == 0 || sample_rate_hz == self.sample_rate {
            return self.clone();
        }
        LoadedWavetable {
            data: self.sampler().resampled(sample_rate_hz),
            sample_rate: sample_rate_hz,
        }
    }

    /// Returns the memory size in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<i16>()
    }

    /// Returns the play length at the native pitch.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.data.len() as f64 / f64::from(self.sample_rate))
    }
}

/// Manages loading and caching of wavetables.
#[derive(Default)]
pub struct WavetableLoader {
    /// Cache of loaded wavetables by file path.
    cache: HashMap<PathBuf, LoadedWavetable>,
}

impl WavetableLoader {
    /// Creates a new wavetable loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a WAV file into memory.
    /// Returns a cached version if already loaded.
    pub fn load(&mut self, path: &Path) -> Result<LoadedWavetable, SoundbankError> {
        if let Some(wavetable) = self.cache.get(path) {
            debug!(path = ?path, "Using cached wavetable");
            return Ok(wavetable.clone());
        }

        let wav_err = |source| SoundbankError::Wav {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = WavReader::open(path).map_err(wav_err)?;
        let spec = reader.spec();
        let channels = usize::from(spec.channels.max(1));

        let data: Vec<i16> = match spec.sample_format {
            SampleFormat::Int => reader
                .samples::<i32>()
                .step_by(channels)
                .map(|sample| sample.map(|value| int_to_i16(value, spec.bits_per_sample)))
                .collect::<Result<_, _>>(),
            SampleFormat::Float => reader
                .samples::<f32>()
                .step_by(channels)
                .map(|sample| sample.map(float_to_i16))
                .collect::<Result<_, _>>(),
        }
        .map_err(wav_err)?;

        if data.is_empty() {
            return Err(SoundbankError::Empty(path.to_path_buf()));
        }

        let loaded = LoadedWavetable::new(data, spec.sample_rate);
        info!(
            path = ?path,
            channels = spec.channels,
            sample_rate = spec.sample_rate,
            bits = spec.bits_per_sample,
            duration_ms = loaded.duration().as_millis(),
            memory_kb = loaded.memory_size() / 1024,
            "Wavetable loaded"
        );

        self.cache.insert(path.to_path_buf(), loaded.clone());
        Ok(loaded)
    }

    /// Returns the total memory used by cached wavetables.
    pub fn total_memory_usage(&self) -> usize {
        self.cache.values().map(|w| w.memory_size()).sum()
    }
}

impl std::fmt::Debug for WavetableLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavetableLoader")
            .field("cached_wavetables", &self.cache.len())
            .field("total_memory_kb", &(self.total_memory_usage() / 1024))
            .finish()
    }
}

/// Scales an integer sample of the given bit depth to 16 bits.
fn int_to_i16(value: i32, bits_per_sample: u16) -> i16 {
    let bits = u32::from(bits_per_sample);
    let scaled = if bits > 16 {
        value >> (bits - 16)
    } else {
        value << (16 - bits)
    };
    scaled.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Scales a float sample in [-1, 1] to 16 bits.
fn float_to_i16(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}
