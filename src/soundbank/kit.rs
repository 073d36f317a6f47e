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
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use super::error::SoundbankError;
use super::loader::{LoadedWavetable, WavetableLoader};
use super::Soundbank;
use crate::config::{KitConfig, ZoneConfig};
use crate::sampler::Sampler;
use crate::synth::VoiceParameters;

/// One playable zone of a kit program.
#[derive(Clone, Debug)]
struct KitZone {
    config: ZoneConfig,
    wavetable: LoadedWavetable,
    params: VoiceParameters,
}

/// A soundbank of WAV samples, arranged into programs and zones by a
/// [`KitConfig`].
pub struct SampleKit {
    programs: HashMap<u32, Vec<KitZone>>,
}

impl SampleKit {
    /// Loads a kit from a YAML file. Sample paths are resolved against the
    /// directory of the file.
    pub fn load(path: &Path) -> Result<SampleKit, SoundbankError> {
        let config = KitConfig::deserialize(path)?;
        let base_path = path.parent().unwrap_or_else(|| Path::new("."));
        SampleKit::from_config(&config, base_path)
    }

    /// Builds a kit from a configuration, loading every sample it references.
    pub fn from_config(config: &KitConfig, base_path: &Path) -> Result<SampleKit, SoundbankError> {
        let mut loader = WavetableLoader::new();
        let mut programs: HashMap<u32, Vec<KitZone>> = HashMap::new();

        for program in config.programs() {
            let zones = programs.entry(program.program()).or_default();
            for zone in program.zones() {
                zones.push(KitZone {
                    config: zone.clone(),
                    wavetable: loader.load(&zone.resolve_file(base_path))?,
                    params: zone.voice_parameters()?,
                });
            }
        }

        info!(
            programs = programs.len(),
            memory_kb = loader.total_memory_usage() / 1024,
            "Sample kit loaded"
        );
        Ok(SampleKit { programs })
    }

    /// Gets the program numbers this kit can play, in ascending order.
    pub fn programs(&self) -> Vec<u32> {
        let mut programs: Vec<u32> = self.programs.keys().copied().collect();
        programs.sort_unstable();
        programs
    }

    fn zone_for(&self, program: u32, note: u8, velocity: u8) -> Option<&KitZone> {
        self.programs
            .get(&program)?
            .iter()
            .find(|zone| zone.config.matches(note, velocity))
    }
}

impl Soundbank for SampleKit {
    fn sampler_for(
        &self,
        program: u32,
        note: u8,
        velocity: u8,
    ) -> Option<(Box<dyn Sampler>, VoiceParameters)> {
        let zone = self.zone_for(program, note, velocity)?;
        let sampler = zone
            .wavetable
            .sampler()
            .with_root_note(zone.config.root_note())
            .with_playing_note(note)
            .with_looping(zone.config.looping());
        Some((Box::new(sampler), zone.params))
    }

    fn set_sample_rate(&mut self, sample_rate_hz: u32) {
        // Zones sharing a file share the resampled copy too.
        let mut resampled: HashMap<*const i16, LoadedWavetable> = HashMap::new();
        for zone in self.programs.values_mut().flatten() {
            let key = zone.wavetable.data().as_ptr();
            let converted = resampled
                .entry(key)
                .or_insert_with(|| {
                    debug!(
                        from = zone.wavetable.sample_rate(),
                        to = sample_rate_hz,
                        "Resampling wavetable"
                    );
                    zone.wavetable.resampled(sample_rate_hz)
                })
                .clone();
            zone.wavetable = converted;
        }
    }
}

impl fmt::Debug for SampleKit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleKit")
            .field("programs", &self.programs())
            .finish()
    }
}
