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
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, File};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::parse_duration;
use crate::synth::{EnvelopeAdsr, VoiceParameters};

/// Default root note of a zone (middle C).
pub const DEFAULT_ROOT_NOTE: u8 = 60;

/// A YAML representation of a sample kit: a set of programs, each made of zones
/// that map key and velocity ranges to sample files.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct KitConfig {
    /// The programs in this kit.
    programs: Vec<ProgramConfig>,
}

impl KitConfig {
    /// Creates a new kit configuration.
    pub fn new(programs: Vec<ProgramConfig>) -> KitConfig {
        KitConfig { programs }
    }

    /// Deserializes a file from the path into a kit configuration struct.
    pub fn deserialize(path: &Path) -> Result<KitConfig, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<KitConfig>()?)
    }

    /// Gets the programs in this kit.
    pub fn programs(&self) -> &[ProgramConfig] {
        &self.programs
    }
}

/// A single program of a kit.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ProgramConfig {
    /// The program number notes are played with.
    program: u32,

    /// Zones are matched in order; the first zone covering a note and velocity wins.
    zones: Vec<ZoneConfig>,
}

impl ProgramConfig {
    /// Creates a new program configuration.
    pub fn new(program: u32, zones: Vec<ZoneConfig>) -> ProgramConfig {
        ProgramConfig { program, zones }
    }

    /// Gets the program number.
    pub fn program(&self) -> u32 {
        self.program
    }

    /// Gets the zones of this program.
    pub fn zones(&self) -> &[ZoneConfig] {
        &self.zones
    }
}

/// A sample zone: one sample file played over a range of keys and velocities.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ZoneConfig {
    /// The WAV file for this zone, relative to the kit file.
    file: String,

    /// The note the sample plays at its recorded pitch.
    root_note: Option<u8>,

    /// The inclusive key range of this zone.
    keys: Option<[u8; 2]>,

    /// The inclusive velocity range of this zone.
    velocities: Option<[u8; 2]>,

    /// Whether the sample loops while the note is held.
    looping: Option<bool>,

    /// The volume of the zone (0.0 to 1.0).
    volume: Option<f32>,

    /// The envelope attack time, e.g. "5ms".
    attack: Option<String>,

    /// The envelope decay time.
    decay: Option<String>,

    /// The envelope sustain level (0.0 to 1.0).
    sustain: Option<f32>,

    /// The envelope release time.
    release: Option<String>,
}

impl ZoneConfig {
    /// Creates a zone covering every key and velocity, with default settings.
    pub fn new(file: &str) -> ZoneConfig {
        ZoneConfig {
            file: file.to_string(),
            root_note: None,
            keys: None,
            velocities: None,
            looping: None,
            volume: None,
            attack: None,
            decay: None,
            sustain: None,
            release: None,
        }
    }

    /// Sets the root note.
    pub fn with_root_note(mut self, root_note: u8) -> ZoneConfig {
        self.root_note = Some(root_note);
        self
    }

    /// Sets the inclusive key range.
    pub fn with_keys(mut self, low: u8, high: u8) -> ZoneConfig {
        self.keys = Some([low, high]);
        self
    }

    /// Sets the inclusive velocity range.
    pub fn with_velocities(mut self, low: u8, high: u8) -> ZoneConfig {
        self.velocities = Some([low, high]);
        self
    }

    /// Sets whether the sample loops.
    pub fn with_looping(mut self, looping: bool) -> ZoneConfig {
        self.looping = Some(looping);
        self
    }

    /// Gets the sample file path as written in the config.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Resolves the sample file against the kit's directory.
    pub fn resolve_file(&self, base_path: &Path) -> PathBuf {
        let file = Path::new(&self.file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            base_path.join(file)
        }
    }

    /// Gets the root note (default: 60).
    pub fn root_note(&self) -> u8 {
        self.root_note.unwrap_or(DEFAULT_ROOT_NOTE)
    }

    /// Gets whether the sample loops (default: true).
    pub fn looping(&self) -> bool {
        self.looping.unwrap_or(true)
    }

    /// Gets the zone volume (default: 1.0).
    pub fn volume(&self) -> f32 {
        self.volume.unwrap_or(1.0)
    }

    /// Returns true if this zone covers the given note and velocity.
    pub fn matches(&self, note: u8, velocity: u8) -> bool {
        let [key_low, key_high] = self.keys.unwrap_or([0, 127]);
        let [vel_low, vel_high] = self.velocities.unwrap_or([1, 127]);
        (key_low..=key_high).contains(&note) && (vel_low..=vel_high).contains(&velocity)
    }

    /// Builds the amplitude envelope of this zone. Stages default to zero length
    /// and the sustain level to full.
    pub fn envelope(&self) -> Result<EnvelopeAdsr, ConfigError> {
        Ok(EnvelopeAdsr::from_durations(
            parse_duration("attack", &self.attack, Duration::ZERO)?,
            parse_duration("decay", &self.decay, Duration::ZERO)?,
            self.sustain.unwrap_or(1.0),
            parse_duration("release", &self.release, Duration::ZERO)?,
        ))
    }

    /// Builds the voice parameters notes in this zone start with.
    pub fn voice_parameters(&self) -> Result<VoiceParameters, ConfigError> {
        Ok(VoiceParameters::new(self.volume(), self.envelope()?))
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(yaml: &str) -> KitConfig {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_kit_deserialize() {
        let kit = parse(
            r#"
            programs:
              - program: 0
                zones:
                  - file: piano-c4.wav
                    keys: [0, 64]
                    attack: 5ms
                    decay: 100ms
                    sustain: 0.6
                    release: 300ms
                  - file: piano-c6.wav
                    root_note: 84
                    keys: [65, 127]
              - program: 128
                zones:
                  - file: kick.wav
                    root_note: 36
                    keys: [36, 36]
                    looping: false
                    volume: 0.8
                    velocities: [1, 100]
                  - file: kick-hard.wav
                    root_note: 36
                    keys: [36, 36]
                    looping: false
                    velocities: [101, 127]
        "#,
        );

        assert_eq!(kit.programs().len(), 2);
        let piano = &kit.programs()[0];
        assert_eq!(piano.program(), 0);
        assert_eq!(piano.zones()[0].root_note(), 60);
        assert!(piano.zones()[0].looping());
        assert_eq!(
            piano.zones()[0].envelope().unwrap(),
            EnvelopeAdsr::new(0.005, 0.1, 0.6, 0.3)
        );
        assert_eq!(piano.zones()[1].root_note(), 84);
        assert!(piano.zones()[1].matches(100, 64));
        assert!(!piano.zones()[1].matches(64, 64));

        let drums = &kit.programs()[1];
        assert_eq!(drums.program(), 128);
        assert!(!drums.zones()[0].looping());
        assert_eq!(drums.zones()[0].volume(), 0.8);
        assert!(drums.zones()[0].matches(36, 100));
        assert!(!drums.zones()[0].matches(36, 101));
        assert!(drums.zones()[1].matches(36, 101));
        assert!(!drums.zones()[1].matches(37, 120));
    }

    #[test]
    fn test_zone_defaults() {
        let zone = ZoneConfig::new("a.wav");
        assert_eq!(zone.root_note(), 60);
        assert!(zone.looping());
        assert_eq!(zone.volume(), 1.0);
        assert_eq!(zone.envelope().unwrap(), EnvelopeAdsr::default());
        assert!(zone.matches(0, 1));
        assert!(zone.matches(127, 127));
        assert!(!zone.matches(60, 0));

        let params = zone.voice_parameters().unwrap();
        assert_eq!(params.volume, 1.0);
    }

    #[test]
    fn test_invalid_envelope_duration() {
        let kit = parse(
            r#"
            programs:
              - program: 1
                zones:
                  - file: a.wav
                    attack: quickly
        "#,
        );
        assert!(matches!(
            kit.programs()[0].zones()[0].envelope(),
            Err(ConfigError::Duration { field: "attack", .. })
        ));
    }

    #[test]
    fn test_resolve_file() {
        let zone = ZoneConfig::new("samples/a.wav");
        assert_eq!(
            zone.resolve_file(Path::new("/kits")),
            PathBuf::from("/kits/samples/a.wav")
        );
        let zone = ZoneConfig::new("/abs/a.wav");
        assert_eq!(
            zone.resolve_file(Path::new("/kits")),
            PathBuf::from("/abs/a.wav")
        );
    }
}
