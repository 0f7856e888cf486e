//! Audio boundary
//!
//! The engine only ever asks for a sound by key. Asset loading and real
//! playback belong to the host; `SoundBank` is the in-process registry that
//! knows which keys exist and plays them at the configured volume.

use std::collections::BTreeMap;

use crate::sim::{DrumType, Instrument, MusicNote};

/// Receives sound-key triggers from the collision dispatcher
pub trait SoundTrigger {
    /// Play the sound registered under `key`. Unknown keys must be ignored.
    fn trigger(&mut self, key: &str);
}

/// Every key a line can resolve to: drum voices, then each note per pitched instrument
pub fn instrument_sound_keys() -> Vec<String> {
    let mut keys: Vec<String> = DrumType::ALL.iter().map(|d| d.as_str().to_string()).collect();
    for instrument in [Instrument::Guitar, Instrument::Piano] {
        for note in MusicNote::ALL {
            keys.push(format!("{}{}", note.as_str(), instrument.as_str()));
        }
    }
    keys
}

/// Registry of playable sounds
#[derive(Debug, Clone)]
pub struct SoundBank {
    /// Asset file per key
    assets: BTreeMap<String, String>,
    /// Playback count per key
    plays: BTreeMap<String, u32>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for SoundBank {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundBank {
    /// Bank with no sounds registered
    pub fn empty() -> Self {
        Self {
            assets: BTreeMap::new(),
            plays: BTreeMap::new(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Bank with every instrument sound registered (`<key>.mp3`)
    pub fn new() -> Self {
        let mut bank = Self::empty();
        for key in instrument_sound_keys() {
            let file = format!("{key}.mp3");
            bank.register(key, file);
        }
        log::info!("Loaded {} instrument sounds", bank.assets.len());
        bank
    }

    pub fn register(&mut self, key: impl Into<String>, asset: impl Into<String>) {
        self.assets.insert(key.into(), asset.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.assets.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// How many times `key` has played
    pub fn play_count(&self, key: &str) -> u32 {
        self.plays.get(key).copied().unwrap_or(0)
    }

    /// Total playbacks across all keys
    pub fn total_plays(&self) -> u32 {
        self.plays.values().sum()
    }

    /// Play counts, sorted by key
    pub fn plays(&self) -> impl Iterator<Item = (&str, u32)> {
        self.plays.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl SoundTrigger for SoundBank {
    fn trigger(&mut self, key: &str) {
        let Some(asset) = self.assets.get(key) else {
            log::debug!("No sound registered for '{}'", key);
            return;
        };
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        log::debug!("Playing {} at volume {:.2}", asset, vol);
        *self.plays.entry(key.to_string()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_registers_all_instrument_sounds() {
        let bank = SoundBank::new();
        assert_eq!(bank.len(), 17);
        for key in ["Kick", "Snare", "Hat", "CPiano", "GGuitar", "APiano"] {
            assert!(bank.contains(key), "missing {key}");
        }
        assert!(!bank.contains("CDrum"));
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let mut bank = SoundBank::new();
        bank.trigger("Cowbell");
        assert_eq!(bank.total_plays(), 0);

        bank.trigger("Hat");
        bank.trigger("Hat");
        assert_eq!(bank.play_count("Hat"), 2);
    }

    #[test]
    fn test_muted_bank_does_not_play() {
        let mut bank = SoundBank::new();
        bank.set_muted(true);
        bank.trigger("Kick");
        assert_eq!(bank.total_plays(), 0);
        assert_eq!(bank.effective_volume(), 0.0);

        bank.set_muted(false);
        bank.set_master_volume(2.0);
        assert_eq!(bank.effective_volume(), 1.0);
    }
}
