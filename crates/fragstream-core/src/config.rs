//! Read-only configuration lookups and the sound settings resolved from them.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::ConfigError;
use crate::format::{DesiredFormat, DEFAULT_FRAGMENT_COUNT};
use crate::negotiate::Protocol;
use crate::recovery::ResumePolicy;

/// Section holding every sound key.
pub const SOUND_SECTION: &str = "sound";

/// Key/value store addressed by section and key. Stores never apply defaults.
pub trait ConfigStore {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// `None` when the key is missing or does not hold an integer.
    fn get_int(&self, section: &str, key: &str) -> Option<i64> {
        self.get_string(section, key)?.trim().parse().ok()
    }
}

/// In-memory [`ConfigStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    values: HashMap<(String, String), String>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl ToString) -> &mut Self {
        self.values
            .insert((section.to_string(), key.to_string()), value.to_string());
        self
    }

    pub fn with(mut self, section: &str, key: &str, value: impl ToString) -> Self {
        self.set(section, key, value);
        self
    }
}

impl ConfigStore for MemoryConfig {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.values
            .get(&(section.to_string(), key.to_string()))
            .cloned()
    }
}

/// Sound output settings, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundSettings {
    /// PCM device identifier (`alsa_device`).
    pub device: String,
    /// Card and device numbers (`alsa_card`, `alsa_pcmdevice`). Only used by
    /// [`Protocol::Block`], where they override [`SoundSettings::device`].
    pub card: Option<(i64, i64)>,
    /// Fragment size override in frames (`alsa_fragsize`).
    pub fragment_frames: Option<u32>,
    /// Fragment count (`alsa_numfrags`).
    pub fragment_count: u32,
    /// Volume element name, matched case-insensitively (`alsa_mixer_elem`).
    pub mixer_element: String,
    /// PCM API variant (`alsa_api`).
    pub protocol: Protocol,
    /// Suspend handling (`alsa_resume_interval_ms`, `alsa_resume_attempts`).
    pub resume: ResumePolicy,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            device: "default".to_string(),
            card: None,
            fragment_frames: None,
            fragment_count: DEFAULT_FRAGMENT_COUNT,
            mixer_element: "PCM".to_string(),
            protocol: Protocol::default(),
            resume: ResumePolicy::default(),
        }
    }
}

impl SoundSettings {
    /// Read the `sound` section of `store`. Missing keys keep their defaults; malformed ones are
    /// reported.
    pub fn from_store<S: ConfigStore + ?Sized>(store: &S) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        let int = |key: &str| -> Result<Option<i64>, ConfigError> {
            if let Some(value) = store.get_int(SOUND_SECTION, key) {
                return Ok(Some(value));
            }
            match store.get_string(SOUND_SECTION, key) {
                None => Ok(None),
                Some(value) => Err(invalid(key, &value)),
            }
        };

        if let Some(device) = store.get_string(SOUND_SECTION, "alsa_device") {
            settings.device = device;
        }
        if let Some(frames) = int("alsa_fragsize")? {
            settings.fragment_frames = u32::try_from(frames).ok().filter(|&n| n > 0);
        }
        if let Some(count) = int("alsa_numfrags")? {
            settings.fragment_count = u32::try_from(count)
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| invalid("alsa_numfrags", &count.to_string()))?;
        }
        if let Some(element) = store.get_string(SOUND_SECTION, "alsa_mixer_elem") {
            settings.mixer_element = element;
        }
        if let Some(api) = store.get_string(SOUND_SECTION, "alsa_api") {
            settings.protocol = api.parse().map_err(|_| invalid("alsa_api", &api))?;
        }
        match (int("alsa_card")?, int("alsa_pcmdevice")?) {
            (None, None) => {}
            (card, device) => settings.card = Some((card.unwrap_or(0), device.unwrap_or(0))),
        }
        if let Some(ms) = int("alsa_resume_interval_ms")? {
            let ms = u64::try_from(ms)
                .map_err(|_| invalid("alsa_resume_interval_ms", &ms.to_string()))?;
            settings.resume.interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = int("alsa_resume_attempts")? {
            settings.resume.max_attempts = u32::try_from(attempts)
                .map_err(|_| invalid("alsa_resume_attempts", &attempts.to_string()))?;
        }
        Ok(settings)
    }

    /// Identifier of the device to open.
    pub fn device(&self) -> String {
        match (self.protocol, self.card) {
            (Protocol::Block, Some((card, device))) => format!("hw:{card},{device}"),
            _ => self.device.clone(),
        }
    }

    /// Fill in fragment hints the caller left unset.
    pub fn apply_hints(&self, desired: DesiredFormat) -> DesiredFormat {
        DesiredFormat {
            fragment_frames: desired.fragment_frames.or(self.fragment_frames),
            fragment_count: desired.fragment_count.or(Some(self.fragment_count)),
            ..desired
        }
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: SOUND_SECTION.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = SoundSettings::from_store(&MemoryConfig::new()).unwrap();
        assert_eq!(SoundSettings::default(), settings);
        assert_eq!("default", settings.device());
        assert_eq!(16, settings.fragment_count);
        assert_eq!("PCM", settings.mixer_element);
        assert_eq!(Protocol::HwParams, settings.protocol);
        assert_eq!(Duration::from_secs(1), settings.resume.interval);
    }

    #[test]
    fn test_overrides() {
        let store = MemoryConfig::new()
            .with("sound", "alsa_device", "hw:1,0")
            .with("sound", "alsa_fragsize", 256)
            .with("sound", "alsa_numfrags", 4)
            .with("sound", "alsa_mixer_elem", "Master")
            .with("sound", "alsa_resume_interval_ms", 50);
        let settings = SoundSettings::from_store(&store).unwrap();
        assert_eq!("hw:1,0", settings.device());
        assert_eq!(Some(256), settings.fragment_frames);
        assert_eq!(4, settings.fragment_count);
        assert_eq!("Master", settings.mixer_element);
        assert_eq!(Duration::from_millis(50), settings.resume.interval);
    }

    #[test]
    fn test_negative_fragsize_means_unset() {
        let store = MemoryConfig::new().with("sound", "alsa_fragsize", -1);
        let settings = SoundSettings::from_store(&store).unwrap();
        assert_eq!(None, settings.fragment_frames);
    }

    #[test]
    fn test_block_protocol_card_device() {
        let store = MemoryConfig::new()
            .with("sound", "alsa_api", "block")
            .with("sound", "alsa_card", 1)
            .with("sound", "alsa_pcmdevice", 2);
        let settings = SoundSettings::from_store(&store).unwrap();
        assert_eq!(Protocol::Block, settings.protocol);
        assert_eq!("hw:1,2", settings.device());
    }

    #[test]
    fn test_malformed_values() {
        let store = MemoryConfig::new().with("sound", "alsa_numfrags", "many");
        assert!(SoundSettings::from_store(&store).is_err());
        let store = MemoryConfig::new().with("sound", "alsa_numfrags", 0);
        assert!(SoundSettings::from_store(&store).is_err());
        let store = MemoryConfig::new().with("sound", "alsa_api", "oss");
        assert!(SoundSettings::from_store(&store).is_err());
    }

    /// Store with its own integer syntax.
    struct HexConfig(MemoryConfig);

    impl ConfigStore for HexConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0.get_string(section, key)
        }

        fn get_int(&self, section: &str, key: &str) -> Option<i64> {
            let value = self.get_string(section, key)?;
            i64::from_str_radix(value.strip_prefix("0x")?, 16).ok()
        }
    }

    #[test]
    fn test_integers_come_from_store() {
        let store = HexConfig(
            MemoryConfig::new()
                .with("sound", "alsa_fragsize", "0x100")
                .with("sound", "alsa_numfrags", "0x4"),
        );
        let settings = SoundSettings::from_store(&store).unwrap();
        assert_eq!(Some(256), settings.fragment_frames);
        assert_eq!(4, settings.fragment_count);

        let store = HexConfig(MemoryConfig::new().with("sound", "alsa_numfrags", "4"));
        let err = SoundSettings::from_store(&store).unwrap_err();
        assert!(err.to_string().contains("alsa_numfrags"));
    }

    #[test]
    fn test_apply_hints_keeps_caller_values() {
        let settings = SoundSettings {
            fragment_frames: Some(128),
            fragment_count: 4,
            ..SoundSettings::default()
        };
        let desired = settings.apply_hints(DesiredFormat::default());
        assert_eq!(Some(128), desired.fragment_frames);
        assert_eq!(Some(4), desired.fragment_count);

        let desired = settings.apply_hints(DesiredFormat {
            fragment_frames: Some(64),
            ..DesiredFormat::default()
        });
        assert_eq!(Some(64), desired.fragment_frames);
    }
}
