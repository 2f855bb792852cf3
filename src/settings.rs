//! Player settings
//!
//! Persisted through the storage gateway; applied immediately to rendering,
//! audio and haptics.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// High contrast palette
    pub high_contrast: bool,
    /// Reduced motion (no shake, dust, wind indicator or vibration)
    pub reduced_motion: bool,
    pub sound_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            high_contrast: false,
            reduced_motion: false,
            sound_enabled: true,
        }
    }
}

/// Partial settings update; `None` leaves a field as it is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub high_contrast: Option<bool>,
    pub reduced_motion: Option<bool>,
    pub sound_enabled: Option<bool>,
}

impl Settings {
    /// Merge a patch over these settings; fields present in the patch win
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.high_contrast {
            self.high_contrast = v;
        }
        if let Some(v) = patch.reduced_motion {
            self.reduced_motion = v;
        }
        if let Some(v) = patch.sound_enabled {
            self.sound_enabled = v;
        }
    }

    /// Shake, landing dust and the wind indicator; all off under reduced motion
    pub fn motion_effects(&self) -> bool {
        !self.reduced_motion
    }

    pub fn haptics_enabled(&self) -> bool {
        !self.reduced_motion
    }
}
