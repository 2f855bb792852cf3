//! Audio and haptic feedback
//!
//! Procedurally generated tones via the Web Audio API plus device vibration.
//! Game logic never depends on either succeeding.

use serde::{Deserialize, Serialize};

/// Discrete feedback cues raised by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackKind {
    /// Block landed on the stack or platform
    Land,
    /// Landing within the perfect threshold
    Perfect,
    /// Run ended
    GameOver,
}

/// Oscillator parameters for a cue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    /// Seconds
    pub duration: f64,
}

/// Starting gain of every tone; ramps exponentially to `TONE_GAIN_END`
pub const TONE_GAIN_START: f32 = 0.1;
pub const TONE_GAIN_END: f32 = 0.01;

impl FeedbackKind {
    pub fn tone(&self) -> Tone {
        match self {
            FeedbackKind::Land => Tone {
                frequency: 220.0,
                duration: 0.15,
            },
            FeedbackKind::Perfect => Tone {
                frequency: 880.0,
                duration: 0.2,
            },
            FeedbackKind::GameOver => Tone {
                frequency: 110.0,
                duration: 0.5,
            },
        }
    }

    /// Vibration pattern in milliseconds (on, off, on, ...)
    pub fn vibration(&self) -> Option<&'static [u32]> {
        match self {
            FeedbackKind::Land => Some(&[50]),
            FeedbackKind::Perfect => None,
            FeedbackKind::GameOver => Some(&[100, 50, 100]),
        }
    }
}

/// Device side of feedback. Settings filtering happens before these are called.
pub trait FeedbackSink {
    fn play(&mut self, tone: Tone);
    fn vibrate(&mut self, pattern: &[u32]);
}

/// Sink that drops everything (native runs, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFeedback;

impl FeedbackSink for SilentFeedback {
    fn play(&mut self, _tone: Tone) {}
    fn vibrate(&mut self, _pattern: &[u32]) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::WebFeedback;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsValue;
    use web_sys::{AudioContext, OscillatorType};

    use super::{FeedbackSink, TONE_GAIN_END, TONE_GAIN_START, Tone};

    /// Web Audio tones plus `navigator.vibrate`
    #[derive(Clone)]
    pub struct WebFeedback {
        ctx: Option<AudioContext>,
    }

    impl Default for WebFeedback {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebFeedback {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn play_tone(ctx: &AudioContext, tone: Tone) -> Option<()> {
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;
            osc.set_type(OscillatorType::Sine);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            let t = ctx.current_time();
            osc.frequency().set_value_at_time(tone.frequency, t).ok()?;
            gain.gain().set_value_at_time(TONE_GAIN_START, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(TONE_GAIN_END, t + tone.duration)
                .ok()?;

            osc.start().ok()?;
            osc.stop_with_when(t + tone.duration).ok()
        }
    }

    impl FeedbackSink for WebFeedback {
        fn play(&mut self, tone: Tone) {
            let Some(ctx) = &self.ctx else { return };
            if Self::play_tone(ctx, tone).is_none() {
                log::warn!("Tone playback failed ({} Hz)", tone.frequency);
            }
        }

        fn vibrate(&mut self, pattern: &[u32]) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let navigator = window.navigator();
            let pattern: js_sys::Array = pattern.iter().map(|ms| JsValue::from(*ms)).collect();
            let _ = navigator.vibrate_with_pattern(&pattern);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cues_have_distinct_tones() {
        let land = FeedbackKind::Land.tone();
        let perfect = FeedbackKind::Perfect.tone();
        let over = FeedbackKind::GameOver.tone();
        assert_eq!(land.frequency, 220.0);
        assert_eq!(perfect.frequency, 880.0);
        assert_eq!(over.frequency, 110.0);
        assert!(over.duration > perfect.duration && perfect.duration > land.duration);
    }

    #[test]
    fn game_over_vibrates_twice() {
        assert_eq!(FeedbackKind::Land.vibration(), Some(&[50u32][..]));
        assert_eq!(FeedbackKind::GameOver.vibration(), Some(&[100u32, 50, 100][..]));
        assert_eq!(FeedbackKind::Perfect.vibration(), None);
    }
}
