//! audio - Microphone capture over ALSA
//!
//! Produces fixed-size blocks of mono S16LE samples for the level extractor.

mod alsa_device;
mod capture;

pub use capture::{AlsaCapture, AudioSource};
