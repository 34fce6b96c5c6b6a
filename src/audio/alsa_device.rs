//! ALSA PCM device wrapper for mono capture.

use alsa::pcm::{Access, Format, HwParams, PCM};
use alsa::{Direction, ValueOr};
use anyhow::{Context, Result, bail};

/// Parameters negotiated with the ALSA hardware.
#[derive(Debug, Clone)]
pub struct AlsaParams {
    pub sample_rate: u32,
    pub channels: u32,
    /// Period size in frames (one frame = channels × sample_width)
    pub period_size: usize,
}

/// Open a PCM device for capture at exactly `sample_rate` / `channels`, S16LE.
///
/// The period is sized near `period_size` frames so that one blocking read of
/// a block maps to roughly one hardware period.
pub fn open_capture(
    device: &str,
    sample_rate: u32,
    channels: u32,
    period_size: usize,
) -> Result<(PCM, AlsaParams)> {
    let pcm = PCM::new(device, Direction::Capture, false)
        .with_context(|| format!("Failed to open PCM device '{}' for Capture", device))?;

    // Configure hardware parameters
    {
        let hwp = HwParams::any(&pcm).with_context(|| "Failed to initialize HwParams")?;
        hwp.set_access(Access::RWInterleaved)?;
        hwp.set_format(Format::S16LE)
            .with_context(|| format!("Device '{}' does not support S16LE", device))?;
        hwp.set_channels(channels)
            .with_context(|| format!("Device '{}' does not support {} channel(s)", device, channels))?;
        hwp.set_rate(sample_rate, ValueOr::Nearest)
            .with_context(|| format!("Device '{}' does not support {} Hz", device, sample_rate))?;
        hwp.set_period_size_near(period_size as alsa::pcm::Frames, ValueOr::Nearest)?;
        pcm.hw_params(&hwp)?;
    }

    // Read back actual negotiated parameters
    let (actual_rate, actual_channels, period_size) = {
        let hwp = pcm.hw_params_current()?;
        let rate = hwp.get_rate()?;
        let ch = hwp.get_channels()?;
        let ps = hwp.get_period_size()? as usize;
        (rate, ch, ps)
    };

    if actual_rate != sample_rate || actual_channels != channels {
        bail!(
            "Device '{}' opened at {} Hz / {} ch, expected {} Hz / {} ch",
            device,
            actual_rate,
            actual_channels,
            sample_rate,
            channels,
        );
    }

    let params = AlsaParams {
        sample_rate: actual_rate,
        channels: actual_channels,
        period_size,
    };

    log::info!(
        "ALSA Capture: device={}, rate={}, channels={}, period_size={}",
        device,
        actual_rate,
        actual_channels,
        period_size,
    );

    Ok((pcm, params))
}
