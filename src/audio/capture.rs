use alsa::pcm::PCM;
use anyhow::{Context, Result};

use super::alsa_device;

/// Blocking source of mono i16 sample blocks.
pub trait AudioSource {
    /// Fill `block` completely, blocking until enough samples were captured.
    ///
    /// Overruns are recovered internally; an error means the stream is unusable.
    fn read_block(&mut self, block: &mut [i16]) -> Result<()>;

    /// Stop and release the stream. Safe to call more than once.
    fn close(&mut self);
}

pub struct AlsaCapture {
    device: String,
    pcm: Option<PCM>,
    overruns: u64,
}

impl AlsaCapture {
    pub fn open(device: &str, sample_rate: u32, channels: u32, block_size: usize) -> Result<Self> {
        let (pcm, params) = alsa_device::open_capture(device, sample_rate, channels, block_size)?;
        if params.period_size != block_size {
            log::debug!(
                "Capture '{}': period {} frames for {}-sample blocks at {} Hz / {} ch",
                device,
                params.period_size,
                block_size,
                params.sample_rate,
                params.channels,
            );
        }
        pcm.start()
            .with_context(|| format!("Failed to start capture on '{}'", device))?;

        Ok(Self {
            device: device.to_string(),
            pcm: Some(pcm),
            overruns: 0,
        })
    }
}

impl AudioSource for AlsaCapture {
    fn read_block(&mut self, block: &mut [i16]) -> Result<()> {
        let pcm = self
            .pcm
            .as_ref()
            .with_context(|| format!("Capture stream '{}' is closed", self.device))?;
        let io = pcm.io_i16()?;

        let mut filled = 0;
        while filled < block.len() {
            match io.readi(&mut block[filled..]) {
                Ok(frames) => filled += frames,
                Err(e) => {
                    // Overrun: keep what we have, re-arm the stream and keep reading
                    self.overruns += 1;
                    log::warn!("ALSA capture error: {}, recovering...", e);
                    pcm.prepare()
                        .with_context(|| format!("Failed to recover PCM capture on '{}'", self.device))?;
                }
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        if let Some(pcm) = self.pcm.take() {
            if let Err(e) = pcm.drop() {
                log::warn!("Failed to stop capture on '{}': {}", self.device, e);
            }
            log::info!(
                "Capture '{}' closed ({} overrun(s) recovered)",
                self.device,
                self.overruns
            );
        }
    }
}

impl Drop for AlsaCapture {
    fn drop(&mut self) {
        self.close();
    }
}
