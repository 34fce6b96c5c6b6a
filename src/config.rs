use anyhow::{Context, Result, bail};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: &'static str,
    pub app_version: &'static str,

    // 串口配置
    pub serial_port: &'static str,
    pub serial_baud_rate: u32,
    pub serial_timeout_ms: u64,
    /// Pause after opening the link before audio capture starts
    pub serial_settle_ms: u64,

    // 音频配置
    pub capture_device: &'static str,
    pub sample_rate: u32,
    pub channels: u32,
    /// Samples per block handed to the level extractor
    pub block_size: usize,

    /// Minimum level change (exclusive) that triggers a send
    pub gate_threshold: u8,
}

impl Config {
    /// 从编译时设置的环境变量创建配置
    /// 所有参数都在编译时从 config.toml 中读取
    pub fn new() -> Result<Self> {
        let config = Self {
            app_name: env!("APP_NAME"),
            app_version: env!("APP_VERSION"),

            serial_port: env!("SERIAL_PORT"),
            serial_baud_rate: env!("SERIAL_BAUD_RATE")
                .parse()
                .context("Failed to parse SERIAL_BAUD_RATE")?,
            serial_timeout_ms: env!("SERIAL_TIMEOUT_MS")
                .parse()
                .context("Failed to parse SERIAL_TIMEOUT_MS")?,
            serial_settle_ms: env!("SERIAL_SETTLE_MS")
                .parse()
                .context("Failed to parse SERIAL_SETTLE_MS")?,

            capture_device: env!("AUDIO_CAPTURE_DEVICE"),
            sample_rate: env!("AUDIO_SAMPLE_RATE")
                .parse()
                .context("Failed to parse AUDIO_SAMPLE_RATE")?,
            channels: env!("AUDIO_CHANNELS")
                .parse()
                .context("Failed to parse AUDIO_CHANNELS")?,
            block_size: env!("AUDIO_BLOCK_SIZE")
                .parse()
                .context("Failed to parse AUDIO_BLOCK_SIZE")?,

            gate_threshold: env!("GATE_THRESHOLD")
                .parse()
                .context("Failed to parse GATE_THRESHOLD")?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.channels != 1 {
            bail!("Only mono capture is supported, got {} channels", self.channels);
        }
        if self.block_size == 0 {
            bail!("AUDIO_BLOCK_SIZE must be non-zero");
        }
        Ok(())
    }

    pub fn serial_timeout(&self) -> Duration {
        Duration::from_millis(self.serial_timeout_ms)
    }

    pub fn serial_settle(&self) -> Duration {
        Duration::from_millis(self.serial_settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_time_config_parses() {
        let config = Config::new().unwrap();
        assert_eq!(config.channels, 1);
        assert!(config.block_size > 0);
        assert!(config.serial_baud_rate > 0);
        assert!(!config.serial_port.is_empty());
    }

    #[test]
    fn rejects_stereo_capture() {
        let mut config = Config::new().unwrap();
        config.channels = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_blocks() {
        let mut config = Config::new().unwrap();
        config.block_size = 0;
        assert!(config.validate().is_err());
    }
}
