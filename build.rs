use std::fs;
use std::path::Path;
use serde::Deserialize;

#[derive(Deserialize)]
struct Config {
    application: Application,
    serial: Serial,
    audio: Audio,
    gate: Gate,
}

#[derive(Deserialize)]
struct Application {
    name: String,
    version: String,
}

#[derive(Deserialize)]
struct Serial {
    port: String,
    baud_rate: u32,
    timeout_ms: u64,
    settle_ms: u64,
}

#[derive(Deserialize)]
struct Audio {
    capture_device: String,
    sample_rate: u32,
    channels: u32,
    block_size: usize,
}

#[derive(Deserialize)]
struct Gate {
    threshold: u8,
}

// 在编译时读取 config.toml 并设置环境变量
fn main() {
    println!("cargo:rerun-if-changed=config.toml");

    let config_path = Path::new("config.toml");
    if !config_path.exists() {
        panic!("config.toml not found!");
    }

    let config_str = fs::read_to_string(config_path).expect("Failed to read config.toml");
    let config: Config = toml::from_str(&config_str).expect("Failed to parse config.toml");

    println!("cargo:rustc-env=APP_NAME={}", config.application.name);
    println!("cargo:rustc-env=APP_VERSION={}", config.application.version);

    // 串口配置
    println!("cargo:rustc-env=SERIAL_PORT={}", config.serial.port);
    println!("cargo:rustc-env=SERIAL_BAUD_RATE={}", config.serial.baud_rate);
    println!("cargo:rustc-env=SERIAL_TIMEOUT_MS={}", config.serial.timeout_ms);
    println!("cargo:rustc-env=SERIAL_SETTLE_MS={}", config.serial.settle_ms);

    // 音频配置
    println!("cargo:rustc-env=AUDIO_CAPTURE_DEVICE={}", config.audio.capture_device);
    println!("cargo:rustc-env=AUDIO_SAMPLE_RATE={}", config.audio.sample_rate);
    println!("cargo:rustc-env=AUDIO_CHANNELS={}", config.audio.channels);
    println!("cargo:rustc-env=AUDIO_BLOCK_SIZE={}", config.audio.block_size);

    println!("cargo:rustc-env=GATE_THRESHOLD={}", config.gate.threshold);
}
