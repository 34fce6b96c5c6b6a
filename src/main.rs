mod audio;
mod config;
mod gate;
mod level;
mod pipeline;
mod serial_link;

use audio::AlsaCapture;
use config::Config;
use gate::TransmissionGate;
use pipeline::Pipeline;
use serial_link::SerialSink;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;

/// Open both devices and run the loop until `running` is cleared.
///
/// Runs entirely on one blocking thread; the pipeline is created, driven and
/// torn down here.
fn run_pipeline(config: &Config, running: &AtomicBool) -> anyhow::Result<()> {
    let mut pipeline = Pipeline::start(
        || {
            SerialSink::open(
                config.serial_port,
                config.serial_baud_rate,
                config.serial_timeout(),
            )
        },
        config.serial_settle(),
        || {
            AlsaCapture::open(
                config.capture_device,
                config.sample_rate,
                config.channels,
                config.block_size,
            )
        },
        TransmissionGate::new(config.gate_threshold),
        config.block_size,
    )?;

    pipeline.run(running)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    env_logger::init();

    // 加载配置
    let config = Config::new()?;
    println!(
        "{} {} starting: serial={} @ {} baud, capture={} @ {} Hz",
        config.app_name,
        config.app_version,
        config.serial_port,
        config.serial_baud_rate,
        config.capture_device,
        config.sample_rate,
    );

    let running = Arc::new(AtomicBool::new(true));

    // 音频采集和串口发送在独立的阻塞线程中运行，主任务只负责监听 Ctrl+C
    let mut worker = {
        let running = running.clone();
        tokio::task::spawn_blocking(move || run_pipeline(&config, &running))
    };

    tokio::select! {
        result = &mut worker => {
            // 启动失败或音频设备故障
            result??;
        }
        _ = signal::ctrl_c() => {
            println!("\nStopping...");
            running.store(false, Ordering::SeqCst);
            // 等待当前迭代结束并释放资源
            worker.await??;
        }
    }

    Ok(())
}
