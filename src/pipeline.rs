//! The capture → level → gate → serial loop and the lifecycle of its devices.
//!
//! Runs on a single thread with blocking reads. The audio stream and the
//! serial link are owned here and nowhere else; `shutdown` releases them in
//! order (audio first, then serial) exactly once, whatever path leads there.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::audio::AudioSource;
use crate::gate::TransmissionGate;
use crate::level::{self, Level};
use crate::serial_link::LevelSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Initializing,
    Running,
    ShuttingDown,
}

/// What a single iteration did with the level it computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Sent(Level),
    /// Too close to the last sent level
    Held(Level),
    WriteFailed(Level),
    /// Serial link not open, nothing written
    LinkClosed(Level),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub blocks: u64,
    pub sent: u64,
    pub write_failures: u64,
}

pub struct Pipeline<A: AudioSource, K: LevelSink> {
    state: PipelineState,
    audio: Option<A>,
    sink: Option<K>,
    gate: TransmissionGate,
    block: Vec<i16>,
    stats: PipelineStats,
}

impl<A: AudioSource, K: LevelSink> Pipeline<A, K> {
    /// Open the serial link, wait `settle` for it to stabilise, then open the
    /// audio stream. Either open failing is fatal; whatever was already opened
    /// is released before the error is returned.
    pub fn start(
        open_sink: impl FnOnce() -> Result<K>,
        settle: Duration,
        open_audio: impl FnOnce() -> Result<A>,
        gate: TransmissionGate,
        block_size: usize,
    ) -> Result<Self> {
        let mut pipeline = Self {
            state: PipelineState::Initializing,
            audio: None,
            sink: None,
            gate,
            block: vec![0; block_size],
            stats: PipelineStats::default(),
        };

        // On any early return below, Drop runs shutdown()
        pipeline.sink = Some(open_sink()?);
        println!("Serial link connected");

        if !settle.is_zero() {
            thread::sleep(settle);
        }

        pipeline.audio = Some(open_audio()?);
        pipeline.state = PipelineState::Running;
        Ok(pipeline)
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// One iteration: read a block, compute its level, maybe send it.
    ///
    /// Write failures are reported and absorbed. Only an unusable audio
    /// stream produces an error.
    pub fn step(&mut self) -> Result<Step> {
        let audio = self.audio.as_mut().context("Audio stream is not open")?;
        audio.read_block(&mut self.block)?;
        self.stats.blocks += 1;

        let level = level::level_of(&self.block);
        log::debug!("block level {}", level);

        let sink = match self.sink.as_mut() {
            Some(sink) if sink.is_open() => sink,
            _ => return Ok(Step::LinkClosed(level)),
        };

        if !self.gate.should_send(level) {
            return Ok(Step::Held(level));
        }

        match sink.send(level) {
            Ok(()) => {
                self.gate.record_sent(level);
                self.stats.sent += 1;
                println!("Sent: {}", level);
                Ok(Step::Sent(level))
            }
            Err(e) => {
                self.stats.write_failures += 1;
                eprintln!("Failed to send level {}: {:#}", level, e);
                Ok(Step::WriteFailed(level))
            }
        }
    }

    /// Loop until `running` is cleared or the audio stream fails, then shut down.
    ///
    /// The flag is checked between iterations, so an interrupt always lets
    /// the current read/compute/send finish.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        println!("Monitoring audio... Press Ctrl+C to stop.");

        let result = loop {
            if !running.load(Ordering::SeqCst) {
                break Ok(());
            }
            if let Err(e) = self.step() {
                log::error!("Audio loop aborted: {:#}", e);
                break Err(e);
            }
        };

        self.shutdown();
        result
    }

    /// Release audio then serial. Later calls are no-ops, as are handles that
    /// were never opened.
    pub fn shutdown(&mut self) {
        if self.state == PipelineState::ShuttingDown {
            return;
        }
        self.state = PipelineState::ShuttingDown;

        if let Some(mut audio) = self.audio.take() {
            audio.close();
        }
        if let Some(mut sink) = self.sink.take() {
            sink.close();
        }

        let stats = self.stats();
        log::info!(
            "Pipeline stopped: blocks={}, sent={}, write_failures={}, last_sent={:?}",
            stats.blocks,
            stats.sent,
            stats.write_failures,
            self.gate.last_sent(),
        );
        println!("Connection closed.");
    }
}

impl<A: AudioSource, K: LevelSink> Drop for Pipeline<A, K> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
