//! Test doubles for the host capabilities and the log sink.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use libretro_sys::PixelFormat;
use log::Level;

use crate::host::{Environment, InputPoll, InputState, VideoSink};
use crate::input::DPad;
use crate::logging::LogSink;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Log sink that keeps every line in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct RecordingLog {
    lines: Arc<Mutex<Vec<(Level, String)>>>,
    releases: Arc<Mutex<u32>>,
}

impl RecordingLog {
    pub fn lines(&self) -> Vec<(Level, String)> {
        lock(&self.lines).clone()
    }

    pub fn count(&self, level: Level) -> usize {
        lock(&self.lines).iter().filter(|(l, _)| *l == level).count()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        lock(&self.lines)
            .iter()
            .any(|(l, msg)| *l == level && msg.contains(needle))
    }

    pub fn releases(&self) -> u32 {
        *lock(&self.releases)
    }

    pub fn clear(&self) {
        lock(&self.lines).clear();
    }
}

impl LogSink for RecordingLog {
    fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        lock(&self.lines).push((level, args.to_string()));
    }

    fn release(&mut self) {
        *lock(&self.releases) += 1;
    }
}

#[derive(Default)]
pub struct EnvState {
    pub accept_no_game: bool,
    pub host_log: Option<RecordingLog>,
    pub accept_pixel_format: bool,
    pub no_game_calls: u32,
    pub log_calls: u32,
    pub pixel_format_calls: u32,
    pub last_pixel_format: Option<PixelFormat>,
}

/// Scriptable environment callback. Clones share state.
#[derive(Clone, Default)]
pub struct FakeEnv {
    state: Arc<Mutex<EnvState>>,
}

impl FakeEnv {
    pub fn accepting(host_log: RecordingLog) -> Self {
        let env = Self::default();
        env.update(|s| {
            s.accept_no_game = true;
            s.host_log = Some(host_log);
            s.accept_pixel_format = true;
        });
        env
    }

    pub fn rejecting() -> Self {
        Self::default()
    }

    pub fn update(&self, f: impl FnOnce(&mut EnvState)) {
        f(&mut lock(&self.state));
    }

    /// `(no_game, log, pixel_format)` request counts.
    pub fn calls(&self) -> (u32, u32, u32) {
        let s = lock(&self.state);
        (s.no_game_calls, s.log_calls, s.pixel_format_calls)
    }

    pub fn boxed(&self) -> Option<Box<dyn Environment>> {
        Some(Box::new(self.clone()))
    }
}

impl Environment for FakeEnv {
    fn set_support_no_game(&mut self, _supported: bool) -> bool {
        let mut s = lock(&self.state);
        s.no_game_calls += 1;
        s.accept_no_game
    }

    fn log_interface(&mut self) -> Option<Box<dyn LogSink>> {
        let mut s = lock(&self.state);
        s.log_calls += 1;
        s.host_log
            .clone()
            .map(|log| Box::new(log) as Box<dyn LogSink>)
    }

    fn set_pixel_format(&mut self, format: PixelFormat) -> bool {
        let mut s = lock(&self.state);
        s.pixel_format_calls += 1;
        s.last_pixel_format = Some(format);
        s.accept_pixel_format
    }
}

pub struct Frame {
    pub pixels: Vec<u16>,
    pub width: u32,
    pub height: u32,
    pub pitch: usize,
}

/// Video sink that copies every submitted frame.
#[derive(Clone, Default)]
pub struct RecordingVideo {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingVideo {
    pub fn frame_count(&self) -> usize {
        lock(&self.frames).len()
    }

    pub fn with_last<R>(&self, f: impl FnOnce(&Frame) -> R) -> Option<R> {
        lock(&self.frames).last().map(f)
    }

    pub fn boxed(&self) -> Option<Box<dyn VideoSink>> {
        Some(Box::new(self.clone()))
    }
}

impl VideoSink for RecordingVideo {
    fn refresh(&mut self, frame: &[u16], width: u32, height: u32, pitch: usize) {
        lock(&self.frames).push(Frame {
            pixels: frame.to_vec(),
            width,
            height,
            pitch,
        });
    }
}

/// Joypad with a scriptable d-pad, counting polls.
#[derive(Clone, Default)]
pub struct FakePad {
    held: Arc<Mutex<DPad>>,
    polls: Arc<Mutex<u32>>,
}

impl FakePad {
    pub fn hold(&self, dpad: DPad) {
        *lock(&self.held) = dpad;
    }

    pub fn polls(&self) -> u32 {
        *lock(&self.polls)
    }

    pub fn boxed_poll(&self) -> Option<Box<dyn InputPoll>> {
        Some(Box::new(self.clone()))
    }

    pub fn boxed_state(&self) -> Option<Box<dyn InputState>> {
        Some(Box::new(self.clone()))
    }
}

impl InputPoll for FakePad {
    fn poll(&mut self) {
        *lock(&self.polls) += 1;
    }
}

impl InputState for FakePad {
    fn pressed(&mut self, port: u32, device: u32, index: u32, id: u32) -> bool {
        use libretro_sys::{
            DEVICE_ID_JOYPAD_DOWN, DEVICE_ID_JOYPAD_LEFT, DEVICE_ID_JOYPAD_RIGHT,
            DEVICE_ID_JOYPAD_UP, DEVICE_JOYPAD,
        };

        if port != 0 || device != DEVICE_JOYPAD || index != 0 {
            return false;
        }
        let held = *lock(&self.held);
        match id {
            DEVICE_ID_JOYPAD_UP => held.contains(DPad::UP),
            DEVICE_ID_JOYPAD_DOWN => held.contains(DPad::DOWN),
            DEVICE_ID_JOYPAD_LEFT => held.contains(DPad::LEFT),
            DEVICE_ID_JOYPAD_RIGHT => held.contains(DPad::RIGHT),
            _ => false,
        }
    }
}
