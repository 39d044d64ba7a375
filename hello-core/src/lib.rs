//! hello-core: a minimal libretro core.
//!
//! The core needs no content. Every frame it clears a 320x240 RGB565 framebuffer,
//! draws a red 20x20 square that the d-pad moves around, writes "Hello World" with
//! a built-in 8x8 bitmap font, and hands the frame to the host.
//!
//! All mutable state lives in [`HelloCore`]. The C entry points in `libretro_glue`
//! lock the single process-wide instance (see `state`) and forward to its methods.
//! Host callbacks reach the core as the capability traits in [`host`].

mod abi;
mod av;
mod error;
mod font;
pub mod host;
mod input;
mod libretro_glue;
pub mod logging;
mod state;

#[cfg(test)]
mod testing;

use std::ffi::CStr;

use libretro_sys::{API_VERSION, PixelFormat, Region};

use crate::abi::colors::{RED, WHITE};
use crate::abi::{
    FPS, GREETING, GREETING_POS, HEIGHT, LOG_FILE_NAME, SAMPLE_RATE, SQUARE_SIZE, WIDTH,
};
pub use crate::av::Framebuffer;
pub use crate::error::CoreError;
use crate::host::{Environment, InputPoll, InputState, VideoSink};
pub use crate::input::{DPad, Square};
use crate::logging::{FileLog, LogSink, sink_log};

/// Which capability requests the host has granted this session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Negotiation {
    pub contentless: bool,
    pub logging: bool,
    pub pixel_format: bool,
}

/// Values for `retro_get_system_info`.
#[derive(Debug, Clone, Copy)]
pub struct CoreInfo {
    pub library_name: &'static CStr,
    pub library_version: &'static CStr,
    pub valid_extensions: &'static CStr,
    pub need_fullpath: bool,
    pub block_extract: bool,
}

/// Values for `retro_get_system_av_info`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvInfo {
    pub base_width: u32,
    pub base_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub aspect_ratio: f32,
    pub fps: f64,
    pub sample_rate: f64,
}

/// The libretro core instance.
pub struct HelloCore {
    env: Option<Box<dyn Environment>>,
    video: Option<Box<dyn VideoSink>>,
    input_poll: Option<Box<dyn InputPoll>>,
    input_state: Option<Box<dyn InputState>>,
    logger: Box<dyn LogSink>,

    framebuffer: Framebuffer,
    square: Square,

    negotiated: Negotiation,
    env_calls: u32,
    initialized: bool,
}

impl Default for HelloCore {
    fn default() -> Self {
        Self::with_logger(Box::new(FileLog::new(LOG_FILE_NAME)))
    }
}

impl HelloCore {
    /// A core that logs to `logger` until the host offers its own log interface.
    pub fn with_logger(logger: Box<dyn LogSink>) -> Self {
        Self {
            env: None,
            video: None,
            input_poll: None,
            input_state: None,
            logger,
            framebuffer: Framebuffer::default(),
            square: Square::default(),
            negotiated: Negotiation::default(),
            env_calls: 0,
            initialized: false,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn square(&self) -> Square {
        self.square
    }

    pub fn negotiated(&self) -> Negotiation {
        self.negotiated
    }

    pub fn env_calls(&self) -> u32 {
        self.env_calls
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // --- Callback registration ---

    pub fn set_environment(&mut self, env: Option<Box<dyn Environment>>) {
        self.env_calls += 1;
        self.env = env;

        if self.env.is_none() {
            let e = CoreError::MissingEnvironment;
            sink_log!(self.logger, Error, "retro_set_environment: {e}");
            return;
        }

        // Logging first, so everything after it reaches the host's logger.
        if let Err(e) = self.negotiate_logging() {
            sink_log!(self.logger, Warn, "{e}");
        }
        let count = self.env_calls;
        sink_log!(self.logger, Debug, "retro_set_environment called (count: {count})");
        self.negotiate_rest();
    }

    pub fn set_video_refresh(&mut self, video: Option<Box<dyn VideoSink>>) {
        self.video = video;
        sink_log!(self.logger, Debug, "Video refresh callback set");
    }

    pub fn set_input_poll(&mut self, poll: Option<Box<dyn InputPoll>>) {
        self.input_poll = poll;
        sink_log!(self.logger, Debug, "Input poll callback set");
    }

    pub fn set_input_state(&mut self, state: Option<Box<dyn InputState>>) {
        self.input_state = state;
        sink_log!(self.logger, Debug, "Input state callback set");
    }

    // --- Capability negotiation ---

    fn negotiate_logging(&mut self) -> Result<(), CoreError> {
        if self.negotiated.logging {
            return Ok(());
        }
        let env = self.env.as_mut().ok_or(CoreError::MissingEnvironment)?;
        let host_log = env.log_interface().ok_or(CoreError::LogInterfaceUnavailable)?;

        self.logger.release();
        self.logger = host_log;
        self.negotiated.logging = true;
        sink_log!(self.logger, Debug, "Logging callback initialized");
        Ok(())
    }

    fn negotiate_contentless(&mut self) -> Result<(), CoreError> {
        if self.negotiated.contentless {
            return Ok(());
        }
        let env = self.env.as_mut().ok_or(CoreError::MissingEnvironment)?;
        if !env.set_support_no_game(true) {
            return Err(CoreError::ContentlessRejected);
        }

        self.negotiated.contentless = true;
        sink_log!(self.logger, Debug, "Content-less support enabled");
        Ok(())
    }

    fn negotiate_pixel_format(&mut self) -> Result<(), CoreError> {
        if self.negotiated.pixel_format {
            return Ok(());
        }
        let env = self.env.as_mut().ok_or(CoreError::MissingEnvironment)?;
        if !env.set_pixel_format(PixelFormat::RGB565) {
            return Err(CoreError::PixelFormatRejected);
        }

        self.negotiated.pixel_format = true;
        sink_log!(self.logger, Debug, "Pixel format set: RGB565");
        Ok(())
    }

    fn negotiate_rest(&mut self) {
        if let Err(e) = self.negotiate_contentless() {
            sink_log!(self.logger, Error, "{e}");
        }
        if let Err(e) = self.negotiate_pixel_format() {
            sink_log!(self.logger, Error, "{e}");
        }
    }

    // --- Lifecycle ---

    pub fn init(&mut self) {
        self.initialized = true;
        sink_log!(self.logger, Debug, "Hello World core initialized");
        self.framebuffer.clear();

        // Anything the host refused at registration time gets one more request.
        if self.env.is_some() {
            if let Err(e) = self.negotiate_logging() {
                sink_log!(self.logger, Warn, "{e}");
            }
            self.negotiate_rest();
        }
    }

    pub fn deinit(&mut self) {
        sink_log!(self.logger, Debug, "Core deinitialized");
        self.initialized = false;
        self.negotiated = Negotiation::default();
        self.env_calls = 0;
        self.square = Square::default();
        self.logger.release();
    }

    pub fn reset(&mut self) {
        self.framebuffer.clear();
        self.square = Square::default();
        sink_log!(self.logger, Debug, "Core reset");
    }

    // --- Frame ---

    pub fn run(&mut self) {
        if let Err(e) = self.run_frame() {
            sink_log!(self.logger, Error, "{e}");
        }
    }

    fn run_frame(&mut self) -> Result<(), CoreError> {
        if !self.initialized {
            return Err(CoreError::NotInitialized);
        }

        self.framebuffer.clear();

        if let Some(poll) = self.input_poll.as_mut() {
            poll.poll();
        }
        let dpad = match self.input_state.as_mut() {
            Some(state) => DPad::read(&mut **state),
            None => DPad::empty(),
        };
        self.square.step(dpad);

        let size = SQUARE_SIZE as u32;
        let Square { x, y } = self.square;
        self.framebuffer.fill_rect(x, y, size, size, RED);

        let (x, y) = GREETING_POS;
        self.draw_text(x, y, GREETING, WHITE);

        let video = self.video.as_mut().ok_or(CoreError::NoVideoSink)?;
        let fb = &self.framebuffer;
        video.refresh(fb.pixels(), fb.width(), fb.height(), fb.pitch());
        Ok(())
    }

    /// Draw one glyph, warning if `c` has none.
    pub fn draw_glyph(&mut self, x: i32, y: i32, c: char, color: u16) {
        if let Err(e) = self.framebuffer.draw_glyph(x, y, c, color) {
            sink_log!(self.logger, Warn, "{e}");
        }
    }

    /// Draw a string, warning once per character that has no glyph.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, color: u16) {
        let drawn = self.framebuffer.draw_string(x, y, text, color);
        if let Err(CoreError::InvalidGlyphs(skipped)) = drawn {
            for c in skipped {
                sink_log!(self.logger, Warn, "{}", CoreError::InvalidGlyph(c));
            }
        }
    }

    // --- Content ---

    pub fn load_game(&mut self, has_content: bool) -> bool {
        sink_log!(
            self.logger,
            Debug,
            "Game loaded (content-less, content supplied: {has_content}): Displaying Hello World"
        );
        self.framebuffer.clear();
        sink_log!(self.logger, Debug, "retro_load_game completed");
        true
    }

    pub fn load_game_special(&mut self, game_type: u32, num_info: usize) -> bool {
        sink_log!(
            self.logger,
            Debug,
            "retro_load_game_special called (type={game_type}, num_info={num_info}, stubbed)"
        );
        false
    }

    pub fn unload_game(&mut self) {
        sink_log!(self.logger, Debug, "Game unloaded");
    }

    // --- Metadata ---

    pub fn api_version(&mut self) -> u32 {
        sink_log!(self.logger, Debug, "API version: {API_VERSION}");
        API_VERSION
    }

    pub fn system_info(&mut self) -> CoreInfo {
        let info = CoreInfo {
            library_name: abi::info::LIBRARY_NAME,
            library_version: abi::info::LIBRARY_VERSION,
            valid_extensions: abi::info::VALID_EXTENSIONS,
            need_fullpath: false,
            block_extract: false,
        };
        sink_log!(
            self.logger,
            Debug,
            "System info: {} v{}, need_fullpath={}",
            info.library_name.to_string_lossy(),
            info.library_version.to_string_lossy(),
            info.need_fullpath
        );
        info
    }

    pub fn av_info(&mut self) -> AvInfo {
        let info = AvInfo {
            base_width: WIDTH as u32,
            base_height: HEIGHT as u32,
            max_width: WIDTH as u32,
            max_height: HEIGHT as u32,
            aspect_ratio: WIDTH as f32 / HEIGHT as f32,
            fps: FPS,
            sample_rate: SAMPLE_RATE,
        };
        sink_log!(self.logger, Debug, "AV info: {WIDTH}x{HEIGHT}, {:.2} fps", info.fps);
        info
    }

    pub fn region(&mut self) -> u32 {
        sink_log!(self.logger, Debug, "Region: NTSC");
        Region::NTSC as u32
    }

    pub fn set_controller_port_device(&mut self, port: u32, device: u32) {
        sink_log!(self.logger, Debug, "Controller port device set: port={port}, device={device}");
    }

    // --- Stubs ---

    pub fn serialize_size(&mut self) -> usize {
        sink_log!(self.logger, Debug, "Serialize size: 0");
        0
    }

    pub fn serialize(&mut self, _data: &mut [u8]) -> bool {
        sink_log!(self.logger, Debug, "Serialize called (stubbed)");
        false
    }

    pub fn unserialize(&mut self, _data: &[u8]) -> bool {
        sink_log!(self.logger, Debug, "Unserialize called (stubbed)");
        false
    }

    pub fn cheat_reset(&mut self) {
        sink_log!(self.logger, Debug, "Cheat reset (stubbed)");
    }

    pub fn cheat_set(&mut self, index: u32, enabled: bool, code: &str) {
        sink_log!(
            self.logger,
            Debug,
            "Cheat set: index={index}, enabled={enabled}, code={code} (stubbed)"
        );
    }

    /// No memory regions are exposed.
    pub fn memory_data(&mut self, id: u32) -> Option<&mut [u8]> {
        sink_log!(self.logger, Debug, "Memory data: id={id} (stubbed)");
        None
    }

    pub fn memory_size(&mut self, id: u32) -> usize {
        sink_log!(self.logger, Debug, "Memory size: id={id} (stubbed)");
        0
    }
}

#[cfg(test)]
mod tests {
    use log::Level;

    use super::*;
    use crate::testing::{FakeEnv, FakePad, RecordingLog, RecordingVideo};

    fn core() -> (HelloCore, RecordingLog) {
        let log = RecordingLog::default();
        (HelloCore::with_logger(Box::new(log.clone())), log)
    }

    #[test]
    fn run_before_init_submits_nothing_and_logs_one_error() {
        let (mut core, log) = core();
        let video = RecordingVideo::default();
        core.set_video_refresh(video.boxed());

        core.run();

        assert_eq!(video.frame_count(), 0);
        assert_eq!(log.count(Level::Error), 1);
        assert!(log.contains(Level::Error, "not initialized"));
    }

    #[test]
    fn run_after_deinit_leaves_previous_frame_untouched() {
        let (mut core, log) = core();
        let video = RecordingVideo::default();
        core.set_video_refresh(video.boxed());
        core.init();
        core.run();
        core.deinit();
        let before = core.framebuffer().pixels().to_vec();
        log.clear();

        core.run();

        assert_eq!(video.frame_count(), 1);
        assert_eq!(core.framebuffer().pixels(), &before[..]);
        assert_eq!(log.count(Level::Error), 1);
    }

    #[test]
    fn frame_draws_square_and_greeting() {
        let (mut core, log) = core();
        let video = RecordingVideo::default();
        core.set_video_refresh(video.boxed());
        core.init();

        core.run();

        let mut expected = Framebuffer::default();
        expected.fill_rect(0, 0, 20, 20, RED);
        expected.draw_string(50, 50, "Hello World", WHITE).unwrap();

        video
            .with_last(|frame| {
                assert_eq!(frame.width, 320);
                assert_eq!(frame.height, 240);
                assert_eq!(frame.pitch, 640);
                assert_eq!(frame.pixels, expected.pixels());
            })
            .expect("one frame submitted");
        assert_eq!(log.count(Level::Error), 0);
        assert_eq!(log.count(Level::Warn), 0);
    }

    #[test]
    fn held_input_moves_square_until_edge() {
        let (mut core, _log) = core();
        let video = RecordingVideo::default();
        let pad = FakePad::default();
        core.set_video_refresh(video.boxed());
        core.set_input_poll(pad.boxed_poll());
        core.set_input_state(pad.boxed_state());
        core.init();

        pad.hold(DPad::RIGHT | DPad::DOWN);
        for _ in 0..WIDTH {
            core.run();
        }

        assert_eq!(pad.polls(), WIDTH as u32);
        assert_eq!(core.square(), Square { x: 300, y: 220 });
        video.with_last(|frame| {
            assert_eq!(frame.pixels[220 * WIDTH + 300], RED);
            assert_eq!(frame.pixels[239 * WIDTH + 319], RED);
        });
    }

    #[test]
    fn missing_video_sink_is_logged_every_frame() {
        let (mut core, log) = core();
        let pad = FakePad::default();
        core.set_input_state(pad.boxed_state());
        core.init();
        pad.hold(DPad::RIGHT);

        core.run();
        core.run();

        assert_eq!(log.count(Level::Error), 2);
        assert!(log.contains(Level::Error, "No video callback set"));
        assert_eq!(core.square(), Square { x: 2, y: 0 });
    }

    #[test]
    fn negotiation_succeeds_once_and_switches_to_host_log() {
        let (mut core, fallback) = core();
        let host_log = RecordingLog::default();
        let env = FakeEnv::accepting(host_log.clone());

        core.set_environment(env.boxed());
        core.set_environment(env.boxed());
        core.init();

        assert_eq!(env.calls(), (1, 1, 1));
        env.update(|s| {
            assert!(matches!(s.last_pixel_format, Some(PixelFormat::RGB565)));
        });
        assert_eq!(
            core.negotiated(),
            Negotiation {
                contentless: true,
                logging: true,
                pixel_format: true,
            }
        );
        assert_eq!(core.env_calls(), 2);
        assert!(host_log.contains(Level::Debug, "Logging callback initialized"));
        assert!(host_log.contains(Level::Debug, "count: 2"));
        assert!(fallback.lines().is_empty());
        assert_eq!(fallback.releases(), 1);
    }

    #[test]
    fn rejected_negotiation_is_logged_and_not_fatal() {
        let (mut core, log) = core();
        let env = FakeEnv::rejecting();
        let video = RecordingVideo::default();

        core.set_environment(env.boxed());

        assert_eq!(core.negotiated(), Negotiation::default());
        assert!(log.contains(Level::Warn, "Failed to get log interface"));
        assert!(log.contains(Level::Error, "Failed to set content-less support"));
        assert!(log.contains(Level::Error, "Failed to set pixel format: RGB565"));

        core.set_video_refresh(video.boxed());
        core.init();
        core.run();
        assert_eq!(video.frame_count(), 1);
    }

    #[test]
    fn refused_capability_is_requested_again_at_init() {
        let (mut core, _log) = core();
        let env = FakeEnv::accepting(RecordingLog::default());
        env.update(|s| s.accept_pixel_format = false);

        core.set_environment(env.boxed());
        assert!(!core.negotiated().pixel_format);

        env.update(|s| s.accept_pixel_format = true);
        core.init();
        assert!(core.negotiated().pixel_format);

        core.set_environment(env.boxed());
        assert_eq!(env.calls(), (1, 1, 2));
    }

    #[test]
    fn null_environment_is_reported() {
        let (mut core, log) = core();
        core.set_environment(None);

        assert_eq!(core.env_calls(), 1);
        assert!(log.contains(Level::Error, "Null environment callback"));
        assert_eq!(core.negotiated(), Negotiation::default());
    }

    #[test]
    fn deinit_resets_session_and_allows_renegotiation() {
        let (mut core, fallback) = core();
        let host_log = RecordingLog::default();
        let env = FakeEnv::accepting(host_log.clone());
        let pad = FakePad::default();
        core.set_environment(env.boxed());
        core.set_input_state(pad.boxed_state());
        core.init();
        pad.hold(DPad::RIGHT);
        core.run();

        core.deinit();

        assert!(!core.is_initialized());
        assert_eq!(core.negotiated(), Negotiation::default());
        assert_eq!(core.env_calls(), 0);
        assert_eq!(core.square(), Square::default());
        assert_eq!(host_log.releases(), 1);
        assert!(host_log.contains(Level::Debug, "Core deinitialized"));
        assert_eq!(fallback.releases(), 1);

        core.set_environment(env.boxed());
        assert_eq!(env.calls(), (2, 2, 2));
        assert_eq!(core.env_calls(), 1);
    }

    #[test]
    fn invalid_glyph_warns_and_draws_nothing() {
        let (mut core, log) = core();
        let before = core.framebuffer().pixels().to_vec();

        core.draw_glyph(0, 0, '\u{7}', WHITE);
        core.draw_glyph(0, 0, 'ÿ', WHITE);

        assert_eq!(core.framebuffer().pixels(), &before[..]);
        assert_eq!(log.count(Level::Warn), 2);
    }

    #[test]
    fn draw_text_warns_per_invalid_character() {
        let (mut core, log) = core();
        core.draw_text(0, 0, "a\tb\n", WHITE);
        assert_eq!(log.count(Level::Warn), 2);
        assert!(log.contains(Level::Warn, "'\\t'"));
    }

    #[test]
    fn reset_clears_and_recenters() {
        let (mut core, _log) = core();
        let pad = FakePad::default();
        core.set_input_state(pad.boxed_state());
        core.init();
        pad.hold(DPad::DOWN);
        core.run();
        assert_eq!(core.square(), Square { x: 0, y: 1 });

        core.reset();

        assert_eq!(core.square(), Square::default());
        assert!(core.framebuffer().pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn boilerplate_entry_points_return_constants() {
        let (mut core, log) = core();

        assert_eq!(core.api_version(), 1);
        assert_eq!(core.region(), 0);
        assert!(core.load_game(false));
        assert!(!core.load_game_special(1, 2));
        assert_eq!(core.serialize_size(), 0);
        assert!(!core.serialize(&mut [0u8; 4]));
        assert!(!core.unserialize(&[0u8; 4]));
        assert!(core.memory_data(0).is_none());
        assert_eq!(core.memory_size(0), 0);
        core.cheat_reset();
        core.cheat_set(0, true, "ABCD");
        core.set_controller_port_device(0, 1);
        core.unload_game();

        let info = core.system_info();
        assert_eq!(info.library_name, c"Libretro Core Hello World");
        assert_eq!(info.library_version, c"1.0");
        assert!(!info.need_fullpath);

        let av = core.av_info();
        assert_eq!((av.base_width, av.base_height), (320, 240));
        assert_eq!((av.max_width, av.max_height), (320, 240));
        assert!((av.aspect_ratio - 4.0 / 3.0).abs() < f32::EPSILON);
        assert_eq!(av.fps, 60.0);
        assert_eq!(av.sample_rate, 48_000.0);

        assert!(log.contains(Level::Debug, "Cheat set: index=0, enabled=true, code=ABCD"));
        assert_eq!(log.count(Level::Error), 0);
    }
}
