//! hello-core ABI module
//!
//! Fixed values the core reports to (or negotiates with) the libretro host.
//!
//! ## Video
//! - Resolution is fixed at `WIDTH` x `HEIGHT` and never changes after it is reported.
//! - Pixels are RGB565 (`u16`), rows are tightly packed: pitch is `WIDTH * 2` bytes.
//!
//! ## Scene
//! - A `SQUARE_SIZE` square in `RED`, moved by the d-pad of controller port 0.
//! - `GREETING` in `WHITE` at `GREETING_POS`.
//!
//! ## Environment commands
//! The libretro numeric ids for environment commands, devices and regions come from
//! `libretro-sys`. The log interface struct is mirrored here because the host may hand
//! back a null log function, which the non-nullable `libretro-sys` type cannot represent.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

/// Framebuffer width in pixels.
pub const WIDTH: usize = 320;
/// Framebuffer height in pixels.
pub const HEIGHT: usize = 240;
/// Bytes per framebuffer row.
pub const PITCH: usize = WIDTH * std::mem::size_of::<u16>();

pub const FPS: f64 = 60.0;
pub const SAMPLE_RATE: f64 = 48_000.0;

/// Side length of the movable square.
pub const SQUARE_SIZE: i32 = 20;

pub const GREETING: &str = "Hello World";
pub const GREETING_POS: (i32, i32) = (50, 50);

/// Metadata reported by `retro_get_system_info`.
pub mod info {
    use std::ffi::CStr;

    pub const LIBRARY_NAME: &CStr = c"Libretro Core Hello World";
    pub const LIBRARY_VERSION: &CStr = c"1.0";
    /// Content-less core: no file extensions.
    pub const VALID_EXTENSIONS: &CStr = c"";
}

/// Fallback log file, relative to the host's working directory.
pub const LOG_FILE_NAME: &str = "core.log";

/// Pack 8-bit channels into RGB565.
pub const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    (((r as u16) >> 3) << 11) | (((g as u16) >> 2) << 5) | ((b as u16) >> 3)
}

pub mod colors {
    use super::rgb565;

    pub const BLACK: u16 = rgb565(0, 0, 0);
    pub const WHITE: u16 = rgb565(255, 255, 255);
    pub const RED: u16 = rgb565(255, 0, 0);
}

/// `retro_log_level` values.
pub mod log_level {
    use std::os::raw::c_int;

    use libretro_sys::LogLevel;

    pub const DEBUG: c_int = LogLevel::Debug as c_int;
    pub const INFO: c_int = LogLevel::Info as c_int;
    pub const WARN: c_int = LogLevel::Warn as c_int;
    pub const ERROR: c_int = LogLevel::Error as c_int;
}

/// `retro_log_printf_t`.
pub type LogPrintfFn = unsafe extern "C" fn(level: c_int, fmt: *const c_char, ...);

/// `struct retro_log_callback`, filled in by `RETRO_ENVIRONMENT_GET_LOG_INTERFACE`.
#[repr(C)]
#[derive(Default)]
pub struct LogCallback {
    pub log: Option<LogPrintfFn>,
}

/// printf format used for every host log call; the message itself is passed as `%s`.
pub const LOG_FORMAT: &CStr = c"%s\n";
