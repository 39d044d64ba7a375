//! Capabilities the core consumes from the libretro host.
//!
//! Each host callback is modeled as a trait so the session can hold
//! `Option<Box<dyn ...>>` (present / absent) instead of nullable function pointers.
//! The traits are implemented directly on the `libretro-sys` callback types; tests
//! supply their own fakes.

use std::ffi::c_void;

use libretro_sys::{
    ENVIRONMENT_GET_LOG_INTERFACE, ENVIRONMENT_SET_PIXEL_FORMAT, ENVIRONMENT_SET_SUPPORT_NO_GAME,
    EnvironmentFn, InputPollFn, InputStateFn, PixelFormat, VideoRefreshFn,
};

use crate::abi::LogCallback;
use crate::logging::{HostLog, LogSink};

/// `retro_environment_t`: capability negotiation.
pub trait Environment: Send {
    /// Ask the host to start the core without content.
    fn set_support_no_game(&mut self, supported: bool) -> bool;

    /// Ask the host for its structured logger.
    fn log_interface(&mut self) -> Option<Box<dyn LogSink>>;

    /// Ask the host to accept frames in `format`.
    fn set_pixel_format(&mut self, format: PixelFormat) -> bool;
}

/// `retro_video_refresh_t`: receives each finished frame.
pub trait VideoSink: Send {
    fn refresh(&mut self, frame: &[u16], width: u32, height: u32, pitch: usize);
}

/// `retro_input_poll_t`.
pub trait InputPoll: Send {
    fn poll(&mut self);
}

/// `retro_input_state_t`.
pub trait InputState: Send {
    fn pressed(&mut self, port: u32, device: u32, index: u32, id: u32) -> bool;
}

impl Environment for EnvironmentFn {
    fn set_support_no_game(&mut self, supported: bool) -> bool {
        let mut value = supported;
        // SAFETY: the command takes a `bool*` that only needs to live for the call.
        unsafe {
            (*self)(
                ENVIRONMENT_SET_SUPPORT_NO_GAME,
                &mut value as *mut bool as *mut c_void,
            )
        }
    }

    fn log_interface(&mut self) -> Option<Box<dyn LogSink>> {
        let mut cb = LogCallback::default();
        // SAFETY: `LogCallback` mirrors `struct retro_log_callback`.
        let ok = unsafe {
            (*self)(
                ENVIRONMENT_GET_LOG_INTERFACE,
                &mut cb as *mut LogCallback as *mut c_void,
            )
        };
        if !ok {
            return None;
        }
        cb.log.map(|f| Box::new(HostLog::new(f)) as Box<dyn LogSink>)
    }

    fn set_pixel_format(&mut self, format: PixelFormat) -> bool {
        let mut fmt = format;
        // SAFETY: the command takes a `enum retro_pixel_format*`; `PixelFormat` is `repr(C)`.
        unsafe {
            (*self)(
                ENVIRONMENT_SET_PIXEL_FORMAT,
                &mut fmt as *mut PixelFormat as *mut c_void,
            )
        }
    }
}

impl VideoSink for VideoRefreshFn {
    fn refresh(&mut self, frame: &[u16], width: u32, height: u32, pitch: usize) {
        // SAFETY: `frame` holds `height` rows of `pitch` bytes and outlives the call.
        unsafe { (*self)(frame.as_ptr() as *const c_void, width, height, pitch) }
    }
}

impl InputPoll for InputPollFn {
    fn poll(&mut self) {
        // SAFETY: host callback with no arguments.
        unsafe { (*self)() }
    }
}

impl InputState for InputStateFn {
    fn pressed(&mut self, port: u32, device: u32, index: u32, id: u32) -> bool {
        // SAFETY: plain integer arguments.
        unsafe { (*self)(port, device, index, id) != 0 }
    }
}
