use std::borrow::Cow;
use std::ffi::{CStr, c_void};
use std::os::raw::{c_char, c_uint};
use std::ptr;

use libretro_sys::*;

use crate::host::{Environment, InputPoll, InputState, VideoSink};
use crate::state::with_core;

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_api_version() -> c_uint {
    with_core(|c| c.api_version())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_init() {
    with_core(|c| c.init());
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_deinit() {
    with_core(|c| c.deinit());
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_set_environment(cb: Option<EnvironmentFn>) {
    let env = cb.map(|f| Box::new(f) as Box<dyn Environment>);
    with_core(|c| c.set_environment(env));
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_set_video_refresh(cb: Option<VideoRefreshFn>) {
    let video = cb.map(|f| Box::new(f) as Box<dyn VideoSink>);
    with_core(|c| c.set_video_refresh(video));
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_set_audio_sample(_cb: Option<AudioSampleFn>) {}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_set_audio_sample_batch(_cb: Option<AudioSampleBatchFn>) {}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_set_input_poll(cb: Option<InputPollFn>) {
    let poll = cb.map(|f| Box::new(f) as Box<dyn InputPoll>);
    with_core(|c| c.set_input_poll(poll));
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_set_input_state(cb: Option<InputStateFn>) {
    let state = cb.map(|f| Box::new(f) as Box<dyn InputState>);
    with_core(|c| c.set_input_state(state));
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_get_system_info(info: *mut SystemInfo) {
    if info.is_null() {
        return;
    }
    let core_info = with_core(|c| c.system_info());
    let info = unsafe { &mut *info };
    info.library_name = core_info.library_name.as_ptr();
    info.library_version = core_info.library_version.as_ptr();
    info.valid_extensions = core_info.valid_extensions.as_ptr();
    info.need_fullpath = core_info.need_fullpath;
    info.block_extract = core_info.block_extract;
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_get_system_av_info(info: *mut SystemAvInfo) {
    if info.is_null() {
        return;
    }
    let av = with_core(|c| c.av_info());
    let info = unsafe { &mut *info };
    info.geometry.base_width = av.base_width;
    info.geometry.base_height = av.base_height;
    info.geometry.max_width = av.max_width;
    info.geometry.max_height = av.max_height;
    info.geometry.aspect_ratio = av.aspect_ratio;

    info.timing.fps = av.fps;
    info.timing.sample_rate = av.sample_rate;
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_set_controller_port_device(port: c_uint, device: c_uint) {
    with_core(|c| c.set_controller_port_device(port, device));
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_reset() {
    with_core(|c| c.reset());
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_run() {
    with_core(|c| c.run());
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_load_game(game: *const GameInfo) -> bool {
    with_core(|c| c.load_game(!game.is_null()))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_load_game_special(
    game_type: c_uint,
    _info: *const GameInfo,
    num_info: usize,
) -> bool {
    with_core(|c| c.load_game_special(game_type, num_info))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_unload_game() {
    with_core(|c| c.unload_game());
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_get_region() -> c_uint {
    with_core(|c| c.region())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_serialize_size() -> usize {
    with_core(|c| c.serialize_size())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_serialize(data: *mut c_void, size: usize) -> bool {
    if data.is_null() {
        return with_core(|c| c.serialize(&mut []));
    }
    let buf = unsafe { std::slice::from_raw_parts_mut(data as *mut u8, size) };
    with_core(|c| c.serialize(buf))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_unserialize(data: *const c_void, size: usize) -> bool {
    if data.is_null() {
        return with_core(|c| c.unserialize(&[]));
    }
    let buf = unsafe { std::slice::from_raw_parts(data as *const u8, size) };
    with_core(|c| c.unserialize(buf))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_cheat_reset() {
    with_core(|c| c.cheat_reset());
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_cheat_set(index: c_uint, enabled: bool, code: *const c_char) {
    let code = if code.is_null() {
        Cow::Borrowed("")
    } else {
        unsafe { CStr::from_ptr(code) }.to_string_lossy()
    };
    with_core(|c| c.cheat_set(index, enabled, &code));
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_get_memory_data(id: c_uint) -> *mut c_void {
    with_core(|c| match c.memory_data(id) {
        Some(mem) => mem.as_mut_ptr() as *mut c_void,
        None => ptr::null_mut(),
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_get_memory_size(id: c_uint) -> usize {
    with_core(|c| c.memory_size(id))
}
