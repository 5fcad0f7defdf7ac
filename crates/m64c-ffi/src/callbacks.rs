//! Callbacks the core and plugins invoke from native code

use crate::types::{CoreDoCommandFn, FrameCallbackFn, CMD_SET_FRAME_CALLBACK};
use m64c_core::{CoreCommand, Frame, FrameAction, FrameCallback};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::ffi::{c_char, c_int, c_uchar, c_void, CStr};
use tracing::{info, warn};

/// Forward a debug message from the core or a plugin to the log.
///
/// `context` is the static C string registered alongside the callback.
pub unsafe extern "C" fn debug_callback(context: *mut c_void, message: *const c_char) {
    if message.is_null() {
        return;
    }
    let source = if context.is_null() {
        Cow::Borrowed("core")
    } else {
        CStr::from_ptr(context as *const c_char).to_string_lossy()
    };
    let message = CStr::from_ptr(message).to_string_lossy();
    info!(target: "m64c::native", "{}: {}", source, message);
}

struct FrameHook {
    callback: FrameCallback,
    do_command: CoreDoCommandFn,
}

// The native frame callback carries no user pointer, so the observer has to
// live somewhere the trampoline can reach it.
static FRAME_HOOK: Mutex<Option<FrameHook>> = parking_lot::const_mutex(None);

/// Install `callback` and register the trampoline with the core
pub(crate) fn install_frame_hook(
    callback: FrameCallback,
    do_command: CoreDoCommandFn,
) -> m64c_core::Result<()> {
    *FRAME_HOOK.lock() = Some(FrameHook {
        callback,
        do_command,
    });

    let trampoline: FrameCallbackFn = frame_trampoline;
    let rval = unsafe { do_command(CMD_SET_FRAME_CALLBACK, 0, trampoline as *mut c_void) };
    if let Err(e) = m64c_core::CoreError::check(rval) {
        clear_frame_hook();
        return Err(e);
    }
    Ok(())
}

pub(crate) fn clear_frame_hook() {
    FRAME_HOOK.lock().take();
}

unsafe extern "C" fn frame_trampoline(
    pixels: *mut c_uchar,
    bits_per_pixel: c_int,
    width: c_int,
    height: c_int,
) {
    let mut guard = FRAME_HOOK.lock();
    let Some(hook) = guard.as_mut() else {
        return;
    };

    let bits_per_pixel = bits_per_pixel.max(0) as u32;
    let width = width.max(0) as u32;
    let height = height.max(0) as u32;
    let len = (width as usize) * (height as usize) * (bits_per_pixel as usize) / 8;
    let pixels = if pixels.is_null() {
        &[][..]
    } else {
        std::slice::from_raw_parts(pixels as *const u8, len)
    };

    let frame = Frame {
        pixels,
        bits_per_pixel,
        width,
        height,
    };
    let action = (hook.callback)(&frame);
    let do_command = hook.do_command;
    drop(guard);

    if action == FrameAction::Stop {
        let rval = do_command(CoreCommand::Stop.code(), 0, std::ptr::null_mut());
        if let Err(e) = m64c_core::CoreError::check(rval) {
            warn!("Core rejected stop request: {}", e);
        }
    }
}
