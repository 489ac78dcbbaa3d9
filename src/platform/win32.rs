//! kernel32 Event Object Bindings

use windows::{
    Win32::{
        Foundation::{
            CloseHandle, ERROR_ALREADY_EXISTS, GetLastError, HANDLE, WAIT_OBJECT_0, WAIT_TIMEOUT,
        },
        Security::SECURITY_ATTRIBUTES,
        System::Threading::{
            CreateEventW, OpenEventW, ResetEvent, SYNCHRONIZATION_ACCESS_RIGHTS, SetEvent,
            WaitForSingleObject,
        },
    },
    core::PCWSTR,
};

use super::{AccessRights, Created};
use crate::PlatformErrorCode;

#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RawHandle(HANDLE);
unsafe impl Sync for RawHandle {}
unsafe impl Send for RawHandle {}
impl RawHandle {
    pub(crate) const fn as_ptr(self) -> *mut core::ffi::c_void {
        self.0.0
    }
}

const FACILITY_WIN32_HRESULT: u32 = 0x8007_0000;

fn error_code(e: &windows::core::Error) -> PlatformErrorCode {
    let hr = e.code().0 as u32;
    if hr & 0xFFFF_0000 == FACILITY_WIN32_HRESULT {
        PlatformErrorCode::new(hr & 0xFFFF)
    } else {
        PlatformErrorCode::new(hr)
    }
}

#[inline]
fn last_error() -> PlatformErrorCode {
    PlatformErrorCode::new(unsafe { GetLastError() }.0)
}

/// NUL-terminated UTF-16 form required by the `W` entry points.
fn to_wide(name: &str) -> Vec<u16> {
    name.encode_utf16().chain(core::iter::once(0)).collect()
}

pub(crate) fn create_event(
    inheritable: bool,
    manual_reset: bool,
    initial_state: bool,
    name: Option<&str>,
) -> Result<Created, PlatformErrorCode> {
    let name = name.map(to_wide);
    let security_attributes = SECURITY_ATTRIBUTES {
        nLength: core::mem::size_of::<SECURITY_ATTRIBUTES>() as _,
        lpSecurityDescriptor: core::ptr::null_mut(),
        bInheritHandle: inheritable.into(),
    };

    let handle = unsafe {
        CreateEventW(
            inheritable.then_some(&security_attributes as *const _),
            manual_reset,
            initial_state,
            name.as_ref()
                .map_or(PCWSTR::null(), |n| PCWSTR::from_raw(n.as_ptr())),
        )
    }
    .map_err(|e| error_code(&e))?;
    // CreateEventW leaves ERROR_ALREADY_EXISTS behind when it opened a named object
    let already_existed = name.is_some() && unsafe { GetLastError() } == ERROR_ALREADY_EXISTS;

    Ok(Created {
        handle: RawHandle(handle),
        already_existed,
    })
}

pub(crate) fn open_event(
    access: AccessRights,
    inheritable: bool,
    name: &str,
) -> Result<RawHandle, PlatformErrorCode> {
    let name = to_wide(name);

    unsafe {
        OpenEventW(
            SYNCHRONIZATION_ACCESS_RIGHTS(access.bits()),
            inheritable,
            PCWSTR::from_raw(name.as_ptr()),
        )
    }
    .map(RawHandle)
    .map_err(|e| error_code(&e))
}

#[inline]
pub(crate) fn set_event(h: RawHandle) -> Result<(), PlatformErrorCode> {
    unsafe { SetEvent(h.0) }.map_err(|e| error_code(&e))
}

#[inline]
pub(crate) fn reset_event(h: RawHandle) -> Result<(), PlatformErrorCode> {
    unsafe { ResetEvent(h.0) }.map_err(|e| error_code(&e))
}

#[inline]
pub(crate) fn close_handle(h: RawHandle) -> Result<(), PlatformErrorCode> {
    unsafe { CloseHandle(h.0) }.map_err(|e| error_code(&e))
}

pub(crate) fn wait_zero(h: RawHandle) -> Result<bool, PlatformErrorCode> {
    match unsafe { WaitForSingleObject(h.0, 0) } {
        WAIT_OBJECT_0 => Ok(true),
        WAIT_TIMEOUT => Ok(false),
        _ => Err(last_error()),
    }
}
