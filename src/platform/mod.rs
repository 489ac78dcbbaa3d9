//! Platform Event Object Primitives
//!
//! Everything here is crate-private: `kernel32` on Windows, and a process-local emulation of
//! the kernel object namespace everywhere else.

use bitflags::bitflags;

#[cfg(windows)]
mod win32;
#[cfg(windows)]
pub(crate) use self::win32::*;

#[cfg(not(windows))]
mod emulated;
#[cfg(not(windows))]
pub(crate) use self::emulated::*;

bitflags! {
    /// Access mask requested when opening an event object.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct AccessRights : u32 {
        const EVENT_QUERY_STATE = 0x0001;
        const EVENT_MODIFY_STATE = 0x0002;
        const DELETE = 0x0001_0000;
        const READ_CONTROL = 0x0002_0000;
        const WRITE_DAC = 0x0004_0000;
        const WRITE_OWNER = 0x0008_0000;
        const SYNCHRONIZE = 0x0010_0000;

        const EVENT_ALL_ACCESS = Self::EVENT_QUERY_STATE.bits()
            | Self::EVENT_MODIFY_STATE.bits()
            | Self::DELETE.bits()
            | Self::READ_CONTROL.bits()
            | Self::WRITE_DAC.bits()
            | Self::WRITE_OWNER.bits()
            | Self::SYNCHRONIZE.bits();
    }
}

/// Result of a create-or-open call.
#[derive(Debug)]
pub(crate) struct Created {
    pub handle: RawHandle,
    /// The name was already bound to an object, which got opened instead.
    pub already_existed: bool,
}
