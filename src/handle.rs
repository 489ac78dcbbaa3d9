//! Owned Platform Handle

use crate::platform::{self, RawHandle};

/// Owns one platform handle and releases it at most once.
#[derive(Debug)]
pub(crate) struct OwnedHandle(Option<RawHandle>);
impl Drop for OwnedHandle {
    fn drop(&mut self) {
        self.close();
    }
}
impl OwnedHandle {
    /// # Safety
    /// `h` must be a live handle that nothing else closes.
    pub(crate) const unsafe fn from_raw(h: RawHandle) -> Self {
        Self(Some(h))
    }

    pub(crate) const fn raw(&self) -> Option<RawHandle> {
        self.0
    }

    pub(crate) const fn is_closed(&self) -> bool {
        self.0.is_none()
    }

    /// Releases the handle. Later calls are no-ops.
    pub(crate) fn close(&mut self) {
        if let Some(h) = self.0.take() {
            if let Err(e) = platform::close_handle(h) {
                tracing::warn!(reason = %e, handle = ?h, "closing handle failed");
            }
        }
    }
}

#[cfg(windows)]
impl std::os::windows::io::AsRawHandle for OwnedHandle {
    fn as_raw_handle(&self) -> std::os::windows::io::RawHandle {
        self.0.map_or(core::ptr::null_mut(), RawHandle::as_ptr)
    }
}
