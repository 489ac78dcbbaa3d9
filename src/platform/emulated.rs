//! Process-local emulation of the kernel event object namespace
//!
//! Mirrors the object manager rules the Windows backend relies on: handles are process-wide
//! values that may be closed once, named objects are shared by name and die with their last
//! handle, and waits on auto-reset objects consume the signal.

use std::{
    cell::Cell,
    collections::HashMap,
    sync::{
        Arc, LazyLock, Weak,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::Mutex;

use super::{AccessRights, Created};
use crate::PlatformErrorCode;

#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct RawHandle(usize);

struct EventObject {
    name: Option<String>,
    manual_reset: bool,
    signaled: AtomicBool,
}
impl EventObject {
    fn wait_zero(&self) -> bool {
        if self.manual_reset {
            self.signaled.load(Ordering::Acquire)
        } else {
            // a satisfied wait on an auto-reset object takes the signal with it
            self.signaled
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        }
    }
}

struct HandleEntry {
    object: Arc<EventObject>,
    access: AccessRights,
}

/// handle values are multiples of 4, as on Windows
const HANDLE_STRIDE: usize = 4;

struct ObjectManager {
    next_handle: usize,
    handles: HashMap<usize, HandleEntry>,
    namespace: HashMap<String, Weak<EventObject>>,
}
impl ObjectManager {
    fn new() -> Self {
        Self {
            next_handle: HANDLE_STRIDE,
            handles: HashMap::new(),
            namespace: HashMap::new(),
        }
    }

    fn lookup_named(&self, name: &str) -> Option<Arc<EventObject>> {
        self.namespace.get(name).and_then(Weak::upgrade)
    }

    fn insert(
        &mut self,
        object: Arc<EventObject>,
        access: AccessRights,
        inheritable: bool,
    ) -> Result<RawHandle, PlatformErrorCode> {
        let h = self.next_handle;
        self.next_handle = h
            .checked_add(HANDLE_STRIDE)
            .ok_or(PlatformErrorCode::NO_SYSTEM_RESOURCES)?;
        self.handles.insert(h, HandleEntry { object, access });
        LIVE_HANDLES.with(|c| c.set(c.get() + 1));
        tracing::trace!(handle = h, ?access, inheritable, "handle inserted");

        Ok(RawHandle(h))
    }

    fn object(
        &self,
        h: RawHandle,
        required: AccessRights,
    ) -> Result<&EventObject, PlatformErrorCode> {
        let entry = self
            .handles
            .get(&h.0)
            .ok_or(PlatformErrorCode::INVALID_HANDLE)?;
        if !entry.access.contains(required) {
            return Err(PlatformErrorCode::ACCESS_DENIED);
        }

        Ok(&*entry.object)
    }

    fn remove(&mut self, h: RawHandle) -> Result<(), PlatformErrorCode> {
        let entry = self
            .handles
            .remove(&h.0)
            .ok_or(PlatformErrorCode::INVALID_HANDLE)?;
        LIVE_HANDLES.with(|c| c.set(c.get() - 1));

        // last handle gone: the object dies and its name becomes free again
        if Arc::strong_count(&entry.object) == 1 {
            if let Some(name) = entry.object.name.as_deref() {
                self.namespace.remove(name);
            }
        }

        Ok(())
    }
}

static OBJECT_MANAGER: LazyLock<Mutex<ObjectManager>> =
    LazyLock::new(|| Mutex::new(ObjectManager::new()));

thread_local! {
    /// handles opened minus handles closed by the current thread
    static LIVE_HANDLES: Cell<isize> = const { Cell::new(0) };
}

/// Net count of handles the current thread has opened and not yet closed.
#[cfg(test)]
pub(crate) fn live_handles_on_current_thread() -> isize {
    LIVE_HANDLES.with(Cell::get)
}

pub(crate) fn create_event(
    inheritable: bool,
    manual_reset: bool,
    initial_state: bool,
    name: Option<&str>,
) -> Result<Created, PlatformErrorCode> {
    let mut om = OBJECT_MANAGER.lock();

    if let Some(existing) = name.and_then(|n| om.lookup_named(n)) {
        return Ok(Created {
            handle: om.insert(existing, AccessRights::EVENT_ALL_ACCESS, inheritable)?,
            already_existed: true,
        });
    }

    let object = Arc::new(EventObject {
        name: name.map(str::to_owned),
        manual_reset,
        signaled: AtomicBool::new(initial_state),
    });
    if let Some(name) = name {
        om.namespace
            .insert(name.to_owned(), Arc::downgrade(&object));
    }

    Ok(Created {
        handle: om.insert(object, AccessRights::EVENT_ALL_ACCESS, inheritable)?,
        already_existed: false,
    })
}

pub(crate) fn open_event(
    access: AccessRights,
    inheritable: bool,
    name: &str,
) -> Result<RawHandle, PlatformErrorCode> {
    let mut om = OBJECT_MANAGER.lock();
    let object = om
        .lookup_named(name)
        .ok_or(PlatformErrorCode::FILE_NOT_FOUND)?;

    om.insert(object, access, inheritable)
}

pub(crate) fn set_event(h: RawHandle) -> Result<(), PlatformErrorCode> {
    OBJECT_MANAGER
        .lock()
        .object(h, AccessRights::EVENT_MODIFY_STATE)?
        .signaled
        .store(true, Ordering::Release);

    Ok(())
}

pub(crate) fn reset_event(h: RawHandle) -> Result<(), PlatformErrorCode> {
    OBJECT_MANAGER
        .lock()
        .object(h, AccessRights::EVENT_MODIFY_STATE)?
        .signaled
        .store(false, Ordering::Release);

    Ok(())
}

#[inline]
pub(crate) fn close_handle(h: RawHandle) -> Result<(), PlatformErrorCode> {
    OBJECT_MANAGER.lock().remove(h)
}

pub(crate) fn wait_zero(h: RawHandle) -> Result<bool, PlatformErrorCode> {
    Ok(OBJECT_MANAGER
        .lock()
        .object(h, AccessRights::SYNCHRONIZE)?
        .wait_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_name(tag: &str) -> String {
        format!("emulated-{tag}-{}", uuid::Uuid::new_v4())
    }

    #[test]
    fn handles_are_multiples_of_four_and_close_once() {
        let c = create_event(true, false, false, None).unwrap();
        assert!(!c.already_existed);
        assert_eq!(c.handle.0 % HANDLE_STRIDE, 0);

        assert_eq!(close_handle(c.handle), Ok(()));
        assert_eq!(
            close_handle(c.handle),
            Err(PlatformErrorCode::INVALID_HANDLE)
        );
        assert_eq!(set_event(c.handle), Err(PlatformErrorCode::INVALID_HANDLE));
        assert_eq!(wait_zero(c.handle), Err(PlatformErrorCode::INVALID_HANDLE));
    }

    #[test]
    fn second_create_opens_existing_object() {
        let name = unique_name("existing");
        let first = create_event(true, true, true, Some(&name)).unwrap();
        let second = create_event(false, false, false, Some(&name)).unwrap();
        assert!(!first.already_existed);
        assert!(second.already_existed);
        assert_ne!(first.handle, second.handle);

        // manual reset + signaled from the first creator wins
        assert_eq!(wait_zero(second.handle), Ok(true));
        assert_eq!(wait_zero(second.handle), Ok(true));

        close_handle(first.handle).unwrap();
        close_handle(second.handle).unwrap();
    }

    #[test]
    fn name_is_released_with_last_handle() {
        let name = unique_name("released");
        let c = create_event(true, false, false, Some(&name)).unwrap();
        let o = open_event(AccessRights::EVENT_ALL_ACCESS, true, &name).unwrap();

        close_handle(c.handle).unwrap();
        assert!(open_event(AccessRights::SYNCHRONIZE, true, &name).is_ok_and(|h| close_handle(h).is_ok()));

        close_handle(o).unwrap();
        assert_eq!(
            open_event(AccessRights::EVENT_ALL_ACCESS, true, &name),
            Err(PlatformErrorCode::FILE_NOT_FOUND)
        );
    }

    #[test]
    fn access_rights_are_enforced() {
        let name = unique_name("access");
        let c = create_event(true, true, false, Some(&name)).unwrap();
        let sync_only = open_event(AccessRights::SYNCHRONIZE, false, &name).unwrap();

        assert_eq!(set_event(sync_only), Err(PlatformErrorCode::ACCESS_DENIED));
        assert_eq!(wait_zero(sync_only), Ok(false));
        set_event(c.handle).unwrap();
        assert_eq!(wait_zero(sync_only), Ok(true));

        close_handle(sync_only).unwrap();
        close_handle(c.handle).unwrap();
    }

    #[test]
    fn auto_reset_wait_consumes_signal() {
        let c = create_event(true, false, true, None).unwrap();
        assert_eq!(wait_zero(c.handle), Ok(true));
        assert_eq!(wait_zero(c.handle), Ok(false));

        set_event(c.handle).unwrap();
        reset_event(c.handle).unwrap();
        assert_eq!(wait_zero(c.handle), Ok(false));

        close_handle(c.handle).unwrap();
    }

    #[test]
    fn live_handle_counter_tracks_current_thread() {
        let before = live_handles_on_current_thread();
        let c = create_event(true, false, false, None).unwrap();
        assert_eq!(live_handles_on_current_thread(), before + 1);
        close_handle(c.handle).unwrap();
        assert_eq!(live_handles_on_current_thread(), before);
    }
}
