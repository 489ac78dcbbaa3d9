//! Event Object Wrapper

use crate::{
    Error, EventOptions, InvalidName, MAX_NAME_LEN, Operation, PlatformErrorCode,
    handle::OwnedHandle,
    platform::{self, AccessRights, RawHandle},
};

/// A named or anonymous event object.
///
/// The signaled state lives in the platform object, not here: other handles to the same named
/// object (in this process or another) may change it at any time, so [`Event::is_signaled`]
/// always asks the platform.
///
/// The handle is released by [`Event::close`] or on drop, whichever comes first.
#[derive(Debug)]
pub struct Event {
    handle: OwnedHandle,
    name: Option<String>,
    manual_reset: bool,
    initial_state: bool,
    inheritable: bool,
}

/// Outcome of checking whether a named object exists.
enum Probe {
    Exists(OwnedHandle),
    Missing(PlatformErrorCode),
}
impl Probe {
    fn run(name: &str, inheritable: bool) -> Self {
        match platform::open_event(AccessRights::EVENT_ALL_ACCESS, inheritable, name) {
            Ok(h) => Self::Exists(unsafe { OwnedHandle::from_raw(h) }),
            Err(code) => Self::Missing(code),
        }
    }
}

fn validate_name(name: &str) -> Result<(), InvalidName> {
    if name.is_empty() {
        return Err(InvalidName::Empty);
    }
    if let Some(offset) = name.find('\0') {
        return Err(InvalidName::InteriorNul(offset));
    }
    let units = name.encode_utf16().count();
    if units > MAX_NAME_LEN {
        return Err(InvalidName::TooLong(units));
    }

    Ok(())
}

impl Event {
    /// Creates an anonymous auto-reset event, initially non-signaled and inheritable.
    #[inline]
    pub fn new() -> Result<Self, Error> {
        Self::create(None, EventOptions::default())
    }

    /// Creates (or opens, if the name is taken) a named event with default options.
    #[inline]
    pub fn named(name: &str) -> Result<Self, Error> {
        Self::create(Some(name), EventOptions::default())
    }

    /// Creates an event, or opens the existing one if `name` is already bound to an event.
    ///
    /// Opening an existing object is not reported: the object keeps its own reset mode and
    /// state, and `options.manual_reset` / `options.initial_state` are only recorded as
    /// requested. `name` and `options.inheritable` always apply to the returned handle.
    pub fn create(name: Option<&str>, options: EventOptions) -> Result<Self, Error> {
        if let Some(name) = name {
            validate_name(name)?;
        }

        let created = platform::create_event(
            options.inheritable,
            options.manual_reset,
            options.initial_state,
            name,
        )
        .map_err(Error::CreationFailed)?;
        let handle = unsafe { OwnedHandle::from_raw(created.handle) };
        tracing::debug!(
            ?name,
            manual_reset = options.manual_reset,
            initial_state = options.initial_state,
            inheritable = options.inheritable,
            already_existed = created.already_existed,
            "event created"
        );

        Ok(Self {
            handle,
            name: name.map(str::to_owned),
            manual_reset: options.manual_reset,
            initial_state: options.initial_state,
            inheritable: options.inheritable,
        })
    }

    /// Opens an event that must already exist.
    ///
    /// Fails with [`Error::NotFound`] instead of creating the object. The returned event reports
    /// `false` from [`Event::manual_reset`] and [`Event::initial_state`] whatever the object was
    /// created with; those properties cannot be read back from an opened handle.
    pub fn open(name: &str, inheritable: bool) -> Result<Self, Error> {
        validate_name(name)?;

        let mut probe_handle = match Probe::run(name, inheritable) {
            Probe::Exists(h) => h,
            Probe::Missing(code) => {
                tracing::debug!(name, %code, "event not found");
                return Err(Error::NotFound(code));
            }
        };
        // the probe pins the object until the working handle is in hand
        let opened = Self::create(
            Some(name),
            EventOptions {
                manual_reset: false,
                initial_state: false,
                inheritable,
            },
        );
        probe_handle.close();

        opened
    }

    /// [`Event::open`] with an inheritable handle.
    #[inline]
    pub fn open_existing(name: &str) -> Result<Self, Error> {
        Self::open(name, true)
    }

    /// Runs `body` with a freshly created event and closes it before returning, whether `body`
    /// succeeds, fails or panics.
    pub fn with_created<R, E>(
        name: Option<&str>,
        options: EventOptions,
        body: impl FnOnce(&mut Self) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<Error>,
    {
        Self::create(name, options)?.scoped(body)
    }

    /// Scoped form of [`Event::open`].
    pub fn with_opened<R, E>(
        name: &str,
        inheritable: bool,
        body: impl FnOnce(&mut Self) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<Error>,
    {
        Self::open(name, inheritable)?.scoped(body)
    }

    fn scoped<R, E>(mut self, body: impl FnOnce(&mut Self) -> Result<R, E>) -> Result<R, E> {
        // on unwind the handle is released by drop instead
        let r = body(&mut self);
        self.close();

        r
    }

    fn live_handle(&self, op: Operation) -> Result<RawHandle, Error> {
        self.handle.raw().ok_or(Error::OperationFailed {
            op,
            code: PlatformErrorCode::INVALID_HANDLE,
        })
    }

    /// Sets the event to the signaled state.
    pub fn set(&self) -> Result<(), Error> {
        let h = self.live_handle(Operation::Set)?;
        platform::set_event(h).map_err(|code| Error::OperationFailed {
            op: Operation::Set,
            code,
        })?;
        tracing::trace!(name = ?self.name, "event set");

        Ok(())
    }

    /// Sets the event to the non-signaled state.
    pub fn reset(&self) -> Result<(), Error> {
        let h = self.live_handle(Operation::Reset)?;
        platform::reset_event(h).map_err(|code| Error::OperationFailed {
            op: Operation::Reset,
            code,
        })?;
        tracing::trace!(name = ?self.name, "event reset");

        Ok(())
    }

    /// [`Event::set`] if `signaled`, [`Event::reset`] otherwise.
    #[inline]
    pub fn set_signaled(&self, signaled: bool) -> Result<(), Error> {
        if signaled { self.set() } else { self.reset() }
    }

    /// Checks the current state without blocking.
    ///
    /// This is a zero-timeout wait, so on an auto-reset event a `true` result consumes the
    /// signal just like any other satisfied wait. Fails once the event has been closed.
    pub fn is_signaled(&self) -> Result<bool, Error> {
        let h = self.live_handle(Operation::Query)?;
        let signaled = platform::wait_zero(h).map_err(|code| Error::OperationFailed {
            op: Operation::Query,
            code,
        })?;
        tracing::trace!(name = ?self.name, signaled, "event queried");

        Ok(signaled)
    }

    /// Releases the handle. Closing an already closed event does nothing.
    #[inline]
    pub fn close(&mut self) {
        self.handle.close();
    }

    #[inline]
    pub const fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Requested reset mode. See [`Event::create`] and [`Event::open`] for when it differs
    /// from the object's real one.
    pub const fn manual_reset(&self) -> bool {
        self.manual_reset
    }

    pub const fn initial_state(&self) -> bool {
        self.initial_state
    }

    /// Whether child processes created after this call inherit the handle.
    pub const fn inheritable(&self) -> bool {
        self.inheritable
    }
}

#[cfg(windows)]
impl std::os::windows::io::AsRawHandle for Event {
    #[inline]
    fn as_raw_handle(&self) -> std::os::windows::io::RawHandle {
        std::os::windows::io::AsRawHandle::as_raw_handle(&self.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_name(tag: &str) -> String {
        format!("event-unit-{tag}-{}", uuid::Uuid::new_v4())
    }

    #[test]
    fn name_validation() {
        assert_eq!(validate_name(""), Err(InvalidName::Empty));
        assert_eq!(validate_name("a\0b"), Err(InvalidName::InteriorNul(1)));
        assert_eq!(
            validate_name(&"x".repeat(MAX_NAME_LEN + 1)),
            Err(InvalidName::TooLong(MAX_NAME_LEN + 1))
        );
        assert_eq!(validate_name(&"x".repeat(MAX_NAME_LEN)), Ok(()));
        assert_eq!(validate_name("Ηελλας"), Ok(()));
        assert_eq!(validate_name(r"Local\foo"), Ok(()));
    }

    #[test]
    fn operations_on_closed_event_report_invalid_handle() {
        let mut e = Event::new().unwrap();
        e.close();

        for (op, r) in [
            (Operation::Set, e.set()),
            (Operation::Reset, e.reset()),
            (Operation::Query, e.is_signaled().map(drop)),
        ] {
            match r {
                Err(Error::OperationFailed { op: failed, code }) => {
                    assert_eq!(failed, op);
                    assert_eq!(code, PlatformErrorCode::INVALID_HANDLE);
                }
                other => panic!("{op}: unexpected {other:?}"),
            }
        }
    }

    #[cfg(not(windows))]
    mod leaks {
        use super::*;

        #[test]
        fn invalid_name_allocates_nothing() {
            let before = platform::live_handles_on_current_thread();
            assert!(matches!(
                Event::create(Some("bad\0name"), EventOptions::default()),
                Err(Error::InvalidArgument(InvalidName::InteriorNul(3)))
            ));
            assert!(matches!(
                Event::open("", true),
                Err(Error::InvalidArgument(InvalidName::Empty))
            ));
            assert_eq!(platform::live_handles_on_current_thread(), before);
        }

        #[test]
        fn open_releases_probe_handle() {
            let name = unique_name("probe");
            let before = platform::live_handles_on_current_thread();
            let creator = Event::named(&name).unwrap();
            let opened = Event::open_existing(&name).unwrap();
            assert_eq!(platform::live_handles_on_current_thread(), before + 2);

            drop(opened);
            drop(creator);
            assert_eq!(platform::live_handles_on_current_thread(), before);
        }

        #[test]
        fn failed_open_leaks_nothing() {
            let before = platform::live_handles_on_current_thread();
            let r = Event::open_existing(&unique_name("missing"));
            assert!(matches!(
                r,
                Err(Error::NotFound(PlatformErrorCode::FILE_NOT_FOUND))
            ));
            assert_eq!(platform::live_handles_on_current_thread(), before);
        }

        #[test]
        fn scoped_form_releases_on_ok_and_err() {
            let mut captured = None;
            let r: Result<u32, Error> =
                Event::with_created(None, EventOptions::default(), |e| {
                    captured = e.handle.raw();
                    e.set()?;
                    Ok(7)
                });
            assert_eq!(r.unwrap(), 7);
            let raw = captured.take().unwrap();
            assert_eq!(
                platform::wait_zero(raw),
                Err(PlatformErrorCode::INVALID_HANDLE)
            );

            let r: Result<(), Error> =
                Event::with_created(None, EventOptions::default(), |e| {
                    captured = e.handle.raw();
                    e.close();
                    e.set()
                });
            assert!(matches!(r, Err(Error::OperationFailed { op: Operation::Set, .. })));
            let raw = captured.take().unwrap();
            assert_eq!(
                platform::wait_zero(raw),
                Err(PlatformErrorCode::INVALID_HANDLE)
            );
        }

        #[test]
        fn scoped_form_releases_on_panic() {
            let before = platform::live_handles_on_current_thread();
            let r = std::panic::catch_unwind(|| {
                let _: Result<(), Error> =
                    Event::with_created(None, EventOptions::default(), |_| {
                        panic!("body failed")
                    });
            });
            assert!(r.is_err());
            assert_eq!(platform::live_handles_on_current_thread(), before);
        }

        #[test]
        fn scoped_open_releases_both_handles() {
            let name = unique_name("scoped-open");
            let before = platform::live_handles_on_current_thread();
            let creator = Event::create(Some(&name), EventOptions::new().manual_reset(true))
                .unwrap();

            let seen: Result<bool, Error> = Event::with_opened(&name, false, |e| {
                assert!(!e.inheritable());
                e.set()?;
                e.is_signaled()
            });
            assert!(seen.unwrap());
            assert_eq!(platform::live_handles_on_current_thread(), before + 1);
            assert!(creator.is_signaled().unwrap());
        }
    }
}
