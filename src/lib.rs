//! Named and anonymous synchronization events modeled on Windows kernel event objects.
//!
//! An [`Event`] is either created (opening the existing object when the name is already taken)
//! or opened by name, then signaled with [`Event::set`], cleared with [`Event::reset`] and
//! polled with [`Event::is_signaled`]. Its handle is released exactly once by
//! [`Event::close`], on drop, or at the end of [`Event::with_created`] / [`Event::with_opened`].
//!
//! On Windows the objects are real kernel events shared with other processes. Elsewhere they
//! live in a process-local namespace that follows the same rules.
//!
//! ```
//! use win32_event::{Event, EventOptions};
//!
//! # fn main() -> Result<(), win32_event::Error> {
//! let ready = Event::create(Some("doc-ready"), EventOptions::new().manual_reset(true))?;
//! let observer = Event::open_existing("doc-ready")?;
//!
//! ready.set()?;
//! assert!(observer.is_signaled()?);
//! assert!(observer.is_signaled()?);
//! ready.reset()?;
//! assert!(!observer.is_signaled()?);
//! # Ok(())
//! # }
//! ```

mod error;
mod event;
mod handle;
mod options;
mod platform;

pub use self::error::{Error, InvalidName, MAX_NAME_LEN, Operation, PlatformErrorCode};
pub use self::event::Event;
pub use self::options::EventOptions;

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
