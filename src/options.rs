use crate::{Error, Event};

/// Creation parameters for [`Event::create`].
///
/// The defaults create an auto-reset, initially non-signaled event whose handle is
/// inherited by child processes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventOptions {
    /// Stay signaled until [`Event::reset`] is called instead of clearing after one wait.
    pub manual_reset: bool,
    pub initial_state: bool,
    pub inheritable: bool,
}
impl Default for EventOptions {
    fn default() -> Self {
        Self::new()
    }
}
impl EventOptions {
    pub const fn new() -> Self {
        Self {
            manual_reset: false,
            initial_state: false,
            inheritable: true,
        }
    }

    #[must_use]
    pub const fn manual_reset(mut self, manual_reset: bool) -> Self {
        self.manual_reset = manual_reset;
        self
    }

    #[must_use]
    pub const fn initial_state(mut self, initial_state: bool) -> Self {
        self.initial_state = initial_state;
        self
    }

    #[must_use]
    pub const fn inheritable(mut self, inheritable: bool) -> Self {
        self.inheritable = inheritable;
        self
    }

    #[inline]
    pub fn create(self, name: Option<&str>) -> Result<Event, Error> {
        Event::create(name, self)
    }
}
