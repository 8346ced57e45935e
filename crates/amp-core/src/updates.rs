//! Update-check collaborator and its de-duplicating notifier.

/// External update checker. Assumed idempotent and non-blocking.
pub trait UpdateChecker {
    fn check(&self);
}

/// Default checker: records the request in the log.
#[derive(Debug, Default)]
pub struct LoggingUpdateChecker;

impl UpdateChecker for LoggingUpdateChecker {
    fn check(&self) {
        log::info!("update check requested");
    }
}

/// Checker used when updates are switched off.
#[derive(Debug, Default)]
pub struct DisabledUpdateChecker;

impl UpdateChecker for DisabledUpdateChecker {
    fn check(&self) {
        log::debug!("update check skipped (disabled)");
    }
}

impl<T: UpdateChecker + ?Sized> UpdateChecker for Box<T> {
    fn check(&self) {
        (**self).check()
    }
}

/// Lifecycle point that asked for an update check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTrigger {
    ReadyToShow,
    FirstReveal,
}

/// Runs the checker at most once per window instance, whichever trigger
/// arrives first.
#[derive(Debug)]
pub struct UpdateNotifier<U> {
    checker: U,
    fired: bool,
}

impl<U: UpdateChecker> UpdateNotifier<U> {
    pub fn new(checker: U) -> Self {
        Self {
            checker,
            fired: false,
        }
    }

    /// Re-arm for a freshly created window.
    pub fn reset(&mut self) {
        self.fired = false;
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Returns `true` if the checker ran.
    pub fn notify(&mut self, trigger: UpdateTrigger) -> bool {
        if self.fired {
            log::debug!("update check already requested; ignoring {trigger:?}");
            return false;
        }
        self.fired = true;
        log::debug!("update check via {trigger:?}");
        self.checker.check();
        true
    }

    pub fn checker(&self) -> &U {
        &self.checker
    }
}
