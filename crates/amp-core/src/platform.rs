//! Per-platform lifecycle rules.

use std::time::Duration;

/// Delay between process readiness and window creation on Linux.
pub const LINUX_CREATE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Other
        }
    }

    /// Transparent compositing fights hardware acceleration here, so it is
    /// switched off process-wide before any window exists.
    pub fn disables_hardware_acceleration(self) -> bool {
        self == Self::Linux
    }

    /// How long to wait after readiness before creating the window.
    pub fn window_creation_delay(self) -> Option<Duration> {
        match self {
            Self::Linux => Some(LINUX_CREATE_DELAY),
            _ => None,
        }
    }

    /// The process keeps running with no windows open.
    pub fn stays_resident_without_windows(self) -> bool {
        self == Self::MacOs
    }
}
