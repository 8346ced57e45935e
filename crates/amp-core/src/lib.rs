//! Ampshell core
//!
//! Keeps a frameless, transparent player window sized to exactly
//! `logical content size * scale`, reveals it once the first correct size is
//! known, and enforces the shell's navigation and drag-region policy. The
//! native window itself sits behind [`NativeWindow`], so everything here runs
//! against a fake in tests.

pub mod content;
pub mod context;
pub mod error;
pub mod geometry;
pub mod ipc;
pub mod lifecycle;
pub mod navigation;
pub mod overlay;
pub mod platform;
pub mod reveal;
pub mod scale;
pub mod updates;
pub mod window;

pub use content::{ContentProvider, ContentStream, DirectoryProvider, UnavailableProvider};
pub use context::ShellContext;
pub use error::{Result, ShellError};
pub use geometry::{Bounds, ClipRect, LogicalSize, LogicalSizeStore, PhysicalSize, ScreenPoint};
pub use ipc::{ContentMessage, Inbound, Reply, ReplyBody};
pub use lifecycle::{LifecycleState, Shell, ShellCommand, ShellEvent};
pub use navigation::{CONTENT_SCHEME, ContentOrigin, NavigationGuard, NavigationVerdict, PopupVerdict};
pub use overlay::{DragOverlay, OverlayPayload, RegionClass, WEBAMP_OVERLAY};
pub use platform::Platform;
pub use reveal::RevealState;
pub use scale::{ScaleFactor, ScaleState};
pub use updates::{DisabledUpdateChecker, LoggingUpdateChecker, UpdateChecker};
pub use window::{NativeWindow, WindowController, WindowSpec};
