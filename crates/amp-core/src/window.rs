//! Window controller.
//!
//! Owns the native window handle and is the only component that touches it.
//! Every operation is a no-op once the handle has been released, so messages
//! still in flight when the window closes are harmless.

use crate::context::ShellContext;
use crate::error::Result;
use crate::geometry::{Bounds, ClipRect, PhysicalSize, ScreenPoint};
use crate::ipc::Reply;
use crate::overlay::OverlayPayload;
use crate::reveal::{RevealGate, RevealState};
use amp_config::WindowConfig;

/// Everything the engine needs from a native window + content surface pair.
pub trait NativeWindow {
    /// Set the content surface zoom factor.
    fn set_zoom(&self, factor: f64) -> Result<()>;
    /// Pin user pinch/visual zoom to `min..=max`. Backends that cannot
    /// honour the limits return an error.
    fn lock_visual_zoom(&self, min: f64, max: f64) -> Result<()>;
    fn is_resizable(&self) -> bool;
    fn set_resizable(&self, resizable: bool);
    /// Set the content-area size in content units (device-independent
    /// pixels, already multiplied by the shell scale).
    fn set_content_size(&self, size: PhysicalSize);
    fn show(&self);
    fn minimize(&self);
    fn bounds(&self) -> Result<Bounds>;
    fn cursor_screen_point(&self) -> Result<ScreenPoint>;
    /// Restrict the taskbar thumbnail to `clip`, in logical units. An empty
    /// clip shows the whole window again.
    fn set_thumbnail_clip(&self, clip: ClipRect);
    /// Start an OS-level window move driven by the current pointer press.
    fn begin_drag(&self) -> Result<()>;
    fn inject_overlay(&self, overlay: &OverlayPayload) -> Result<()>;
    fn load_url(&self, url: &str) -> Result<()>;
    /// Hand a response back to the content surface.
    fn deliver(&self, reply: &Reply) -> Result<()>;
    fn open_devtools(&self);
}

/// Creation parameters for the player window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub title: String,
    pub x: f64,
    pub y: f64,
    /// Content size in logical units.
    pub width: f64,
    pub height: f64,
    pub transparent: bool,
    pub decorations: bool,
    pub resizable: bool,
    pub visible: bool,
    pub movable: bool,
    pub fullscreenable: bool,
    pub shadow: bool,
    pub devtools: bool,
}

impl WindowSpec {
    /// Tiny, hidden, transparent and frameless: nothing is shown until the
    /// first correctly sized layout.
    pub fn player(config: &WindowConfig) -> Self {
        Self {
            title: config.title.clone(),
            x: 0.0,
            y: 0.0,
            width: config.initial_width,
            height: config.initial_height,
            transparent: true,
            decorations: false,
            resizable: false,
            visible: false,
            movable: true,
            fullscreenable: false,
            shadow: true,
            devtools: false,
        }
    }

    pub fn with_devtools(mut self, devtools: bool) -> Self {
        self.devtools = devtools;
        self
    }
}

/// Visual zoom is pinned to exactly 1 so pinch gestures cannot drift away
/// from the shell-controlled scale.
pub const VISUAL_ZOOM_LIMITS: (f64, f64) = (1.0, 1.0);

/// Outcome of one physical-size pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeApplied {
    pub size: PhysicalSize,
    /// This pass opened the reveal gate and showed the window.
    pub revealed: bool,
}

#[derive(Debug)]
pub struct WindowController<W> {
    handle: Option<W>,
    reveal: RevealGate,
}

impl<W> Default for WindowController<W> {
    fn default() -> Self {
        Self {
            handle: None,
            reveal: RevealGate::default(),
        }
    }
}

impl<W: NativeWindow> WindowController<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a freshly created window. The reveal gate starts
    /// over for every window instance.
    pub fn attach(&mut self, window: W) {
        self.handle = Some(window);
        self.reveal = RevealGate::default();
    }

    /// Drop the handle; the native window is destroyed with it.
    pub fn release(&mut self) -> Option<W> {
        self.handle.take()
    }

    pub fn has_window(&self) -> bool {
        self.handle.is_some()
    }

    pub fn window(&self) -> Option<&W> {
        self.handle.as_ref()
    }

    pub fn reveal_state(&self) -> RevealState {
        self.reveal.state()
    }

    /// Push the current scale into the content surface and pin visual zoom.
    pub fn apply_zoom(&self, ctx: &ShellContext) {
        let Some(window) = &self.handle else { return };
        let scale = ctx.scale.get();
        if let Err(err) = window.set_zoom(scale.get()) {
            log::warn!("failed to set zoom {scale}: {err}");
        }
        let (min, max) = VISUAL_ZOOM_LIMITS;
        if let Err(err) = window.lock_visual_zoom(min, max) {
            log::debug!("visual zoom lock unavailable: {err}");
        }
    }

    /// Resize the window to `logical * scale`. No-op until a logical size is
    /// known and a window exists.
    pub fn apply_physical_size(&mut self, ctx: &ShellContext) -> Option<SizeApplied> {
        let window = self.handle.as_ref()?;
        let logical = ctx.logical.known()?;
        let size = logical.to_physical(ctx.scale.get());

        // Some window managers refuse programmatic resizes of non-resizable
        // windows.
        let was_resizable = window.is_resizable();
        window.set_resizable(true);
        window.set_content_size(size);
        window.set_resizable(was_resizable);
        log::debug!(
            "content size {}x{} (logical {}x{} @ {})",
            size.width,
            size.height,
            logical.width,
            logical.height,
            ctx.scale.get()
        );

        let revealed = self.reveal.open();
        if revealed {
            window.show();
            log::info!("window revealed at {}x{}", size.width, size.height);
        }
        Some(SizeApplied { size, revealed })
    }

    pub fn inject_overlay(&self, overlay: &OverlayPayload) {
        let Some(window) = &self.handle else { return };
        if let Err(err) = window.inject_overlay(overlay) {
            log::warn!("failed to inject drag overlay: {err}");
        }
    }

    pub fn load_url(&self, url: &str) {
        let Some(window) = &self.handle else { return };
        log::info!("loading {url}");
        if let Err(err) = window.load_url(url) {
            log::error!("failed to load {url}: {err}");
        }
    }

    pub fn deliver(&self, reply: &Reply) {
        let Some(window) = &self.handle else {
            log::debug!("dropping reply {} (no window)", reply.id);
            return;
        };
        if let Err(err) = window.deliver(reply) {
            log::warn!("failed to deliver reply {}: {err}", reply.id);
        }
    }

    pub fn minimize(&self) {
        if let Some(window) = &self.handle {
            window.minimize();
        }
    }

    pub fn set_thumbnail_clip(&self, clip: ClipRect) {
        if let Some(window) = &self.handle {
            window.set_thumbnail_clip(clip);
        }
    }

    pub fn begin_drag(&self) {
        let Some(window) = &self.handle else { return };
        if let Err(err) = window.begin_drag() {
            log::debug!("window drag not started: {err}");
        }
    }

    pub fn open_devtools(&self) {
        if let Some(window) = &self.handle {
            window.open_devtools();
        }
    }

    /// `None` when there is no window.
    pub fn bounds(&self) -> Option<Result<Bounds>> {
        self.handle.as_ref().map(NativeWindow::bounds)
    }

    pub fn cursor_screen_point(&self) -> Option<Result<ScreenPoint>> {
        self.handle.as_ref().map(NativeWindow::cursor_screen_point)
    }
}
