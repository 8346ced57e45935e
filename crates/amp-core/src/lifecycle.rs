//! Lifecycle controller.
//!
//! The native runtime feeds [`ShellEvent`]s in arrival order; each one is a
//! transition over the shell's state and may return [`ShellCommand`]s for the
//! runtime to carry out. Window effects go through the [`WindowController`].

use crate::context::ShellContext;
use crate::error::Result;
use crate::ipc::{
    BridgeSignal, ContentMessage, ConsoleEntry, Inbound, Reply, ReplyBody, RequestId, ScaleReply,
};
use crate::navigation::{ContentOrigin, NavigationGuard, PopupVerdict};
use crate::overlay::{DragOverlay, OverlayPayload};
use crate::platform::Platform;
use crate::updates::{UpdateChecker, UpdateNotifier, UpdateTrigger};
use crate::window::{NativeWindow, WindowController, WindowSpec};
use amp_config::AmpConfig;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const NO_WINDOW: &str = "no window";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Waiting for the process to become ready.
    Starting,
    /// Window creation is deferred until the scheduled deadline.
    Scheduled,
    /// A window has been requested from the runtime.
    Creating,
    /// A window exists.
    Running,
    /// No windows, process kept alive (macOS).
    Resident,
    /// Exit has been requested.
    Exiting,
}

/// Inputs to the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    /// The process is ready to create windows.
    Ready,
    /// A scheduled window creation deadline was reached.
    CreateDue,
    /// The content document finished parsing.
    DocumentReady,
    /// The content surface finished loading a page.
    LoadFinished,
    /// The content painted its first frame.
    ReadyToShow,
    CloseRequested,
    WindowClosed,
    /// The application was activated (dock click on macOS).
    Activate,
    /// The content asked to open a new window.
    PopupRequested(String),
    Content(ContentMessage),
}

impl From<Inbound> for ShellEvent {
    fn from(inbound: Inbound) -> Self {
        match inbound {
            Inbound::Message(message) => ShellEvent::Content(message),
            Inbound::Signal(BridgeSignal::DocumentReady) => ShellEvent::DocumentReady,
            Inbound::Signal(BridgeSignal::ReadyToShow) => ShellEvent::ReadyToShow,
        }
    }
}

/// Work the runtime has to do on the shell's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    CreateWindow(WindowSpec),
    /// Deliver [`ShellEvent::CreateDue`] after this delay.
    ScheduleWindow(Duration),
    OpenExternal(Url),
    Exit,
}

pub struct Shell<W, U> {
    state: LifecycleState,
    platform: Platform,
    ctx: ShellContext,
    controller: WindowController<W>,
    updates: UpdateNotifier<U>,
    guard: NavigationGuard,
    overlay: OverlayPayload,
    document: Url,
    spec: WindowSpec,
    devtools: bool,
    devtools_opened: bool,
    forward_console: bool,
}

impl<W: NativeWindow, U: UpdateChecker> Shell<W, U> {
    pub fn new(config: &AmpConfig, platform: Platform, checker: U) -> Result<Self> {
        let origin = ContentOrigin::for_platform(platform)?;
        let document = origin.document_url(&config.content.entry)?;
        Ok(Self {
            state: LifecycleState::Starting,
            platform,
            ctx: ShellContext::new(config.window.scale),
            controller: WindowController::new(),
            updates: UpdateNotifier::new(checker),
            guard: NavigationGuard::new(origin),
            overlay: DragOverlay::default().payload(),
            document,
            spec: WindowSpec::player(&config.window).with_devtools(config.dev.devtools),
            devtools: config.dev.devtools,
            devtools_opened: false,
            forward_console: config.dev.forward_console,
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn context(&self) -> &ShellContext {
        &self.ctx
    }

    pub fn controller(&self) -> &WindowController<W> {
        &self.controller
    }

    pub fn updates(&self) -> &UpdateNotifier<U> {
        &self.updates
    }

    /// Policy the runtime installs on every content surface.
    pub fn navigation_guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// URL of the packaged entry document.
    pub fn document_url(&self) -> &Url {
        &self.document
    }

    /// Take a window the runtime built in response to
    /// [`ShellCommand::CreateWindow`]: zoom is applied before the first
    /// navigation so the page never lays out at the wrong scale.
    pub fn attach(&mut self, window: W) {
        self.controller.attach(window);
        self.updates.reset();
        self.devtools_opened = false;
        self.state = LifecycleState::Running;
        log::info!("window attached (scale {})", self.ctx.scale.get());

        self.controller.apply_zoom(&self.ctx);
        self.controller.load_url(self.document.as_str());
    }

    pub fn handle(&mut self, event: ShellEvent) -> Vec<ShellCommand> {
        match event {
            ShellEvent::Ready => self.on_ready(),
            ShellEvent::CreateDue => {
                if self.state == LifecycleState::Scheduled {
                    self.request_window()
                } else {
                    Vec::new()
                }
            }
            ShellEvent::DocumentReady => {
                self.controller.inject_overlay(&self.overlay);
                Vec::new()
            }
            ShellEvent::LoadFinished => {
                self.on_load_finished();
                Vec::new()
            }
            ShellEvent::ReadyToShow => {
                if self.controller.has_window() {
                    self.updates.notify(UpdateTrigger::ReadyToShow);
                }
                Vec::new()
            }
            ShellEvent::CloseRequested | ShellEvent::WindowClosed => self.on_window_gone(),
            ShellEvent::Activate => {
                if self.state == LifecycleState::Resident && !self.controller.has_window() {
                    log::info!("activated with no window; recreating");
                    self.request_window()
                } else {
                    Vec::new()
                }
            }
            ShellEvent::PopupRequested(target) => match self.guard.on_new_window(&target) {
                PopupVerdict::OpenExternal(url) => {
                    log::info!("opening {url} externally");
                    vec![ShellCommand::OpenExternal(url)]
                }
                PopupVerdict::Cancel => Vec::new(),
            },
            ShellEvent::Content(message) => self.on_message(message),
        }
    }

    fn on_ready(&mut self) -> Vec<ShellCommand> {
        if self.state != LifecycleState::Starting {
            return Vec::new();
        }
        match self.platform.window_creation_delay() {
            Some(delay) => {
                log::debug!("deferring window creation by {delay:?}");
                self.state = LifecycleState::Scheduled;
                vec![ShellCommand::ScheduleWindow(delay)]
            }
            None => self.request_window(),
        }
    }

    fn request_window(&mut self) -> Vec<ShellCommand> {
        self.state = LifecycleState::Creating;
        vec![ShellCommand::CreateWindow(self.spec.clone())]
    }

    fn on_load_finished(&mut self) {
        if !self.controller.has_window() {
            return;
        }
        self.controller.apply_zoom(&self.ctx);
        self.apply_size();
        if self.devtools && !self.devtools_opened {
            self.devtools_opened = true;
            self.controller.open_devtools();
        }
    }

    fn on_window_gone(&mut self) -> Vec<ShellCommand> {
        if self.controller.release().is_some() {
            log::info!("window closed");
        }
        match self.state {
            LifecycleState::Running | LifecycleState::Creating => {
                if self.platform.stays_resident_without_windows() {
                    log::info!("all windows closed; staying resident");
                    self.state = LifecycleState::Resident;
                    Vec::new()
                } else {
                    log::info!("all windows closed; exiting");
                    self.state = LifecycleState::Exiting;
                    vec![ShellCommand::Exit]
                }
            }
            _ => Vec::new(),
        }
    }

    fn on_message(&mut self, message: ContentMessage) -> Vec<ShellCommand> {
        match message {
            ContentMessage::ResizeToWebamp(size) => {
                log::debug!("content reported {}x{}", size.width, size.height);
                self.ctx.logical.report(size);
                self.apply_size();
            }
            ContentMessage::SetScale { id, value } => self.set_scale(id, &value),
            ContentMessage::Minimize => self.controller.minimize(),
            ContentMessage::Close => return self.on_window_gone(),
            ContentMessage::SetThumbnailClip(clip) => self.controller.set_thumbnail_clip(clip),
            ContentMessage::GetBounds { id } => {
                let reply = query_reply(id, self.controller.bounds(), ReplyBody::Bounds);
                self.controller.deliver(&reply);
            }
            ContentMessage::GetCursorScreenPoint { id } => {
                let point = self.controller.cursor_screen_point();
                let reply = query_reply(id, point, ReplyBody::Point);
                self.controller.deliver(&reply);
            }
            ContentMessage::DragWindow => self.controller.begin_drag(),
            ContentMessage::Console(entry) => self.forward_console(&entry),
        }
        Vec::new()
    }

    fn set_scale(&mut self, id: u64, value: &Value) {
        let reply = match self.ctx.scale.set_from_request(value) {
            Some(scale) => {
                log::info!("scale set to {scale}");
                self.controller.apply_zoom(&self.ctx);
                self.apply_size();
                ScaleReply::accepted(scale.get())
            }
            None => ScaleReply::rejected(),
        };
        self.controller.deliver(&Reply::new(id, ReplyBody::Scale(reply)));
    }

    fn apply_size(&mut self) {
        let revealed = self
            .controller
            .apply_physical_size(&self.ctx)
            .is_some_and(|applied| applied.revealed);
        if revealed {
            self.updates.notify(UpdateTrigger::FirstReveal);
        }
    }

    fn forward_console(&self, entry: &ConsoleEntry) {
        if !self.forward_console {
            return;
        }
        log::log!(
            target: "renderer",
            entry.log_level(),
            "[renderer][{}] {} ({}:{})",
            entry.level,
            entry.message,
            entry.source,
            entry.line
        );
    }
}

/// Every request id gets an answer, including when no window is left to ask.
fn query_reply<T>(
    id: RequestId,
    outcome: Option<Result<T>>,
    body: impl FnOnce(T) -> ReplyBody,
) -> Reply {
    match outcome {
        Some(Ok(value)) => Reply::new(id, body(value)),
        Some(Err(err)) => Reply::error(id, err.to_string()),
        None => Reply::error(id, NO_WINDOW),
    }
}
