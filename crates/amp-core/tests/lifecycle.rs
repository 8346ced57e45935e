use amp_config::AmpConfig;
use amp_core::ipc::ScaleReply;
use amp_core::updates::UpdateChecker;
use amp_core::{
    Bounds, ClipRect, ContentMessage, Inbound, LifecycleState, LogicalSize, NativeWindow,
    OverlayPayload, PhysicalSize, Platform, Reply, ReplyBody, RevealState, ScreenPoint, Shell,
    ShellCommand, ShellEvent,
};
use anyhow::Result;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Zoom(f64),
    LockZoom,
    SetResizable(bool),
    ContentSize(PhysicalSize),
    Show,
    Minimize,
    Clip(ClipRect),
    Drag,
    Overlay,
    Load(String),
    Deliver(Reply),
    Devtools,
}

#[derive(Clone, Default)]
struct Recorder {
    calls: Rc<RefCell<Vec<Call>>>,
}

impl Recorder {
    fn take(&self) -> Vec<Call> {
        self.calls.borrow_mut().drain(..).collect()
    }

    fn sizes(&self) -> Vec<PhysicalSize> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::ContentSize(size) => Some(*size),
                _ => None,
            })
            .collect()
    }

    fn shows(&self) -> usize {
        self.calls.borrow().iter().filter(|c| **c == Call::Show).count()
    }

    fn replies(&self) -> Vec<Reply> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Deliver(reply) => Some(reply.clone()),
                _ => None,
            })
            .collect()
    }
}

struct FakeWindow {
    log: Recorder,
    resizable: Cell<bool>,
    lock_fails: bool,
}

impl FakeWindow {
    fn new(log: &Recorder) -> Self {
        Self {
            log: log.clone(),
            resizable: Cell::new(false),
            lock_fails: false,
        }
    }

    fn push(&self, call: Call) {
        self.log.calls.borrow_mut().push(call);
    }
}

impl NativeWindow for FakeWindow {
    fn set_zoom(&self, factor: f64) -> amp_core::Result<()> {
        self.push(Call::Zoom(factor));
        Ok(())
    }

    fn lock_visual_zoom(&self, _min: f64, _max: f64) -> amp_core::Result<()> {
        if self.lock_fails {
            return Err(amp_core::ShellError::Window("pinch zoom lock unsupported".into()));
        }
        self.push(Call::LockZoom);
        Ok(())
    }

    fn is_resizable(&self) -> bool {
        self.resizable.get()
    }

    fn set_resizable(&self, resizable: bool) {
        self.resizable.set(resizable);
        self.push(Call::SetResizable(resizable));
    }

    fn set_content_size(&self, size: PhysicalSize) {
        self.push(Call::ContentSize(size));
    }

    fn show(&self) {
        self.push(Call::Show);
    }

    fn minimize(&self) {
        self.push(Call::Minimize);
    }

    fn bounds(&self) -> amp_core::Result<Bounds> {
        Ok(Bounds {
            x: 40.0,
            y: 60.0,
            width: 550.0,
            height: 232.0,
        })
    }

    fn cursor_screen_point(&self) -> amp_core::Result<ScreenPoint> {
        Ok(ScreenPoint { x: 100.0, y: 80.0 })
    }

    fn set_thumbnail_clip(&self, clip: ClipRect) {
        self.push(Call::Clip(clip));
    }

    fn begin_drag(&self) -> amp_core::Result<()> {
        self.push(Call::Drag);
        Ok(())
    }

    fn inject_overlay(&self, _overlay: &OverlayPayload) -> amp_core::Result<()> {
        self.push(Call::Overlay);
        Ok(())
    }

    fn load_url(&self, url: &str) -> amp_core::Result<()> {
        self.push(Call::Load(url.to_string()));
        Ok(())
    }

    fn deliver(&self, reply: &Reply) -> amp_core::Result<()> {
        self.push(Call::Deliver(reply.clone()));
        Ok(())
    }

    fn open_devtools(&self) {
        self.push(Call::Devtools);
    }
}

#[derive(Clone, Default)]
struct CountingChecker(Rc<Cell<usize>>);

impl UpdateChecker for CountingChecker {
    fn check(&self) {
        self.0.set(self.0.get() + 1);
    }
}

type TestShell = Shell<FakeWindow, CountingChecker>;

fn shell_with(config: &AmpConfig, platform: Platform) -> Result<(TestShell, CountingChecker)> {
    let checker = CountingChecker::default();
    let shell = Shell::new(config, platform, checker.clone())?;
    Ok((shell, checker))
}

/// Shell with an attached window, past startup.
fn running(platform: Platform) -> Result<(TestShell, Recorder, CountingChecker)> {
    let (mut shell, checker) = shell_with(&AmpConfig::default(), platform)?;
    let commands = shell.handle(ShellEvent::Ready);
    assert!(matches!(commands.as_slice(), [ShellCommand::CreateWindow(_)]));
    let log = Recorder::default();
    shell.attach(FakeWindow::new(&log));
    log.take();
    Ok((shell, log, checker))
}

fn resize(width: f64, height: f64) -> ShellEvent {
    ShellEvent::Content(ContentMessage::ResizeToWebamp(LogicalSize::new(width, height)))
}

fn set_scale(id: u64, value: serde_json::Value) -> ShellEvent {
    ShellEvent::Content(ContentMessage::SetScale { id, value })
}

#[test]
fn attach_applies_zoom_before_loading_content() -> Result<()> {
    let (mut shell, _) = shell_with(&AmpConfig::default(), Platform::MacOs)?;
    shell.handle(ShellEvent::Ready);
    let log = Recorder::default();
    shell.attach(FakeWindow::new(&log));

    assert_eq!(
        log.take(),
        vec![
            Call::Zoom(2.0),
            Call::LockZoom,
            Call::Load("ampshell://localhost/index.html".into()),
        ]
    );
    assert_eq!(shell.state(), LifecycleState::Running);
    assert_eq!(shell.controller().reveal_state(), RevealState::Hidden);
    Ok(())
}

#[test]
fn first_known_size_resizes_and_reveals() -> Result<()> {
    let (mut shell, log, checker) = running(Platform::Windows)?;

    shell.handle(resize(275.0, 116.0));

    assert_eq!(
        log.take(),
        vec![
            Call::SetResizable(true),
            Call::ContentSize(PhysicalSize::new(550, 232)),
            Call::SetResizable(false),
            Call::Show,
        ]
    );
    assert_eq!(shell.controller().reveal_state(), RevealState::Revealed);
    assert_eq!(checker.0.get(), 1);
    Ok(())
}

#[test]
fn repeated_size_is_idempotent_and_reveals_once() -> Result<()> {
    let (mut shell, log, _) = running(Platform::Windows)?;

    shell.handle(resize(275.0, 116.0));
    shell.handle(resize(275.0, 116.0));

    assert_eq!(log.sizes(), vec![PhysicalSize::new(550, 232); 2]);
    assert_eq!(log.shows(), 1);
    Ok(())
}

#[test]
fn unknown_size_neither_resizes_nor_reveals() -> Result<()> {
    let (mut shell, log, checker) = running(Platform::Windows)?;

    shell.handle(resize(0.0, 116.0));
    shell.handle(ShellEvent::LoadFinished);

    assert!(log.sizes().is_empty());
    assert_eq!(log.shows(), 0);
    assert_eq!(shell.controller().reveal_state(), RevealState::Hidden);
    assert_eq!(checker.0.get(), 0);
    Ok(())
}

#[test]
fn negative_size_is_floored_to_one_pixel() -> Result<()> {
    let (mut shell, log, _) = running(Platform::Windows)?;

    shell.handle(resize(-5.0, 116.0));

    assert_eq!(log.sizes(), vec![PhysicalSize::new(1, 232)]);
    Ok(())
}

#[test]
fn scale_change_applies_immediately() -> Result<()> {
    let (mut shell, log, _) = running(Platform::Windows)?;
    shell.handle(resize(275.0, 116.0));
    log.take();

    shell.handle(set_scale(7, json!(3)));

    let calls = log.take();
    assert_eq!(calls[0], Call::Zoom(3.0));
    assert!(calls.contains(&Call::ContentSize(PhysicalSize::new(825, 348))));
    assert!(!calls.contains(&Call::Show));
    assert_eq!(
        calls.last(),
        Some(&Call::Deliver(Reply::new(7, ReplyBody::Scale(ScaleReply::accepted(3.0)))))
    );
    assert_eq!(shell.context().scale.get().get(), 3.0);
    Ok(())
}

#[test]
fn invalid_scale_is_rejected_without_side_effects() -> Result<()> {
    let (mut shell, log, _) = running(Platform::Windows)?;
    shell.handle(resize(275.0, 116.0));
    log.take();

    for (id, value) in [(1, json!("abc")), (2, json!(0)), (3, json!(-2)), (4, json!(null))] {
        shell.handle(set_scale(id, value));
    }

    let replies = log.replies();
    assert_eq!(replies.len(), 4);
    for reply in replies {
        assert_eq!(reply.result, ReplyBody::Scale(ScaleReply::rejected()));
    }
    assert!(log.take().iter().all(|call| matches!(call, Call::Deliver(_))));
    assert_eq!(shell.context().scale.get().get(), 2.0);
    Ok(())
}

#[test]
fn numeric_string_scale_is_accepted() -> Result<()> {
    let (mut shell, log, _) = running(Platform::Windows)?;

    shell.handle(set_scale(9, json!("1.5")));

    assert_eq!(shell.context().scale.get().get(), 1.5);
    assert_eq!(
        log.replies(),
        vec![Reply::new(9, ReplyBody::Scale(ScaleReply::accepted(1.5)))]
    );
    Ok(())
}

#[test]
fn scale_before_any_window_is_remembered() -> Result<()> {
    let (mut shell, _) = shell_with(&AmpConfig::default(), Platform::Windows)?;

    shell.handle(set_scale(1, json!(3)));
    shell.handle(resize(275.0, 116.0));
    assert_eq!(shell.state(), LifecycleState::Starting);

    shell.handle(ShellEvent::Ready);
    let log = Recorder::default();
    shell.attach(FakeWindow::new(&log));
    shell.handle(ShellEvent::LoadFinished);

    assert_eq!(log.calls.borrow()[0], Call::Zoom(3.0));
    assert_eq!(log.sizes(), vec![PhysicalSize::new(825, 348)]);
    assert_eq!(log.shows(), 1);
    Ok(())
}

#[test]
fn load_finished_reapplies_zoom_and_size() -> Result<()> {
    let (mut shell, log, _) = running(Platform::Windows)?;
    shell.handle(resize(275.0, 116.0));
    log.take();

    shell.handle(ShellEvent::LoadFinished);

    let calls = log.take();
    assert_eq!(calls[0], Call::Zoom(2.0));
    assert!(calls.contains(&Call::ContentSize(PhysicalSize::new(550, 232))));
    assert!(!calls.contains(&Call::Show));
    Ok(())
}

#[test]
fn zoom_lock_failure_is_not_fatal() -> Result<()> {
    let (mut shell, _) = shell_with(&AmpConfig::default(), Platform::Windows)?;
    shell.handle(ShellEvent::Ready);
    let log = Recorder::default();
    let mut window = FakeWindow::new(&log);
    window.lock_fails = true;
    shell.attach(window);

    assert_eq!(
        log.take(),
        vec![Call::Zoom(2.0), Call::Load("https://ampshell.localhost/index.html".into())]
    );
    Ok(())
}

#[test]
fn document_ready_injects_overlay() -> Result<()> {
    let (mut shell, log, _) = running(Platform::Linux)?;

    shell.handle(ShellEvent::DocumentReady);
    shell.handle(ShellEvent::DocumentReady);

    assert_eq!(log.take(), vec![Call::Overlay, Call::Overlay]);
    Ok(())
}

#[test]
fn chrome_requests_pass_through() -> Result<()> {
    let (mut shell, log, _) = running(Platform::Windows)?;
    let clip = ClipRect {
        x: 0,
        y: 0,
        width: 550,
        height: 232,
    };

    shell.handle(ShellEvent::Content(ContentMessage::Minimize));
    shell.handle(ShellEvent::Content(ContentMessage::SetThumbnailClip(clip)));
    shell.handle(ShellEvent::Content(ContentMessage::DragWindow));
    shell.handle(ShellEvent::Content(ContentMessage::GetBounds { id: 11 }));
    shell.handle(ShellEvent::Content(ContentMessage::GetCursorScreenPoint { id: 12 }));

    assert_eq!(
        log.take(),
        vec![
            Call::Minimize,
            Call::Clip(clip),
            Call::Drag,
            Call::Deliver(Reply::new(
                11,
                ReplyBody::Bounds(Bounds {
                    x: 40.0,
                    y: 60.0,
                    width: 550.0,
                    height: 232.0
                })
            )),
            Call::Deliver(Reply::new(12, ReplyBody::Point(ScreenPoint { x: 100.0, y: 80.0 }))),
        ]
    );
    Ok(())
}

#[test]
fn messages_after_close_are_no_ops() -> Result<()> {
    let (mut shell, log, _) = running(Platform::MacOs)?;
    shell.handle(ShellEvent::WindowClosed);

    shell.handle(resize(275.0, 116.0));
    shell.handle(set_scale(1, json!(3)));
    shell.handle(ShellEvent::Content(ContentMessage::Minimize));
    shell.handle(ShellEvent::Content(ContentMessage::GetBounds { id: 2 }));
    shell.handle(ShellEvent::LoadFinished);
    shell.handle(ShellEvent::DocumentReady);

    assert!(log.take().is_empty());
    // state still updates for the next window
    assert_eq!(shell.context().scale.get().get(), 3.0);
    Ok(())
}

#[test]
fn linux_defers_window_creation() -> Result<()> {
    let (mut shell, _) = shell_with(&AmpConfig::default(), Platform::Linux)?;

    assert_eq!(
        shell.handle(ShellEvent::Ready),
        vec![ShellCommand::ScheduleWindow(Duration::from_millis(100))]
    );
    assert_eq!(shell.state(), LifecycleState::Scheduled);

    let commands = shell.handle(ShellEvent::CreateDue);
    let [ShellCommand::CreateWindow(spec)] = commands.as_slice() else {
        panic!("expected a window request, got {commands:?}");
    };
    assert_eq!((spec.x, spec.y, spec.width, spec.height), (0.0, 0.0, 100.0, 100.0));
    assert!(spec.transparent && !spec.decorations && !spec.resizable && !spec.visible);
    assert!(spec.movable && spec.shadow && !spec.fullscreenable);
    assert!(shell.handle(ShellEvent::CreateDue).is_empty());
    Ok(())
}

#[test]
fn closing_the_last_window_exits() -> Result<()> {
    let (mut shell, _, _) = running(Platform::Windows)?;

    assert_eq!(shell.handle(ShellEvent::CloseRequested), vec![ShellCommand::Exit]);
    assert_eq!(shell.state(), LifecycleState::Exiting);
    assert!(!shell.controller().has_window());
    // the trailing destroy notification does not exit twice
    assert!(shell.handle(ShellEvent::WindowClosed).is_empty());
    Ok(())
}

#[test]
fn close_message_from_content_closes_the_window() -> Result<()> {
    let (mut shell, _, _) = running(Platform::Linux)?;

    assert_eq!(
        shell.handle(ShellEvent::Content(ContentMessage::Close)),
        vec![ShellCommand::Exit]
    );
    Ok(())
}

#[test]
fn macos_stays_resident_and_recreates_on_activate() -> Result<()> {
    let (mut shell, _, checker) = running(Platform::MacOs)?;
    shell.handle(resize(275.0, 116.0));
    assert_eq!(checker.0.get(), 1);

    assert!(shell.handle(ShellEvent::CloseRequested).is_empty());
    assert_eq!(shell.state(), LifecycleState::Resident);

    let commands = shell.handle(ShellEvent::Activate);
    assert!(matches!(commands.as_slice(), [ShellCommand::CreateWindow(_)]));
    // activation while a window is on its way does nothing
    assert!(shell.handle(ShellEvent::Activate).is_empty());

    let log = Recorder::default();
    shell.attach(FakeWindow::new(&log));
    assert_eq!(shell.controller().reveal_state(), RevealState::Hidden);
    shell.handle(ShellEvent::LoadFinished);

    // the new window reveals at the remembered size and checks again
    assert_eq!(log.sizes(), vec![PhysicalSize::new(550, 232)]);
    assert_eq!(log.shows(), 1);
    assert_eq!(checker.0.get(), 2);
    Ok(())
}

#[test]
fn update_check_runs_once_per_window() -> Result<()> {
    let (mut shell, _, checker) = running(Platform::Windows)?;

    shell.handle(ShellEvent::ReadyToShow);
    shell.handle(resize(275.0, 116.0));
    shell.handle(ShellEvent::ReadyToShow);

    assert_eq!(checker.0.get(), 1);
    assert!(shell.updates().has_fired());
    Ok(())
}

#[test]
fn external_popups_go_to_the_system_handler() -> Result<()> {
    let (mut shell, _, _) = running(Platform::Linux)?;

    let commands = shell.handle(ShellEvent::PopupRequested(
        "https://github.com/captbaritone/webamp".into(),
    ));
    let [ShellCommand::OpenExternal(url)] = commands.as_slice() else {
        panic!("expected an external open, got {commands:?}");
    };
    assert_eq!(url.as_str(), "https://github.com/captbaritone/webamp");

    assert!(
        shell
            .handle(ShellEvent::PopupRequested("ampshell://localhost/about.html".into()))
            .is_empty()
    );
    assert_eq!(
        shell.navigation_guard().on_navigate("ampshell://localhost/index.html"),
        amp_core::NavigationVerdict::Allow
    );
    Ok(())
}

#[test]
fn devtools_open_once_after_first_load() -> Result<()> {
    let mut config = AmpConfig::default();
    config.dev.devtools = true;
    let (mut shell, _) = shell_with(&config, Platform::Windows)?;
    shell.handle(ShellEvent::Ready);
    let log = Recorder::default();
    shell.attach(FakeWindow::new(&log));

    shell.handle(ShellEvent::LoadFinished);
    shell.handle(ShellEvent::LoadFinished);

    let opened = log.take().into_iter().filter(|c| *c == Call::Devtools).count();
    assert_eq!(opened, 1);
    Ok(())
}

#[test]
fn bridge_messages_drive_the_shell() -> Result<()> {
    let (mut shell, log, _) = running(Platform::Windows)?;

    for raw in [
        r#"{"channel":"document-ready"}"#,
        r#"{"channel":"resize-to-webamp","payload":{"width":275,"height":116}}"#,
        r#"{"channel":"set-scale","id":3,"payload":"abc"}"#,
    ] {
        shell.handle(Inbound::parse(raw)?.into());
    }

    assert_eq!(log.calls.borrow()[0], Call::Overlay);
    assert_eq!(log.sizes(), vec![PhysicalSize::new(550, 232)]);
    assert_eq!(
        log.replies(),
        vec![Reply::new(3, ReplyBody::Scale(ScaleReply::rejected()))]
    );
    Ok(())
}
