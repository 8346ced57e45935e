//! amp-window: tao + wry runtime for the Ampshell player window.
//!
//! Responsibilities:
//! - Prepare the process for the current platform.
//! - Run the native event loop and feed translated events to the shell.
//! - Build windows and carry out the commands the shell returns.

use amp_config::AmpConfig;
use amp_core::updates::UpdateChecker;
use amp_core::{
    ContentProvider, DirectoryProvider, DisabledUpdateChecker, LoggingUpdateChecker, Platform,
    Shell, ShellCommand, ShellEvent, UnavailableProvider,
};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tao::event_loop::{ControlFlow, EventLoopBuilder, EventLoopWindowTarget};

pub mod events;
mod webview;

pub use events::UserEvent;
pub use webview::{SurfaceServices, WryWindow};

type PlayerShell = Shell<WryWindow, Box<dyn UpdateChecker>>;

/// Process-wide switches that must be in place before any window exists.
pub fn prepare_process(platform: Platform) {
    if platform.disables_hardware_acceleration() {
        log::info!("disabling hardware-accelerated compositing");
        // SAFETY: called from `run` before the event loop or any other thread
        // is started.
        unsafe {
            std::env::set_var("WEBKIT_DISABLE_COMPOSITING_MODE", "1");
            std::env::set_var("WEBKIT_DISABLE_DMABUF_RENDERER", "1");
        }
    }
}

/// Content provider for the configured root, or a stand-in that fails every
/// request when the root is unusable.
pub fn content_provider(config: &AmpConfig) -> Arc<dyn ContentProvider> {
    match DirectoryProvider::new(&config.content.root, config.content.entry.clone()) {
        Ok(provider) => {
            log::info!("serving content from {}", provider.root().display());
            Arc::new(provider)
        }
        Err(err) => {
            log::error!("content protocol registration failed: {err}");
            Arc::new(UnavailableProvider::new(err.to_string()))
        }
    }
}

fn update_checker(config: &AmpConfig) -> Box<dyn UpdateChecker> {
    if config.updates.enabled {
        Box::new(LoggingUpdateChecker)
    } else {
        Box::new(DisabledUpdateChecker)
    }
}

/// Run the shell until it asks to exit. Never returns on success.
pub fn run(config: AmpConfig) -> Result<()> {
    let platform = Platform::current();
    prepare_process(platform);

    let mut shell: PlayerShell = Shell::new(&config, platform, update_checker(&config))?;
    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let services = SurfaceServices {
        proxy: event_loop.create_proxy(),
        guard: shell.navigation_guard().clone(),
        provider: content_provider(&config),
    };
    let mut deadline: Option<Instant> = None;

    log::info!("starting event loop ({platform:?})");
    event_loop.run(move |event, target, control_flow| {
        if let Some(shell_event) = events::translate_event(event) {
            if shell_event == ShellEvent::CreateDue {
                deadline = None;
            }
            for command in shell.handle(shell_event) {
                execute(command, &mut shell, &services, target, &mut deadline, control_flow);
            }
        }

        if !matches!(*control_flow, ControlFlow::Exit | ControlFlow::ExitWithCode(_)) {
            *control_flow = deadline.map_or(ControlFlow::Wait, ControlFlow::WaitUntil);
        }
    })
}

fn execute(
    command: ShellCommand,
    shell: &mut PlayerShell,
    services: &SurfaceServices,
    target: &EventLoopWindowTarget<UserEvent>,
    deadline: &mut Option<Instant>,
    control_flow: &mut ControlFlow,
) {
    match command {
        ShellCommand::CreateWindow(spec) => match WryWindow::build(target, &spec, services) {
            Ok(window) => shell.attach(window),
            Err(err) => {
                log::error!("failed to create player window: {err:#}");
                *control_flow = ControlFlow::ExitWithCode(1);
            }
        },
        ShellCommand::ScheduleWindow(delay) => {
            *deadline = Some(Instant::now() + delay);
        }
        ShellCommand::OpenExternal(url) => {
            if let Err(err) = open::that(url.as_str()) {
                log::warn!("failed to open {url}: {err}");
            }
        }
        ShellCommand::Exit => {
            log::info!("exiting");
            *control_flow = ControlFlow::Exit;
        }
    }
}
