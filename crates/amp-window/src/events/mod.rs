//! Native event translation.
//!
//! Webview callbacks run outside the shell's control flow, so they only post
//! raw [`UserEvent`]s into the event loop. Everything is turned into a
//! [`ShellEvent`] here, on the loop thread, in arrival order.

use amp_core::{Inbound, ShellEvent};
use tao::event::{Event, StartCause, WindowEvent};

/// Payloads posted through the event loop proxy.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    /// Raw IPC body posted by the bridge script.
    Ipc(String),
    /// The webview finished loading a page.
    PageLoaded,
    /// The content asked for a new window.
    NewWindow(String),
}

pub fn translate_event(event: Event<'_, UserEvent>) -> Option<ShellEvent> {
    match event {
        Event::NewEvents(cause) => translate_start_cause(cause),
        Event::WindowEvent { event, .. } => translate_window_event(&event),
        Event::UserEvent(user) => translate_user_event(user),
        Event::Reopen { .. } => Some(ShellEvent::Activate),
        _ => None,
    }
}

pub fn translate_start_cause(cause: StartCause) -> Option<ShellEvent> {
    match cause {
        StartCause::Init => Some(ShellEvent::Ready),
        StartCause::ResumeTimeReached { .. } => Some(ShellEvent::CreateDue),
        _ => None,
    }
}

pub fn translate_window_event(event: &WindowEvent<'_>) -> Option<ShellEvent> {
    match event {
        WindowEvent::CloseRequested => Some(ShellEvent::CloseRequested),
        WindowEvent::Destroyed => Some(ShellEvent::WindowClosed),
        _ => None,
    }
}

pub fn translate_user_event(event: UserEvent) -> Option<ShellEvent> {
    match event {
        UserEvent::Ipc(body) => match Inbound::parse(&body) {
            Ok(inbound) => Some(inbound.into()),
            Err(err) => {
                log::warn!("dropping content message: {err}");
                None
            }
        },
        UserEvent::PageLoaded => Some(ShellEvent::LoadFinished),
        UserEvent::NewWindow(url) => Some(ShellEvent::PopupRequested(url)),
    }
}
