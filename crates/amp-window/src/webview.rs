//! tao window + wry webview behind the engine's `NativeWindow` seam.

use crate::events::UserEvent;
use amp_core::content::ContentProvider;
use amp_core::{
    Bounds, CONTENT_SCHEME, ClipRect, NativeWindow, NavigationGuard, NavigationVerdict,
    OverlayPayload, PhysicalSize, Reply, ScreenPoint, ShellError, WindowSpec,
};
use std::borrow::Cow;
use std::sync::Arc;
use tao::dpi::{LogicalPosition, LogicalSize};
use tao::event_loop::{EventLoopProxy, EventLoopWindowTarget};
use tao::window::{Window, WindowBuilder};
use wry::http::{Request, Response, StatusCode, header::CONTENT_TYPE};
use wry::{PageLoadEvent, WebView, WebViewBuilder};

#[cfg(target_os = "linux")]
use wry::WebViewBuilderExtUnix;
#[cfg(target_os = "windows")]
use wry::WebViewBuilderExtWindows;

const BRIDGE_SCRIPT: &str = include_str!("bridge.js");

/// Collaborators shared by every webview the runtime builds.
#[derive(Clone)]
pub struct SurfaceServices {
    pub proxy: EventLoopProxy<UserEvent>,
    pub guard: NavigationGuard,
    pub provider: Arc<dyn ContentProvider>,
}

pub struct WryWindow {
    // Dropped before the window it is embedded in.
    webview: WebView,
    window: Window,
}

fn window_error(err: impl std::fmt::Display) -> ShellError {
    ShellError::Window(err.to_string())
}

impl WryWindow {
    /// Build the player window and its content surface. The webview is
    /// visible from the start; the window stays hidden until revealed.
    pub fn build(
        target: &EventLoopWindowTarget<UserEvent>,
        spec: &WindowSpec,
        services: &SurfaceServices,
    ) -> anyhow::Result<Self> {
        let builder = WindowBuilder::new()
            .with_title(&spec.title)
            .with_position(LogicalPosition::new(spec.x, spec.y))
            .with_inner_size(LogicalSize::new(spec.width, spec.height))
            .with_transparent(spec.transparent)
            .with_decorations(spec.decorations)
            .with_resizable(spec.resizable)
            .with_maximizable(spec.fullscreenable)
            .with_visible(spec.visible);

        #[cfg(target_os = "linux")]
        let builder = {
            use tao::platform::unix::WindowBuilderExtUnix;
            builder.with_rgba_visual(spec.transparent)
        };
        #[cfg(target_os = "windows")]
        let builder = {
            use tao::platform::windows::WindowBuilderExtWindows;
            builder.with_undecorated_shadow(spec.shadow)
        };

        let window = builder.build(target)?;

        let ipc_proxy = services.proxy.clone();
        let load_proxy = services.proxy.clone();
        let popup_proxy = services.proxy.clone();
        let guard = services.guard.clone();
        let provider = Arc::clone(&services.provider);

        let webview_builder = WebViewBuilder::new()
            .with_transparent(spec.transparent)
            .with_visible(true)
            .with_devtools(spec.devtools)
            .with_hotkeys_zoom(false)
            .with_initialization_script(BRIDGE_SCRIPT)
            .with_custom_protocol(CONTENT_SCHEME.into(), move |_webview_id, request| {
                serve(provider.as_ref(), &request)
            })
            .with_ipc_handler(move |request: Request<String>| {
                let _ = ipc_proxy.send_event(UserEvent::Ipc(request.into_body()));
            })
            .with_navigation_handler(move |url: String| {
                guard.on_navigate(&url) == NavigationVerdict::Allow
            })
            .with_new_window_req_handler(move |url, _features| {
                let _ = popup_proxy.send_event(UserEvent::NewWindow(url));
                wry::NewWindowResponse::Deny
            })
            .with_on_page_load_handler(move |event, _url| {
                if matches!(event, PageLoadEvent::Finished) {
                    let _ = load_proxy.send_event(UserEvent::PageLoaded);
                }
            });

        #[cfg(target_os = "windows")]
        let webview_builder = webview_builder.with_https_scheme(true);

        #[cfg(target_os = "linux")]
        let webview = {
            use tao::platform::unix::WindowExtUnix;
            webview_builder.build_gtk(window.gtk_window())?
        };
        #[cfg(not(target_os = "linux"))]
        let webview = webview_builder.build(&window)?;

        log::info!(
            "created window {}x{} (hidden, devtools {})",
            spec.width,
            spec.height,
            spec.devtools
        );
        Ok(Self { webview, window })
    }

    fn eval(&self, script: &str) -> amp_core::Result<()> {
        self.webview.evaluate_script(script).map_err(window_error)
    }
}

impl NativeWindow for WryWindow {
    fn set_zoom(&self, factor: f64) -> amp_core::Result<()> {
        self.webview.zoom(factor).map_err(window_error)
    }

    fn lock_visual_zoom(&self, min: f64, max: f64) -> amp_core::Result<()> {
        check_zoom_limits(min, max)?;
        disable_pinch_zoom(&self.webview)
    }

    fn is_resizable(&self) -> bool {
        self.window.is_resizable()
    }

    fn set_resizable(&self, resizable: bool) {
        self.window.set_resizable(resizable);
    }

    fn set_content_size(&self, size: PhysicalSize) {
        self.window.set_inner_size(content_size(size));
    }

    fn show(&self) {
        self.window.set_visible(true);
    }

    fn minimize(&self) {
        self.window.set_minimized(true);
    }

    fn bounds(&self) -> amp_core::Result<Bounds> {
        let scale = self.window.scale_factor();
        let position = self
            .window
            .outer_position()
            .map_err(window_error)?
            .to_logical::<f64>(scale);
        let size = self.window.outer_size().to_logical::<f64>(scale);
        Ok(Bounds {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        })
    }

    fn cursor_screen_point(&self) -> amp_core::Result<ScreenPoint> {
        let point = self
            .window
            .cursor_position()
            .map_err(window_error)?
            .to_logical::<f64>(self.window.scale_factor());
        Ok(ScreenPoint {
            x: point.x,
            y: point.y,
        })
    }

    fn set_thumbnail_clip(&self, clip: ClipRect) {
        let edges = clip_edges(clip, self.window.scale_factor());
        if let Err(err) = apply_thumbnail_clip(&self.window, edges) {
            log::warn!(
                "thumbnail clip {}x{}+{}+{} not applied: {err}",
                clip.width,
                clip.height,
                clip.x,
                clip.y
            );
        }
    }

    fn begin_drag(&self) -> amp_core::Result<()> {
        self.window.drag_window().map_err(window_error)
    }

    fn inject_overlay(&self, overlay: &OverlayPayload) -> amp_core::Result<()> {
        self.eval(&overlay_script(overlay))
    }

    fn load_url(&self, url: &str) -> amp_core::Result<()> {
        self.webview.load_url(url).map_err(window_error)
    }

    fn deliver(&self, reply: &Reply) -> amp_core::Result<()> {
        let json = reply.to_json()?;
        self.eval(&format!("window.__ampshell && window.__ampshell.resolve({json});"))
    }

    fn open_devtools(&self) {
        self.webview.open_devtools();
    }
}

/// The shell hands over sizes already multiplied by its scale; they are
/// device-independent, so the OS applies the display factor on top.
fn content_size(size: PhysicalSize) -> LogicalSize<f64> {
    LogicalSize::new(f64::from(size.width), f64::from(size.height))
}

/// Client-area edges `[left, top, right, bottom]` in device pixels, or `None`
/// to clear the clip.
fn clip_edges(clip: ClipRect, scale: f64) -> Option<[i32; 4]> {
    if clip.width == 0 || clip.height == 0 {
        return None;
    }
    let px = |value: f64| (value * scale).round() as i32;
    let left = px(f64::from(clip.x));
    let top = px(f64::from(clip.y));
    Some([
        left,
        top,
        left + px(f64::from(clip.width)),
        top + px(f64::from(clip.height)),
    ])
}

#[cfg(target_os = "windows")]
fn apply_thumbnail_clip(window: &Window, edges: Option<[i32; 4]>) -> amp_core::Result<()> {
    use tao::platform::windows::WindowExtWindows;
    use windows::Win32::Foundation::{HWND, RECT};
    use windows::Win32::System::Com::{CLSCTX_INPROC_SERVER, CoCreateInstance};
    use windows::Win32::UI::Shell::{ITaskbarList3, TaskbarList};

    let hwnd = HWND(window.hwnd() as *mut _);
    let rect = edges.map(|[left, top, right, bottom]| RECT {
        left,
        top,
        right,
        bottom,
    });
    // SAFETY: COM is initialised on the event loop thread by tao, and `hwnd`
    // belongs to a live window borrowed for the duration of the call.
    unsafe {
        let taskbar: ITaskbarList3 =
            CoCreateInstance(&TaskbarList, None, CLSCTX_INPROC_SERVER).map_err(window_error)?;
        taskbar.HrInit().map_err(window_error)?;
        let clip = rect.as_ref().map_or(std::ptr::null(), |rect| rect as *const RECT);
        taskbar.SetThumbnailClip(hwnd, clip).map_err(window_error)
    }
}

#[cfg(not(target_os = "windows"))]
fn apply_thumbnail_clip(_window: &Window, edges: Option<[i32; 4]>) -> amp_core::Result<()> {
    log::debug!("thumbnail clip {edges:?} has no taskbar to apply to");
    Ok(())
}

/// Only a fixed 1:1 visual zoom can be expressed by the native backends.
fn check_zoom_limits(min: f64, max: f64) -> amp_core::Result<()> {
    if min == 1.0 && max == 1.0 {
        Ok(())
    } else {
        Err(ShellError::Window(format!(
            "visual zoom range {min}..={max} is not supported"
        )))
    }
}

#[cfg(target_os = "windows")]
fn disable_pinch_zoom(webview: &WebView) -> amp_core::Result<()> {
    use webview2_com::Microsoft::Web::WebView2::Win32::ICoreWebView2Settings5;
    use windows::core::Interface;
    use wry::WebViewExtWindows;

    // SAFETY: the controller is owned by `webview` and used on its own thread.
    unsafe {
        let settings = webview
            .controller()
            .CoreWebView2()
            .and_then(|core| core.Settings())
            .map_err(window_error)?;
        let settings: ICoreWebView2Settings5 = settings.cast().map_err(window_error)?;
        settings.SetIsPinchZoomEnabled(false).map_err(window_error)
    }
}

#[cfg(not(target_os = "windows"))]
fn disable_pinch_zoom(_webview: &WebView) -> amp_core::Result<()> {
    Err(ShellError::Window(
        "pinch zoom cannot be locked on this webview backend".into(),
    ))
}

/// Script handing the drag overlay to the bridge.
fn overlay_script(overlay: &OverlayPayload) -> String {
    let payload = serde_json::json!({
        "stylesheet": overlay.stylesheet,
        "noDragSelector": overlay.no_drag_selector,
        "dragSelector": overlay.drag_selector,
        "surfaceDraggable": overlay.surface_draggable,
    });
    format!("window.__ampshell && window.__ampshell.applyOverlay({payload});")
}

/// Answer one content protocol request.
fn serve(provider: &dyn ContentProvider, request: &Request<Vec<u8>>) -> Response<Cow<'static, [u8]>> {
    let path = request.uri().path();
    let opened = provider
        .open(path)
        .and_then(|stream| {
            let mime = stream.mime.clone();
            stream.into_bytes().map(|body| (mime, body))
        });
    let built = match opened {
        Ok((mime, body)) => Response::builder()
            .header(CONTENT_TYPE, mime)
            .body(Cow::Owned(body)),
        Err(err) => {
            log::warn!("content request {path} failed: {err}");
            Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Cow::Borrowed(&[][..]))
        }
    };
    built.unwrap_or_else(|err| {
        log::error!("failed to build content response for {path}: {err}");
        let mut response = Response::new(Cow::Borrowed(&[][..]));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}
