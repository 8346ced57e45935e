//! Navigation guard for content surfaces.
//!
//! The shell never follows links in place. Only loads of the packaged
//! content origin (the shell's own loads and reloads) go through; popups are
//! always refused and, unless they point back at packaged content or at the
//! developer tools, are handed to the system URL handler.

use crate::error::{Result, ShellError};
use crate::platform::Platform;
use url::Url;

/// Scheme the content protocol provider is registered under.
pub const CONTENT_SCHEME: &str = "ampshell";

const DEVTOOLS_SCHEMES: &[&str] = &["devtools", "chrome-devtools"];

/// Where packaged content is served from on a given platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentOrigin {
    base: Url,
}

impl ContentOrigin {
    /// Custom schemes are served as `ampshell://localhost/`, except on
    /// Windows where the webview maps them to `https://ampshell.localhost/`.
    pub fn for_platform(platform: Platform) -> Result<Self> {
        let raw = match platform {
            Platform::Windows => format!("https://{CONTENT_SCHEME}.localhost/"),
            _ => format!("{CONTENT_SCHEME}://localhost/"),
        };
        let base = Url::parse(&raw)
            .map_err(|err| ShellError::Content(format!("bad content origin `{raw}`: {err}")))?;
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL of a document inside the packaged content.
    pub fn document_url(&self, entry: &str) -> Result<Url> {
        self.base
            .join(entry.trim_start_matches('/'))
            .map_err(|err| ShellError::Content(format!("bad entry `{entry}`: {err}")))
    }

    pub fn contains(&self, url: &Url) -> bool {
        url.scheme() == self.base.scheme()
            && url.host_str() == self.base.host_str()
            && url.port_or_known_default() == self.base.port_or_known_default()
    }
}

/// Outcome for an in-place navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationVerdict {
    Allow,
    Cancel,
}

/// Outcome for a new-window request. The request itself is always refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupVerdict {
    Cancel,
    OpenExternal(Url),
}

/// Navigation and popup policy, installed on every content surface.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    origin: ContentOrigin,
}

impl NavigationGuard {
    pub fn new(origin: ContentOrigin) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> &ContentOrigin {
        &self.origin
    }

    pub fn on_navigate(&self, target: &str) -> NavigationVerdict {
        match Url::parse(target) {
            Ok(url) if self.origin.contains(&url) => NavigationVerdict::Allow,
            _ => {
                log::info!("blocked in-place navigation to {target}");
                NavigationVerdict::Cancel
            }
        }
    }

    pub fn on_new_window(&self, target: &str) -> PopupVerdict {
        let url = match Url::parse(target) {
            Ok(url) => url,
            Err(err) => {
                log::warn!("ignoring popup with unparsable target {target:?}: {err}");
                return PopupVerdict::Cancel;
            }
        };
        if self.origin.contains(&url) || is_devtools(&url) {
            log::debug!("refused popup for local target {url}");
            PopupVerdict::Cancel
        } else {
            PopupVerdict::OpenExternal(url)
        }
    }
}

fn is_devtools(url: &Url) -> bool {
    DEVTOOLS_SCHEMES.contains(&url.scheme())
}
