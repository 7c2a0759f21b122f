//! Menu navigation, URL-fragment persistence and render acknowledgement.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Top-level views of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Menu {
    #[default]
    Dashboard,
    Projects,
    #[serde(rename = "apikeys")]
    ApiKeys,
    Instances,
    Monitoring,
}

impl Menu {
    pub const ALL: [Menu; 5] = [
        Menu::Dashboard,
        Menu::Projects,
        Menu::ApiKeys,
        Menu::Instances,
        Menu::Monitoring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Menu::Dashboard => "dashboard",
            Menu::Projects => "projects",
            Menu::ApiKeys => "apikeys",
            Menu::Instances => "instances",
            Menu::Monitoring => "monitoring",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Menu::Dashboard => "Dashboard",
            Menu::Projects => "Projects",
            Menu::ApiKeys => "API Keys",
            Menu::Instances => "Instances",
            Menu::Monitoring => "Monitoring",
        }
    }

    /// Menu named by a URL fragment, with or without the leading `#`. Anything absent or
    /// unrecognised is the dashboard.
    pub fn from_fragment(fragment: Option<&str>) -> Menu {
        fragment
            .map(|raw| raw.trim().trim_start_matches('#'))
            .and_then(|name| name.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Menu {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Menu::ALL
            .into_iter()
            .find(|menu| menu.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown menu '{s}', expected one of \
                     dashboard, projects, apikeys, instances, monitoring"
                )
            })
    }
}

/// The active menu. Changes only through [`NavigationState::navigate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationState {
    active: Menu,
}

impl NavigationState {
    pub fn new(active: Menu) -> Self {
        Self { active }
    }

    pub fn active(&self) -> Menu {
        self.active
    }

    /// Switch to `to`. Returns whether the active menu changed.
    pub fn navigate(&mut self, to: Menu) -> bool {
        let changed = self.active != to;
        self.active = to;
        changed
    }
}

/// Where the active menu is persisted between sessions (the page's URL fragment).
pub trait FragmentStore: Send + Sync {
    /// Current fragment, if any. May carry a leading `#`.
    fn read(&self) -> Option<String>;
    fn write(&self, fragment: &str);
}

/// In-process fragment store.
#[derive(Debug, Clone, Default)]
pub struct MemoryFragment {
    fragment: Arc<Mutex<Option<String>>>,
}

impl MemoryFragment {
    pub fn new(initial: Option<&str>) -> Self {
        Self {
            fragment: Arc::new(Mutex::new(initial.map(str::to_string))),
        }
    }

    /// Replace the fragment from outside the console, as back/forward navigation does.
    pub fn set(&self, fragment: &str) {
        *self.fragment.lock() = Some(fragment.to_string());
    }
}

impl FragmentStore for MemoryFragment {
    fn read(&self) -> Option<String> {
        self.fragment.lock().clone()
    }

    fn write(&self, fragment: &str) {
        *self.fragment.lock() = Some(format!("#{}", fragment.trim_start_matches('#')));
    }
}

/// Fragment persisted to a file so the active view survives restarts.
///
/// I/O failures are logged and otherwise ignored; a missing file reads as no fragment.
#[derive(Debug, Clone)]
pub struct FileFragment {
    path: PathBuf,
}

impl FileFragment {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FragmentStore for FileFragment {
    fn read(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Some(contents.trim().to_string()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read state file"
                );
                None
            }
        }
    }

    fn write(&self, fragment: &str) {
        let contents = format!("#{}\n", fragment.trim_start_matches('#'));
        if let Err(e) = fs::write(&self.path, contents) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write state file");
        }
    }
}

/// Frame counter shared between the view-model and the host that draws it.
///
/// The view-model requests a frame after changing views and waits until the host reports
/// that frame (or a later one) as drawn before it touches chart mounts.
#[derive(Debug, Clone)]
pub struct RenderSignal {
    inner: Arc<SignalInner>,
}

#[derive(Debug)]
struct SignalInner {
    requested: AtomicU64,
    requests: watch::Sender<u64>,
    rendered: watch::Sender<u64>,
    headless: bool,
}

impl RenderSignal {
    /// A signal that waits for the host to call [`RenderSignal::mark_rendered`].
    pub fn new() -> Self {
        Self::build(false)
    }

    /// A signal with no host: every frame counts as drawn as soon as it is requested.
    pub fn headless() -> Self {
        Self::build(true)
    }

    fn build(headless: bool) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                requested: AtomicU64::new(0),
                requests: watch::Sender::new(0),
                rendered: watch::Sender::new(0),
                headless,
            }),
        }
    }

    /// Ask for a render pass. Returns the frame id to wait for.
    pub fn request_frame(&self) -> u64 {
        let frame = self.inner.requested.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.requests.send_replace(frame);
        if self.inner.headless {
            self.mark_rendered(frame);
        }
        frame
    }

    /// Latest requested frame.
    pub fn requested(&self) -> u64 {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Feed of requested frame ids, for hosts that draw on demand.
    pub fn requests(&self) -> watch::Receiver<u64> {
        self.inner.requests.subscribe()
    }

    /// Report `frame` as drawn. Older acknowledgements are ignored.
    pub fn mark_rendered(&self, frame: u64) {
        self.inner.rendered.send_if_modified(|rendered| {
            if frame > *rendered {
                *rendered = frame;
                true
            } else {
                false
            }
        });
    }

    /// Wait until `frame` has been drawn, for at most `timeout`. Returns whether it was.
    pub async fn wait_rendered(&self, frame: u64, timeout: Duration) -> bool {
        let mut rendered = self.inner.rendered.subscribe();
        matches!(
            tokio::time::timeout(timeout, rendered.wait_for(|drawn| *drawn >= frame)).await,
            Ok(Ok(_))
        )
    }
}

impl Default for RenderSignal {
    fn default() -> Self {
        Self::new()
    }
}
