//! The console view-model.
//!
//! [`ViewModel`] owns the view state and wires navigation, the resource loaders, the
//! auto-refresh timer and the chart renderer together. It is cheap to clone; clones share
//! the same state.
//!
//! State sits behind a synchronous lock that is never held across an `.await`. Hosts learn
//! about changes through [`ViewModel::subscribe`] and read a copy with
//! [`ViewModel::snapshot`].

mod loaders;
mod mutations;
mod state;
mod tickets;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::api::models::instances::InstanceFilter;
use crate::api::models::monitoring::{ObservationFilter, TimeRange};
use crate::charts::{ChartRenderer, ChartSurface, MemorySurface};
use crate::client::AdminClient;
use crate::fallback::{FallbackData, StaticFallback};
use crate::http::HttpClient;
use crate::navigation::{FragmentStore, MemoryFragment, Menu, RenderSignal};
use crate::refresh::AutoRefresh;
use crate::status::SeverityThresholds;

pub use state::{
    DashboardStats, MAX_NOTICES, Notice, NoticeLevel, ObservationSort, SortKey, SortOrder,
    ViewState,
};
use tickets::RequestTickets;

/// Timing and classification knobs of the view-model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    /// Period of the monitoring auto-refresh
    pub refresh_interval: Duration,
    /// Longest wait for the host to draw a new view before its data is loaded anyway
    pub render_wait: Duration,
    pub thresholds: SeverityThresholds,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(60),
            render_wait: Duration::from_millis(500),
            thresholds: SeverityThresholds::default(),
        }
    }
}

#[derive(Default)]
struct Store {
    view: ViewState,
    tickets: RequestTickets,
    notices: VecDeque<Notice>,
}

impl Store {
    fn push_notice(&mut self, notice: Notice) {
        if self.notices.len() >= MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }

    /// Make every in-flight load stale and drop its loading flag.
    fn invalidate_requests(&mut self) {
        self.tickets.invalidate_all();
        self.view.clear_loading();
    }
}

struct Inner<H: HttpClient, S: ChartSurface> {
    client: AdminClient<H>,
    fallback: Arc<dyn FallbackData>,
    fragment: Arc<dyn FragmentStore>,
    render: RenderSignal,
    charts: ChartRenderer<S>,
    refresh: AutoRefresh,
    settings: ViewSettings,
    store: Mutex<Store>,
    changes: watch::Sender<u64>,
}

pub struct ViewModel<H: HttpClient, S: ChartSurface = MemorySurface> {
    inner: Arc<Inner<H, S>>,
}

impl<H: HttpClient, S: ChartSurface> Clone for ViewModel<H, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Builder for [`ViewModel`].
///
/// Defaults: [`StaticFallback`] data, an in-memory fragment store and a headless render
/// signal.
pub struct ViewModelBuilder<H: HttpClient, S: ChartSurface> {
    client: AdminClient<H>,
    surface: Arc<S>,
    settings: ViewSettings,
    fallback: Arc<dyn FallbackData>,
    fragment: Arc<dyn FragmentStore>,
    render: RenderSignal,
}

impl<H: HttpClient + 'static, S: ChartSurface + 'static> ViewModelBuilder<H, S> {
    pub fn settings(mut self, settings: ViewSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn fallback(mut self, fallback: Arc<dyn FallbackData>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fragment_store(mut self, fragment: Arc<dyn FragmentStore>) -> Self {
        self.fragment = fragment;
        self
    }

    pub fn render_signal(mut self, render: RenderSignal) -> Self {
        self.render = render;
        self
    }

    pub fn build(self) -> ViewModel<H, S> {
        ViewModel {
            inner: Arc::new(Inner {
                client: self.client,
                fallback: self.fallback,
                fragment: self.fragment,
                render: self.render,
                charts: ChartRenderer::new(self.surface, self.settings.thresholds),
                refresh: AutoRefresh::new(),
                settings: self.settings,
                store: Mutex::new(Store::default()),
                changes: watch::Sender::new(0),
            }),
        }
    }
}

impl<H: HttpClient + 'static, S: ChartSurface + 'static> ViewModel<H, S> {
    pub fn builder(client: AdminClient<H>, surface: Arc<S>) -> ViewModelBuilder<H, S> {
        ViewModelBuilder {
            client,
            surface,
            settings: ViewSettings::default(),
            fallback: Arc::new(StaticFallback),
            fragment: Arc::new(MemoryFragment::default()),
            render: RenderSignal::headless(),
        }
    }

    /// Apply `f` to the store, then tell subscribers something changed.
    fn update<R>(&self, f: impl FnOnce(&mut Store) -> R) -> R {
        let result = {
            let mut store = self.inner.store.lock();
            f(&mut store)
        };
        self.inner.changes.send_modify(|version| *version += 1);
        result
    }

    /// Read from the current state without copying it.
    pub fn read<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        f(&self.inner.store.lock().view)
    }

    pub fn snapshot(&self) -> ViewState {
        self.read(ViewState::clone)
    }

    pub fn active_menu(&self) -> Menu {
        self.read(ViewState::active_menu)
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.inner.settings
    }

    /// Version counter bumped after every state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }

    /// Drain pending notices, oldest first.
    pub fn take_notices(&self) -> Vec<Notice> {
        self.inner.store.lock().notices.drain(..).collect()
    }

    pub fn render_signal(&self) -> &RenderSignal {
        &self.inner.render
    }

    pub fn chart_surface(&self) -> &Arc<S> {
        self.inner.charts.surface()
    }

    pub fn auto_refresh_running(&self) -> bool {
        self.inner.refresh.is_running()
    }

    /// Restore the menu from the fragment and load its data.
    ///
    /// An absent fragment is written back as the default menu; an unrecognised one is left
    /// alone and shows the dashboard.
    pub async fn initialize(&self) {
        let fragment = self.inner.fragment.read();
        let menu = Menu::from_fragment(fragment.as_deref());

        let absent = fragment
            .as_deref()
            .is_none_or(|raw| raw.trim_start_matches('#').trim().is_empty());
        if absent {
            self.inner.fragment.write(menu.as_str());
        }

        tracing::info!(menu = %menu, "Initializing console");
        self.update(|store| {
            store.view.navigation.navigate(menu);
        });
        self.load_active_view().await;
    }

    /// Switch views on operator request.
    ///
    /// Data of the previous view is cleared before the switch. The new view's data is only
    /// loaded once the host has drawn it, or `render_wait` has passed.
    pub async fn select_menu(&self, menu: Menu) {
        tracing::info!(menu = %menu, "Switching view");
        self.inner.refresh.stop();

        self.update(|store| {
            store.invalidate_requests();
            store.view.clear_view_data();
            store.view.navigation.navigate(menu);
        });
        self.inner.fragment.write(menu.as_str());

        let frame = self.inner.render.request_frame();
        if !self.inner.render.wait_rendered(frame, self.inner.settings.render_wait).await {
            tracing::debug!(frame, "View not drawn in time, loading data anyway");
        }

        if self.active_menu() != menu {
            tracing::debug!(menu = %menu, "View changed while waiting for render, skipping load");
            return;
        }
        self.load_active_view().await;
    }

    /// React to the fragment changing underneath the console (back/forward navigation).
    /// Data of the previous view is kept until the new view's loaders replace it.
    pub async fn handle_fragment_change(&self) {
        let menu = Menu::from_fragment(self.inner.fragment.read().as_deref());

        let changed = self.update(|store| {
            let changed = store.view.navigation.navigate(menu);
            if changed {
                store.invalidate_requests();
            }
            changed
        });

        if changed {
            tracing::info!(menu = %menu, "Fragment changed, switching view");
            self.load_active_view().await;
        }
    }

    /// Reload everything the active view shows.
    pub async fn reload(&self) {
        self.load_active_view().await;
    }

    async fn load_active_view(&self) {
        let menu = self.active_menu();
        self.inner.refresh.stop();

        match menu {
            Menu::Dashboard => {
                let _ = self.load_dashboard().await;
            }
            Menu::Projects => {
                let _ = self.load_projects().await;
            }
            Menu::ApiKeys => {
                let _ = self.load_api_keys().await;
            }
            Menu::Instances => {
                let _ = futures::join!(self.load_project_options(), self.load_instances());
            }
            Menu::Monitoring => {
                self.start_auto_refresh();
                let _ = futures::join!(self.load_projects(), self.load_monitoring());
            }
        }
    }

    fn start_auto_refresh(&self) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.refresh.start(self.inner.settings.refresh_interval, move || {
            let weak = weak.clone();
            async move {
                let Some(inner) = weak.upgrade() else {
                    return false;
                };
                let view_model = ViewModel { inner };
                if view_model.active_menu() == Menu::Monitoring {
                    tracing::debug!("Auto-refreshing monitoring data");
                    let _ = view_model.load_monitoring().await;
                }
                true
            }
        });
    }

    /// Pause or resume the auto-refresh. Resuming on the monitoring view refreshes at once.
    /// Returns the new paused state.
    pub async fn toggle_auto_refresh(&self) -> bool {
        let paused = self.inner.refresh.toggle_pause();
        self.update(|store| store.view.auto_refresh_paused = paused);
        tracing::info!(paused, "Auto-refresh toggled");

        if !paused && self.active_menu() == Menu::Monitoring {
            let _ = self.load_monitoring().await;
        }
        paused
    }

    /// Stop the timer and release every chart. In-flight loads are discarded.
    pub fn teardown(&self) {
        self.inner.refresh.stop();
        self.inner.charts.dispose_all();
        self.update(Store::invalidate_requests);
        tracing::info!("Console torn down");
    }

    pub fn set_project_search(&self, search: impl Into<String>) {
        let search = search.into();
        self.update(|store| store.view.project_search = search);
    }

    pub fn set_instance_filter(&self, filter: InstanceFilter) {
        self.update(|store| store.view.instance_filter = filter);
    }

    pub fn set_observation_filter(&self, filter: ObservationFilter) {
        self.update(|store| store.view.observation_filter = filter);
    }

    pub fn set_time_range(&self, range: TimeRange) {
        self.update(|store| store.view.time_range = range);
    }

    /// Sort the monitoring table, or restore backend order with `None`.
    pub fn sort_observation_instances(&self, sort: Option<ObservationSort>) {
        self.update(|store| store.view.observation_sort = sort);
    }
}

#[cfg(test)]
mod tests;
