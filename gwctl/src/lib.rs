//! # gwctl: admin console for the API premium gateway
//!
//! `gwctl` is the client side of the gateway's administration surface. It talks to the admin
//! API (`/admin/*`) and keeps a view-model of five screens: a dashboard of counters, the
//! project list, API key management, service instances, and a monitoring view with a live
//! health table and three time-series charts.
//!
//! ## Architecture
//!
//! The **transport** ([`http`]) is a small trait so the view-model can be driven against a
//! real backend through [reqwest](https://docs.rs/reqwest) or against a scripted
//! [`http::MockHttpClient`] in tests. [`client::AdminClient`] maps every admin route to a
//! typed method and unwraps the `{code, data, message}` envelope described in [`api`].
//!
//! The **view-model** ([`view_model`]) owns the state of the active screen. Navigation
//! ([`navigation`]) is persisted through a fragment store, loads are guarded by per-resource
//! request tickets so a late response never overwrites a newer one, and failed list loads
//! fall back to demo data ([`fallback`]). The monitoring screen polls on a timer
//! ([`refresh`]) and pushes chart options to a [`charts::ChartSurface`].
//!
//! Presentation helpers live in [`format`], [`status`] and [`render`]; the `gwctl` binary uses
//! them to draw the active screen as text.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gwctl::{AdminClient, MemorySurface, MonitoringApi, ReqwestHttpClient, ViewModel};
//! use gwctl::navigation::Menu;
//!
//! # async fn run() {
//! let http = ReqwestHttpClient::new("http://localhost:8081/api".parse().unwrap(), None);
//! let client = AdminClient::new(Arc::new(http), MonitoringApi::Observation);
//! let surface = Arc::new(MemorySurface::with_monitoring_mounts());
//! let console = ViewModel::builder(client, surface).build();
//!
//! console.initialize().await;
//! console.select_menu(Menu::Monitoring).await;
//! let state = console.snapshot();
//! println!("{} instances", state.observation_instances.len());
//! console.teardown();
//! # }
//! ```

pub mod api;
pub mod charts;
pub mod client;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod format;
pub mod http;
pub mod navigation;
pub mod refresh;
pub mod render;
pub mod status;
pub mod telemetry;
pub mod types;
pub mod view_model;

pub use charts::{ChartSurface, MemorySurface};
pub use client::{AdminClient, MonitoringApi};
pub use config::Config;
pub use errors::{Error, Result};
pub use http::{HttpClient, ReqwestHttpClient};
pub use view_model::{ViewModel, ViewSettings, ViewState};
