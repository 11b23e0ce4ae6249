#![allow(unused_assignments)]

//! # Remote Starter
//!
//! A remote control panel for starting, stopping and monitoring locally
//! registered launcher scripts from a browser.
//!
//! ## Features
//!
//! - **Application Registry**: Named launchers with a working directory, an optional port and a display order, persisted as JSON
//! - **Schema Migration**: Legacy and inconsistent registry files are upgraded on load
//! - **Process Tracking**: Last known PID per application, persisted across restarts
//! - **Reconciliation**: Tracked PIDs are checked against the OS on every status query; anything not confirmed alive is pruned
//! - **Idempotent Lifecycle**: Starting a running application or stopping a stopped one is a successful no-op
//! - **HTTP API**: axum routes for the browser panel, mutations guarded by a secret path segment
//!
//! ## Quick Start
//!
//! ```no_run
//! use remote_starter::config::PanelConfig;
//! use remote_starter::process::SystemHost;
//! use remote_starter::ControlPanel;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), remote_starter::Error> {
//! let config = PanelConfig::in_dir("/srv/panel");
//! let panel = ControlPanel::open(&config, Arc::new(SystemHost::new()));
//!
//! panel.add_application("web", "/srv/web/run.sh", Some("8080")).await?;
//! let started = panel.start_application("web").await?;
//! println!("{}", started.describe("web"));
//!
//! for (name, status) in panel.get_status().await {
//!     println!("{}: running={}", name, status.running);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! - All operations take `&self` on [`ControlPanel`]
//! - The registry and process table sit behind one async mutex, held for the whole operation including file writes
//! - OS queries and terminations are bounded by configurable timeouts
//! - Spawned launchers are detached and outlive the panel

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod panel;
pub mod process;
pub mod reconcile;
pub mod registry;
pub mod store;
pub mod tracker;

pub use config::{PanelConfig, Parser};
pub use error::{Error, Result};
pub use lifecycle::{LifecycleController, StartOutcome, StopOutcome};
pub use panel::ControlPanel;
pub use process::{Liveness, ProcessHost, SystemHost, TerminateError};
pub use reconcile::{reconcile, AppStatus, StatusReport};
pub use registry::{AppRecord, CanonicalRegistry, LauncherPolicy, Registry};
pub use store::JsonStore;
pub use tracker::ProcessTracker;
