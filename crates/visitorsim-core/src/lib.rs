//! # visitorsim-core
//!
//! Client-side core for a discrete-event visitor simulation backend.
//!
//! The backend runs the simulation; this crate configures runs, triggers
//! them and turns the returned time series into something displayable.
//!
//! ## Quick Start
//!
//! ```no_run
//! use visitorsim_core::{Action, ClientConfig, DashboardState, HttpApi, dispatch};
//!
//! # async fn demo() -> Result<(), visitorsim_core::ApiError> {
//! let api = HttpApi::new(&ClientConfig::default())?;
//! let mut state = DashboardState::new();
//!
//! // Fetch scenario list and default settings, then run with them.
//! dispatch(&api, &mut state, Action::Initialize).await;
//! dispatch(&api, &mut state, Action::SubmitRun).await;
//!
//! for row in state.items() {
//!     println!("{:?} days: {:?} served", row.elapsed_days(), row.cust_served);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Action → [`DashboardState`] → [`Command`] → [`executor`] → [`Event`] →
//! [`DashboardState`]
//!
//! The state never performs I/O. The executor talks to the backend through
//! the [`SimulationApi`] trait, implemented over HTTP by [`HttpApi`].

pub mod chart;
pub mod client;
pub mod error;
pub mod executor;
pub mod export;
pub mod form;
pub mod model;
pub mod state;

pub use chart::{Bounds, Series, ServiceChart};
pub use client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HttpApi, SimulationApi};
pub use error::{ApiError, ExportError, FormError};
pub use executor::{dispatch, run_command};
pub use export::{ResultsSnapshot, default_export_path};
pub use form::{Field, RunForm};
pub use model::{MINUTES_PER_DAY, ResultRow, RunAck, RunParams, ScenarioId, Settings};
pub use state::{
    Action, Command, DashboardState, ErrorReport, ErrorSource, Event, Notice, RequestId,
    RequestKind,
};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Text of the about screen.
pub const ABOUT: &str = "A project simulating visitor counts over 7 days.";
