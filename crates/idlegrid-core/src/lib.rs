#![forbid(unsafe_code)]

//! Core: idle-time batch scheduling for incrementally populated card grids.
//!
//! # Role in idlegrid
//! `idlegrid-core` owns every piece of logic that does not touch the DOM.
//! It decides how many cards a cycle may produce, when a cycle must yield
//! back to the host, and which cards are currently visible. The web crate
//! (`idlegrid-web`) only supplies host implementations of the collaborator
//! traits defined in [`host`] and [`visibility`].
//!
//! # Primary responsibilities
//! - **IdleBatchRenderer**: the cursor, the created-card list, and the
//!   bounded per-cycle loop with its idle-budget check.
//! - **IdleGrid**: re-schedules the renderer through an [`IdleScheduler`]
//!   until every card exists.
//! - **Capability selection**: picks the native or fallback strategy for
//!   scheduling and visibility once, from [`HostCapabilities`].
//! - **VisibleSet**: membership of cards the host last reported as visible.
//!
//! # Execution model
//! ```text
//! IdleGrid::start
//!   → scheduler.schedule_idle(cb)      // native idle callback or 16 ms timer
//!   → cb(deadline)
//!       → renderer.run_cycle(deadline) // create ≤ batch, observe, append once
//!       → remaining > 0 ? schedule again : stop
//! ```
//! Everything runs on one control flow; a "suspended" renderer is simply a
//! callback the host has not invoked yet.
//!
//! [`IdleScheduler`]: host::IdleScheduler
//! [`HostCapabilities`]: capabilities::HostCapabilities

pub mod capabilities;
pub mod card;
pub mod config;
pub mod deadline;
pub mod error;
pub mod grid;
pub mod host;
pub mod renderer;
pub mod scheduler;
pub mod visibility;

pub use capabilities::{HostCapabilities, SchedulerKind, VisibilityKind};
pub use card::Card;
pub use config::{GridConfig, MAX_CARDS_LIMIT};
pub use deadline::{Deadline, FixedDeadline};
pub use error::ConfigError;
pub use grid::IdleGrid;
pub use host::{CardFactory, Container, IdleCallback, IdleScheduler};
pub use renderer::{CycleReport, CycleStop, IdleBatchRenderer};
pub use scheduler::ManualScheduler;
pub use visibility::{
    AlwaysVisible, IntersectionSource, ObservedVisibility, SharedVisibleSet, VisibilityChange,
    VisibilityTracker, VisibleSet,
};
