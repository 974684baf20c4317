#![forbid(unsafe_code)]

//! Browser front for idlegrid.
//!
//! This crate provides [`IdleGridWeb`], a `wasm-bindgen`-exported struct that
//! populates a container element with cards during idle time and tracks which
//! cards intersect the viewport. All scheduling decisions live in
//! `idlegrid-core`; this crate supplies the DOM implementations of the core's
//! collaborator traits and picks between native and fallback strategies once,
//! at construction.
//!
//! Host capability → strategy:
//!
//! | capability | present | absent |
//! |---|---|---|
//! | `requestIdleCallback` | idle callback, 500 ms timeout | `setTimeout` 16 ms, forced deadline |
//! | `IntersectionObserver` | one shared observer | every card visible on creation |

pub mod markup;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::IdleGridWeb;
