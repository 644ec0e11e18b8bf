//! Watercooler claim service.
//!
//! The claim core ([`claims`], [`rate_limit`], [`mail`], [`settings`]) is plain
//! SeaORM code and builds for any target. The HTTP surface is a Cloudflare
//! Worker and only exists on `wasm32`.

pub mod claims;
pub mod error;
pub mod logging;
pub mod mail;
pub mod rate_limit;
pub mod settings;
pub mod util;

#[cfg(target_arch = "wasm32")]
mod worker_wasm;

#[cfg(target_arch = "wasm32")]
pub use worker_wasm::*;

/// This crate's HTTP surface is intended to be built for Cloudflare Workers (wasm32-unknown-unknown).
///
/// Keeping a tiny non-wasm surface helps `cargo check` on typical dev machines.
#[cfg(not(target_arch = "wasm32"))]
pub fn build_target_hint() -> &'static str {
    "watercooler-worker serves HTTP only on wasm32-unknown-unknown (Cloudflare Workers)"
}
