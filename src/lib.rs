//! Frame-driven scheduling core for browser front-ends.
//!
//! Everything visual in a page built on this crate (DOM wrappers, canvas
//! objects, scroll/slide interactions, 3D helpers) is a *client* of the
//! pieces defined here: one render loop fanning the platform's animation
//! frame out to registered callbacks, a delayed-call queue advanced by that
//! loop, a publish/subscribe bus with object-scoped teardown, and a tween
//! engine interpolating numeric properties. The crate never touches browser
//! APIs directly; the host reaches in through the [`render::FrameRequester`],
//! [`loader::AssetFetcher`] and [`storage::KeyValueStore`] traits.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`context`] | Explicit process-wide context tying the pieces together |
//! | [`render`] | Render loop, shared clock, frame callbacks |
//! | [`timer`] | Delayed one-shot callbacks advanced per frame |
//! | [`events`] | Emitters and per-instance event buses |
//! | [`interpolation`] | Easing curves, CSS ease table, transform strings |
//! | [`tween`] | Numeric property tweens and their manager |
//! | [`component`] | Lifecycle owner for timers, loops, tweens and events |
//! | [`loader`] | Asset and aggregate loaders |
//! | [`storage`] | Key/value storage codec |
//! | [`config`] | Runtime configuration |
//! | [`error`] | Crate error type |
//! | [`math`], [`path`] | Small numeric and path helpers |
//! | [`vector`], [`pool`] | 2D/3D vectors and a reusable object pool |

pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod interpolation;
pub mod loader;
pub mod math;
pub mod path;
pub mod pool;
pub mod render;
pub mod storage;
pub mod timer;
pub mod tween;
pub mod vector;

pub use config::Config;
pub use context::Context;
pub use error::{Error, Result};
