#![forbid(unsafe_code)]

//! Browser binding for `scroll-blocker-core`.
//!
//! - [`DomHost`] implements the core's `ScrollHost` over `web-sys`: styles and
//!   classes on `<html>`/`<body>`, `window.scrollTo`, a `resize` listener,
//!   `setTimeout` for the debounce and `requestAnimationFrame` for deferred
//!   compensation writes.
//! - [`WebScrollBlocker`] is the `wasm-bindgen` export (`ScrollBlocker` in JS)
//!   with `enable(options?)`, `disable(force?)` and the `isEnabled` getter.
//! - [`shared_scroll_blocker`] (`sharedScrollBlocker` in JS) hands every caller
//!   on the page the same engine, so activation counts are shared between
//!   independent UI features.
//!
//! Only [`css`] is compiled on native targets; everything touching the DOM is
//! gated on `wasm32`.

pub mod css;

#[cfg(target_arch = "wasm32")]
mod dom_host;
#[cfg(target_arch = "wasm32")]
mod options;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom_host::DomHost;
#[cfg(target_arch = "wasm32")]
pub use wasm::{WebScrollBlocker, shared_scroll_blocker};
