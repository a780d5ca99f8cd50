#![forbid(unsafe_code)]

//! `purify` sanitizes untrusted HTML, SVG and MathML with DOMPurify-compatible semantics.
//!
//! Two ways in:
//! - [`Sanitizer`] instances, each with its own hooks, pinned configuration and removal log
//! - the process-wide default instance behind the free functions in this crate
//!
//! ```
//! let clean = purify::sanitize_to_string(r#"<p onclick="steal()">hi<script>x()</script></p>"#);
//! assert_eq!(clean, "<p>hi</p>");
//! ```
//!
//! The free functions share one lock. Hooks registered through [`add_hook`] run while that lock
//! is held and must not call back into this module.

pub use purify_core::*;

pub mod dom {
    pub use purify_dom::*;
}

use parking_lot::{Mutex, MutexGuard};
use std::sync::OnceLock;

fn instance() -> MutexGuard<'static, Sanitizer> {
    static DEFAULT: OnceLock<Mutex<Sanitizer>> = OnceLock::new();
    DEFAULT.get_or_init(|| Mutex::new(Sanitizer::new())).lock()
}

/// Sanitizes with the pinned configuration, or the defaults.
pub fn sanitize<'d>(dirty: impl Into<Dirty<'d>>) -> Sanitized {
    instance().sanitize(dirty)
}

/// Sanitizes with `config`. A configuration pinned by [`set_config`] takes precedence.
pub fn sanitize_with<'d>(dirty: impl Into<Dirty<'d>>, config: &Config) -> Sanitized {
    instance().sanitize_with(dirty, config)
}

pub fn sanitize_to_string(markup: &str) -> String {
    instance().sanitize_to_string(markup)
}

/// Pins `config` for every later call until [`clear_config`].
pub fn set_config(config: &Config) {
    instance().set_config(config);
}

pub fn clear_config() {
    instance().clear_config();
}

pub fn add_hook(point: HookPoint, hook: impl FnMut(&mut HookContext<'_>) + Send + 'static) {
    instance().add_hook(point, hook);
}

/// Removes and returns the most recently added hook of `point`.
pub fn remove_hook(point: HookPoint) -> Option<Hook> {
    instance().remove_hook(point)
}

pub fn remove_hooks(point: HookPoint) {
    instance().remove_hooks(point);
}

pub fn remove_all_hooks() {
    instance().remove_all_hooks();
}

pub fn is_valid_attribute(tag: &str, attr: &str, value: &str) -> bool {
    instance().is_valid_attribute(tag, attr, value)
}

/// A copy of what the last call through the default instance removed.
pub fn removed() -> Vec<Removal> {
    instance().removed().to_vec()
}

pub fn is_supported() -> bool {
    instance().is_supported()
}
