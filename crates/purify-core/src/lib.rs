#![forbid(unsafe_code)]

//! Allowlist sanitizer for HTML, SVG and MathML markup.
//!
//! Design goals:
//! - DOMPurify-compatible defaults and decisions (tag/attribute tables, namespace rules, hook
//!   points, output precedence)
//! - never fail on hostile markup: anything doubtful is dropped and recorded in the removal log
//! - no process-wide state in this crate; every [`Sanitizer`] owns its hooks and configuration

pub mod config;
pub mod defaults;
pub mod error;
pub mod guard;
pub mod hooks;
pub mod output;
mod patterns;
pub mod policy;
pub mod removal;
mod sanitizer;
mod uri;
mod walker;

#[cfg(test)]
mod tests;

pub use config::{Config, CustomElementHandling, NamePredicate, Profiles, TrustedTypesPolicy, UriPattern};
pub use error::{Error, Result};
pub use hooks::{AttributeCheck, ElementCheck, Hook, HookContext, HookData, HookPoint, HookRegistry};
pub use output::{Dirty, Sanitized, Tree, TrustedHtml};
pub use policy::Policy;
pub use removal::{Removal, RemovedAttribute, RemovedNode};
pub use sanitizer::Sanitizer;
