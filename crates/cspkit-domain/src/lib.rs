//! Pure CSP model and policy algebra (no IO).
//!
//! Four layered value types, leaf first: [`Uri`], [`SourceExpression`], [`Directive`] and
//! [`Policy`]. All of them are immutable; operations return new values. Malformed input never
//! errors here: every type carries sentinel variants (`Invalid` and friends) instead.
//!
//! String parsing lives in `cspkit-parser`.

#![forbid(unsafe_code)]

pub mod directive;
pub mod percent;
pub mod policy;
pub mod source_expression;
pub mod tables;
pub mod uri;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use directive::{Directive, DirectiveKind, ReportType};
pub use policy::{Policy, PolicyComparison};
pub use source_expression::{PortSpec, SourceExpression, UriSourceExpression};
pub use tables::{PortSchemes, SchemePorts};
pub use uri::{Uri, UriKind};
