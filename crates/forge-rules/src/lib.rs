//! Declarative compatibility rules and the plugin selection validator.
//!
//! The validator is a pure function over a plugin selection and an ordered
//! rule list. Rule violations are returned as data in a [`ValidationResult`];
//! only malformed rule files produce errors.
//!
//! # Rule sources
//!
//! - [`builtin_rules`]: the hard-coded table
//! - [`derive_rules`]: rules flattened from plugin metadata
//! - [`load_rules`]: user rule files in JSON or TOML
//!
//! # Examples
//!
//! ```
//! use forge_core::{Framework, Plugin};
//! use forge_rules::{rule_set, validate};
//!
//! let plugins = vec![
//!     Plugin::builder("zustand").frameworks([Framework::React]).build(),
//!     Plugin::builder("jotai").frameworks([Framework::React]).build(),
//! ];
//!
//! let result = validate(&plugins, &rule_set(&plugins));
//! assert!(!result.valid);
//! println!("{}", result.summary());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod builtin;
mod derive;
mod rule;
mod validator;

pub use builtin::builtin_rules;
pub use derive::{derive_rules, rule_set};
pub use rule::{CompatibilityRule, RuleKind, Severity, load_rules, rules_from_json, rules_from_toml};
pub use validator::{
    CompatibilityValidator, ValidationResult, Violation, check_project, validate, validate_names,
};
