//! The built-in rule table.

use crate::rule::CompatibilityRule;

/// State-management libraries that each own the application store.
const STATE_MANAGERS: [&str; 5] = ["@reduxjs/toolkit", "zustand", "jotai", "mobx", "pinia"];

/// Returns the hard-coded compatibility rules, in evaluation order.
///
/// Rules derived from plugin records (see [`derive_rules`](crate::derive_rules))
/// are appended after these by [`rule_set`](crate::rule_set).
#[must_use]
pub fn builtin_rules() -> Vec<CompatibilityRule> {
    vec![
        CompatibilityRule::exclusive(
            STATE_MANAGERS,
            "Multiple state management libraries compete for the same store",
        ),
        CompatibilityRule::exclusive(
            ["react-router-dom", "@tanstack/react-router"],
            "Only one client-side router can own navigation",
        ),
        CompatibilityRule::exclusive(
            ["vue-router", "@tanstack/vue-router"],
            "Only one client-side router can own navigation",
        ),
        CompatibilityRule::requires(
            "tailwindcss",
            ["postcss", "autoprefixer"],
            "Tailwind CSS runs as a PostCSS plugin",
        )
        .with_override(true),
        CompatibilityRule::conflict(
            ["tailwindcss", "bootstrap", "bulma"],
            "CSS frameworks ship competing resets and utility classes",
        ),
        CompatibilityRule::conflict(
            ["styled-components", "@emotion/styled"],
            "Two CSS-in-JS runtimes inflate the bundle",
        ),
        CompatibilityRule::exclusive(
            ["vitest", "jest"],
            "Two test runners would fight over the same test files",
        )
        .with_override(true),
        CompatibilityRule::exclusive(
            ["axios", "ky"],
            "Pick a single HTTP client",
        )
        .with_severity(crate::Severity::Warning)
        .with_override(true),
        CompatibilityRule::recommends("eslint", ["prettier"], "Prettier handles formatting"),
        CompatibilityRule::recommends(
            "@tanstack/react-query",
            ["@tanstack/react-query-devtools"],
            "Devtools make cache state visible",
        ),
        CompatibilityRule::recommends("react-hook-form", ["zod"], "Schema-based validation"),
    ]
}
