//! Rules derived from plugin metadata.
//!
//! Each plugin record can declare its own `incompatible_with`, `requires` and
//! `recommends` lists. [`derive_rules`] flattens them into ordinary
//! [`CompatibilityRule`]s so the validator only ever sees one rule list.

use crate::builtin::builtin_rules;
use crate::rule::CompatibilityRule;
use forge_core::{Plugin, PluginName};
use std::collections::HashSet;

/// Derives rules from plugin records, in plugin order.
///
/// - every `incompatible_with` entry becomes an EXCLUSIVE rule over the pair;
///   a pair declared from both sides is emitted once
/// - a non-empty `requires` list becomes one REQUIRES rule
/// - a non-empty `recommends` list becomes one RECOMMENDS rule
///
/// # Examples
///
/// ```
/// use forge_core::{Framework, Plugin};
/// use forge_rules::{RuleKind, derive_rules};
///
/// let plugins = vec![
///     Plugin::builder("jest").frameworks([Framework::React]).incompatible_with(["vitest"]).build(),
///     Plugin::builder("vitest").frameworks([Framework::React]).incompatible_with(["jest"]).build(),
/// ];
///
/// let rules = derive_rules(&plugins);
/// assert_eq!(rules.len(), 1);
/// assert_eq!(rules[0].kind(), RuleKind::Exclusive);
/// ```
#[must_use]
pub fn derive_rules(plugins: &[Plugin]) -> Vec<CompatibilityRule> {
    let mut rules = Vec::new();
    let mut seen_pairs: HashSet<(PluginName, PluginName)> = HashSet::new();

    for plugin in plugins {
        for other in &plugin.incompatible_with {
            if other == &plugin.name {
                continue;
            }
            let key = if plugin.name <= *other {
                (plugin.name.clone(), other.clone())
            } else {
                (other.clone(), plugin.name.clone())
            };
            if seen_pairs.insert(key) {
                rules.push(CompatibilityRule::exclusive(
                    [plugin.name.clone(), other.clone()],
                    format!("{} is declared incompatible with {other}", plugin.name),
                ));
            }
        }

        if !plugin.requires.is_empty() {
            rules.push(CompatibilityRule::requires(
                plugin.name.clone(),
                plugin.requires.iter().cloned(),
                format!("{} declares these as required", plugin.name),
            ));
        }

        if !plugin.recommends.is_empty() {
            rules.push(CompatibilityRule::recommends(
                plugin.name.clone(),
                plugin.recommends.iter().cloned(),
                format!("{} is commonly used with them", plugin.name),
            ));
        }
    }

    tracing::trace!(plugins = plugins.len(), rules = rules.len(), "Derived rules");
    rules
}

/// The built-in table followed by rules derived from `plugins`.
#[must_use]
pub fn rule_set(plugins: &[Plugin]) -> Vec<CompatibilityRule> {
    let mut rules = builtin_rules();
    rules.extend(derive_rules(plugins));
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleKind;
    use forge_core::Framework;

    fn plugin(name: &str) -> forge_core::PluginBuilder {
        Plugin::builder(name).frameworks([Framework::React])
    }

    #[test]
    fn test_requires_and_recommends() {
        let plugins = vec![
            plugin("tailwindcss")
                .requires(["postcss", "autoprefixer"])
                .recommends(["prettier-plugin-tailwindcss"])
                .build(),
        ];
        let rules = derive_rules(&plugins);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].kind(), RuleKind::Requires);
        assert_eq!(rules[1].kind(), RuleKind::Recommends);
    }

    #[test]
    fn test_one_sided_incompatibility() {
        let plugins = vec![plugin("mobx").incompatible_with(["zustand", "jotai"]).build()];
        let rules = derive_rules(&plugins);
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|r| r.mentions(&PluginName::new("mobx"))));
    }

    #[test]
    fn test_self_incompatibility_ignored() {
        let plugins = vec![plugin("odd").incompatible_with(["odd"]).build()];
        assert!(derive_rules(&plugins).is_empty());
    }

    #[test]
    fn test_plain_plugins_derive_nothing() {
        let plugins = vec![plugin("a").build(), plugin("b").build()];
        assert!(derive_rules(&plugins).is_empty());
    }

    #[test]
    fn test_rule_set_puts_builtin_first() {
        let plugins = vec![plugin("a").requires(["b"]).build()];
        let rules = rule_set(&plugins);
        let builtin = builtin_rules();
        assert_eq!(rules.len(), builtin.len() + 1);
        assert_eq!(&rules[..builtin.len()], builtin.as_slice());
    }
}
