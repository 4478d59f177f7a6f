//! Inclusion and exclusion rules deciding which specs are visible.
//!
//! Rules are pure predicates over a [`Spec`], optionally restricted to one
//! [`SpecCategory`]. A [`RuleSet`] evaluates them:
//!
//! - with no applicable rule, a spec is included;
//! - if any applicable exclusion rule matches, the spec is excluded, whatever the
//!   inclusion rules say;
//! - if applicable inclusion rules exist, at least one of them must match.
//!
//! Excluded specs stay in the graph, so edges pointing at them remain intact; they
//! are only skipped by the build driver and filtered from listings.
//!
//! # Examples
//!
//! ```rust
//! use dotspec::rules::{ExclusionRule, InclusionRule, RuleSet};
//!
//! let rules = RuleSet::new()
//!     .with_inclusion(InclusionRule::name_prefix("MyCompany."))
//!     .with_exclusion(ExclusionRule::system());
//! assert_eq!(rules.inclusions().len(), 1);
//! ```

use std::{fmt, sync::Arc};

use crate::spec::{Spec, SpecCategory};

/// A pure predicate over a spec.
pub trait SpecPredicate: Send + Sync {
    /// Whether `spec` satisfies the predicate.
    fn matches(&self, spec: &Spec) -> bool;
}

impl<F> SpecPredicate for F
where
    F: Fn(&Spec) -> bool + Send + Sync,
{
    fn matches(&self, spec: &Spec) -> bool {
        self(spec)
    }
}

/// Common part of inclusion and exclusion rules.
#[derive(Clone)]
struct Rule {
    category: Option<SpecCategory>,
    predicate: Arc<dyn SpecPredicate>,
}

impl Rule {
    fn applies_to(&self, spec: &Spec) -> bool {
        self.category
            .map_or(true, |category| category == spec.category())
    }

    fn matches(&self, spec: &Spec) -> bool {
        self.predicate.matches(spec)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

macro_rules! rule_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug)]
        pub struct $name(Rule);

        impl $name {
            /// A rule for every spec category.
            pub fn new(predicate: impl SpecPredicate + 'static) -> Self {
                $name(Rule {
                    category: None,
                    predicate: Arc::new(predicate),
                })
            }

            /// A rule that only applies to specs of `category`.
            pub fn for_category(
                category: SpecCategory,
                predicate: impl SpecPredicate + 'static,
            ) -> Self {
                $name(Rule {
                    category: Some(category),
                    predicate: Arc::new(predicate),
                })
            }

            /// Matches specs whose canonical name starts with `prefix`.
            #[must_use]
            pub fn name_prefix(prefix: &str) -> Self {
                let prefix = prefix.to_string();
                Self::new(move |spec: &Spec| spec.name().starts_with(&prefix))
            }

            /// Matches specs of runtime-provided assemblies.
            #[must_use]
            pub fn system() -> Self {
                Self::new(|spec: &Spec| spec.is_system())
            }

            /// The category this rule is restricted to.
            #[must_use]
            pub fn category(&self) -> Option<SpecCategory> {
                self.0.category
            }

            /// Evaluate the predicate, ignoring the category restriction.
            #[must_use]
            pub fn matches(&self, spec: &Spec) -> bool {
                self.0.matches(spec)
            }
        }
    };
}

rule_type!(
    /// A rule that admits matching specs.
    InclusionRule
);

rule_type!(
    /// A rule that hides matching specs; always wins over inclusion rules.
    ExclusionRule
);

/// An ordered collection of inclusion and exclusion rules.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    inclusions: Vec<InclusionRule>,
    exclusions: Vec<ExclusionRule>,
}

impl RuleSet {
    /// A rule set without rules; every spec is included.
    #[must_use]
    pub fn new() -> Self {
        RuleSet::default()
    }

    /// Add an inclusion rule.
    pub fn add_inclusion(&mut self, rule: InclusionRule) {
        self.inclusions.push(rule);
    }

    /// Add an exclusion rule.
    pub fn add_exclusion(&mut self, rule: ExclusionRule) {
        self.exclusions.push(rule);
    }

    /// Builder form of [`RuleSet::add_inclusion`].
    #[must_use]
    pub fn with_inclusion(mut self, rule: InclusionRule) -> Self {
        self.add_inclusion(rule);
        self
    }

    /// Builder form of [`RuleSet::add_exclusion`].
    #[must_use]
    pub fn with_exclusion(mut self, rule: ExclusionRule) -> Self {
        self.add_exclusion(rule);
        self
    }

    /// Registered inclusion rules.
    #[must_use]
    pub fn inclusions(&self) -> &[InclusionRule] {
        &self.inclusions
    }

    /// Registered exclusion rules.
    #[must_use]
    pub fn exclusions(&self) -> &[ExclusionRule] {
        &self.exclusions
    }

    /// Whether `spec` is visible under these rules.
    #[must_use]
    pub fn is_included(&self, spec: &Spec) -> bool {
        if self
            .exclusions
            .iter()
            .any(|rule| rule.0.applies_to(spec) && rule.0.matches(spec))
        {
            return false;
        }

        let mut applicable = self
            .inclusions
            .iter()
            .filter(|rule| rule.0.applies_to(spec))
            .peekable();

        if applicable.peek().is_none() {
            return true;
        }

        applicable.any(|rule| rule.0.matches(spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{SpecKind, TypeData};

    fn type_spec(name: &str, is_system: bool) -> Spec {
        Spec::new(name, is_system, SpecKind::Type(TypeData::missing(None, name)))
    }

    #[test]
    fn default_is_included() {
        assert!(RuleSet::new().is_included(&type_spec("Any.Type", false)));
    }

    #[test]
    fn exclusion_wins() {
        let rules = RuleSet::new()
            .with_inclusion(InclusionRule::name_prefix("System."))
            .with_exclusion(ExclusionRule::system());

        assert!(!rules.is_included(&type_spec("System.String", true)));
    }

    #[test]
    fn inclusion_requires_a_match() {
        let rules = RuleSet::new().with_inclusion(InclusionRule::name_prefix("App."));
        assert!(rules.is_included(&type_spec("App.Main", false)));
        assert!(!rules.is_included(&type_spec("Lib.Helper", false)));
    }

    #[test]
    fn category_restriction() {
        let rules = RuleSet::new().with_inclusion(InclusionRule::for_category(
            SpecCategory::Method,
            |_: &Spec| false,
        ));

        // the only inclusion rule targets methods, so types are unaffected
        assert!(rules.is_included(&type_spec("App.Main", false)));
        assert_eq!(rules.inclusions()[0].category(), Some(SpecCategory::Method));
    }
}
