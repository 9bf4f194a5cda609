use crate::classifier;
use crate::variants::{parse_variants, strip_important, strip_variant_with};
use crate::vocabulary::{ClassOrigin, Vocabulary};
use regex::Regex;
use std::sync::LazyLock;

/// Opacity (`/50`, `/2.5`) or line-height (`/7`) modifiers, plus their
/// arbitrary (`/[0.3]`) and variable (`/(--alpha)`) forms.
static MODIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+(?:\.\d+)?|\[[^\]]+\]|\([^)]+\))$").expect("modifier grammar compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyOptions {
    pub allow_arbitrary_values: bool,
    pub suppress_overridden_defaults: bool,
}

impl Default for PolicyOptions {
    fn default() -> Self {
        Self {
            allow_arbitrary_values: true,
            suppress_overridden_defaults: true,
        }
    }
}

/// Decides whether a single class token resolves to something.
///
/// In order: arbitrary values (when allowed), the token itself in the
/// vocabulary, the token with its variants stripped, a theme or generated
/// utility carrying an opacity or line-height modifier, and finally the
/// structural classifier, which only applies when the project imports the
/// framework.
pub fn is_valid(token: &str, vocabulary: &Vocabulary, options: PolicyOptions) -> bool {
    let cleaned = strip_important(token);
    if cleaned.is_empty() {
        return false;
    }
    let custom_variants = vocabulary.custom_variants();
    let base = strip_variant_with(cleaned, custom_variants)
        .map(strip_important)
        .unwrap_or(cleaned);

    // An unrecognized head leaves a colon in the base; only a bare base can
    // be an arbitrary value.
    let arbitrary = parse_variants(base).0.is_empty() && is_arbitrary(base);
    if arbitrary && options.allow_arbitrary_values {
        log::debug!("'{}' uses an arbitrary value", token);
        return true;
    }

    if resolves(cleaned, vocabulary) {
        return true;
    }
    if base != cleaned && resolves(base, vocabulary) {
        log::debug!("'{}' resolves through its base '{}'", token, base);
        return true;
    }
    let unmodified = without_modifier(base);
    if unmodified.is_some_and(|name| accepts_modifier(name, vocabulary)) {
        log::debug!("'{}' applies a modifier to a utility", token);
        return true;
    }

    if !vocabulary.has_base_framework_import() || arbitrary {
        return false;
    }
    if !classifier::matches(cleaned, custom_variants) {
        return false;
    }
    // Modified forms of resolved names are never overridden defaults.
    let modifies_known = unmodified.is_some_and(|name| resolves(name, vocabulary));
    if options.suppress_overridden_defaults && !modifies_known {
        if let Some(slot) = classifier::overridden_default_slots(base)
            .into_iter()
            .find(|slot| vocabulary.has_theme_variable(slot))
        {
            log::debug!(
                "'{}' refers to a default the theme replaces with --{}",
                token,
                slot
            );
            return false;
        }
    }
    true
}

fn resolves(class: &str, vocabulary: &Vocabulary) -> bool {
    vocabulary.contains(class) || vocabulary.matches_functional_utility(class)
}

/// The `name` of `name/modifier` when the modifier has an opacity or
/// line-height shape.
fn without_modifier(base: &str) -> Option<&str> {
    let (name, modifier) = base.rsplit_once('/')?;
    (!name.is_empty() && MODIFIER_RE.is_match(modifier)).then_some(name)
}

fn accepts_modifier(name: &str, vocabulary: &Vocabulary) -> bool {
    match vocabulary.origin(name) {
        Some(ClassOrigin::Theme { .. } | ClassOrigin::Generated) => true,
        Some(_) => false,
        None => vocabulary.matches_functional_utility(name),
    }
}

fn is_arbitrary(base: &str) -> bool {
    base.find('[')
        .is_some_and(|open| base[open + 1..].contains(']'))
}
