use crate::css::{
    class_names_in_rule_preludes, extract_at_blocks, extract_custom_properties, strip_comments,
};
use crate::generator::{Derived, expand_theme_variable};
use crate::resolver::StyleSource;
use regex::{Regex, RegexSet};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static FRAMEWORK_MARKERS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r#"@import\s+["'](?:tailwindcss|ironframe)["']"#,
        r#"@import\s+url\(\s*["']?(?:tailwindcss|ironframe)["']?\s*\)"#,
        r"@tailwind\s+(?:base|components|utilities)\b",
        r#"@import\s+(?:url\(\s*)?["']?(?:tailwindcss|ironframe)/[^"'\s)]+"#,
        r"@theme(?:\s+(?:inline|static|reference))*\s*\{",
    ])
    .expect("framework markers compile")
});

static UTILITY_DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@utility\s+([^\s{;]+)").expect("utility pattern compiles"));

static CUSTOM_VARIANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@custom-variant\s+([^\s({;]+)").expect("custom variant pattern compiles")
});

/// Where a class name in the vocabulary came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassOrigin {
    /// Declared as a selector in a stylesheet.
    Explicit { file: PathBuf },
    /// Declared with `@utility`.
    Utility { file: PathBuf },
    /// Derived from a `@theme` variable.
    Theme { variable: String },
    /// Present in CSS produced by an external build tool.
    Generated,
    /// Listed in the lint configuration.
    Configured,
}

impl ClassOrigin {
    fn is_authored(&self) -> bool {
        matches!(
            self,
            ClassOrigin::Explicit { .. } | ClassOrigin::Utility { .. } | ClassOrigin::Configured
        )
    }
}

impl std::fmt::Display for ClassOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassOrigin::Explicit { file } => write!(f, "selector in {}", file.display()),
            ClassOrigin::Utility { file } => write!(f, "@utility in {}", file.display()),
            ClassOrigin::Theme { variable } => write!(f, "theme variable --{}", variable),
            ClassOrigin::Generated => write!(f, "generated css"),
            ClassOrigin::Configured => write!(f, "configuration"),
        }
    }
}

/// Every class name, theme variable and variant a session knows about.
///
/// Only ever grows while it is being built. Authored names (selectors,
/// `@utility`, configuration) take precedence over derived ones, so a theme
/// token can never shadow a hand-written override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    classes: BTreeMap<String, ClassOrigin>,
    theme_variables: BTreeMap<String, String>,
    functional_utilities: BTreeSet<String>,
    custom_variants: BTreeSet<String>,
    has_base_framework_import: bool,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    pub fn origin(&self, class: &str) -> Option<&ClassOrigin> {
        self.classes.get(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = (&str, &ClassOrigin)> {
        self.classes
            .iter()
            .map(|(class, origin)| (class.as_str(), origin))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn has_base_framework_import(&self) -> bool {
        self.has_base_framework_import
    }

    pub fn mark_base_framework_import(&mut self) {
        self.has_base_framework_import = true;
    }

    pub fn has_theme_variable(&self, name: &str) -> bool {
        self.theme_variables.contains_key(name)
    }

    pub fn theme_variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.theme_variables
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn custom_variants(&self) -> &BTreeSet<String> {
        &self.custom_variants
    }

    /// True when `class` is `<prefix>-<value>` for a functional `@utility
    /// <prefix>-*` declaration.
    pub fn matches_functional_utility(&self, class: &str) -> bool {
        self.functional_utilities.iter().any(|prefix| {
            class
                .strip_prefix(prefix.as_str())
                .is_some_and(|value| !value.is_empty())
        })
    }

    /// Records an authored class. Replaces a derived origin, keeps an earlier
    /// authored one.
    pub fn insert_authored(&mut self, class: String, origin: ClassOrigin) {
        match self.classes.get(&class) {
            Some(existing) if existing.is_authored() => {}
            _ => {
                log::debug!("class '{}' from {}", class, origin);
                self.classes.insert(class, origin);
            }
        }
    }

    /// Records a derived class unless the name is already known. Returns
    /// whether it was added.
    pub fn insert_derived(&mut self, class: String, origin: ClassOrigin) -> bool {
        if self.classes.contains_key(&class) {
            log::debug!("class '{}' already declared, not deriving it again", class);
            return false;
        }
        log::debug!("class '{}' from {}", class, origin);
        self.classes.insert(class, origin);
        true
    }

    pub fn add_theme_variable(&mut self, name: &str, value: &str) {
        self.theme_variables
            .insert(name.to_string(), value.to_string());
    }

    pub fn add_functional_utility(&mut self, prefix: &str) {
        self.functional_utilities.insert(prefix.to_string());
    }

    pub fn add_custom_variant(&mut self, name: &str) {
        self.custom_variants.insert(name.to_string());
    }

    /// Adds classes from configuration unconditionally.
    pub fn extend_configured<I, S>(&mut self, classes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for class in classes {
            let class = class.as_ref().trim();
            if !class.is_empty() {
                self.insert_authored(class.to_string(), ClassOrigin::Configured);
            }
        }
    }
}

/// Scans one stylesheet and merges what it declares into `vocabulary`.
pub fn extract_stylesheet(source: &StyleSource, vocabulary: &mut Vocabulary) {
    let css = strip_comments(&source.text);
    let path = source.path.as_path();

    if contains_framework_marker(&css) {
        if !vocabulary.has_base_framework_import() {
            log::debug!("base framework import found in {}", path.display());
        }
        vocabulary.mark_base_framework_import();
    }

    let explicit = extract_explicit_classes(&css);
    for class in &explicit {
        vocabulary.insert_authored(
            class.clone(),
            ClassOrigin::Explicit {
                file: path.to_path_buf(),
            },
        );
    }

    extract_utility_directives(&css, path, vocabulary);

    for name in CUSTOM_VARIANT_RE
        .captures_iter(&css)
        .filter_map(|caps| caps.get(1))
    {
        log::debug!("custom variant '{}' in {}", name.as_str(), path.display());
        vocabulary.add_custom_variant(name.as_str());
    }

    for (name, value) in extract_theme_variables(&css) {
        vocabulary.add_theme_variable(name, value);
        for derived in expand_theme_variable(name) {
            match derived {
                Derived::Class(class) => {
                    if explicit.contains(&class) {
                        log::debug!(
                            "--{} would derive '{}', but {} declares it explicitly",
                            name,
                            class,
                            path.display()
                        );
                        continue;
                    }
                    vocabulary.insert_derived(
                        class,
                        ClassOrigin::Theme {
                            variable: name.to_string(),
                        },
                    );
                }
                Derived::Variant(variant) => {
                    log::debug!("--{} adds variant '{}'", name, variant);
                    vocabulary.add_custom_variant(&variant);
                }
            }
        }
    }
}

/// Adds the selectors of already generated CSS (a build tool's output) with
/// origin [`ClassOrigin::Generated`].
pub fn extract_generated_css(css: &str, vocabulary: &mut Vocabulary) -> usize {
    let css = strip_comments(css);
    extract_explicit_classes(&css)
        .into_iter()
        .filter(|class| vocabulary.insert_derived(class.clone(), ClassOrigin::Generated))
        .count()
}

pub fn contains_framework_marker(css: &str) -> bool {
    FRAMEWORK_MARKERS.is_match(css)
}

/// Explicit class selectors of a comment-free stylesheet, in first-seen order.
pub fn extract_explicit_classes(css: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    class_names_in_rule_preludes(css)
        .into_iter()
        .filter(|class| seen.insert(class.clone()))
        .collect()
}

/// `(name, value)` for every custom property declared in a `@theme` block.
pub fn extract_theme_variables(css: &str) -> Vec<(&str, &str)> {
    extract_at_blocks(css, "theme")
        .into_iter()
        .flat_map(|block| extract_custom_properties(block.body))
        .collect()
}

fn extract_utility_directives(css: &str, path: &Path, vocabulary: &mut Vocabulary) {
    for name in UTILITY_DIRECTIVE_RE
        .captures_iter(css)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str())
    {
        if let Some(prefix) = name.strip_suffix('*') {
            log::debug!("functional utility '{}' in {}", name, path.display());
            vocabulary.add_functional_utility(prefix);
            continue;
        }
        vocabulary.insert_authored(
            name.to_string(),
            ClassOrigin::Utility {
                file: path.to_path_buf(),
            },
        );
    }
}
