//! Maps theme variables to the utility names the framework derives from them.

const COLOR_UTILITIES: [&str; 16] = [
    "text",
    "bg",
    "border",
    "decoration",
    "outline",
    "ring",
    "ring-offset",
    "shadow",
    "accent",
    "caret",
    "fill",
    "stroke",
    "from",
    "via",
    "to",
    "divide",
];

const BORDER_SIDES: [&str; 12] = [
    "t", "r", "b", "l", "x", "y", "s", "e", "is", "ie", "bs", "be",
];

const SPACING_UTILITIES: [&str; 17] = [
    "p", "m", "px", "py", "pt", "pr", "pb", "pl", "mx", "my", "mt", "mr", "mb", "ml", "gap",
    "space-x", "space-y",
];

/// Something a theme variable contributes to the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derived {
    Class(String),
    Variant(String),
}

#[derive(Debug, Clone, Copy)]
enum Namespace {
    Color,
    Animate,
    Shadow,
    Radius,
    Spacing,
    Text,
    FontFamily,
    FontWeight,
    FontSize,
    Font,
    Tracking,
    Leading,
    Blur,
    DropShadow,
    InsetShadow,
    TextShadow,
    Ease,
    Aspect,
    Perspective,
    Container,
    Breakpoint,
}

/// Ordered so that a longer prefix always wins over one it extends
/// (`font-weight-` before `font-`, `text-shadow-` before `text-`).
const NAMESPACES: [(&str, Namespace); 21] = [
    ("font-family-", Namespace::FontFamily),
    ("font-weight-", Namespace::FontWeight),
    ("font-size-", Namespace::FontSize),
    ("inset-shadow-", Namespace::InsetShadow),
    ("drop-shadow-", Namespace::DropShadow),
    ("text-shadow-", Namespace::TextShadow),
    ("perspective-", Namespace::Perspective),
    ("breakpoint-", Namespace::Breakpoint),
    ("container-", Namespace::Container),
    ("tracking-", Namespace::Tracking),
    ("leading-", Namespace::Leading),
    ("animate-", Namespace::Animate),
    ("spacing-", Namespace::Spacing),
    ("radius-", Namespace::Radius),
    ("shadow-", Namespace::Shadow),
    ("aspect-", Namespace::Aspect),
    ("color-", Namespace::Color),
    ("blur-", Namespace::Blur),
    ("ease-", Namespace::Ease),
    ("text-", Namespace::Text),
    ("font-", Namespace::Font),
];

/// Expands a theme variable name (without its leading `--`) into derived
/// utilities. Unknown namespaces, namespace resets (`color-*`) and
/// sub-properties (`text-lg--line-height`) yield nothing.
pub fn expand_theme_variable(name: &str) -> Vec<Derived> {
    if name.contains('*') || name.contains("--") {
        return Vec::new();
    }
    let Some((namespace, suffix)) = NAMESPACES.iter().find_map(|(prefix, namespace)| {
        name.strip_prefix(prefix)
            .filter(|suffix| !suffix.is_empty())
            .map(|suffix| (*namespace, suffix))
    }) else {
        return Vec::new();
    };

    match namespace {
        Namespace::Color => {
            let mut derived = COLOR_UTILITIES
                .iter()
                .map(|utility| class(utility, suffix))
                .collect::<Vec<_>>();
            derived.extend(
                BORDER_SIDES
                    .iter()
                    .map(|side| class(&format!("border-{}", side), suffix)),
            );
            derived
        }
        Namespace::Spacing => SPACING_UTILITIES
            .iter()
            .map(|utility| class(utility, suffix))
            .collect(),
        Namespace::Animate => vec![class("animate", suffix)],
        Namespace::Shadow => vec![class("shadow", suffix)],
        Namespace::Radius => vec![class("rounded", suffix)],
        Namespace::Text | Namespace::FontSize => vec![class("text", suffix)],
        Namespace::FontFamily | Namespace::FontWeight | Namespace::Font => {
            vec![class("font", suffix)]
        }
        Namespace::Tracking => vec![class("tracking", suffix)],
        Namespace::Leading => vec![class("leading", suffix)],
        Namespace::Blur => vec![class("blur", suffix), class("backdrop-blur", suffix)],
        Namespace::DropShadow => vec![class("drop-shadow", suffix)],
        Namespace::InsetShadow => vec![class("inset-shadow", suffix)],
        Namespace::TextShadow => vec![class("text-shadow", suffix)],
        Namespace::Ease => vec![class("ease", suffix)],
        Namespace::Aspect => vec![class("aspect", suffix)],
        Namespace::Perspective => vec![class("perspective", suffix)],
        Namespace::Container => vec![
            class("w", suffix),
            class("max-w", suffix),
            class("min-w", suffix),
        ],
        Namespace::Breakpoint => vec![Derived::Variant(suffix.to_string())],
    }
}

fn class(utility: &str, suffix: &str) -> Derived {
    Derived::Class(format!("{}-{}", utility, suffix))
}

#[cfg(test)]
mod tests {
    use super::{Derived, expand_theme_variable};

    fn classes(name: &str) -> Vec<String> {
        expand_theme_variable(name)
            .into_iter()
            .filter_map(|derived| match derived {
                Derived::Class(class) => Some(class),
                Derived::Variant(_) => None,
            })
            .collect()
    }

    #[test]
    fn color_variables_cover_every_color_utility_and_border_side() {
        let derived = classes("color-primary");
        assert_eq!(derived.len(), 28);
        for expected in [
            "text-primary",
            "bg-primary",
            "ring-offset-primary",
            "divide-primary",
            "from-primary",
            "border-x-primary",
            "border-be-primary",
        ] {
            assert!(derived.contains(&expected.to_string()), "{}", expected);
        }
    }

    #[test]
    fn spacing_variables_cover_padding_margin_gap_and_space() {
        let derived = classes("spacing-lg");
        assert!(derived.contains(&"p-lg".to_string()));
        assert!(derived.contains(&"mx-lg".to_string()));
        assert!(derived.contains(&"space-y-lg".to_string()));
        assert!(!derived.contains(&"w-lg".to_string()));
    }

    #[test]
    fn font_namespaces_pick_the_longest_prefix() {
        assert_eq!(classes("font-weight-semibold"), vec!["font-semibold"]);
        assert_eq!(classes("font-family-display"), vec!["font-display"]);
        assert_eq!(classes("font-size-huge"), vec!["text-huge"]);
        assert_eq!(classes("font-brand"), vec!["font-brand"]);
    }

    #[test]
    fn single_utility_namespaces() {
        assert_eq!(classes("radius-card"), vec!["rounded-card"]);
        assert_eq!(classes("shadow-soft"), vec!["shadow-soft"]);
        assert_eq!(classes("animate-wiggle"), vec!["animate-wiggle"]);
        assert_eq!(classes("text-button"), vec!["text-button"]);
        assert_eq!(classes("text-shadow-glow"), vec!["text-shadow-glow"]);
        assert_eq!(classes("blur-huge"), vec!["blur-huge", "backdrop-blur-huge"]);
    }

    #[test]
    fn breakpoints_register_variants() {
        assert_eq!(
            expand_theme_variable("breakpoint-3xl"),
            vec![Derived::Variant("3xl".to_string())]
        );
    }

    #[test]
    fn unknown_and_special_names_are_inert() {
        assert!(expand_theme_variable("brand-primary").is_empty());
        assert!(expand_theme_variable("color-*").is_empty());
        assert!(expand_theme_variable("text-lg--line-height").is_empty());
        assert!(expand_theme_variable("color-").is_empty());
        assert!(expand_theme_variable("spacing").is_empty());
    }
}
