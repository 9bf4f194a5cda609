//! Structural recognition of framework utilities.
//!
//! The framework's own utilities are never listed anywhere the lint can read,
//! so they are recognized by shape: a family of anchored patterns per concern,
//! compiled once into a [`RegexSet`].

use crate::variants::{is_variant, parse_variants, strip_important};
use regex::{Regex, RegexSet};
use std::collections::BTreeSet;
use std::sync::LazyLock;

const PALETTE: &str = "slate|gray|zinc|neutral|stone|red|orange|amber|yellow|lime|green|\
emerald|teal|cyan|sky|blue|indigo|violet|purple|fuchsia|pink|rose";

const SHADES: &str = "50|100|200|300|400|500|600|700|800|900|950";

const COLOR_PREFIXES: &str = "text|bg|border|border-[trblxyse]|border-(?:is|ie|bs|be)|\
decoration|outline|ring|ring-offset|shadow|inset-shadow|inset-ring|drop-shadow|text-shadow|\
accent|caret|fill|stroke|from|via|to|divide|placeholder";

const SPACING: &str = r"(?:\d+(?:\.\d+)?|px)";

const SPACING_UTILITIES: &str = "p|px|py|pt|pr|pb|pl|ps|pe|m|mx|my|mt|mr|mb|ml|ms|me|\
gap|gap-x|gap-y|space-x|space-y";

const TEXT_SIZES: &str = "xs|sm|base|lg|xl|[2-9]xl";

const FONT_WEIGHTS: &str = "thin|extralight|light|normal|medium|semibold|bold|extrabold|black";

const RADIUS_SIZES: &str = "none|xs|sm|md|lg|xl|2xl|3xl|4xl|full";

const SHADOW_SIZES: &str = "2xs|xs|sm|md|lg|xl|2xl|inner|none";

const NAMED_SIZES: &str = "3xs|2xs|xs|sm|md|lg|xl|[2-7]xl";

fn color_value() -> String {
    format!(
        r"(?:(?:{PALETTE})-(?:{SHADES})|inherit|current|transparent|black|white)(?:/(?:\d{{1,3}}|\[[^\]]+\]|\([^)]+\)))?"
    )
}

fn families() -> Vec<(&'static str, Vec<String>)> {
    let color = color_value();
    vec![
        (
            "container queries",
            vec![
                r"@container(?:/[\w-]+)?".to_string(),
                "@container-(?:normal|size)".to_string(),
            ],
        ),
        (
            "layout",
            vec![
                "container|block|inline-block|inline|flex|inline-flex|grid|inline-grid|contents|\
flow-root|hidden|list-item|table|inline-table|table-caption|table-cell|table-column|\
table-column-group|table-footer-group|table-header-group|table-row-group|table-row"
                    .to_string(),
                "box-(?:border|content)|box-decoration-(?:clone|slice)".to_string(),
                "(?:float|clear)-(?:left|right|start|end|none|both)".to_string(),
                "isolate|isolation-auto".to_string(),
                "object-(?:contain|cover|fill|none|scale-down|center|top|bottom|left|right|\
left-top|left-bottom|right-top|right-bottom|top-left|top-right|bottom-left|bottom-right)"
                    .to_string(),
                format!(r"columns-(?:\d+|auto|{NAMED_SIZES})"),
                "break-(?:after|before)-(?:auto|avoid|all|avoid-page|page|left|right|column)|\
break-inside-(?:auto|avoid|avoid-page|avoid-column)"
                    .to_string(),
                r"aspect-(?:auto|square|video|\d+/\d+)".to_string(),
            ],
        ),
        (
            "flexbox and grid",
            vec![
                r"flex-(?:row|row-reverse|col|col-reverse|wrap|wrap-reverse|nowrap|auto|initial|none|\d+)"
                    .to_string(),
                r"(?:grow|shrink)(?:-\d+)?".to_string(),
                format!(r"basis-(?:{SPACING}|\d+/\d+|full|auto|{NAMED_SIZES})"),
                r"-?order-(?:\d+|first|last|none)".to_string(),
                r"grid-(?:cols|rows)-(?:\d+|none|subgrid)".to_string(),
                "grid-flow-(?:row|col|dense|row-dense|col-dense)".to_string(),
                "auto-(?:cols|rows)-(?:auto|min|max|fr)".to_string(),
                "(?:justify|content|items|self|place-content|place-items|place-self|justify-items|\
justify-self)-(?:start|end|center|between|around|evenly|stretch|baseline|normal|auto|\
end-safe|center-safe|baseline-last)"
                    .to_string(),
            ],
        ),
        (
            "grid placement",
            vec![
                r"(?:col|row)-(?:auto|span-(?:\d+|full)|start-(?:\d+|auto)|end-(?:\d+|auto)|\d+)"
                    .to_string(),
            ],
        ),
        (
            "spacing",
            vec![
                format!("(?:p|px|py|pt|pr|pb|pl|ps|pe)-{SPACING}"),
                format!("-?(?:m|mx|my|mt|mr|mb|ml|ms|me)-(?:{SPACING}|auto)"),
                format!("gap(?:-[xy])?-{SPACING}"),
                format!("-?space-[xy]-{SPACING}|space-[xy]-reverse"),
            ],
        ),
        (
            "sizing",
            vec![format!(
                r"(?:w|h|min-w|min-h|max-w|max-h|size|inline|block|min-inline|max-inline|min-block|max-block)-(?:{SPACING}|\d+/\d+|full|screen|svw|lvw|dvw|svh|lvh|dvh|min|max|fit|auto|prose|none|lh|{NAMED_SIZES}|screen-(?:sm|md|lg|xl|2xl))"
            )],
        ),
        (
            "typography",
            vec![
                format!(r"text-(?:{TEXT_SIZES})(?:/\d+)?"),
                format!("font-(?:{FONT_WEIGHTS}|sans|serif|mono)"),
                "italic|not-italic|antialiased|subpixel-antialiased|uppercase|lowercase|capitalize|\
normal-case|underline|overline|line-through|no-underline|truncate"
                    .to_string(),
                "text-(?:left|center|right|justify|start|end|ellipsis|clip|wrap|nowrap|balance|pretty)"
                    .to_string(),
                "tracking-(?:tighter|tight|normal|wide|wider|widest)".to_string(),
                r"leading-(?:none|tight|snug|normal|relaxed|loose|\d+)".to_string(),
                "whitespace-(?:normal|nowrap|pre|pre-line|pre-wrap|break-spaces)".to_string(),
                "break-(?:normal|words|all|keep)|wrap-(?:break-word|anywhere|normal)".to_string(),
                "hyphens-(?:none|manual|auto)".to_string(),
                "align-(?:baseline|top|middle|bottom|text-top|text-bottom|sub|super)".to_string(),
                r"decoration-(?:solid|double|dotted|dashed|wavy|auto|from-font|\d+)".to_string(),
                r"underline-offset-(?:auto|\d+)".to_string(),
                format!("-?indent-{SPACING}"),
                r"line-clamp-(?:\d+|none)".to_string(),
                "normal-nums|ordinal|slashed-zero|lining-nums|oldstyle-nums|proportional-nums|\
tabular-nums|diagonal-fractions|stacked-fractions|content-none"
                    .to_string(),
            ],
        ),
        ("colors", vec![format!("(?:{COLOR_PREFIXES})-{color}")]),
        (
            "backgrounds",
            vec![
                "bg-(?:linear|gradient)-to-(?:t|tr|r|br|b|bl|l|tl)".to_string(),
                r"-?bg-linear-\d+|bg-(?:radial|conic)|bg-none".to_string(),
                "bg-(?:fixed|local|scroll|auto|cover|contain)".to_string(),
                "bg-(?:clip|origin)-(?:border|padding|content|text)".to_string(),
                "bg-(?:repeat|no-repeat|repeat-x|repeat-y|repeat-round|repeat-space)".to_string(),
                "bg-(?:bottom|center|left|left-bottom|left-top|right|right-bottom|right-top|top)"
                    .to_string(),
                r"(?:from|via|to)-\d+%".to_string(),
                r"(?:bg-blend|mix-blend)-[a-z-]+".to_string(),
            ],
        ),
        (
            "borders",
            vec![
                r"border(?:-[trblxyse]|-(?:is|ie|bs|be))?(?:-\d+)?".to_string(),
                "border-(?:solid|dashed|dotted|double|hidden|none)".to_string(),
                format!(
                    "rounded(?:-(?:t|r|b|l|s|e|tl|tr|br|bl|ss|se|es|ee))?(?:-(?:{RADIUS_SIZES}))?"
                ),
                r"outline(?:-(?:none|hidden|solid|dashed|dotted|double|\d+))?".to_string(),
                r"-?outline-offset-\d+".to_string(),
                r"(?:ring|inset-ring)(?:-\d+)?|ring-inset|ring-offset-\d+".to_string(),
                r"divide-[xy](?:-\d+|-reverse)?|divide-(?:solid|dashed|dotted|double|none)"
                    .to_string(),
            ],
        ),
        (
            "effects",
            vec![
                format!("shadow(?:-(?:{SHADOW_SIZES}))?"),
                "inset-shadow-(?:2xs|xs|sm|none)".to_string(),
                r"opacity-\d+".to_string(),
                format!("(?:backdrop-)?blur(?:-(?:none|{NAMED_SIZES}))?"),
                r"-?(?:backdrop-)?(?:brightness|contrast|saturate|hue-rotate)-\d+".to_string(),
                r"(?:backdrop-)?(?:grayscale|invert|sepia)(?:-\d+)?".to_string(),
                format!("drop-shadow(?:-(?:none|{NAMED_SIZES}))?"),
                "transition(?:-(?:all|colors|opacity|shadow|transform|none|discrete|normal))?"
                    .to_string(),
                r"(?:duration|delay)-\d+".to_string(),
                "ease-(?:linear|in|out|in-out|initial)".to_string(),
                "animate-(?:spin|ping|pulse|bounce|none)".to_string(),
                "will-change-(?:auto|scroll|contents|transform)".to_string(),
            ],
        ),
        (
            "transforms",
            vec![
                r"-?scale(?:-[xyz])?-\d+".to_string(),
                r"-?rotate(?:-[xyz])?-\d+".to_string(),
                format!(r"-?translate-[xyz]-(?:{SPACING}|\d+/\d+|full)"),
                r"-?skew(?:-[xy])?-\d+".to_string(),
                "origin-(?:center|top|top-right|right|bottom-right|bottom|bottom-left|left|top-left)"
                    .to_string(),
                "transform(?:-(?:none|gpu|cpu|3d|flat))?".to_string(),
                "perspective-(?:dramatic|near|normal|midrange|distant|none)".to_string(),
                "backface-(?:visible|hidden)".to_string(),
            ],
        ),
        (
            "positioning",
            vec![
                "static|fixed|absolute|relative|sticky".to_string(),
                format!(
                    r"-?(?:inset|inset-x|inset-y|top|right|bottom|left|start|end)-(?:{SPACING}|\d+/\d+|full|auto)"
                ),
                r"-?z-(?:\d+|auto)".to_string(),
            ],
        ),
        (
            "overflow and visibility",
            vec![
                "overflow(?:-[xy])?-(?:auto|hidden|clip|visible|scroll)".to_string(),
                "overscroll(?:-[xy])?-(?:auto|contain|none)".to_string(),
                "visible|invisible|collapse".to_string(),
                format!("-?scroll-[mp][xytrblse]?-{SPACING}|scroll-(?:auto|smooth)"),
                "snap-(?:start|end|center|align-none|normal|always|none|x|y|both|mandatory|proximity)"
                    .to_string(),
            ],
        ),
        (
            "interactivity",
            vec![
                "cursor-[a-z-]+".to_string(),
                "pointer-events-(?:none|auto)".to_string(),
                "resize(?:-(?:none|x|y))?".to_string(),
                "select-(?:none|text|all|auto)".to_string(),
                "touch-(?:auto|none|pan-x|pan-left|pan-right|pan-y|pan-up|pan-down|pinch-zoom|manipulation)"
                    .to_string(),
                "appearance-(?:none|auto)".to_string(),
                "scheme-(?:normal|dark|light|light-dark|only-dark|only-light)".to_string(),
                "field-sizing-(?:fixed|content)".to_string(),
            ],
        ),
        (
            "svg",
            vec![r"stroke-\d+|(?:fill|stroke)-none".to_string()],
        ),
        (
            "accessibility",
            vec!["sr-only|not-sr-only|forced-color-adjust-(?:auto|none)".to_string()],
        ),
        (
            "lists",
            vec!["list-(?:inside|outside|none|disc|decimal|image-none)".to_string()],
        ),
        (
            "tables",
            vec![
                "border-(?:collapse|separate)".to_string(),
                format!("border-spacing(?:-[xy])?-{SPACING}"),
                "table-(?:auto|fixed)|caption-(?:top|bottom)".to_string(),
            ],
        ),
        (
            "arbitrary",
            vec![
                r"-?[a-z][\w-]*-\[[^\]]+\](?:/[\w.%\[\]-]+)?".to_string(),
                r"\[[a-z-]+:[^\]]+\]".to_string(),
                r"-?[a-z][\w-]*-\([^)]+\)".to_string(),
            ],
        ),
        ("group markers", vec![r"(?:group|peer)(?:/[\w-]+)?".to_string()]),
    ]
}

struct Families {
    names: Vec<&'static str>,
    set: RegexSet,
}

static FAMILIES: LazyLock<Families> = LazyLock::new(|| {
    let families = families();
    let names = families.iter().map(|(name, _)| *name).collect();
    let patterns = families
        .iter()
        .map(|(_, alternatives)| format!("^(?:{})$", alternatives.join("|")));
    Families {
        names,
        set: RegexSet::new(patterns).expect("utility families compile"),
    }
});

static TEXT_SIZE_SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^text-({TEXT_SIZES})(?:/\d+)?$")).expect("text size slot compiles")
});

static FONT_WEIGHT_SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^font-({FONT_WEIGHTS})$")).expect("font weight slot compiles")
});

static COLOR_SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "^(?:{COLOR_PREFIXES})-((?:{PALETTE})-(?:{SHADES}))(?:/.+)?$"
    ))
    .expect("color slot compiles")
});

static SPACING_SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^-?(?:{SPACING_UTILITIES})-(\d+(?:\.\d+)?)$"))
        .expect("spacing slot compiles")
});

static RADIUS_SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "^rounded(?:-(?:t|r|b|l|s|e|tl|tr|br|bl|ss|se|es|ee))?-({RADIUS_SIZES})$"
    ))
    .expect("radius slot compiles")
});

static SHADOW_SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^shadow-({SHADOW_SIZES})$")).expect("shadow slot compiles")
});

/// The family `base` belongs to, if any. `base` must already be free of
/// variants and important markers.
pub fn family_of(base: &str) -> Option<&'static str> {
    FAMILIES
        .set
        .matches(base)
        .iter()
        .next()
        .map(|idx| FAMILIES.names[idx])
}

/// Whether `token` looks like a framework utility: every variant head is
/// recognized and the base belongs to a family.
pub fn matches(token: &str, custom_variants: &BTreeSet<String>) -> bool {
    let (variants, base) = parse_variants(strip_important(token));
    if base.is_empty() {
        return false;
    }
    if let Some(head) = variants
        .iter()
        .find(|head| !is_variant(head, custom_variants))
    {
        log::debug!("'{}' has unrecognized variant '{}'", token, head);
        return false;
    }
    let base = strip_important(base);
    match family_of(base) {
        Some(family) => {
            log::debug!("'{}' matches the {} family", token, family);
            true
        }
        None => false,
    }
}

/// Theme variables that, when the project declares them, replace the default
/// scale entry `base` would otherwise refer to.
pub fn overridden_default_slots(base: &str) -> Vec<String> {
    let base = strip_important(base);
    let mut slots = Vec::new();
    if let Some(caps) = TEXT_SIZE_SLOT.captures(base) {
        slots.push(format!("text-{}", &caps[1]));
        slots.push(format!("font-size-{}", &caps[1]));
    }
    if let Some(caps) = FONT_WEIGHT_SLOT.captures(base) {
        slots.push(format!("font-weight-{}", &caps[1]));
    }
    if let Some(caps) = COLOR_SLOT.captures(base) {
        slots.push(format!("color-{}", &caps[1]));
    }
    if let Some(caps) = SPACING_SLOT.captures(base) {
        slots.push(format!("spacing-{}", &caps[1]));
    }
    if let Some(caps) = RADIUS_SLOT.captures(base) {
        slots.push(format!("radius-{}", &caps[1]));
    }
    if let Some(caps) = SHADOW_SLOT.captures(base) {
        slots.push(format!("shadow-{}", &caps[1]));
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::{family_of, matches, overridden_default_slots};
    use std::collections::BTreeSet;

    fn matches_plain(token: &str) -> bool {
        matches(token, &BTreeSet::new())
    }

    #[test]
    fn recognizes_common_utilities() {
        for token in [
            "flex",
            "hidden",
            "items-center",
            "justify-between",
            "grid-cols-3",
            "col-span-2",
            "p-4",
            "px-2.5",
            "-mt-4",
            "mx-auto",
            "space-y-6",
            "w-1/2",
            "h-screen",
            "max-w-7xl",
            "size-10",
            "text-sm",
            "text-lg/7",
            "font-semibold",
            "tracking-tight",
            "truncate",
            "text-slate-700",
            "bg-white/80",
            "border-t-red-500",
            "ring-offset-blue-50",
            "bg-gradient-to-r",
            "from-10%",
            "rounded-lg",
            "rounded-tl-none",
            "border-2",
            "ring-2",
            "shadow-md",
            "opacity-50",
            "transition-colors",
            "duration-200",
            "animate-spin",
            "-translate-x-1/2",
            "rotate-45",
            "absolute",
            "-inset-1",
            "z-10",
            "overflow-y-auto",
            "cursor-pointer",
            "select-none",
            "sr-only",
            "list-disc",
            "table-fixed",
            "stroke-2",
            "group",
            "peer/email",
            "@container",
            "w-[37px]",
            "[mask-type:luminance]",
            "bg-(--brand)",
        ] {
            assert!(matches_plain(token), "{}", token);
        }
    }

    #[test]
    fn rejects_unknown_shapes() {
        for token in [
            "bg-primary",
            "text-brand",
            "custom-badge",
            "unknown-xyz",
            "p-",
            "flexx",
            "text-red-550",
            "rounded-huge",
        ] {
            assert!(!matches_plain(token), "{}", token);
        }
    }

    #[test]
    fn variants_must_all_be_recognized() {
        assert!(matches_plain("md:hover:bg-blue-500"));
        assert!(matches_plain("!p-4"));
        assert!(matches_plain("lg:!p-4"));
        assert!(matches_plain("p-4!"));
        assert!(!matches_plain("bogus:p-4"));
        assert!(!matches_plain("md:"));
        let custom = BTreeSet::from(["theme-midnight".to_string()]);
        assert!(matches("theme-midnight:bg-black", &custom));
    }

    #[test]
    fn reports_family_names() {
        assert_eq!(family_of("grid-cols-3"), Some("flexbox and grid"));
        assert_eq!(family_of("bg-red-500"), Some("colors"));
        assert_eq!(family_of("nope"), None);
    }

    #[test]
    fn maps_scale_utilities_to_theme_slots() {
        assert_eq!(
            overridden_default_slots("text-lg"),
            vec!["text-lg", "font-size-lg"]
        );
        assert_eq!(overridden_default_slots("font-bold"), vec!["font-weight-bold"]);
        assert_eq!(overridden_default_slots("bg-red-500/50"), vec!["color-red-500"]);
        assert_eq!(overridden_default_slots("-mt-4"), vec!["spacing-4"]);
        assert_eq!(overridden_default_slots("rounded-t-lg"), vec!["radius-lg"]);
        assert_eq!(overridden_default_slots("shadow-md"), vec!["shadow-md"]);
        assert!(overridden_default_slots("flex").is_empty());
        assert!(overridden_default_slots("text-center").is_empty());
    }
}
