use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

const PSEUDO_CLASSES: &str = "hover|focus|focus-within|focus-visible|active|visited|target|\
first|last|only|odd|even|first-of-type|last-of-type|only-of-type|empty|disabled|enabled|\
checked|indeterminate|default|optional|required|valid|invalid|user-valid|user-invalid|\
in-range|out-of-range|placeholder-shown|details-content|autofill|read-only|open|inert";

const PSEUDO_ELEMENTS: &str =
    "before|after|first-letter|first-line|marker|selection|file|backdrop|placeholder";

const MEDIA_KEYWORDS: &str = "dark|light|motion-safe|motion-reduce|contrast-more|contrast-less|\
forced-colors|not-forced-colors|inverted-colors|pointer-fine|pointer-coarse|pointer-none|\
any-pointer-fine|any-pointer-coarse|any-pointer-none|portrait|landscape|print|noscript|\
ltr|rtl|starting";

const BREAKPOINTS: &str = "sm|md|lg|xl|[2-7]xl";

const CONTAINER_SIZES: &str = "3xs|2xs|xs|sm|md|lg|xl|[2-7]xl";

const ARIA_STATES: &str =
    "busy|checked|disabled|expanded|hidden|pressed|readonly|required|selected";

static VARIANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    let bracket = r"\[[^\]]+\]";
    let state = format!("(?:{PSEUDO_CLASSES}|{PSEUDO_ELEMENTS})");
    let alternatives = [
        format!("(?:max-|min-)?(?:{BREAKPOINTS})"),
        format!("(?:max|min)-{bracket}"),
        format!("@(?:max-|min-)?(?:{CONTAINER_SIZES})(?:/[\\w-]+)?"),
        format!("@(?:max-|min-)?{bracket}"),
        state.clone(),
        format!(
            "(?:group|peer)-(?:{state}|(?:has|not|in|aria|data|supports)-(?:{bracket}|[a-z][\\w-]*)|{bracket})(?:/[\\w-]+)?"
        ),
        format!("(?:has|not|in)-(?:{bracket}|[a-z][\\w-]*)"),
        format!("nth(?:-last)?(?:-of-type)?-(?:\\d+|{bracket})"),
        MEDIA_KEYWORDS.to_string(),
        format!("(?:supports|data)-(?:{bracket}|[a-z][\\w-]*)"),
        format!("aria-(?:{ARIA_STATES}|{bracket})"),
        r"\*\*?".to_string(),
        bracket.to_string(),
    ];
    Regex::new(&format!("^(?:{})$", alternatives.join("|"))).expect("variant grammar compiles")
});

/// True when `head` is a variant prefix the framework understands, or one of
/// the project's own `custom` variants.
pub fn is_variant(head: &str, custom: &BTreeSet<String>) -> bool {
    if head.is_empty() {
        return false;
    }
    if custom.contains(head) {
        return true;
    }
    if !head.contains('[') {
        return VARIANT_RE.is_match(head);
    }
    collapse_brackets(head).is_some_and(|collapsed| VARIANT_RE.is_match(&collapsed))
}

/// Replaces the contents of every top-level `[...]` group with `_`, so nested
/// selectors such as `[&_[data-slot=icon]]` reduce to `[_]`. Unbalanced or
/// empty groups yield `None`.
fn collapse_brackets(head: &str) -> Option<String> {
    let mut out = String::with_capacity(head.len());
    let mut depth = 0usize;
    let mut group_len = 0usize;
    for ch in head.chars() {
        match ch {
            '[' => {
                if depth == 0 {
                    out.push('[');
                    group_len = 0;
                } else {
                    group_len += 1;
                }
                depth += 1;
            }
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    if group_len == 0 {
                        return None;
                    }
                    out.push_str("_]");
                } else {
                    group_len += 1;
                }
            }
            _ if depth > 0 => group_len += 1,
            _ => out.push(ch),
        }
    }
    (depth == 0).then_some(out)
}

/// Drops the important marker in either position (`!flex`, `flex!`).
pub fn strip_important(token: &str) -> &str {
    let token = token.strip_prefix('!').unwrap_or(token);
    token.strip_suffix('!').unwrap_or(token)
}

/// Splits a class at its top-level colons, ignoring colons nested in `[]` or
/// `()`, into its variant heads and the base utility.
pub fn parse_variants(class: &str) -> (Vec<&str>, &str) {
    let mut variants = Vec::new();
    let mut start = 0usize;
    let mut rest = class;
    while let Some(idx) = first_top_level_colon(rest) {
        variants.push(&class[start..start + idx]);
        start += idx + 1;
        rest = &class[start..];
    }
    (variants, rest)
}

/// Strips recognized variant prefixes from the front of `token` until the
/// next head is not a variant. Returns the remainder when anything was
/// stripped.
pub fn strip_variant(token: &str) -> Option<&str> {
    strip_variant_with(token, &BTreeSet::new())
}

pub fn strip_variant_with<'a>(token: &'a str, custom: &BTreeSet<String>) -> Option<&'a str> {
    let mut rest = token.strip_prefix('!').unwrap_or(token);
    while let Some(idx) = first_top_level_colon(rest) {
        let head = &rest[..idx];
        if !is_variant(head, custom) {
            log::debug!("'{}' in '{}' is not a known variant", head, token);
            break;
        }
        rest = &rest[idx + 1..];
    }
    (!rest.is_empty() && rest.len() != token.len()).then_some(rest)
}

fn first_top_level_colon(class: &str) -> Option<usize> {
    let mut paren_depth = 0usize;
    let mut bracket_depth = 0usize;
    for (idx, ch) in class.char_indices() {
        match ch {
            '(' => paren_depth += 1,
            ')' => paren_depth = paren_depth.saturating_sub(1),
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            ':' if paren_depth == 0 && bracket_depth == 0 => return Some(idx),
            _ => {}
        }
    }
    None
}
