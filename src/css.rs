//! Tolerant text helpers shared by the stylesheet scanners.
//!
//! None of these functions validate CSS. Unbalanced braces, stray quotes and
//! unterminated comments simply end a scan early.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtBlock<'a> {
    pub start: usize,
    pub end: usize,
    pub header: &'a str,
    pub body: &'a str,
}

/// Replaces every `/* ... */` comment with a single space, leaving string
/// literals untouched.
pub fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut in_comment = false;
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    let mut chars = css.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_comment {
            if ch == '*' && chars.peek() == Some(&'/') {
                let _ = chars.next();
                in_comment = false;
                out.push(' ');
            }
            continue;
        }

        if let Some(quote) = in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                in_string = None;
            }
            continue;
        }

        if ch == '/' && chars.peek() == Some(&'*') {
            let _ = chars.next();
            in_comment = true;
            continue;
        }
        if ch == '"' || ch == '\'' {
            in_string = Some(ch);
        }
        out.push(ch);
    }

    out
}

pub fn find_matching_brace(css: &str, open_idx: usize) -> Option<usize> {
    if !css[open_idx..].starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (rel_idx, ch) in css[open_idx..].char_indices() {
        let idx = open_idx + rel_idx;
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
                continue;
            }
            if ch == '\\' {
                escaped = true;
                continue;
            }
            if ch == quote {
                in_string = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => in_string = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }

    None
}

/// Collects every `@<keyword> ... { ... }` block. The header is the text
/// between the keyword and the opening brace (`inline` in `@theme inline {`).
/// A directive terminated by `;` before any `{` is skipped.
pub fn extract_at_blocks<'a>(css: &'a str, keyword: &str) -> Vec<AtBlock<'a>> {
    let marker = format!("@{}", keyword);
    let mut blocks = Vec::new();
    let mut cursor = 0usize;

    while let Some(rel_start) = css[cursor..].find(&marker) {
        let at_idx = cursor + rel_start;
        let after_marker = at_idx + marker.len();
        let boundary_ok = css[after_marker..]
            .chars()
            .next()
            .is_none_or(|ch| !is_ident_char(ch));
        if !boundary_ok {
            cursor = after_marker;
            continue;
        }

        let Some(open_rel) = css[after_marker..].find(['{', ';']) else {
            break;
        };
        let open_idx = after_marker + open_rel;
        if !css[open_idx..].starts_with('{') {
            cursor = open_idx + 1;
            continue;
        }
        let Some(close_idx) = find_matching_brace(css, open_idx) else {
            break;
        };

        blocks.push(AtBlock {
            start: at_idx,
            end: close_idx + 1,
            header: css[after_marker..open_idx].trim(),
            body: &css[open_idx + 1..close_idx],
        });
        cursor = close_idx + 1;
    }

    blocks
}

/// Splits a block body into `--name: value` custom property declarations at
/// brace depth zero. The final declaration may omit its semicolon.
pub fn extract_custom_properties(body: &str) -> Vec<(&str, &str)> {
    let mut declarations = Vec::new();
    let mut depth = 0usize;
    let mut segment_start = 0usize;

    for (idx, ch) in body.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    segment_start = idx + 1;
                }
            }
            ';' if depth == 0 => {
                if let Some(declaration) = parse_custom_property(&body[segment_start..idx]) {
                    declarations.push(declaration);
                }
                segment_start = idx + 1;
            }
            _ => {}
        }
    }
    if depth == 0 {
        if let Some(declaration) = parse_custom_property(&body[segment_start..]) {
            declarations.push(declaration);
        }
    }

    declarations
}

fn parse_custom_property(segment: &str) -> Option<(&str, &str)> {
    let (name, value) = segment.trim().split_once(':')?;
    let name = name.trim();
    let value = value.trim();
    let name = name.strip_prefix("--")?;
    if name.is_empty() || value.is_empty() {
        return None;
    }
    Some((name, value))
}

/// Returns every class name used in a rule prelude anywhere in `css`, at any
/// nesting depth, unescaped to its logical form. At-rule preludes are skipped.
pub fn class_names_in_rule_preludes(css: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut segment_start = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in css.char_indices() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
                continue;
            }
            if ch == '\\' {
                escaped = true;
                continue;
            }
            if ch == quote {
                in_string = None;
            }
            continue;
        }
        if escaped {
            escaped = false;
            continue;
        }

        match ch {
            '\\' => escaped = true,
            '"' | '\'' => in_string = Some(ch),
            '{' => {
                let prelude = css[segment_start..idx].trim();
                if !prelude.is_empty() && !prelude.starts_with('@') {
                    names.extend(class_names_in_selector(prelude));
                }
                segment_start = idx + 1;
            }
            '}' | ';' => segment_start = idx + 1,
            _ => {}
        }
    }

    names
}

/// Extracts the class names of a single selector list such as
/// `.card > .title:hover, .md\:flex`.
pub fn class_names_in_selector(selector: &str) -> Vec<String> {
    let chars = selector.chars().collect::<Vec<_>>();
    let mut names = Vec::new();
    let mut in_string: Option<char> = None;
    let mut bracket_depth = 0usize;
    let mut idx = 0usize;

    while idx < chars.len() {
        let ch = chars[idx];
        if let Some(quote) = in_string {
            if ch == '\\' {
                idx += 2;
                continue;
            }
            if ch == quote {
                in_string = None;
            }
            idx += 1;
            continue;
        }

        match ch {
            '\\' => {
                idx += 2;
                continue;
            }
            '"' | '\'' => in_string = Some(ch),
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            '.' if bracket_depth == 0 => {
                let (raw, next) = read_escaped_ident(&chars, idx + 1);
                if is_class_ident_start(&raw) {
                    names.push(unescape_selector(&raw));
                }
                idx = next;
                continue;
            }
            _ => {}
        }
        idx += 1;
    }

    names
}

fn read_escaped_ident(chars: &[char], mut idx: usize) -> (String, usize) {
    let mut raw = String::new();
    while idx < chars.len() {
        let ch = chars[idx];
        if ch == '\\' {
            let Some(&next) = chars.get(idx + 1) else {
                break;
            };
            raw.push('\\');
            if next.is_ascii_hexdigit() {
                let mut consumed = 0usize;
                while consumed < 6 {
                    match chars.get(idx + 1 + consumed) {
                        Some(hex) if hex.is_ascii_hexdigit() => {
                            raw.push(*hex);
                            consumed += 1;
                        }
                        _ => break,
                    }
                }
                idx += 1 + consumed;
                if let Some(space) = chars.get(idx).filter(|c| c.is_whitespace()) {
                    raw.push(*space);
                    idx += 1;
                }
                continue;
            }
            raw.push(next);
            idx += 2;
            continue;
        }
        if is_ident_char(ch) || !ch.is_ascii() {
            raw.push(ch);
            idx += 1;
            continue;
        }
        break;
    }
    (raw, idx)
}

fn is_class_ident_start(raw: &str) -> bool {
    let mut chars = raw.chars();
    match chars.next() {
        Some('\\') => true,
        Some('-') => chars
            .next()
            .is_some_and(|next| !next.is_ascii_digit()),
        Some(first) => first.is_ascii_alphabetic() || first == '_' || !first.is_ascii(),
        None => false,
    }
}

/// Turns an escaped selector identifier into the class name it denotes:
/// `sm\:bg-primary\/50` becomes `sm:bg-primary/50` and `\32 xl` becomes `2xl`.
pub fn unescape_selector(raw: &str) -> String {
    let chars = raw.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(raw.len());
    let mut idx = 0usize;

    while idx < chars.len() {
        let ch = chars[idx];
        if ch != '\\' {
            out.push(ch);
            idx += 1;
            continue;
        }

        let mut hex = String::new();
        let mut cursor = idx + 1;
        while hex.len() < 6 {
            match chars.get(cursor) {
                Some(digit) if digit.is_ascii_hexdigit() => {
                    hex.push(*digit);
                    cursor += 1;
                }
                _ => break,
            }
        }
        if hex.is_empty() {
            if let Some(next) = chars.get(idx + 1) {
                out.push(*next);
            }
            idx += 2;
            continue;
        }

        let decoded = u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        out.push(decoded);
        if chars.get(cursor).is_some_and(|c| c.is_whitespace()) {
            cursor += 1;
        }
        idx = cursor;
    }

    out
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}
