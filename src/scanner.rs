use crate::session::Position;
use crate::tokens::ClassSite;
use globset::{Glob, GlobSet};
use ignore::WalkBuilder;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

const CLASS_ATTRIBUTES: [&str; 2] = ["className", "class"];
const CLASS_HELPERS: [&str; 4] = ["cn", "clsx", "cva", "tw"];

/// A class site found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSite {
    pub site: ClassSite,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanGlobOptions {
    pub base_path: PathBuf,
    pub respect_gitignore: bool,
    pub include_node_modules: bool,
}

impl Default for ScanGlobOptions {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            respect_gitignore: true,
            include_node_modules: false,
        }
    }
}

/// Source files under `options.base_path` matching any of `patterns` and
/// none of `ignore_patterns`, in walk order.
pub fn find_files(
    patterns: &[String],
    ignore_patterns: &[String],
    options: &ScanGlobOptions,
) -> Result<Vec<PathBuf>, ScanError> {
    if patterns.is_empty() {
        return Err(ScanError {
            message: "at least one file pattern is required".to_string(),
        });
    }

    let globset = build_globset(patterns)?;
    let ignore_set = build_globset(ignore_patterns)?;
    let mut paths = Vec::new();
    let mut seen = HashSet::new();

    let mut builder = WalkBuilder::new(&options.base_path);
    builder
        .hidden(false)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore);

    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let relative_path = path.strip_prefix(&options.base_path).unwrap_or(path);
        if !globset.is_match(relative_path) && !globset.is_match(path) {
            continue;
        }
        if ignore_set.is_match(relative_path) || ignore_set.is_match(path) {
            continue;
        }
        if !options.include_node_modules
            && path
                .components()
                .any(|component| component.as_os_str() == "node_modules")
        {
            continue;
        }
        if seen.insert(path.to_path_buf()) {
            paths.push(path.to_path_buf());
        }
    }

    log::debug!("{} file(s) matched", paths.len());
    Ok(paths)
}

pub fn scan_file(path: &Path) -> Result<Vec<LocatedSite>, ScanError> {
    let text = fs::read_to_string(path).map_err(|err| ScanError {
        message: format!("failed to read {}: {}", path.display(), err),
    })?;
    Ok(extract_sites(&text))
}

/// Every class site in `text`: string and template literals given to a
/// `class`/`className` attribute or passed to a class helper call.
pub fn extract_sites(text: &str) -> Vec<LocatedSite> {
    let mut sites = BTreeMap::new();
    extract_class_attributes(text, &mut sites);
    extract_class_helpers(text, &mut sites);

    let lines = LineIndex::new(text);
    sites
        .into_iter()
        .map(|(offset, site)| LocatedSite {
            site,
            position: lines.position(text, offset),
        })
        .collect()
}

fn extract_class_attributes(text: &str, sites: &mut BTreeMap<usize, ClassSite>) {
    for attr in CLASS_ATTRIBUTES {
        for (idx, _) in text.match_indices(attr) {
            if !is_attr_boundary(text, idx, attr.len()) {
                continue;
            }
            let mut pos = skip_whitespace(text, idx + attr.len());
            if !text[pos..].starts_with('=') {
                continue;
            }
            pos = skip_whitespace(text, pos + 1);
            let Some((ch, size)) = next_char(text, pos) else {
                continue;
            };
            match ch {
                '"' | '\'' => {
                    let (value, _) = parse_string_literal(text, pos + size, ch);
                    sites.insert(pos, ClassSite::Literal(value));
                }
                '{' => {
                    let (inner_start, inner_end, _) = extract_delimited(text, pos, '{', '}');
                    extract_literals(&text[inner_start..inner_end], inner_start, sites);
                }
                _ => {}
            }
        }
    }
}

fn extract_class_helpers(text: &str, sites: &mut BTreeMap<usize, ClassSite>) {
    for helper in CLASS_HELPERS {
        for (idx, _) in text.match_indices(helper) {
            if !is_identifier_boundary(text, idx, helper.len()) {
                continue;
            }
            let pos = skip_whitespace(text, idx + helper.len());
            match next_char(text, pos) {
                Some(('(', _)) => {
                    let (args_start, args_end, _) = extract_delimited(text, pos, '(', ')');
                    extract_literals(&text[args_start..args_end], args_start, sites);
                }
                Some(('`', size)) if helper == "tw" => {
                    let (segments, _) = parse_template_literal(text, pos + size);
                    sites.insert(pos, ClassSite::Template(segments));
                }
                _ => {}
            }
        }
    }
}

/// Collects the string and template literals of an expression. `base` is the
/// offset of `expr` within the whole file.
fn extract_literals(expr: &str, base: usize, sites: &mut BTreeMap<usize, ClassSite>) {
    let mut idx = 0;
    while idx < expr.len() {
        let Some((ch, size)) = next_char(expr, idx) else {
            break;
        };
        match ch {
            '"' | '\'' => {
                let (value, new_idx) = parse_string_literal(expr, idx + size, ch);
                sites.insert(base + idx, ClassSite::Literal(value));
                idx = new_idx;
            }
            '`' => {
                let (segments, new_idx) = parse_template_literal(expr, idx + size);
                sites.insert(base + idx, ClassSite::Template(segments));
                idx = new_idx;
            }
            _ => idx += size,
        }
    }
}

/// Given `text[idx] == open`, returns the byte range of the contents and the
/// index after the matching `close`. Literals are skipped while matching.
fn extract_delimited(text: &str, idx: usize, open: char, close: char) -> (usize, usize, usize) {
    let start = idx + open.len_utf8();
    let mut depth = 0usize;
    let mut pos = idx;

    while pos < text.len() {
        let Some((ch, size)) = next_char(text, pos) else {
            break;
        };
        if ch == open {
            depth += 1;
            pos += size;
        } else if ch == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return (start, pos, pos + size);
            }
            pos += size;
        } else if ch == '"' || ch == '\'' {
            pos = parse_string_literal(text, pos + size, ch).1;
        } else if ch == '`' {
            pos = parse_template_literal(text, pos + size).1;
        } else {
            pos += size;
        }
    }

    (start.min(text.len()), text.len(), text.len())
}

fn parse_string_literal(text: &str, mut idx: usize, quote: char) -> (String, usize) {
    let mut value = String::new();
    while idx < text.len() {
        let Some((ch, size)) = next_char(text, idx) else {
            break;
        };
        if ch == '\\' {
            let next_idx = idx + size;
            if let Some((next, next_size)) = next_char(text, next_idx) {
                value.push('\\');
                value.push(next);
                idx = next_idx + next_size;
                continue;
            }
            break;
        }
        if ch == quote {
            idx += size;
            break;
        }
        value.push(ch);
        idx += size;
    }
    (value, idx)
}

/// Splits a template literal body into its static segments. A template with
/// `n` interpolations always yields `n + 1` segments, empty ones included.
fn parse_template_literal(text: &str, mut idx: usize) -> (Vec<String>, usize) {
    let mut segments = Vec::new();
    let mut current = String::new();

    while idx < text.len() {
        let Some((ch, size)) = next_char(text, idx) else {
            break;
        };
        if ch == '`' {
            idx += size;
            break;
        }
        if ch == '\\' {
            let next_idx = idx + size;
            if let Some((next, next_size)) = next_char(text, next_idx) {
                current.push('\\');
                current.push(next);
                idx = next_idx + next_size;
                continue;
            }
            break;
        }
        if ch == '$' && text[idx + size..].starts_with('{') {
            segments.push(std::mem::take(&mut current));
            idx = skip_braced_expression(text, idx + size + 1);
            continue;
        }
        current.push(ch);
        idx += size;
    }

    segments.push(current);
    (segments, idx)
}

fn skip_braced_expression(text: &str, mut idx: usize) -> usize {
    let mut depth = 1usize;
    while idx < text.len() && depth > 0 {
        let Some((ch, size)) = next_char(text, idx) else {
            break;
        };
        match ch {
            '{' => depth += 1,
            '}' => depth -= 1,
            '"' | '\'' => {
                idx = parse_string_literal(text, idx + size, ch).1;
                continue;
            }
            '`' => {
                idx = parse_template_literal(text, idx + size).1;
                continue;
            }
            _ => {}
        }
        idx += size;
    }
    idx
}

struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
        Self { starts }
    }

    fn position(&self, text: &str, offset: usize) -> Position {
        let line = self.starts.partition_point(|start| *start <= offset);
        let line_start = self.starts[line.saturating_sub(1)];
        Position {
            line,
            column: text[line_start..offset].chars().count() + 1,
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = globset::GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|err| ScanError {
            message: format!("invalid glob pattern '{}': {}", pattern, err),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|err| ScanError {
        message: format!("failed to build glob set: {}", err),
    })
}

fn is_attr_boundary(text: &str, idx: usize, len: usize) -> bool {
    let prev = text[..idx].chars().last();
    let next = text[idx + len..].chars().next();
    prev.is_none_or(|c| !is_name_char(c)) && next.is_none_or(|c| !is_name_char(c))
}

fn is_identifier_boundary(text: &str, idx: usize, len: usize) -> bool {
    let prev = text[..idx].chars().last();
    let next = text[idx + len..].chars().next();
    prev.is_none_or(|c| !is_identifier_char(c)) && next.is_none_or(|c| !is_identifier_char(c))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ':'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn skip_whitespace(text: &str, mut idx: usize) -> usize {
    while let Some((ch, size)) = next_char(text, idx) {
        if !ch.is_whitespace() {
            break;
        }
        idx += size;
    }
    idx
}

fn next_char(text: &str, idx: usize) -> Option<(char, usize)> {
    text.get(idx..)?
        .chars()
        .next()
        .map(|ch| (ch, ch.len_utf8()))
}

#[cfg(test)]
mod tests {
    use super::{LocatedSite, ScanGlobOptions, extract_sites, find_files, scan_file};
    use crate::session::Position;
    use crate::tokens::ClassSite;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn literal(text: &str) -> ClassSite {
        ClassSite::Literal(text.to_string())
    }

    fn sites(text: &str) -> Vec<ClassSite> {
        extract_sites(text)
            .into_iter()
            .map(|located| located.site)
            .collect()
    }

    #[test]
    fn finds_quoted_attributes_with_positions() {
        let source = "<div>\n  <span className=\"flex gap-2\" class='p-4'></span>\n</div>";
        assert_eq!(
            extract_sites(source),
            vec![
                LocatedSite {
                    site: literal("flex gap-2"),
                    position: Position { line: 2, column: 19 },
                },
                LocatedSite {
                    site: literal("p-4"),
                    position: Position { line: 2, column: 38 },
                },
            ]
        );
    }

    #[test]
    fn braced_attributes_yield_every_literal() {
        let source = r#"<a className={active ? "bg-blue-500" : 'bg-gray-100'} />"#;
        assert_eq!(sites(source), vec![literal("bg-blue-500"), literal("bg-gray-100")]);
    }

    #[test]
    fn template_literals_keep_interpolation_boundaries() {
        let source = "<p className={`px-4 ${size} text-${tone}`} />";
        assert_eq!(
            sites(source),
            vec![ClassSite::Template(vec![
                "px-4 ".to_string(),
                " text-".to_string(),
                String::new(),
            ])]
        );
    }

    #[test]
    fn helper_calls_and_member_calls() {
        let source = r#"
const a = cn("flex", isOpen && "block", { "text-sm": small });
const b = utils.clsx('rounded');
const c = cva("btn", { variants: { size: { sm: "h-8" } } });
const d = tw`mt-2 ${x}`;
const e = scan("not-a-class");
"#;
        assert_eq!(
            sites(source),
            vec![
                literal("flex"),
                literal("block"),
                literal("text-sm"),
                literal("rounded"),
                literal("btn"),
                literal("h-8"),
                ClassSite::Template(vec!["mt-2 ".to_string(), String::new()]),
            ]
        );
    }

    #[test]
    fn helper_inside_attribute_is_reported_once() {
        let source = r#"<div className={cn("p-2", "m-1")} />"#;
        assert_eq!(sites(source), vec![literal("p-2"), literal("m-1")]);
    }

    #[test]
    fn ignores_lookalike_names() {
        let source = r#"<div data-class="x" classList="y" /> const clsxHelper = clsxx("z");"#;
        assert!(sites(source).is_empty());
    }

    #[test]
    fn finds_files_by_glob_and_ignore() {
        let base = temp_dir("scanner_glob");
        let _ = fs::create_dir_all(base.join("src/components"));
        let _ = fs::create_dir_all(base.join("node_modules/pkg"));
        let _ = fs::write(base.join("src/components/Button.tsx"), "<b className=\"p-2\" />");
        let _ = fs::write(base.join("src/components/Button.test.tsx"), "");
        let _ = fs::write(base.join("node_modules/pkg/index.tsx"), "");

        let options = ScanGlobOptions {
            base_path: base.clone(),
            ..ScanGlobOptions::default()
        };
        let files = find_files(
            &["**/*.tsx".to_string()],
            &["**/*.test.tsx".to_string()],
            &options,
        )
        .expect("glob scan should succeed");
        assert_eq!(files, vec![base.join("src/components/Button.tsx")]);

        let located = scan_file(&files[0]).expect("file should be readable");
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].site, literal("p-2"));

        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn rejects_empty_and_invalid_patterns() {
        let options = ScanGlobOptions::default();
        assert!(find_files(&[], &[], &options).is_err());
        assert!(find_files(&["a/[".to_string()], &[], &options).is_err());
    }

    fn temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("{}_{}", prefix, nanos))
    }
}
