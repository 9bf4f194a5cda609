use regex::Regex;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Extensions probed, in order, for an extensionless relative import.
const STYLESHEET_EXTENSIONS: [&str; 4] = ["css", "pcss", "postcss", "scss"];

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*)?["']([^"']+)["']"#).expect("import pattern compiles")
});

/// A stylesheet read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSource {
    pub path: PathBuf,
    pub text: String,
}

/// Walks the `@import` graph breadth-first from `root`, returning every
/// reachable stylesheet exactly once.
///
/// Unreadable files are logged and skipped. Only relative imports (`./`,
/// `../`) are followed; framework and bare package imports are not.
pub fn resolve(root: &Path) -> Vec<StyleSource> {
    let mut sources = Vec::new();
    let mut visited = HashSet::<PathBuf>::new();
    let mut queue = VecDeque::from([root.to_path_buf()]);

    while let Some(path) = queue.pop_front() {
        let key = visit_key(&path);
        if !visited.insert(key) {
            continue;
        }

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("could not read stylesheet {}: {}", path.display(), err);
                continue;
            }
        };
        log::debug!("read stylesheet {}", path.display());

        let base_dir = path.parent().unwrap_or(Path::new("."));
        for target in import_targets(&text) {
            if is_framework_import(&target) {
                log::debug!("skipping framework import '{}'", target);
                continue;
            }
            if !is_relative_import(&target) {
                log::debug!("not following non-relative import '{}'", target);
                continue;
            }
            let Some(resolved) = resolve_import_path(base_dir, &target) else {
                log::debug!(
                    "import '{}' from {} does not exist",
                    target,
                    path.display()
                );
                continue;
            };
            if !visited.contains(&visit_key(&resolved)) {
                queue.push_back(resolved);
            }
        }

        sources.push(StyleSource { path, text });
    }

    sources
}

/// Every `@import` target in `css`, in source order.
pub fn import_targets(css: &str) -> Vec<String> {
    IMPORT_RE
        .captures_iter(css)
        .filter_map(|caps| caps.get(1))
        .map(|target| target.as_str().trim().to_string())
        .filter(|target| !target.is_empty())
        .collect()
}

pub fn is_framework_import(target: &str) -> bool {
    ["tailwindcss", "ironframe"].iter().any(|framework| {
        target == *framework
            || target
                .strip_prefix(framework)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

fn is_relative_import(target: &str) -> bool {
    target.starts_with("./") || target.starts_with("../")
}

fn resolve_import_path(base_dir: &Path, target: &str) -> Option<PathBuf> {
    let candidate = base_dir.join(target);
    if candidate.extension().is_some() {
        return candidate.is_file().then_some(candidate);
    }
    if candidate.is_file() {
        return Some(candidate);
    }
    STYLESHEET_EXTENSIONS
        .iter()
        .map(|ext| candidate.with_extension(ext))
        .find(|probe| probe.is_file())
}

fn visit_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
