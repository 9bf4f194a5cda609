use crate::config::{SourceConfig, SourceKind};
use crate::resolver;
use crate::vocabulary::{Vocabulary, extract_generated_css, extract_stylesheet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

/// A strategy for filling a vocabulary from the project's root stylesheet.
pub trait VocabularySource {
    fn name(&self) -> &str;
    fn load(&self, css_file: &Path, vocabulary: &mut Vocabulary);
}

/// Reads the stylesheet and everything it imports as plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StylesheetSource;

impl VocabularySource for StylesheetSource {
    fn name(&self) -> &str {
        "stylesheets"
    }

    fn load(&self, css_file: &Path, vocabulary: &mut Vocabulary) {
        let sources = resolver::resolve(css_file);
        log::debug!(
            "resolved {} stylesheet(s) from {}",
            sources.len(),
            css_file.display()
        );
        for source in &sources {
            extract_stylesheet(source, vocabulary);
        }
    }
}

/// Scans the stylesheets, then asks an external CSS build tool for the CSS it
/// generates and adds every selector found there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildToolSource {
    pub root: PathBuf,
    pub command: String,
    pub args: Vec<String>,
}

impl BuildToolSource {
    fn run(&self, css_file: &Path, output: &Path) -> Result<String, String> {
        let args = self
            .args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &css_file.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy())
            })
            .collect::<Vec<_>>();
        log::debug!("running {} {}", self.command, args.join(" "));

        let result = Command::new(&self.command)
            .args(&args)
            .current_dir(&self.root)
            .output()
            .map_err(|err| format!("failed to start {}: {}", self.command, err))?;
        if !result.status.success() {
            return Err(format!(
                "{} exited with {}: {}",
                self.command,
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            ));
        }
        fs::read_to_string(output)
            .map_err(|err| format!("failed to read {}: {}", output.display(), err))
    }
}

impl VocabularySource for BuildToolSource {
    fn name(&self) -> &str {
        "build-tool"
    }

    fn load(&self, css_file: &Path, vocabulary: &mut Vocabulary) {
        StylesheetSource.load(css_file, vocabulary);

        let output = temp_output_path();
        match self.run(css_file, &output) {
            Ok(css) => {
                let added = extract_generated_css(&css, vocabulary);
                log::debug!("build tool added {} class(es)", added);
            }
            Err(message) => {
                log::warn!("{}; using the stylesheet vocabulary only", message);
            }
        }
        let _ = fs::remove_file(&output);
    }
}

/// Picks the source the configuration asks for.
pub fn from_config(config: &SourceConfig, root: &Path) -> Box<dyn VocabularySource> {
    match config.kind {
        SourceKind::Stylesheets => Box::new(StylesheetSource),
        SourceKind::BuildTool => Box::new(BuildToolSource {
            root: root.to_path_buf(),
            command: config.command.clone(),
            args: config.args.clone(),
        }),
    }
}

fn temp_output_path() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "ironframe_lint_{}_{}.css",
        std::process::id(),
        nanos
    ))
}

#[cfg(test)]
mod tests {
    use super::{BuildToolSource, StylesheetSource, VocabularySource, from_config};
    use crate::config::{SourceConfig, SourceKind};
    use crate::vocabulary::{ClassOrigin, Vocabulary};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn stylesheet_source_reads_imports() {
        let base = temp_dir("source_sheets");
        let _ = fs::create_dir_all(&base);
        let _ = fs::write(base.join("globals.css"), "@import \"./cards.css\";\n.page { }");
        let _ = fs::write(base.join("cards.css"), ".card { }");

        let mut vocabulary = Vocabulary::new();
        StylesheetSource.load(&base.join("globals.css"), &mut vocabulary);
        assert!(vocabulary.contains("page"));
        assert!(vocabulary.contains("card"));

        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn failing_build_tool_keeps_stylesheet_vocabulary() {
        let base = temp_dir("source_tool_missing");
        let _ = fs::create_dir_all(&base);
        let _ = fs::write(base.join("globals.css"), ".page { }");

        let source = BuildToolSource {
            root: base.clone(),
            command: "ironframe-lint-no-such-tool".to_string(),
            args: vec!["{input}".to_string()],
        };
        let mut vocabulary = Vocabulary::new();
        source.load(&base.join("globals.css"), &mut vocabulary);
        assert!(vocabulary.contains("page"));
        assert_eq!(vocabulary.len(), 1);

        let _ = fs::remove_dir_all(&base);
    }

    #[cfg(unix)]
    #[test]
    fn build_tool_output_adds_generated_classes() {
        let base = temp_dir("source_tool_sh");
        let _ = fs::create_dir_all(&base);
        let _ = fs::write(base.join("globals.css"), ".page { }");

        let source = BuildToolSource {
            root: base.clone(),
            command: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "printf '.flex{display:flex}.page{}' > \"$1\"".to_string(),
                "sh".to_string(),
                "{output}".to_string(),
            ],
        };
        let mut vocabulary = Vocabulary::new();
        source.load(&base.join("globals.css"), &mut vocabulary);
        assert_eq!(vocabulary.origin("flex"), Some(&ClassOrigin::Generated));
        assert!(matches!(
            vocabulary.origin("page"),
            Some(ClassOrigin::Explicit { .. })
        ));

        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn picks_source_by_kind() {
        let root = PathBuf::from(".");
        let mut config = SourceConfig::default();
        assert_eq!(from_config(&config, &root).name(), "stylesheets");
        config.kind = SourceKind::BuildTool;
        assert_eq!(from_config(&config, &root).name(), "build-tool");
    }

    fn temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("{}_{}", prefix, nanos))
    }
}
