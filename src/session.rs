use crate::config::Config;
use crate::policy;
use crate::source;
use crate::tokens::ClassSite;
use crate::vocabulary::Vocabulary;
use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a class site starts in its source file, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

/// A class token that resolves to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub token: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class '{}' is not defined in your CSS", self.token)
    }
}

/// One lint run over a project. The vocabulary is built on first use and
/// reused for every later check; start a new session to pick up CSS edits.
#[derive(Debug)]
pub struct Session {
    config: Config,
    root: PathBuf,
    vocabulary: OnceCell<Vocabulary>,
}

impl Session {
    pub fn new(config: Config, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
            vocabulary: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn css_path(&self) -> PathBuf {
        self.root.join(&self.config.css_file)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.vocabulary.get_or_init(|| self.build_vocabulary())
    }

    pub fn is_valid(&self, token: &str) -> bool {
        policy::is_valid(token, self.vocabulary(), self.config.policy_options())
    }

    pub fn check_site(&self, site: &ClassSite) -> Vec<Finding> {
        self.check_site_at(site, Position::default())
    }

    /// One finding per invalid token, in order. Repeated tokens are reported
    /// each time.
    pub fn check_site_at(&self, site: &ClassSite, position: Position) -> Vec<Finding> {
        site.tokens()
            .into_iter()
            .filter(|token| !self.is_valid(token))
            .map(|token| Finding {
                token: token.to_string(),
                line: position.line,
                column: position.column,
            })
            .collect()
    }

    fn build_vocabulary(&self) -> Vocabulary {
        let css_path = self.css_path();
        let source = source::from_config(&self.config.source, &self.root);
        log::debug!(
            "building vocabulary from {} using {}",
            css_path.display(),
            source.name()
        );

        let mut vocabulary = Vocabulary::new();
        source.load(&css_path, &mut vocabulary);
        vocabulary.extend_configured(&self.config.custom_classes);
        log::debug!(
            "vocabulary has {} class(es), framework import: {}",
            vocabulary.len(),
            vocabulary.has_base_framework_import()
        );
        vocabulary
    }
}

#[cfg(test)]
mod tests {
    use super::{Finding, Position, Session};
    use crate::config::Config;
    use crate::tokens::ClassSite;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn project(prefix: &str, css: &str) -> PathBuf {
        let root = temp_dir(prefix);
        let _ = fs::create_dir_all(root.join("src/styles"));
        let _ = fs::write(root.join("src/styles/globals.css"), css);
        root
    }

    #[test]
    fn reports_exactly_the_undefined_class() {
        let root = project(
            "session_e2e",
            "@import \"tailwindcss\";\n.custom-badge { color: red; }",
        );
        let session = Session::new(Config::default(), &root);
        let findings = session.check_site_at(
            &ClassSite::Literal("flex custom-badge unknown-xyz".to_string()),
            Position { line: 3, column: 18 },
        );
        assert_eq!(
            findings,
            vec![Finding {
                token: "unknown-xyz".to_string(),
                line: 3,
                column: 18,
            }]
        );
        assert_eq!(
            findings[0].to_string(),
            "class 'unknown-xyz' is not defined in your CSS"
        );
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn without_framework_structural_classes_are_reported() {
        let root = project("session_plain", ".card { }");
        let session = Session::new(Config::default(), &root);
        assert!(!session.is_valid("flex"));
        assert!(session.is_valid("card"));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn repeated_tokens_are_reported_each_time() {
        let root = project("session_repeat", "@theme { --color-primary: #000; }");
        let session = Session::new(Config::default(), &root);
        let findings = session.check_site(&ClassSite::Template(vec![
            "bg-primary nope ".to_string(),
            " nope".to_string(),
        ]));
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|finding| finding.token == "nope"));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn vocabulary_is_built_once_per_session() {
        let root = project("session_memo", ".first { }");
        let session = Session::new(Config::default(), &root);
        assert!(session.is_valid("first"));

        let _ = fs::write(root.join("src/styles/globals.css"), ".second { }");
        assert!(session.is_valid("first"));
        assert!(!session.is_valid("second"));

        let fresh = Session::new(Config::default(), &root);
        assert!(fresh.is_valid("second"));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn configured_classes_and_missing_css() {
        let root = temp_dir("session_missing");
        let config = Config {
            custom_classes: vec!["js-toggle".to_string()],
            ..Config::default()
        };
        let session = Session::new(config, &root);
        assert!(session.is_valid("js-toggle"));
        assert!(!session.is_valid("flex"));
        assert!(session.is_valid("p-[3px]"));
    }

    fn temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("{}_{}", prefix, nanos))
    }
}
