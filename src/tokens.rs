/// A class-bearing literal handed to the engine by its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassSite {
    /// A plain string literal.
    Literal(String),
    /// The static segments of a template literal, in order. A template with
    /// `n` interpolations has `n + 1` segments.
    Template(Vec<String>),
}

impl ClassSite {
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            ClassSite::Literal(text) => tokens_from_literal(text),
            ClassSite::Template(segments) => tokens_from_template(segments),
        }
    }

    pub fn interpolations(&self) -> usize {
        match self {
            ClassSite::Literal(_) => 0,
            ClassSite::Template(segments) => segments.len().saturating_sub(1),
        }
    }
}

pub fn tokens_from_literal(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Tokens of a template's static text. Each interpolation boundary acts as
/// whitespace, so a partial name next to a hole (`bg-${color}`) becomes its
/// own token.
pub fn tokens_from_template<S: AsRef<str>>(segments: &[S]) -> Vec<&str> {
    segments
        .iter()
        .flat_map(|segment| segment.as_ref().split_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{ClassSite, tokens_from_literal, tokens_from_template};

    #[test]
    fn literal_splits_on_any_whitespace_run() {
        assert_eq!(
            tokens_from_literal("  flex\n\titems-center   gap-2 "),
            vec!["flex", "items-center", "gap-2"]
        );
        assert!(tokens_from_literal(" \n ").is_empty());
    }

    #[test]
    fn template_boundaries_separate_tokens() {
        let segments = ["px-4 bg-", " text-white ", "", " rounded"];
        assert_eq!(
            tokens_from_template(&segments),
            vec!["px-4", "bg-", "text-white", "rounded"]
        );
    }

    #[test]
    fn site_reports_tokens_and_holes() {
        let site = ClassSite::Template(vec!["flex ".to_string(), "".to_string()]);
        assert_eq!(site.tokens(), vec!["flex"]);
        assert_eq!(site.interpolations(), 1);
        assert_eq!(ClassSite::Literal("a b".to_string()).interpolations(), 0);
    }
}
