//! Styled progress and diagnostics on stderr.

use console::{Style, Term};
use folio_site::BuildWarning;

/// How a line of output is styled.
#[derive(Debug, Clone, Copy)]
enum Tone {
    Plain,
    Done,
    Caution,
    Failure,
    Heading,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Done => Style::new().green(),
            Self::Caution => Style::new().yellow(),
            Self::Failure => Style::new().red(),
            Self::Heading => Style::new().cyan().bold(),
        }
    }
}

/// Writes CLI progress to stderr so stdout stays free for `inspect --json`.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(Tone::Plain, msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(Tone::Done, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(Tone::Failure, msg);
    }

    pub(crate) fn highlight(&self, msg: &str) {
        self.line(Tone::Heading, msg);
    }

    /// Print the warnings collected while assembling the site.
    pub(crate) fn build_warnings(&self, warnings: &[BuildWarning]) {
        for line in warning_lines(warnings) {
            self.line(Tone::Caution, &line);
        }
    }

    fn line(&self, tone: Tone, msg: &str) {
        let _ = self.term.write_line(&tone.style().apply_to(msg).to_string());
    }
}

/// A count header followed by one bullet per warning; nothing when clean.
fn warning_lines(warnings: &[BuildWarning]) -> Vec<String> {
    if warnings.is_empty() {
        return Vec::new();
    }
    std::iter::once(format!("{} warning(s):", warnings.len()))
        .chain(warnings.iter().map(|warning| format!("  - {warning}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_no_warnings_prints_nothing() {
        assert!(warning_lines(&[]).is_empty());
    }

    #[test]
    fn test_warning_lines() {
        let warnings = [
            BuildWarning::PageSkipped {
                page_id: "p2".to_owned(),
                parent_id: "root".to_owned(),
            },
            BuildWarning::RootSlugDefaulted {
                page_id: "root".to_owned(),
                slug: "index".to_owned(),
            },
        ];
        let lines = warning_lines(&warnings);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "2 warning(s):");
        assert_eq!(lines[1], format!("  - {}", warnings[0]));
        assert_eq!(lines[2], format!("  - {}", warnings[1]));
    }
}
