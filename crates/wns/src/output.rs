//! Startup banner and error reporting on stderr.

use console::{Style, Term};

/// Width labels are right-aligned to, so values line up.
const LABEL_WIDTH: usize = 12;

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    label: Style,
    url: Style,
    failure: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().cyan().bold(),
            url: Style::new().green().underlined(),
            failure: Style::new().red(),
        }
    }

    /// Print one `label value` line of the startup banner.
    pub(crate) fn field(&self, label: &str, value: &str) {
        let label = self.label.apply_to(pad_label(label));
        let _ = self.term.write_line(&format!("{label} {value}"));
    }

    /// Print the address pages are served from.
    pub(crate) fn address(&self, url: &str) {
        let label = self.label.apply_to(pad_label("Serving at"));
        let url = self.url.apply_to(url);
        let _ = self.term.write_line(&format!("{label} {url}"));
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.failure.apply_to(msg).to_string());
    }
}

/// Right-align a banner label.
fn pad_label(label: &str) -> String {
    format!("{label:>LABEL_WIDTH$}")
}
