use std::fmt;

use serde::Serialize;

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum CheckStatus {
    /// The container satisfies the check
    Ok,
    /// Readable, but something a consumer may trip over
    Warning(String),
    /// The container breaks the format contract
    Failed(String),
}

impl CheckStatus {
    fn label(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "ok",
            CheckStatus::Warning(_) => "warn",
            CheckStatus::Failed(_) => "FAIL",
        }
    }

    fn message(&self) -> Option<&str> {
        match self {
            CheckStatus::Ok => None,
            CheckStatus::Warning(m) | CheckStatus::Failed(m) => Some(m),
        }
    }
}

/// A named check and its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationCheck {
    /// Check name, unique within a report
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
}

impl ValidationCheck {
    fn with(name: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }

    pub(crate) fn ok(name: impl Into<String>) -> Self {
        Self::with(name, CheckStatus::Ok)
    }

    pub(crate) fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with(name, CheckStatus::Warning(message.into()))
    }

    pub(crate) fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with(name, CheckStatus::Failed(message.into()))
    }
}

/// Per-status check counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// Checks that passed
    pub ok: usize,
    /// Checks that raised a warning
    pub warnings: usize,
    /// Checks that failed
    pub failed: usize,
}

impl Tally {
    fn verdict(&self) -> &'static str {
        if self.failed > 0 {
            "invalid"
        } else if self.warnings > 0 {
            "valid (with warnings)"
        } else {
            "valid"
        }
    }
}

/// Every check run against one container, in execution order
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Path that was validated
    pub file_path: String,
    /// Checks in the order they ran
    pub checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    /// Empty report for `file_path`
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            checks: Vec::new(),
        }
    }

    /// Append a check result
    pub fn add_check(&mut self, check: ValidationCheck) {
        self.checks.push(check);
    }

    /// Status of the first check called `name`
    pub fn status_of(&self, name: &str) -> Option<&CheckStatus> {
        self.checks.iter().find(|c| c.name == name).map(|c| &c.status)
    }

    /// Count checks by outcome
    pub fn tally(&self) -> Tally {
        self.checks.iter().fold(Tally::default(), |mut t, c| {
            match c.status {
                CheckStatus::Ok => t.ok += 1,
                CheckStatus::Warning(_) => t.warnings += 1,
                CheckStatus::Failed(_) => t.failed += 1,
            }
            t
        })
    }

    /// True if any check failed
    pub fn has_failures(&self) -> bool {
        self.tally().failed > 0
    }

    /// True if any check raised a warning
    pub fn has_warnings(&self) -> bool {
        self.tally().warnings > 0
    }

    /// Render for a terminal, colored when the `colorized_output` feature is on
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::style;
            self.render(|status, text| match status {
                CheckStatus::Ok => style(text).green().to_string(),
                CheckStatus::Warning(_) => style(text).yellow().to_string(),
                CheckStatus::Failed(_) => style(text).red().bold().to_string(),
            })
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }

    fn render(&self, paint: impl Fn(&CheckStatus, &str) -> String) -> String {
        let mut out = format!("morphpack validate: {}\n\n", self.file_path);
        for check in &self.checks {
            let label = paint(&check.status, &format!("{:<4}", check.status.label()));
            match check.status.message() {
                Some(message) => out.push_str(&format!("  {}  {}: {}\n", label, check.name, message)),
                None => out.push_str(&format!("  {}  {}\n", label, check.name)),
            }
        }

        let tally = self.tally();
        let verdict = match (tally.failed, tally.warnings) {
            (0, 0) => paint(&CheckStatus::Ok, tally.verdict()),
            (0, _) => paint(&CheckStatus::Warning(String::new()), tally.verdict()),
            _ => paint(&CheckStatus::Failed(String::new()), tally.verdict()),
        };
        out.push_str(&format!(
            "\n{} checks: {} ok, {} warning(s), {} failed\nContainer is {}\n",
            self.checks.len(),
            tally.ok,
            tally.warnings,
            tally.failed,
            verdict
        ));
        out
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(|_, text| text.to_string()))
    }
}
