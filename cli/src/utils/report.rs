use std::fmt;
use std::path::{Path, PathBuf};
use unithereum_codegen::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Passed,
    Warning,
    Error,
}

impl Severity {
    fn marker(self) -> &'static str {
        match self {
            Severity::Passed => "✓",
            Severity::Warning => "⚠️ ",
            Severity::Error => "❌",
        }
    }
}

/// One line of the `unithereum check` report
#[derive(Debug, Clone)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
    /// Config key the finding is about, e.g. `outputDir`
    pub field: Option<String>,
    pub file: Option<PathBuf>,
    pub hint: Option<String>,
}

impl Finding {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            field: None,
            file: None,
            hint: None,
        }
    }

    pub fn passed(message: impl Into<String>) -> Self {
        Self::new(Severity::Passed, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// A failed config resolution, pointing at the offending key when known
    pub fn config_error(err: &anyhow::Error, config_file: &Path) -> Self {
        let mut finding = Self::error(format!("{:#}", err)).with_file(config_file);
        finding.field = err
            .downcast_ref::<ConfigError>()
            .and_then(ConfigError::field)
            .map(str::to_string);
        finding
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.severity.marker())?;
        if let Some(field) = &self.field {
            write!(f, "[{}] ", field)?;
        }
        write!(f, "{}", self.message)?;
        if let Some(file) = &self.file {
            write!(f, " ({})", file.display())?;
        }
        if let Some(hint) = &self.hint {
            for line in hint.lines() {
                write!(f, "\n     {}", line)?;
            }
        }
        Ok(())
    }
}

/// Everything `unithereum check` found, in check order
#[derive(Debug, Default)]
pub struct CheckReport {
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.count(Severity::Warning) > 0
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn find(&self, prefix: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.message.starts_with(prefix))
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for finding in &self.findings {
            writeln!(f, "{}", finding)?;
        }
        write!(
            f,
            "\n{} passed, {} warning(s), {} error(s)",
            self.count(Severity::Passed),
            self.count(Severity::Warning),
            self.error_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_finding_display() {
        let finding = Finding::error("No dotnet tool manifest")
            .with_file("/project/tools")
            .with_hint("dotnet new tool-manifest\ndotnet tool install Nethereum.Generator.Console");

        let display = finding.to_string();
        assert!(display.starts_with("❌ No dotnet tool manifest (/project/tools)"));
        assert!(display.ends_with("\n     dotnet tool install Nethereum.Generator.Console"));
    }

    #[test]
    fn test_config_error_keeps_field() {
        let err = Err::<(), _>(ConfigError::invalid("outputDir", Some(".."), "bad"))
            .context("Failed to resolve codegen config")
            .unwrap_err();

        let finding = Finding::config_error(&err, Path::new("codegen.config.json"));
        assert_eq!(finding.field.as_deref(), Some("outputDir"));
        assert_eq!(finding.file, Some(PathBuf::from("codegen.config.json")));
        assert!(finding.to_string().contains("[outputDir] Failed to resolve codegen config"));
    }

    #[test]
    fn test_report_counts() {
        let mut report = CheckReport::new();
        report.push(Finding::passed("dotnet 8.0.100"));
        report.push(Finding::warning("No .abi files found"));
        assert!(!report.has_errors());
        assert!(report.has_warnings());

        report.push(Finding::error("No dotnet tool manifest"));
        assert_eq!(report.error_count(), 1);
        assert!(report.find("No .abi").is_some());
        assert!(report.to_string().ends_with("1 passed, 1 warning(s), 1 error(s)"));
    }
}
