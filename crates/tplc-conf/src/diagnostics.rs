use std::collections::HashMap;

use serde::Deserialize;
use tplc_source::Severity;

/// Diagnostic severity level as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Off,
    Error,
    Warning,
    Info,
    Hint,
}

impl DiagnosticSeverity {
    /// Convert to the renderer's severity.
    /// Returns None for Off (diagnostic should not be shown).
    #[must_use]
    pub fn to_render_severity(self) -> Option<Severity> {
        match self {
            DiagnosticSeverity::Off => None,
            DiagnosticSeverity::Error => Some(Severity::Error),
            DiagnosticSeverity::Warning => Some(Severity::Warning),
            DiagnosticSeverity::Info => Some(Severity::Info),
            DiagnosticSeverity::Hint => Some(Severity::Hint),
        }
    }
}

/// Configuration for diagnostic severity levels.
///
/// All diagnostics are enabled by default at "error" severity.
/// Configure severity per diagnostic code or prefix pattern.
/// Specific codes override prefix patterns.
///
/// Example configuration:
/// ```toml
/// [diagnostics.severity]
/// # Individual codes
/// T101 = "warning"
/// T105 = "off"
///
/// # Prefixes for bulk configuration
/// "C" = "off"     # Silence all compiler reports
/// C102 = "hint"   # But keep the runtime compilation notice (specific overrides prefix)
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct DiagnosticsConfig {
    /// Map of diagnostic codes/prefixes to severity levels.
    /// Supports:
    /// - Specific codes: "T100", "C101"
    /// - Prefixes: "T" (all template diagnostics), "T1" (T100-T199)
    /// - More specific patterns override less specific ones
    #[serde(default)]
    pub severity: HashMap<String, DiagnosticSeverity>,
}

impl DiagnosticsConfig {
    /// Get the severity level for a diagnostic code.
    ///
    /// Resolution order (most specific wins):
    /// 1. Exact match (e.g., "T100")
    /// 2. Longest prefix match (e.g., "T1" over "T")
    /// 3. Default: Error
    ///
    /// # Examples
    /// ```
    /// # use tplc_conf::{DiagnosticsConfig, DiagnosticSeverity};
    /// # use std::collections::HashMap;
    /// let mut severity = HashMap::new();
    /// severity.insert("T".to_string(), DiagnosticSeverity::Warning);
    /// severity.insert("T1".to_string(), DiagnosticSeverity::Off);
    /// severity.insert("T100".to_string(), DiagnosticSeverity::Error);
    ///
    /// let config = DiagnosticsConfig { severity };
    ///
    /// assert_eq!(config.get_severity("T100"), DiagnosticSeverity::Error);  // Exact
    /// assert_eq!(config.get_severity("T101"), DiagnosticSeverity::Off);    // "T1" prefix
    /// assert_eq!(config.get_severity("T200"), DiagnosticSeverity::Warning); // "T" prefix
    /// assert_eq!(config.get_severity("C100"), DiagnosticSeverity::Error);   // Default
    /// ```
    #[must_use]
    pub fn get_severity(&self, code: &str) -> DiagnosticSeverity {
        if let Some(&severity) = self.severity.get(code) {
            return severity;
        }

        let mut best_match: Option<(&str, DiagnosticSeverity)> = None;

        for (pattern, &severity) in &self.severity {
            if code.starts_with(pattern.as_str()) {
                match best_match {
                    None => best_match = Some((pattern, severity)),
                    Some((existing_pattern, _)) => {
                        if pattern.len() > existing_pattern.len() {
                            best_match = Some((pattern, severity));
                        }
                    }
                }
            }
        }

        best_match.map_or(DiagnosticSeverity::Error, |(_, severity)| severity)
    }

    /// Check if a diagnostic should be shown (severity is not Off).
    #[must_use]
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_severity(code) != DiagnosticSeverity::Off
    }

    /// Apply command line `--select` / `--ignore` lists on top of the
    /// configured severities. Ignored codes are turned off; when a selection
    /// is given, every code outside it is turned off as well.
    #[must_use]
    pub fn with_selection(mut self, select: &[String], ignore: &[String]) -> Self {
        if !select.is_empty() {
            let mut selected = HashMap::new();
            for code in select {
                let severity = self.get_severity(code);
                let severity = if severity == DiagnosticSeverity::Off {
                    DiagnosticSeverity::Error
                } else {
                    severity
                };
                selected.insert(code.clone(), severity);
            }
            // the empty prefix matches every code
            selected.insert(String::new(), DiagnosticSeverity::Off);
            self.severity = selected;
        }
        for code in ignore {
            self.severity.insert(code.clone(), DiagnosticSeverity::Off);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use config::Config;
    use config::File;
    use config::FileFormat;

    use super::*;

    #[test]
    fn test_get_severity_default() {
        let config = DiagnosticsConfig::default();
        assert_eq!(config.get_severity("T100"), DiagnosticSeverity::Error);
        assert_eq!(config.get_severity("C100"), DiagnosticSeverity::Error);
    }

    #[test]
    fn test_get_severity_exact_match() {
        let mut severity = HashMap::new();
        severity.insert("T100".to_string(), DiagnosticSeverity::Warning);
        severity.insert("T101".to_string(), DiagnosticSeverity::Off);

        let config = DiagnosticsConfig { severity };

        assert_eq!(config.get_severity("T100"), DiagnosticSeverity::Warning);
        assert_eq!(config.get_severity("T101"), DiagnosticSeverity::Off);
        assert_eq!(config.get_severity("T102"), DiagnosticSeverity::Error);
    }

    #[test]
    fn test_get_severity_longest_prefix_wins() {
        let mut severity = HashMap::new();
        severity.insert("T".to_string(), DiagnosticSeverity::Warning);
        severity.insert("T1".to_string(), DiagnosticSeverity::Off);
        severity.insert("T10".to_string(), DiagnosticSeverity::Hint);

        let config = DiagnosticsConfig { severity };

        assert_eq!(config.get_severity("T100"), DiagnosticSeverity::Hint);
        assert_eq!(config.get_severity("T110"), DiagnosticSeverity::Off);
        assert_eq!(config.get_severity("T200"), DiagnosticSeverity::Warning);
    }

    #[test]
    fn test_is_enabled_prefix_off_with_specific_override() {
        let mut severity = HashMap::new();
        severity.insert("C".to_string(), DiagnosticSeverity::Off);
        severity.insert("C102".to_string(), DiagnosticSeverity::Hint);

        let config = DiagnosticsConfig { severity };

        assert!(config.is_enabled("C102"));
        assert!(!config.is_enabled("C100"));
        assert!(config.is_enabled("T100"));
    }

    #[test]
    fn test_to_render_severity() {
        assert_eq!(DiagnosticSeverity::Off.to_render_severity(), None);
        assert_eq!(
            DiagnosticSeverity::Error.to_render_severity(),
            Some(Severity::Error)
        );
        assert_eq!(
            DiagnosticSeverity::Hint.to_render_severity(),
            Some(Severity::Hint)
        );
    }

    #[test]
    fn test_selection_keeps_only_selected_codes() {
        let config = DiagnosticsConfig::default()
            .with_selection(&["T100".to_string(), "T101".to_string()], &[]);

        assert!(config.is_enabled("T100"));
        assert!(config.is_enabled("T101"));
        assert!(!config.is_enabled("T102"));
        assert!(!config.is_enabled("C100"));
    }

    #[test]
    fn test_ignore_turns_codes_off() {
        let config = DiagnosticsConfig::default().with_selection(&[], &["T105".to_string()]);

        assert!(!config.is_enabled("T105"));
        assert!(config.is_enabled("T100"));
    }

    #[test]
    fn test_deserialize_diagnostics_config() {
        let source = r#"
            [severity]
            T100 = "off"
            T101 = "warning"
            "C" = "hint"
        "#;

        let config: DiagnosticsConfig = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.severity.get("T100"), Some(&DiagnosticSeverity::Off));
        assert_eq!(
            config.severity.get("T101"),
            Some(&DiagnosticSeverity::Warning)
        );
        assert_eq!(config.severity.get("C"), Some(&DiagnosticSeverity::Hint));
    }
}
