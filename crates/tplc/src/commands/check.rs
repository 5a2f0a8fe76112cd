use std::io::IsTerminal;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use clap::Parser;
use tplc_conf::DiagnosticsConfig;
use tplc_conf::Settings;
use tplc_source::DiagnosticRenderer;
use tplc_source::Severity;
use tplc_templates::Ast;
use tplc_templates::Diagnostic;
use tplc_templates::EcmaSyntax;
use tplc_templates::ExpressionValidator;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Check {
    /// Serialized template tree (JSON) to validate.
    ast: Utf8PathBuf,

    /// Template source the tree was built from, for code frames.
    #[arg(long)]
    template: Option<Utf8PathBuf>,

    /// Select specific diagnostic codes to enable (e.g. T100,T101).
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,

    /// Ignore specific diagnostic codes (e.g. T105).
    #[arg(long, value_delimiter = ',')]
    ignore: Vec<String>,
}

impl Command for Check {
    fn execute(&self, args: &Args) -> Result<Exit> {
        let project_root = resolve_project_root()?;
        let settings =
            Settings::new(project_root.as_std_path()).context("Failed to load settings")?;
        let config = settings
            .diagnostics
            .clone()
            .with_selection(&self.select, &self.ignore);

        let ast = read_ast(&self.ast)?;
        let source = self
            .template
            .as_ref()
            .map(|path| {
                std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
            })
            .transpose()?;

        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        ExpressionValidator::new(&EcmaSyntax).detect_errors(&ast, &mut diagnostics);
        tracing::debug!(count = diagnostics.len(), "validated template tree");

        let path = self.template.as_deref().unwrap_or(&self.ast);
        let rendered = render_diagnostics(&diagnostics, source.as_deref(), path, &config);

        if !args.global.quiet {
            for (_, output) in &rendered {
                println!("{output}\n");
            }
        }

        let error_count = rendered
            .iter()
            .filter(|(severity, _)| *severity == Severity::Error)
            .count();
        if error_count > 0 {
            let word = if error_count == 1 { "error" } else { "errors" };
            Ok(Exit::error().with_message(format!("Found {error_count} {word}.")))
        } else {
            Ok(Exit::success())
        }
    }
}

fn read_ast(path: &Utf8Path) -> Result<Ast> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse template tree {path}"))
}

fn render_diagnostics(
    diagnostics: &[Diagnostic],
    source: Option<&str>,
    path: &Utf8Path,
    config: &DiagnosticsConfig,
) -> Vec<(Severity, String)> {
    let fmt = pick_renderer();
    diagnostics
        .iter()
        .filter_map(|diagnostic| {
            let severity = config.get_severity(diagnostic.code).to_render_severity()?;
            let output = match (source, diagnostic.span) {
                (Some(source), Some(span)) => {
                    let title = diagnostic.message.lines().next().unwrap_or_default();
                    fmt.render(&tplc_source::Diagnostic::new(
                        source,
                        path.as_str(),
                        diagnostic.code,
                        title,
                        severity,
                        span,
                        "",
                    ))
                }
                _ => format!(
                    "{}[{}]: {}\n --> {path}",
                    severity_label(severity),
                    diagnostic.code,
                    diagnostic.message
                ),
            };
            Some((severity, output))
        })
        .collect()
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
        Severity::Hint => "help",
    }
}

fn resolve_project_root() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|_| anyhow::anyhow!("Current directory is not valid UTF-8"))
}

fn pick_renderer() -> DiagnosticRenderer {
    if std::io::stdout().is_terminal() {
        DiagnosticRenderer::styled()
    } else {
        DiagnosticRenderer::plain()
    }
}
