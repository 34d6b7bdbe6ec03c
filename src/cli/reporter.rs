use colored::Colorize;
use rustc_hash::FxHashMap;

use sable_common::{Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation};

/// Byte offsets of line starts.
struct LineMap {
    starts: Vec<u32>,
}

impl LineMap {
    fn build(source: &str) -> Self {
        let mut starts = vec![0];
        for (index, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                starts.push(index as u32 + 1);
            }
        }
        LineMap { starts }
    }

    /// Zero-based `(line, column)`; the column counts characters.
    fn position(&self, offset: u32, source: &str) -> (u32, u32) {
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.starts[line] as usize;
        let end = (offset as usize).min(source.len());
        let column = source
            .get(start..end)
            .map_or(end - start, |text| text.chars().count());
        (line as u32, column as u32)
    }
}

pub struct Reporter {
    color: bool,
    sources: FxHashMap<String, String>,
    line_maps: FxHashMap<String, LineMap>,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter {
            color,
            sources: FxHashMap::default(),
            line_maps: FxHashMap::default(),
        }
    }

    /// Source text that spans in `file` point into. Without it, locations
    /// fall back to the bare file name.
    pub fn add_source(&mut self, file: &str, source: &str) {
        self.line_maps.insert(file.to_string(), LineMap::build(source));
        self.sources.insert(file.to_string(), source.to_string());
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = self
            .format_location(&diagnostic.file, diagnostic.start)
            .unwrap_or_else(|| {
                if diagnostic.file.is_empty() {
                    "<unknown>".to_string()
                } else {
                    diagnostic.file.clone()
                }
            });

        output.push_str(" - ");
        output.push_str(&self.format_category(diagnostic.category));
        let code = self.format_code(diagnostic.code);
        if !code.is_empty() {
            output.push(' ');
            output.push_str(&code);
        }
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        if let Some(snippet) =
            self.format_snippet(&diagnostic.file, diagnostic.start, diagnostic.length)
        {
            output.push_str(&snippet);
        }

        for related in &diagnostic.related_information {
            output.push('\n');
            output.push_str(&self.format_related(related));
        }
        output
    }

    /// `Found 2 warnings in 1 file.`
    pub fn format_summary(&self, diagnostics: &[Diagnostic], files: usize) -> String {
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        let warnings = diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Warning)
            .count();
        let plural = |n: usize, word: &str| {
            if n == 1 {
                format!("{n} {word}")
            } else {
                format!("{n} {word}s")
            }
        };
        let counts = match (errors, warnings) {
            (0, 0) => "no issues".to_string(),
            (0, w) => plural(w, "warning"),
            (e, 0) => plural(e, "error"),
            (e, w) => format!("{} and {}", plural(e, "error"), plural(w, "warning")),
        };
        format!("Found {counts} in {}.", plural(files, "file"))
    }

    ///   3   let kp: KeyPath<K, Bool> & Sendable = \K.[NonSendable()]
    ///                                              ~~~~~~~~~~~~~~~~~~
    fn format_snippet(&self, file: &str, start: u32, length: u32) -> Option<String> {
        if length == 0 {
            return None;
        }
        let source = self.sources.get(file)?;
        let (line, column) = self.line_maps.get(file)?.position(start, source);
        let line_text = source.lines().nth(line as usize)?;

        let mut underline = String::new();
        let end = column + length;
        for (index, ch) in line_text.chars().enumerate() {
            let index = index as u32;
            if index >= end {
                break;
            }
            let width = if ch == '\t' { 4 } else { 1 };
            let mark = if index < column { ' ' } else { '~' };
            underline.extend(std::iter::repeat_n(mark, width));
        }
        if !underline.contains('~') {
            underline.push('~');
        }

        let underline = if self.color {
            underline.red().to_string()
        } else {
            underline
        };
        Some(format!("\n  {:>3}   {line_text}\n       {underline}", line + 1))
    }

    fn format_related(&self, related: &DiagnosticRelatedInformation) -> String {
        let location = self
            .format_location(&related.file, related.start)
            .unwrap_or_else(|| related.file.clone());
        let prefix = if self.color {
            "  Related".dimmed().to_string()
        } else {
            "  Related".to_string()
        };
        format!("{prefix}: {location} - {}", related.message_text)
    }

    fn format_location(&self, file: &str, offset: u32) -> Option<String> {
        let source = self.sources.get(file)?;
        let (line, column) = self.line_maps.get(file)?.position(offset, source);
        Some(format!("{file}:{}:{}", line + 1, column + 1))
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = category.as_str();
        if !self.color {
            return label.to_string();
        }
        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Suggestion => label.blue().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        if code == 0 {
            return String::new();
        }
        let label = format!("SABLE{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}
