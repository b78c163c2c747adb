//! # PDF Generation Module
//!
//! Renders a [`Report`] to PDF using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Report data is escaped and injected before compilation
//! - Fonts come from `typst-assets`; nothing is read from disk
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use kalc_core::catalog::Catalog;
//! use kalc_core::engine::{evaluate, EvalContext};
//! use kalc_core::export::Report;
//! use kalc_core::locale::Locale;
//! use kalc_core::pdf::render_report_pdf;
//!
//! let config = Catalog::embedded()?.config("loan")?;
//! let inputs = config.default_snapshot();
//! let ctx = EvalContext::for_today(config, Locale::En);
//! let results = evaluate(config, &inputs, &ctx);
//! let report = Report::build(config, &inputs, &results, Locale::En, ctx.today)?;
//! std::fs::write("loan.pdf", render_report_pdf(&report)?).unwrap();
//! # Ok::<(), kalc_core::errors::CalcError>(())
//! ```

use chrono::Datelike;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::errors::{CalcError, CalcResult};
use crate::export::{Report, ReportRow};
use crate::format::format_date;
use crate::locale::Locale;

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    /// The main source document
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
    /// Date reported to `datetime.today()`
    today: Option<Datetime>,
}

impl PdfWorld {
    fn new(source: String, today: Option<Datetime>) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
            today,
        }
    }

    fn load_fonts() -> Vec<Font> {
        typst_assets::fonts()
            .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
            .collect()
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        self.today
    }
}

// ============================================================================
// PDF Template
// ============================================================================

const REPORT_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2.5cm, bottom: 2.5cm, left: 2.2cm, right: 2.2cm),
  header: align(right)[
    #text(size: 9pt, fill: gray)[Kalcufy]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr),
      align(left)[#text(size: 9pt)[{{DATE}}]],
      align(right)[#text(size: 9pt)[#counter(page).display()]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 11pt, lang: "{{LANG}}")

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[{{TITLE}}]
  ]
]

#v(12pt)

#block(width: 100%, stroke: (left: 2pt + rgb("#4a7bd0")), inset: (left: 10pt, y: 6pt))[
  {{SUMMARY}}
]

#v(12pt)

== {{RESULTS_HEADING}}

#table(
  columns: (1fr, auto),
  inset: 8pt,
  stroke: 0.5pt,
  align: (left, right),
{{RESULT_ROWS}}
)

#v(12pt)

== {{INPUTS_HEADING}}

#table(
  columns: (1fr, auto),
  inset: 8pt,
  stroke: 0.5pt,
  align: (left, right),
{{INPUT_ROWS}}
)
"##;

// ============================================================================
// PDF Rendering
// ============================================================================

/// Render a report to PDF bytes.
pub fn render_report_pdf(report: &Report) -> CalcResult<Vec<u8>> {
    let (results_heading, inputs_heading) = headings(report);
    let source = REPORT_TEMPLATE
        .replace("{{DATE}}", &escape_typst(&format_date(report.date, report.locale)))
        .replace("{{LANG}}", report.locale.code())
        .replace("{{TITLE}}", &escape_typst(&report.title))
        .replace("{{SUMMARY}}", &escape_typst(&report.summary))
        .replace("{{RESULTS_HEADING}}", results_heading)
        .replace("{{INPUTS_HEADING}}", inputs_heading)
        .replace("{{RESULT_ROWS}}", &table_rows(&report.results))
        .replace("{{INPUT_ROWS}}", &table_rows(&report.inputs));

    let today = Datetime::from_ymd(report.date.year(), report.date.month() as u8, report.date.day() as u8);
    let world = PdfWorld::new(source, today);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("PDF rendering failed: {}", error_msgs.join("; ")),
        }
    })
}

fn headings(report: &Report) -> (&'static str, &'static str) {
    match report.locale {
        Locale::En => ("Results", "Inputs"),
        Locale::Es => ("Resultados", "Datos"),
        Locale::Pt => ("Resultados", "Dados"),
        Locale::Fr => ("Résultats", "Données"),
        Locale::De => ("Ergebnisse", "Eingaben"),
    }
}

fn table_rows(rows: &[ReportRow]) -> String {
    rows.iter()
        .map(|row| {
            let (label, value) = (escape_typst(&row.label), escape_typst(&row.formatted));
            if row.primary {
                format!("  [*{label}*], [*{value}*],")
            } else {
                format!("  [{label}], [{value}],")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape special Typst characters in user-provided text, including comment
/// openers and the heading and list markers that act at the start of a line.
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' => "\\/".to_string(),
            '~' => "\\~".to_string(),
            '=' => "\\=".to_string(),
            '-' => "\\-".to_string(),
            '+' => "\\+".to_string(),
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
