//! Note export to Markdown and PDF.
//!
//! Both formats are built from the raw Markdown, never from the rendered
//! HTML.

use notebook_common::{AppError, AppResult};
use notebook_db::{entities::note, repositories::NoteRepository};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use tracing::info;

/// Fallback file stem for untitled notes.
const UNTITLED: &str = "note";

/// Heading drawn on the PDF of an untitled note.
const UNTITLED_HEADING: &str = "Untitled note";

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const LAYER: &str = "Layer 1";

/// One point in millimetres.
const PT: f32 = 25.4 / 72.0;

const MARGIN_SIDE: f32 = 72.0 * PT;
const MARGIN_TOP: f32 = 72.0 * PT;
const MARGIN_BOTTOM: f32 = 18.0 * PT;

const TITLE_SIZE: f32 = 18.0;
const TITLE_LEADING: f32 = 22.0 * PT;
const BODY_SIZE: f32 = 12.0;
const BODY_LEADING: f32 = 20.0 * PT;
const PARAGRAPH_GAP: f32 = 6.0 * PT;

/// Characters per wrapped body line. Helvetica at 12pt averages about
/// 6pt per glyph across the 451pt text column.
const WRAP_COLUMNS: usize = 75;

/// An export ready to send as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Export service for business logic.
#[derive(Clone)]
pub struct ExportService {
    note_repo: NoteRepository,
}

impl ExportService {
    /// Create a new export service.
    #[must_use]
    pub const fn new(note_repo: NoteRepository) -> Self {
        Self { note_repo }
    }

    /// Export an owned note as Markdown.
    pub async fn markdown(&self, user_id: &str, note_id: &str) -> AppResult<ExportedFile> {
        let note = self.note_repo.get_owned(note_id, user_id).await?;
        Ok(markdown_file(&note))
    }

    /// Export an owned note as PDF.
    pub async fn pdf(&self, user_id: &str, note_id: &str) -> AppResult<ExportedFile> {
        let note = self.note_repo.get_owned(note_id, user_id).await?;
        let file = pdf_file(&note)?;

        info!(note_id = %note_id, bytes = file.body.len(), "Exported note as PDF");
        Ok(file)
    }
}

/// `<title>.<ext>`, or `note.<ext>` for an empty title.
#[must_use]
pub fn export_filename(title: &str, extension: &str) -> String {
    let stem = if title.trim().is_empty() { UNTITLED } else { title };
    format!("{stem}.{extension}")
}

/// Heading line of a PDF export: the title, or a placeholder when blank.
#[must_use]
fn pdf_heading(title: &str) -> &str {
    if title.trim().is_empty() {
        UNTITLED_HEADING
    } else {
        title
    }
}

/// `Content-Disposition` value for a download.
///
/// The quoted `filename` is an ASCII fallback; `filename*` carries the real
/// name for titles in other scripts.
#[must_use]
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

/// The raw Markdown as a `.md` download.
#[must_use]
pub fn markdown_file(note: &note::Model) -> ExportedFile {
    ExportedFile {
        filename: export_filename(&note.title, "md"),
        content_type: "text/markdown; charset=utf-8",
        body: note.content_md.clone().into_bytes(),
    }
}

/// An A4 document: the title, then every non-blank line of the Markdown.
pub fn pdf_file(note: &note::Model) -> AppResult<ExportedFile> {
    let heading = pdf_heading(&note.title);
    let mut writer = PdfWriter::new(heading)?;

    writer.line(heading, TITLE_SIZE, TITLE_LEADING, true);
    writer.gap(PARAGRAPH_GAP * 2.0);

    for line in note.content_md.lines().filter(|l| !l.trim().is_empty()) {
        for wrapped in wrap_line(line, WRAP_COLUMNS) {
            writer.line(&wrapped, BODY_SIZE, BODY_LEADING, false);
        }
        writer.gap(PARAGRAPH_GAP);
    }

    Ok(ExportedFile {
        filename: export_filename(&note.title, "pdf"),
        content_type: "application/pdf",
        body: writer.finish()?,
    })
}

/// Break a line on whitespace so no piece exceeds `columns` characters.
/// Words longer than a line are split.
fn wrap_line(line: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > columns {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(columns);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 { word.len() } else { word.len() + 1 };
        if current_len + needed > columns && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Top-down text layout over printpdf pages.
struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Baseline cursor, millimetres from the bottom edge.
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> AppResult<Self> {
        let (doc, page, layer) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, LAYER);

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Export(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::Export(e.to_string()))?;

        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT.0 - MARGIN_TOP,
        })
    }

    fn line(&mut self, text: &str, size: f32, leading: f32, bold: bool) {
        if self.y - leading < MARGIN_BOTTOM {
            self.new_page();
        }
        self.y -= leading;

        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, Mm(MARGIN_SIDE), Mm(self.y), font);
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT.0 - MARGIN_TOP;
    }

    fn finish(self) -> AppResult<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| AppError::Export(e.to_string()))
    }
}
