//! PDF annotation reports.
//!
//! Layout: a title, then one block per annotated frame (thumbnail on the left,
//! `Frame N: note` wrapped to its right). A block starts on a new page when its
//! thumbnail and first line no longer fit; longer notes continue line by line
//! onto the following pages. The global comment always starts a final page,
//! one paragraph per source line.
//!
//! Text uses the built-in Helvetica faces, which only cover ASCII reliably,
//! so accented Latin letters are folded to their base letters.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{DynamicImage, RgbImage};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use unicode_width::UnicodeWidthStr;

use super::{ExportRow, ReportLanguage, RowLabel};
use crate::error::{CoreResult, export_error};
use crate::external::FrameDecoder;
use crate::frame::FrameIndex;
use crate::media::{VideoHandle, make_thumbnail};

// US Letter
const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 18.0;

const TITLE_SIZE_PT: f32 = 16.0;
const HEADING_SIZE_PT: f32 = 14.0;
const BODY_SIZE_PT: f32 = 11.0;
const LINE_HEIGHT_MM: f32 = 5.5;
const BLOCK_GAP_MM: f32 = 8.0;
const COLUMN_GAP_MM: f32 = 6.0;

/// Resolution thumbnails are embedded at.
const THUMBNAIL_DPI: f32 = 96.0;

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;
const MM_PER_PT: f32 = 25.4 / 72.0;

/// Supplies thumbnails for annotated frames.
pub trait ThumbnailSource {
    /// A thumbnail for `frame`, or `None` to render the row without one.
    fn thumbnail(&self, frame: FrameIndex) -> Option<RgbImage>;
}

impl<F: Fn(FrameIndex) -> Option<RgbImage>> ThumbnailSource for F {
    fn thumbnail(&self, frame: FrameIndex) -> Option<RgbImage> {
        self(frame)
    }
}

/// Decodes thumbnails from an open video. Frames that fail to decode are skipped.
pub struct DecodedThumbnails<'a> {
    handle: &'a VideoHandle,
    decoder: &'a dyn FrameDecoder,
    max_side: u32,
}

impl<'a> DecodedThumbnails<'a> {
    pub fn new(handle: &'a VideoHandle, decoder: &'a dyn FrameDecoder, max_side: u32) -> Self {
        Self {
            handle,
            decoder,
            max_side,
        }
    }
}

impl ThumbnailSource for DecodedThumbnails<'_> {
    fn thumbnail(&self, frame: FrameIndex) -> Option<RgbImage> {
        match self.handle.read_frame(self.decoder, frame) {
            Ok(Some(image)) => Some(make_thumbnail(&image, self.max_side)),
            Ok(None) => {
                log::warn!("Frame {} is past the end of the stream; no thumbnail", frame);
                None
            }
            Err(err) => {
                log::warn!("Could not decode frame {} for the report: {}", frame, err);
                None
            }
        }
    }
}

fn px_to_mm(px: u32) -> f32 {
    px as f32 / THUMBNAIL_DPI * 25.4
}

/// Maps text onto what the built-in fonts can show.
fn pdf_text(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        '\u{2013}' | '\u{2014}' => '-',
        '\t' => ' ',
        c if c.is_ascii() && !c.is_ascii_control() => c,
        _ => '?',
    }
}

/// How many display columns of body text fit in `width_mm`.
fn columns_for(width_mm: f32, size_pt: f32) -> usize {
    let glyph_mm = size_pt * AVG_GLYPH_EM * MM_PER_PT;
    ((width_mm / glyph_mm).floor() as usize).max(8)
}

/// Greedy word wrap by display width. Each source line starts a new line;
/// words wider than `max_columns` are split.
pub(crate) fn wrap_text(text: &str, max_columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for source_line in text.split('\n') {
        let mut current = String::new();
        for word in source_line.split_whitespace() {
            let mut word = word.to_string();
            while word.width() > max_columns {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let split_at = split_index(&word, max_columns);
                let rest = word.split_off(split_at);
                lines.push(word);
                word = rest;
            }
            let needed = if current.is_empty() {
                word.width()
            } else {
                current.width() + 1 + word.width()
            };
            if needed > max_columns && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        lines.push(current);
    }
    lines
}

/// Byte index where the prefix of `word` reaches `max_columns` display columns.
fn split_index(word: &str, max_columns: usize) -> usize {
    let mut width = 0;
    for (idx, c) in word.char_indices() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > max_columns && idx > 0 {
            return idx;
        }
        width += w;
    }
    word.len()
}

/// Left edge of the frame note column for a given thumbnail cap.
fn frame_text_x(thumbnail_size: u32) -> f32 {
    MARGIN_MM + px_to_mm(thumbnail_size) + COLUMN_GAP_MM
}

/// Where the rows of a report ended up.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReportLayout {
    pub pages: usize,
    /// Each row in drawing order with the 1-based page its first line is on
    pub placements: Vec<(RowLabel, usize)>,
    /// Lowest point drawn on any page, in mm from the bottom edge
    pub lowest_mm: f32,
}

/// Tracks the current page and the vertical write position.
struct PageCursor<'d> {
    doc: &'d PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
    lowest: f32,
}

impl<'d> PageCursor<'d> {
    fn top() -> f32 {
        PAGE_HEIGHT_MM - MARGIN_MM
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = Self::top();
    }

    /// Starts a new page unless `height` still fits above the bottom margin.
    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN_MM && self.y < Self::top() {
            self.new_page();
        }
    }

    fn text(&mut self, text: &str, size_pt: f32, x: f32, y: f32, font: &IndirectFontRef) {
        self.lowest = self.lowest.min(y);
        self.layer.use_text(pdf_text(text), size_pt, Mm(x), Mm(y), font);
    }

    /// Draws `thumb` with its top-left corner at (`x`, `top`).
    fn image(&mut self, thumb: RgbImage, x: f32, top: f32) {
        let bottom = top - px_to_mm(thumb.height());
        self.lowest = self.lowest.min(bottom);
        Image::from_dynamic_image(&DynamicImage::ImageRgb8(thumb)).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(bottom)),
                dpi: Some(THUMBNAIL_DPI),
                ..Default::default()
            },
        );
    }
}

/// Builds the report document in memory.
pub fn build_pdf(
    rows: &[ExportRow],
    language: ReportLanguage,
    thumbnail_size: u32,
    thumbnails: &dyn ThumbnailSource,
) -> Result<PdfDocumentReference, printpdf::Error> {
    lay_out(rows, language, thumbnail_size, thumbnails).map(|(doc, _)| doc)
}

fn lay_out(
    rows: &[ExportRow],
    language: ReportLanguage,
    thumbnail_size: u32,
    thumbnails: &dyn ThumbnailSource,
) -> Result<(PdfDocumentReference, ReportLayout), printpdf::Error> {
    let title = pdf_text(language.report_title());
    let (doc, page, layer) = PdfDocument::new(
        title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Page 1",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let layer = doc.get_page(page).get_layer(layer);
    let mut cursor = PageCursor {
        doc: &doc,
        layer,
        y: PageCursor::top(),
        pages: 1,
        lowest: PageCursor::top(),
    };
    let mut placements = Vec::with_capacity(rows.len());

    cursor.y -= TITLE_SIZE_PT * MM_PER_PT;
    cursor.text(&title, TITLE_SIZE_PT, MARGIN_MM, cursor.y, &bold);
    cursor.y -= BLOCK_GAP_MM * 1.5;

    let text_x = frame_text_x(thumbnail_size);
    let frame_columns = columns_for(PAGE_WIDTH_MM - MARGIN_MM - text_x, BODY_SIZE_PT);
    let full_columns = columns_for(PAGE_WIDTH_MM - 2.0 * MARGIN_MM, BODY_SIZE_PT);

    for row in rows {
        match row.label {
            RowLabel::Frame(index) => {
                let thumb = thumbnails.thumbnail(index);
                let thumb_height = thumb.as_ref().map_or(0.0, |t| px_to_mm(t.height()));
                let lines = wrap_text(&language.frame_line(index, &row.text), frame_columns);

                // The thumbnail stays with the first line of its note.
                cursor.ensure_space(thumb_height.max(LINE_HEIGHT_MM));
                let block_top = cursor.y;
                let block_page = cursor.pages;
                placements.push((row.label, block_page));

                if let Some(thumb) = thumb {
                    cursor.image(thumb, MARGIN_MM, block_top);
                }
                for line in &lines {
                    cursor.ensure_space(LINE_HEIGHT_MM);
                    cursor.y -= LINE_HEIGHT_MM;
                    cursor.text(line, BODY_SIZE_PT, text_x, cursor.y, &regular);
                }

                let mut bottom = cursor.y;
                if cursor.pages == block_page {
                    bottom = bottom.min(block_top - thumb_height);
                }
                cursor.y = bottom - BLOCK_GAP_MM;
            }
            RowLabel::GlobalComment => {
                cursor.new_page();
                placements.push((row.label, cursor.pages));
                cursor.y -= HEADING_SIZE_PT * MM_PER_PT;
                cursor.text(
                    language.global_comment_label(),
                    HEADING_SIZE_PT,
                    MARGIN_MM,
                    cursor.y,
                    &bold,
                );
                cursor.y -= BLOCK_GAP_MM;

                for paragraph in row.text.lines() {
                    for line in wrap_text(paragraph, full_columns) {
                        cursor.ensure_space(LINE_HEIGHT_MM);
                        cursor.y -= LINE_HEIGHT_MM;
                        cursor.text(&line, BODY_SIZE_PT, MARGIN_MM, cursor.y, &regular);
                    }
                    cursor.y -= LINE_HEIGHT_MM / 2.0;
                }
            }
        }
    }

    let layout = ReportLayout {
        pages: cursor.pages,
        placements,
        lowest_mm: cursor.lowest,
    };
    log::debug!(
        "Laid out {} report rows on {} pages, lowest at {:.1}mm",
        layout.placements.len(),
        layout.pages,
        layout.lowest_mm
    );
    Ok((doc, layout))
}

/// Builds the report and writes it to `out`.
pub fn write_pdf<W: Write>(
    out: &mut BufWriter<W>,
    rows: &[ExportRow],
    language: ReportLanguage,
    thumbnail_size: u32,
    thumbnails: &dyn ThumbnailSource,
) -> Result<(), printpdf::Error> {
    build_pdf(rows, language, thumbnail_size, thumbnails)?.save(out)
}

/// Writes a PDF report to `path`, creating parent directories as needed.
///
/// # Errors
///
/// `CoreError::Export` with the underlying cause when layout or writing fails.
pub fn write_pdf_report(
    path: &Path,
    rows: &[ExportRow],
    language: ReportLanguage,
    thumbnail_size: u32,
    thumbnails: &dyn ThumbnailSource,
) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| export_error(path, e))?;
    }
    let file = File::create(path).map_err(|e| export_error(path, e))?;
    let mut out = BufWriter::new(file);
    write_pdf(&mut out, rows, language, thumbnail_size, thumbnails)
        .map_err(|e| export_error(path, format!("{e:?}")))?;
    out.flush().map_err(|e| export_error(path, e))?;

    log::info!("Wrote PDF report with {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;
    use crate::config::MAX_THUMBNAIL_SIZE;
    use crate::external::mocks::MockFrameDecoder;
    use crate::media::VideoResource;
    use crate::resolver::ResolvedFrameCount;

    fn rows() -> Vec<ExportRow> {
        vec![
            ExportRow::new(RowLabel::Frame(FrameIndex(0)), "first frame"),
            ExportRow::new(RowLabel::Frame(FrameIndex(7)), "observação longa ".repeat(40)),
            ExportRow::new(RowLabel::GlobalComment, "line one\nline two"),
        ]
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("the quick brown fox jumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn wrap_keeps_source_lines_and_splits_long_words() {
        let lines = wrap_text("abcdefghijkl\nx", 5);
        assert_eq!(lines, vec!["abcde", "fghij", "kl", "x"]);
    }

    #[test]
    fn folds_accents_for_builtin_fonts() {
        assert_eq!(pdf_text("Relatório de Anotações"), "Relatorio de Anotacoes");
        assert_eq!(pdf_text("日本"), "??");
    }

    #[test]
    fn writes_pdf_with_and_without_thumbnails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let thumbs = |frame: FrameIndex| {
            (frame.get() == 0).then(|| RgbImage::from_pixel(200, 112, Rgb([90, 90, 90])))
        };

        write_pdf_report(&path, &rows(), ReportLanguage::Portuguese, 200, &thumbs).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    fn labels(rows: &[ExportRow]) -> Vec<RowLabel> {
        rows.iter().map(|row| row.label).collect()
    }

    #[test]
    fn many_frames_span_pages() {
        let mut rows: Vec<ExportRow> = (0..20)
            .map(|i| ExportRow::new(RowLabel::Frame(FrameIndex(i)), format!("note {i}")))
            .collect();
        rows.push(ExportRow::new(RowLabel::GlobalComment, ""));
        let thumbs = |_: FrameIndex| Some(RgbImage::from_pixel(200, 150, Rgb([0, 0, 0])));

        let (_, layout) = lay_out(&rows, ReportLanguage::English, 200, &thumbs).unwrap();

        // 4 blocks fit under the title, 5 on each following page.
        assert_eq!(layout.pages, 6);
        let pages: Vec<usize> = layout.placements.iter().map(|(_, page)| *page).collect();
        assert_eq!(&pages[..5], &[1, 1, 1, 1, 2]);
        assert_eq!(pages[19], 5);
        assert_eq!(layout.placements.last(), Some(&(RowLabel::GlobalComment, 6)));
        assert!(layout.lowest_mm >= MARGIN_MM);

        let mut out = BufWriter::new(Vec::new());
        write_pdf(&mut out, &rows, ReportLanguage::English, 200, &thumbs).unwrap();
        let bytes = out.into_inner().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
    }

    #[test]
    fn rows_keep_export_order_and_global_comment_gets_its_own_page() {
        let rows = rows();
        let thumbs = |_: FrameIndex| -> Option<RgbImage> { None };

        let (_, layout) = lay_out(&rows, ReportLanguage::English, 200, &thumbs).unwrap();

        let drawn: Vec<RowLabel> = layout.placements.iter().map(|(label, _)| *label).collect();
        assert_eq!(drawn, labels(&rows));
        assert_eq!(layout.pages, 2);
        assert_eq!(layout.placements[1].1, 1);
        assert_eq!(layout.placements[2], (RowLabel::GlobalComment, 2));
    }

    #[test]
    fn long_note_continues_on_following_pages() {
        let rows = vec![
            ExportRow::new(RowLabel::Frame(FrameIndex(3)), "word ".repeat(1200)),
            ExportRow::new(RowLabel::Frame(FrameIndex(4)), "after"),
            ExportRow::new(RowLabel::GlobalComment, "done"),
        ];
        let thumbs = |_: FrameIndex| Some(RgbImage::from_pixel(200, 112, Rgb([10, 10, 10])));

        let (_, layout) = lay_out(&rows, ReportLanguage::English, 200, &thumbs).unwrap();

        assert!(layout.pages >= 4, "only {} pages", layout.pages);
        assert!(layout.lowest_mm >= MARGIN_MM, "drew at {}mm", layout.lowest_mm);
        assert_eq!(layout.placements[0], (RowLabel::Frame(FrameIndex(3)), 1));
        assert!(layout.placements[1].1 > 1);
        assert_eq!(layout.placements[2], (RowLabel::GlobalComment, layout.pages));
    }

    #[test]
    fn largest_thumbnail_fits_the_page() {
        let text_width = PAGE_WIDTH_MM - MARGIN_MM - frame_text_x(MAX_THUMBNAIL_SIZE);
        assert!(columns_for(text_width, BODY_SIZE_PT) >= 30);
        assert!(px_to_mm(MAX_THUMBNAIL_SIZE) < PAGE_HEIGHT_MM - 2.0 * MARGIN_MM - 30.0);

        let rows = vec![ExportRow::new(RowLabel::Frame(FrameIndex(0)), "tall")];
        let side = MAX_THUMBNAIL_SIZE;
        let thumbs = move |_: FrameIndex| Some(RgbImage::from_pixel(side, side, Rgb([0, 0, 0])));
        let (_, layout) = lay_out(&rows, ReportLanguage::English, side, &thumbs).unwrap();
        assert_eq!(layout.pages, 1);
        assert!(layout.lowest_mm >= MARGIN_MM);
    }

    #[test]
    fn undecodable_frames_have_no_thumbnail() {
        let decoder = MockFrameDecoder::new();
        decoder.add_video(Path::new("clip.mp4"), 10, 64, 36);
        let handle = VideoHandle::new(
            VideoResource::from_path("clip.mp4"),
            ResolvedFrameCount::Trusted(10),
            None,
            Vec::new(),
        )
        .unwrap();

        let thumbs = DecodedThumbnails::new(&handle, &decoder, 32);
        let thumb = thumbs.thumbnail(FrameIndex(3)).unwrap();
        assert_eq!(thumb.dimensions(), (32, 18));

        decoder.fail_on(Path::new("clip.mp4"));
        assert!(thumbs.thumbnail(FrameIndex(3)).is_none());
    }
}
