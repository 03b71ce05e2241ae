use crate::errors::ServiceError;
use printpdf::{BuiltinFont, Mm, PdfDocument};

/// Page geometry for text reports. Defaults to US letter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
    pub line_height_mm: f32,
    pub title_size: f32,
    pub body_size: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width_mm: 215.9,
            height_mm: 279.4,
            margin_mm: 14.0,
            line_height_mm: 7.0,
            title_size: 14.0,
            body_size: 10.0,
        }
    }
}

impl PageLayout {
    pub fn lines_per_page(&self) -> usize {
        let usable = self.height_mm - 2.0 * self.margin_mm;
        ((usable / self.line_height_mm).floor() as usize).max(1)
    }

    /// Splits the title plus `lines` into pages. The title is the first entry
    /// of the first page; there is always at least one page.
    pub fn paginate<'a>(&self, title: &'a str, lines: &'a [String]) -> Vec<Vec<&'a str>> {
        let per_page = self.lines_per_page();
        let all: Vec<&str> = std::iter::once(title)
            .chain(lines.iter().map(String::as_str))
            .collect();
        all.chunks(per_page).map(<[&str]>::to_vec).collect()
    }
}

/// Renders a title line followed by one text line per entry.
pub fn render_pdf(
    title: &str,
    lines: &[String],
    layout: &PageLayout,
) -> Result<Vec<u8>, ServiceError> {
    let pages = layout.paginate(title, lines);
    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        Mm(layout.width_mm),
        Mm(layout.height_mm),
        "Layer 1",
    );
    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let title_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    for (page_no, page_lines) in pages.iter().enumerate() {
        let (page, layer) = if page_no == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(layout.width_mm), Mm(layout.height_mm), "Layer 1")
        };
        let canvas = doc.get_page(page).get_layer(layer);

        let mut y = layout.height_mm - layout.margin_mm;
        for (line_no, text) in page_lines.iter().enumerate() {
            if page_no == 0 && line_no == 0 {
                canvas.use_text(*text, layout.title_size, Mm(layout.margin_mm), Mm(y), &title_font);
            } else {
                canvas.use_text(*text, layout.body_size, Mm(layout.margin_mm), Mm(y), &body_font);
            }
            y -= layout.line_height_mm;
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}

fn pdf_error<E: std::fmt::Debug>(err: E) -> ServiceError {
    ServiceError::ExportError(format!("PDF rendering failed: {:?}", err))
}
