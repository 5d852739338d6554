//! Minimal PDF 1.4 writer for the page model
//!
//! Produces one content stream per page using the two standard Helvetica
//! fonts in WinAnsiEncoding, plus URI link annotations. Layout coordinates
//! (millimetres, y down from the top) are converted to PDF user space
//! (points, y up from the bottom) here and nowhere else.

use crate::document::{DrawOp, Page};
use crate::metrics::{Font, TextStyle, encode_text};
use chrono::{DateTime, Utc};
use medchat_common::constants::MM_PER_PT;
use medchat_common::{ExportError, PageGeometry, Result, Rgb};
use std::io::Write;

/// Bezier control distance for a quarter circle of radius 1
const KAPPA: f64 = 0.5523;

/// Document information dictionary entries
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub producer: String,
    pub created_at: DateTime<Utc>,
}

fn pt(mm: f64) -> f64 {
    mm / MM_PER_PT
}

/// Escape encoded bytes for a PDF literal string
fn escape_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 8);
    for &b in bytes {
        match b {
            b'\\' | b'(' | b')' => {
                out.push(b'\\');
                out.push(b);
            }
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\n' => out.extend_from_slice(b"\\n"),
            _ => out.push(b),
        }
    }
    out
}

fn literal(text: &str) -> Vec<u8> {
    let mut out = vec![b'('];
    out.extend(escape_bytes(&encode_text(text)));
    out.push(b')');
    out
}

/// Turns page ops into content stream bytes
struct ContentStream<'a> {
    geometry: &'a PageGeometry,
    buf: Vec<u8>,
}

impl<'a> ContentStream<'a> {
    fn new(geometry: &'a PageGeometry) -> Self {
        Self {
            geometry,
            buf: Vec::new(),
        }
    }

    /// PDF y of a layout y
    fn flip(&self, y: f64) -> f64 {
        pt(self.geometry.height - y)
    }

    fn fill_color(&mut self, color: Rgb) -> Result<()> {
        let (r, g, b) = color.unit();
        writeln!(self.buf, "{:.3} {:.3} {:.3} rg", r, g, b)?;
        Ok(())
    }

    fn text(&mut self, x: f64, y: f64, text: &str, style: &TextStyle) -> Result<()> {
        writeln!(self.buf, "BT")?;
        writeln!(
            self.buf,
            "/{} {:.2} Tf",
            style.font.resource_name(),
            style.size
        )?;
        self.fill_color(style.color)?;
        writeln!(self.buf, "{:.2} {:.2} Td", pt(x), self.flip(y))?;
        self.buf.extend(literal(text));
        writeln!(self.buf, " Tj")?;
        writeln!(self.buf, "ET")?;
        Ok(())
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) -> Result<()> {
        writeln!(self.buf, "q")?;
        self.fill_color(color)?;
        writeln!(
            self.buf,
            "{:.2} {:.2} {:.2} {:.2} re f",
            pt(x),
            self.flip(y + height),
            pt(width),
            pt(height)
        )?;
        writeln!(self.buf, "Q")?;
        Ok(())
    }

    fn rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        color: Rgb,
    ) -> Result<()> {
        let r = pt(radius.min(width / 2.0).min(height / 2.0));
        let left = pt(x);
        let right = pt(x + width);
        let top = self.flip(y);
        let bottom = self.flip(y + height);
        let k = r * KAPPA;

        writeln!(self.buf, "q")?;
        self.fill_color(color)?;
        writeln!(self.buf, "{:.2} {:.2} m", left + r, bottom)?;
        writeln!(self.buf, "{:.2} {:.2} l", right - r, bottom)?;
        writeln!(
            self.buf,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            right - r + k,
            bottom,
            right,
            bottom + r - k,
            right,
            bottom + r
        )?;
        writeln!(self.buf, "{:.2} {:.2} l", right, top - r)?;
        writeln!(
            self.buf,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            right,
            top - r + k,
            right - r + k,
            top,
            right - r,
            top
        )?;
        writeln!(self.buf, "{:.2} {:.2} l", left + r, top)?;
        writeln!(
            self.buf,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            left + r - k,
            top,
            left,
            top - r + k,
            left,
            top - r
        )?;
        writeln!(self.buf, "{:.2} {:.2} l", left, bottom + r)?;
        writeln!(
            self.buf,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            left,
            bottom + r - k,
            left + r - k,
            bottom,
            left + r,
            bottom
        )?;
        writeln!(self.buf, "f")?;
        writeln!(self.buf, "Q")?;
        Ok(())
    }

    fn render(mut self, page: &Page) -> Result<Vec<u8>> {
        for op in &page.ops {
            match op {
                DrawOp::Text { x, y, text, style } => self.text(*x, *y, text, style)?,
                DrawOp::FilledRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => self.rect(*x, *y, *width, *height, *color)?,
                DrawOp::RoundedRect {
                    x,
                    y,
                    width,
                    height,
                    radius,
                    color,
                } => self.rounded_rect(*x, *y, *width, *height, *radius, *color)?,
                // Links become annotations, not content
                DrawOp::Link { .. } => {}
            }
        }
        Ok(self.buf)
    }
}

/// Object numbers assigned before anything is written
struct PageObjects {
    page: usize,
    content: usize,
    annotations: Vec<usize>,
}

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const INFO_ID: usize = 3;
const FIRST_FONT_ID: usize = 4;

/// Byte buffer that records where each object starts
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<Option<usize>>,
}

impl PdfWriter {
    fn new(object_count: usize) -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: vec![None; object_count],
        }
    }

    fn begin(&mut self, id: usize) -> Result<()> {
        let slot = self
            .offsets
            .get_mut(id - 1)
            .ok_or_else(|| ExportError::Render(format!("object {} was never allocated", id)))?;
        *slot = Some(self.buf.len());
        write!(self.buf, "{} 0 obj\n", id)?;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.buf.extend_from_slice(b"endobj\n");
        Ok(())
    }

    fn object(&mut self, id: usize, body: &[u8]) -> Result<()> {
        self.begin(id)?;
        self.buf.extend_from_slice(body);
        self.buf.push(b'\n');
        self.end()
    }

    fn stream(&mut self, id: usize, data: &[u8]) -> Result<()> {
        self.begin(id)?;
        write!(self.buf, "<< /Length {} >>\nstream\n", data.len())?;
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\n");
        self.end()
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        let xref_start = self.buf.len();
        let size = self.offsets.len() + 1;
        write!(self.buf, "xref\n0 {}\n0000000000 65535 f \n", size)?;
        for (index, offset) in self.offsets.iter().enumerate() {
            let offset = offset.ok_or_else(|| {
                ExportError::Render(format!("object {} was never written", index + 1))
            })?;
            write!(self.buf, "{:010} 00000 n \n", offset)?;
        }
        write!(
            self.buf,
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            size, CATALOG_ID, INFO_ID, xref_start
        )?;
        Ok(self.buf)
    }
}

/// Serialize laid-out pages into a complete PDF file
pub fn write_pdf(pages: &[Page], geometry: &PageGeometry, info: &DocumentInfo) -> Result<Vec<u8>> {
    if pages.is_empty() {
        return Err(ExportError::Render("document has no pages".to_string()));
    }

    let font_ids: Vec<(Font, usize)> = Font::ALL
        .iter()
        .enumerate()
        .map(|(i, font)| (*font, FIRST_FONT_ID + i))
        .collect();
    let mut next_id = FIRST_FONT_ID + font_ids.len();
    let mut allocate = || {
        let id = next_id;
        next_id += 1;
        id
    };

    let plan: Vec<PageObjects> = pages
        .iter()
        .map(|page| PageObjects {
            page: allocate(),
            content: allocate(),
            annotations: page.links().map(|_| allocate()).collect(),
        })
        .collect();
    let object_count = next_id - 1;

    let mut pdf = PdfWriter::new(object_count);

    pdf.object(
        CATALOG_ID,
        format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID).as_bytes(),
    )?;

    let kids: Vec<String> = plan.iter().map(|p| format!("{} 0 R", p.page)).collect();
    pdf.object(
        PAGES_ID,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            plan.len()
        )
        .as_bytes(),
    )?;

    let mut info_body = b"<< /Title ".to_vec();
    info_body.extend(literal(&info.title));
    info_body.extend_from_slice(b" /Producer ");
    info_body.extend(literal(&info.producer));
    write!(
        info_body,
        " /CreationDate (D:{}Z) >>",
        info.created_at.format("%Y%m%d%H%M%S")
    )?;
    pdf.object(INFO_ID, &info_body)?;

    for (font, id) in &font_ids {
        pdf.object(
            *id,
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_name()
            )
            .as_bytes(),
        )?;
    }
    let font_resources: Vec<String> = font_ids
        .iter()
        .map(|(font, id)| format!("/{} {} 0 R", font.resource_name(), id))
        .collect();
    let font_resources = font_resources.join(" ");

    for (page, objects) in pages.iter().zip(&plan) {
        let annots = if objects.annotations.is_empty() {
            String::new()
        } else {
            let refs: Vec<String> = objects
                .annotations
                .iter()
                .map(|id| format!("{} 0 R", id))
                .collect();
            format!(" /Annots [{}]", refs.join(" "))
        };
        pdf.object(
            objects.page,
            format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {:.2} {:.2}] /Contents {} 0 R /Resources << /Font << {} >> >>{} >>",
                PAGES_ID,
                pt(geometry.width),
                pt(geometry.height),
                objects.content,
                font_resources,
                annots
            )
            .as_bytes(),
        )?;

        let content = ContentStream::new(geometry).render(page)?;
        pdf.stream(objects.content, &content)?;

        let links = page.ops.iter().filter_map(|op| match op {
            DrawOp::Link {
                x,
                y,
                width,
                height,
                url,
            } => Some((*x, *y, *width, *height, url)),
            _ => None,
        });
        for ((x, y, width, height, url), id) in links.zip(&objects.annotations) {
            let mut body = Vec::new();
            write!(
                body,
                "<< /Type /Annot /Subtype /Link /Rect [{:.2} {:.2} {:.2} {:.2}] /Border [0 0 0] /A << /Type /Action /S /URI /URI ",
                pt(x),
                pt(geometry.height - y - height),
                pt(x + width),
                pt(geometry.height - y)
            )?;
            body.extend(literal(url));
            body.extend_from_slice(b" >> >>");
            pdf.object(*id, &body)?;
        }
    }

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn info() -> DocumentInfo {
        DocumentInfo {
            title: "Checkup (notes)".to_string(),
            producer: "MedChat".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap(),
        }
    }

    fn page_with_text(text: &str) -> Page {
        let mut page = Page::default();
        page.push(DrawOp::Text {
            x: 20.0,
            y: 30.0,
            text: text.to_string(),
            style: TextStyle::regular(10.0, Rgb::BLACK),
        });
        page
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_escape_bytes() {
        assert_eq!(escape_bytes(b"a(b)c\\"), b"a\\(b\\)c\\\\".to_vec());
    }

    #[test]
    fn test_literal_encodes_winansi() {
        assert_eq!(literal("é"), vec![b'(', 0xE9, b')']);
        assert_eq!(literal("😀"), b"(?)".to_vec());
    }

    #[test]
    fn test_structure() {
        let pages = vec![page_with_text("Hello"), page_with_text("World")];
        let bytes = write_pdf(&pages, &PageGeometry::default(), &info()).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert!(contains(&bytes, b"/Count 2"));
        assert!(contains(&bytes, b"(Hello) Tj"));
        assert!(contains(&bytes, b"(World) Tj"));
        assert!(contains(&bytes, b"/BaseFont /Helvetica-Bold"));
        assert!(contains(&bytes, b"/Title (Checkup \\(notes\\))"));
        assert!(contains(&bytes, b"/CreationDate (D:20240115080000Z)"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let pages = vec![page_with_text("Hello")];
        let bytes = write_pdf(&pages, &PageGeometry::default(), &info()).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        let xref_at: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(bytes[xref_at..].starts_with(b"xref"));

        let xref = std::str::from_utf8(&bytes[xref_at..]).unwrap();
        let entries: Vec<usize> = xref
            .lines()
            .skip(3)
            .take_while(|line| line.ends_with(" n "))
            .map(|line| line[..10].parse().unwrap())
            .collect();
        for (index, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", index + 1);
            assert!(bytes[*offset..].starts_with(expected.as_bytes()));
        }
        // catalog, pages, info, two fonts, one page + content
        assert_eq!(entries.len(), 7);
    }

    #[test]
    fn test_link_annotation() {
        let mut page = page_with_text("https://x");
        page.push(DrawOp::Link {
            x: 20.0,
            y: 26.0,
            width: 10.0,
            height: 5.0,
            url: "https://x".to_string(),
        });
        let bytes = write_pdf(&[page], &PageGeometry::default(), &info()).unwrap();
        assert!(contains(&bytes, b"/Subtype /Link"));
        assert!(contains(&bytes, b"/URI (https://x)"));
        assert!(contains(&bytes, b"/Annots ["));
    }

    #[test]
    fn test_no_pages_is_an_error() {
        let result = write_pdf(&[], &PageGeometry::default(), &info());
        assert!(matches!(result, Err(ExportError::Render(_))));
    }

    #[test]
    fn test_y_axis_flipped() {
        let geometry = PageGeometry::default();
        let stream = ContentStream::new(&geometry);
        assert!((stream.flip(0.0) - pt(297.0)).abs() < 1e-9);
        assert!(stream.flip(297.0).abs() < 1e-9);
    }
}
