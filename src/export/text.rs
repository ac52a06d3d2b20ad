//! Plain-text rendering of export blocks, one string per page

use crate::export::layout::{ExportBlock, LayoutConfig};

/// Render blocks into pages of text
///
/// Headings keep their outline number, paragraphs are indented by their
/// indent converted to character columns. Every page ends with a
/// "page N of M" footer.
pub fn render_pages(blocks: &[ExportBlock], layout: &LayoutConfig) -> Vec<String> {
    let total = blocks.iter().map(ExportBlock::page).max().unwrap_or(1);
    let mut pages: Vec<String> = vec![String::new(); total];
    let glyph = layout.body_font_size * layout.char_width_factor;

    for block in blocks {
        let Some(page) = pages.get_mut(block.page().saturating_sub(1)) else {
            continue;
        };
        match block {
            ExportBlock::Heading { level, lines, .. } => {
                if !page.is_empty() {
                    page.push('\n');
                }
                for line in lines {
                    page.push_str(line);
                    page.push('\n');
                }
                if *level == 1 {
                    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
                    page.push_str(&"=".repeat(width));
                    page.push('\n');
                }
            }
            ExportBlock::Paragraph { lines, indent, .. } => {
                let pad = if glyph > 0.0 {
                    " ".repeat((indent / glyph).round() as usize)
                } else {
                    String::new()
                };
                for line in lines {
                    page.push_str(&pad);
                    page.push_str(line);
                    page.push('\n');
                }
            }
            ExportBlock::PageBreak { .. } => {}
        }
    }

    pages
        .into_iter()
        .enumerate()
        .map(|(i, mut text)| {
            text.push_str(&format!("\n[page {} of {}]\n", i + 1, total));
            text
        })
        .collect()
}

/// Render blocks as a single document with form feeds between pages
pub fn render_document(blocks: &[ExportBlock], layout: &LayoutConfig) -> String {
    render_pages(blocks, layout).join("\u{c}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(page: usize, text: &str) -> ExportBlock {
        ExportBlock::Heading {
            level: 1,
            number: String::new(),
            lines: vec![text.to_string()],
            font_size: 16.0,
            page,
            y: 20.0,
            height: 8.0,
        }
    }

    fn paragraph(page: usize, text: &str, indent: f64) -> ExportBlock {
        ExportBlock::Paragraph {
            lines: vec![text.to_string()],
            indent,
            font_size: 10.0,
            page,
            y: 30.0,
            height: 5.0,
        }
    }

    #[test]
    fn test_render_pages_splits_on_breaks() {
        let blocks = vec![
            heading(1, "Title"),
            paragraph(1, "first", 0.0),
            ExportBlock::PageBreak { page: 2 },
            paragraph(2, "second", 4.0),
        ];
        let pages = render_pages(&blocks, &LayoutConfig::default());
        assert_eq!(pages.len(), 2);
        assert!(pages[0].starts_with("Title\n=====\nfirst\n"));
        assert!(pages[0].ends_with("[page 1 of 2]\n"));
        assert!(pages[1].starts_with("  second\n"));
    }

    #[test]
    fn test_render_document_uses_form_feed() {
        let blocks = vec![
            paragraph(1, "a", 0.0),
            ExportBlock::PageBreak { page: 2 },
            paragraph(2, "b", 0.0),
        ];
        let doc = render_document(&blocks, &LayoutConfig::default());
        assert_eq!(doc.matches('\u{c}').count(), 1);
    }

    #[test]
    fn test_empty_blocks_give_one_page() {
        let pages = render_pages(&[], &LayoutConfig::default());
        assert_eq!(pages, vec!["\n[page 1 of 1]\n".to_string()]);
    }
}
