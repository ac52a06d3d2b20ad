//! Paginating layout of aggregated trees into draw instructions
//!
//! The formatter walks an element or goal tree and emits headings,
//! wrapped paragraphs and page breaks with page/y positions, in page units
//! (millimetres for the default A4 layout). A PDF or text renderer consumes
//! the blocks without doing any layout of its own.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::aggregate::{ElementNode, GoalNode, ProcessNode};
use crate::entities::Process;

const EPSILON: f64 = 1e-9;

/// Page geometry and typography for exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page_width: f64,
    pub page_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub body_font_size: f64,
    /// Font sizes for heading levels 1..=3
    pub heading_font_sizes: [f64; 3],
    /// Line advance as a fraction of font size
    pub line_height_factor: f64,
    /// Average glyph width as a fraction of font size
    pub char_width_factor: f64,
    /// Space a heading needs below the cursor, per level
    pub heading_reserve: [f64; 3],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin_top: 20.0,
            margin_bottom: 20.0,
            margin_left: 20.0,
            margin_right: 20.0,
            body_font_size: 10.0,
            heading_font_sizes: [16.0, 13.0, 11.0],
            line_height_factor: 0.5,
            char_width_factor: 0.2,
            heading_reserve: [20.0, 17.0, 15.0],
        }
    }
}

impl LayoutConfig {
    /// Vertical space available for content on one page
    pub fn content_height(&self) -> f64 {
        self.page_height - self.margin_top - self.margin_bottom
    }

    pub fn content_width(&self) -> f64 {
        self.page_width - self.margin_left - self.margin_right
    }

    pub fn line_height(&self, font_size: f64) -> f64 {
        font_size * self.line_height_factor
    }

    /// Characters per line for a font size and left indent
    pub fn max_chars(&self, font_size: f64, indent: f64) -> usize {
        let glyph = font_size * self.char_width_factor;
        if glyph <= 0.0 {
            return 0;
        }
        ((self.content_width() - indent) / glyph).floor().max(0.0) as usize
    }

    /// Room a heading keeps below itself for the first line of what follows
    fn follow_space(&self) -> f64 {
        self.line_height(self.body_font_size) * (1.0 + PARAGRAPH_GAP)
    }

    fn heading_font(&self, level: u8) -> f64 {
        self.heading_font_sizes[heading_slot(level)]
    }

    fn heading_reserve(&self, level: u8) -> f64 {
        self.heading_reserve[heading_slot(level)]
    }

    /// Reject layouts that leave no room to place content
    pub fn check(&self) -> Result<(), ExportError> {
        let fonts = std::iter::once(self.body_font_size).chain(self.heading_font_sizes);
        for size in fonts {
            if !(size.is_finite() && size > 0.0) {
                return Err(ExportError::InvalidFontSize(size));
            }
        }
        for (name, value) in [
            ("line_height_factor", self.line_height_factor),
            ("char_width_factor", self.char_width_factor),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ExportError::InvalidFactor { name, value });
            }
        }

        let height = self.content_height();
        if !(height.is_finite() && height > 0.0) {
            return Err(ExportError::NoContentHeight { height });
        }
        // A heading plus one body line must fit on an empty page
        for level in 1..=3u8 {
            let need = self
                .heading_reserve(level)
                .max(self.line_height(self.heading_font(level)) + self.follow_space());
            if need > height + EPSILON {
                return Err(ExportError::ReserveTooLarge {
                    level,
                    reserve: need,
                    height,
                });
            }
        }

        let width = self.content_width();
        if self.max_chars(self.heading_font(1), 0.0) < MIN_COLUMN_CHARS
            || self.max_chars(self.body_font_size, PARAGRAPH_INDENT * 2.0) < MIN_COLUMN_CHARS
        {
            return Err(ExportError::NoColumnWidth { width });
        }
        Ok(())
    }
}

fn heading_slot(level: u8) -> usize {
    usize::from(level.clamp(1, 3)) - 1
}

const MIN_COLUMN_CHARS: usize = 10;
const PARAGRAPH_INDENT: f64 = 5.0;
/// Space before a block, as a fraction of its line height
const HEADING_GAP: f64 = 0.5;
const PARAGRAPH_GAP: f64 = 0.3;

/// Layout configuration that cannot produce any page
#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("page layout leaves no content height (got {height:.1})")]
    #[diagnostic(code(oex::export::height), help("reduce the top and bottom margins"))]
    NoContentHeight { height: f64 },

    #[error("page layout leaves no usable column width (got {width:.1})")]
    #[diagnostic(code(oex::export::width), help("reduce the side margins or font sizes"))]
    NoColumnWidth { width: f64 },

    #[error("level {level} heading needs {reserve:.1} but a page only holds {height:.1}")]
    #[diagnostic(code(oex::export::reserve))]
    ReserveTooLarge { level: u8, reserve: f64, height: f64 },

    #[error("invalid font size: {0}")]
    #[diagnostic(code(oex::export::font))]
    InvalidFontSize(f64),

    #[error("export.{name} must be a positive number (got {value})")]
    #[diagnostic(code(oex::export::factor))]
    InvalidFactor { name: &'static str, value: f64 },
}

/// One draw instruction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExportBlock {
    Heading {
        level: u8,
        /// Outline number such as "2.3"; empty for the document title
        number: String,
        lines: Vec<String>,
        font_size: f64,
        page: usize,
        y: f64,
        height: f64,
    },
    Paragraph {
        lines: Vec<String>,
        indent: f64,
        font_size: f64,
        page: usize,
        y: f64,
        height: f64,
    },
    /// Starts page `page`
    PageBreak { page: usize },
}

impl ExportBlock {
    pub fn page(&self) -> usize {
        match self {
            ExportBlock::Heading { page, .. }
            | ExportBlock::Paragraph { page, .. }
            | ExportBlock::PageBreak { page } => *page,
        }
    }

    /// Vertical space the block occupies; zero for page breaks
    pub fn height(&self) -> f64 {
        match self {
            ExportBlock::Heading { height, .. } | ExportBlock::Paragraph { height, .. } => *height,
            ExportBlock::PageBreak { .. } => 0.0,
        }
    }

    pub fn is_page_break(&self) -> bool {
        matches!(self, ExportBlock::PageBreak { .. })
    }
}

/// Which tree to lay out
#[derive(Debug, Clone, Copy)]
pub enum ExportSource<'a> {
    Elements(&'a [ElementNode]),
    Goals(&'a [GoalNode]),
}

/// Turns an aggregated tree into paginated draw instructions
#[derive(Debug, Clone)]
pub struct ExportFormatter {
    layout: LayoutConfig,
    subtitle: Option<String>,
}

impl ExportFormatter {
    pub fn new(layout: LayoutConfig) -> Result<Self, ExportError> {
        layout.check()?;
        Ok(Self {
            layout,
            subtitle: None,
        })
    }

    /// Line printed under the document title, e.g. the generation date
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Lay out a tree as a block sequence
    pub fn format(&self, source: &ExportSource<'_>) -> Result<Vec<ExportBlock>, ExportError> {
        let mut page = PageWriter::new(&self.layout);

        match source {
            ExportSource::Elements(tree) => {
                self.preamble(&mut page, "Operational Excellence Framework");
                if tree.is_empty() {
                    page.paragraph("No elements recorded.", 0.0);
                }
                for node in tree.iter() {
                    self.element_section(&mut page, node);
                }
            }
            ExportSource::Goals(tree) => {
                self.preamble(&mut page, "Strategic Goals");
                if tree.is_empty() {
                    page.paragraph("No strategic goals recorded.", 0.0);
                }
                for (idx, node) in tree.iter().enumerate() {
                    self.goal_section(&mut page, idx + 1, node);
                }
            }
        }

        let blocks = page.finish();
        debug!(
            "laid out {} block(s) over {} page(s)",
            blocks.len(),
            blocks.last().map_or(1, ExportBlock::page)
        );
        Ok(blocks)
    }

    fn preamble(&self, page: &mut PageWriter<'_>, title: &str) {
        page.heading(1, "", title);
        if let Some(ref subtitle) = self.subtitle {
            page.paragraph(subtitle, 0.0);
        }
    }

    fn element_section(&self, page: &mut PageWriter<'_>, node: &ElementNode) {
        let element = &node.element;
        let number = element.element_number.to_string();
        page.heading(1, &number, &element.title);

        let mut summary = format!("{} process(es)", node.processes.len());
        if !element.active {
            summary.push_str(" | inactive");
        }
        page.paragraph(&summary, 0.0);
        if let Some(ref desc) = element.description {
            page.paragraph(desc, 0.0);
        }
        if !element.enabling_elements().is_empty() {
            page.paragraph(
                &format!("Enabling elements: {}", element.enabling_elements().join(", ")),
                0.0,
            );
        }
        if node.processes.is_empty() {
            page.paragraph("No processes documented.", 0.0);
        }

        for (idx, proc_node) in node.processes.iter().enumerate() {
            self.process_section(page, &format!("{}.{}", number, idx + 1), proc_node);
        }
    }

    fn process_section(&self, page: &mut PageWriter<'_>, number: &str, node: &ProcessNode) {
        let process = &node.process;
        page.heading(2, number, &process.label());
        page.paragraph(&process_summary(process), 0.0);

        for (label, value) in [
            ("Description", &process.description),
            ("Expectations", &process.expectations),
            ("Inputs", &process.inputs),
            ("Deliverables", &process.deliverables),
            ("Critical to quality", &process.critical_to_quality),
        ] {
            if let Some(text) = value {
                page.paragraph(&format!("{}: {}", label, text), 0.0);
            }
        }

        if !node.steps.is_empty() {
            page.heading(3, "", "Steps");
            for step in &node.steps {
                let mut text = format!("{}. [{}] {}", step.step_number, step.step_type, step.title);
                if let Some(ref who) = step.responsibility {
                    text.push_str(&format!(" ({})", who));
                }
                if let Some(ref desc) = step.description {
                    text.push_str(&format!(": {}", desc));
                }
                page.paragraph(&text, PARAGRAPH_INDENT);
            }
        }

        if !node.measures.is_empty() {
            page.heading(3, "", "Performance measures");
            for measure in &node.measures {
                page.paragraph(&measure_line(&measure.name, measure), PARAGRAPH_INDENT);
            }
        }
    }

    fn goal_section(&self, page: &mut PageWriter<'_>, index: usize, node: &GoalNode) {
        let goal = &node.goal;
        let number = index.to_string();
        page.heading(1, &number, &goal.title);

        let mut summary = format!(
            "Element {}. {} | Category: {} | Priority: {}",
            node.element.element_number, node.element.title, goal.category, goal.priority
        );
        if let (Some(current), Some(target)) = (goal.current_value, goal.target_value) {
            let unit = goal.unit.as_deref().unwrap_or("");
            summary.push_str(&format!(" | Progress: {} / {} {}", current, target, unit));
            if let Some(pct) = goal.progress() {
                summary.push_str(&format!(" ({:.0}%)", pct));
            }
        }
        page.paragraph(summary.trim_end(), 0.0);
        if let Some(ref desc) = goal.description {
            page.paragraph(desc, 0.0);
        }
        if node.processes.is_empty() {
            page.paragraph("No linked processes.", 0.0);
        }

        for (idx, proc_node) in node.processes.iter().enumerate() {
            page.heading(2, &format!("{}.{}", number, idx + 1), &proc_node.process.label());
            for measure in &proc_node.measures {
                page.paragraph(&measure_line(&measure.name, measure), PARAGRAPH_INDENT);
            }
        }
    }
}

fn process_summary(process: &Process) -> String {
    let mut parts = vec![
        format!("Status: {}", process.status),
        format!("Mandatory: {}", if process.mandatory { "yes" } else { "no" }),
    ];
    if let (Some(level), Some(score)) = (process.risk.level(), process.risk.score()) {
        parts.push(format!("Risk: {} ({})", level, score));
    }
    parts.join(" | ")
}

fn measure_line(name: &str, measure: &crate::entities::PerformanceMeasure) -> String {
    let mut text = format!("- {}", name);
    let details: Vec<String> = [
        measure.formula.as_ref().map(|f| format!("formula {}", f)),
        measure.target.as_ref().map(|t| format!("target {}", t)),
        measure.frequency.clone(),
        measure.scorecard_category.as_ref().map(|c| c.to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !details.is_empty() {
        text.push_str(&format!(" ({})", details.join(", ")));
    }
    text
}

/// Cursor over the page sequence
struct PageWriter<'a> {
    layout: &'a LayoutConfig,
    blocks: Vec<ExportBlock>,
    page: usize,
    y: f64,
}

impl<'a> PageWriter<'a> {
    fn new(layout: &'a LayoutConfig) -> Self {
        Self {
            layout,
            blocks: Vec::new(),
            page: 1,
            y: layout.margin_top,
        }
    }

    fn bottom(&self) -> f64 {
        self.layout.page_height - self.layout.margin_bottom
    }

    fn remaining(&self) -> f64 {
        self.bottom() - self.y
    }

    fn at_page_top(&self) -> bool {
        (self.y - self.layout.margin_top).abs() < EPSILON
    }

    fn break_page(&mut self) {
        self.page += 1;
        self.y = self.layout.margin_top;
        self.blocks.push(ExportBlock::PageBreak { page: self.page });
    }

    /// Gap between blocks; dropped when it would cross the bottom margin
    fn gap(&mut self, amount: f64) {
        if self.at_page_top() {
            return;
        }
        self.y = (self.y + amount).min(self.bottom());
    }

    fn heading(&mut self, level: u8, number: &str, text: &str) {
        let font_size = self.layout.heading_font(level);
        let lh = self.layout.line_height(font_size);
        let label = if number.is_empty() {
            text.to_string()
        } else {
            format!("{} {}", number, text)
        };
        let mut lines = wrap_text(&label, self.layout.max_chars(font_size, 0.0));
        if lines.is_empty() {
            lines.push(String::new());
        }

        self.gap(lh * HEADING_GAP);
        let height = lines.len() as f64 * lh;
        let need = self.layout.heading_reserve(level).max(height + self.layout.follow_space());
        if self.remaining() + EPSILON < need && !self.at_page_top() {
            self.break_page();
        }

        // Headings taller than a page are cut line by line like paragraphs
        self.place_lines(lines, lh, |lines, page, y, height| ExportBlock::Heading {
            level,
            number: number.to_string(),
            lines,
            font_size,
            page,
            y,
            height,
        });
    }

    fn paragraph(&mut self, text: &str, indent: f64) {
        let font_size = self.layout.body_font_size;
        let lh = self.layout.line_height(font_size);
        let lines = wrap_text(text, self.layout.max_chars(font_size, indent));
        if lines.is_empty() {
            return;
        }

        self.gap(lh * PARAGRAPH_GAP);
        self.place_lines(lines, lh, |lines, page, y, height| ExportBlock::Paragraph {
            lines,
            indent,
            font_size,
            page,
            y,
            height,
        });
    }

    /// Place lines, splitting across pages when the remaining budget is short
    fn place_lines<F>(&mut self, mut lines: Vec<String>, lh: f64, make: F)
    where
        F: Fn(Vec<String>, usize, f64, f64) -> ExportBlock,
    {
        while !lines.is_empty() {
            let remaining = self.remaining();
            // A negative budget can only come from rounding; never draw into it
            let fit = if remaining < 0.0 {
                0
            } else {
                ((remaining + EPSILON) / lh).floor() as usize
            };

            if fit == 0 {
                if self.at_page_top() {
                    // One line is taller than the page; place it alone
                    let chunk: Vec<String> = lines.drain(..1).collect();
                    let height = self.remaining().max(0.0);
                    self.blocks.push(make(chunk, self.page, self.y, height));
                    self.y = self.bottom();
                } else {
                    self.break_page();
                }
                continue;
            }

            let take = fit.min(lines.len());
            let chunk: Vec<String> = lines.drain(..take).collect();
            let height = take as f64 * lh;
            self.blocks.push(make(chunk, self.page, self.y, height));
            self.y += height;
        }
    }

    fn finish(self) -> Vec<ExportBlock> {
        self.blocks
    }
}

/// Word-wrap text to at most `max_width` characters per line
///
/// Words longer than the width are hard-broken. Explicit newlines start a
/// new line; blank lines are dropped.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();

    for source_line in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in source_line.split_whitespace() {
            let word_len = word.chars().count();
            if current_len > 0 && current_len + 1 + word_len <= max_width {
                // Word fits on current line
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
                continue;
            }

            // Start new line
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
            }
            let mut rest: Vec<char> = word.chars().collect();
            while rest.len() > max_width {
                lines.push(rest.drain(..max_width).collect());
            }
            current = rest.iter().collect();
            current_len = rest.len();
        }

        if current_len > 0 {
            lines.push(current);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{build_element_tree, build_goal_tree};
    use crate::core::entity::ScorecardCategory;
    use crate::core::store::FrameworkRows;
    use crate::entities::{Element, PerformanceMeasure, StrategicGoal};

    fn page_heights(blocks: &[ExportBlock]) -> Vec<f64> {
        let pages = blocks.last().map_or(0, ExportBlock::page);
        (1..=pages)
            .map(|p| {
                blocks
                    .iter()
                    .filter(|b| b.page() == p)
                    .map(ExportBlock::height)
                    .sum()
            })
            .collect()
    }

    fn sample_rows(elements: u32, processes: u32) -> FrameworkRows {
        let mut rows = FrameworkRows::default();
        for e in 1..=elements {
            let mut element = Element::new(e, format!("Element {}", e), "t".to_string());
            element.description = Some("Leadership sets direction and reviews results. ".repeat(6));
            for p in 1..=processes {
                let mut process = Process::new(
                    format!("OE-{}.{}", e, p),
                    format!("Process {}", p),
                    element.id.clone(),
                    "t".to_string(),
                );
                process.expectations = Some("Every site follows the documented procedure. ".repeat(4));
                rows.processes.push(process);
            }
            rows.elements.push(element);
        }
        rows
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn test_wrap_text_breaks_long_words() {
        let lines = wrap_text("abcdefghijkl xy", 5);
        assert_eq!(lines, vec!["abcde", "fghij", "kl xy"]);
        assert!(wrap_text("   ", 5).is_empty());
        assert_eq!(wrap_text("é".repeat(7).as_str(), 3).len(), 3);
    }

    #[test]
    fn test_default_layout_is_valid() {
        let layout = LayoutConfig::default();
        assert!(layout.check().is_ok());
        assert_eq!(layout.content_height(), 257.0);
        assert_eq!(layout.max_chars(10.0, 0.0), 85);
    }

    #[test]
    fn test_unusable_layouts_rejected() {
        let tall_margins = LayoutConfig {
            margin_top: 150.0,
            margin_bottom: 150.0,
            ..Default::default()
        };
        assert!(matches!(
            ExportFormatter::new(tall_margins),
            Err(ExportError::NoContentHeight { .. })
        ));

        let short_page = LayoutConfig {
            page_height: 50.0,
            ..Default::default()
        };
        assert!(matches!(
            short_page.check(),
            Err(ExportError::ReserveTooLarge { level: 1, .. })
        ));

        let narrow = LayoutConfig {
            page_width: 45.0,
            ..Default::default()
        };
        assert!(matches!(narrow.check(), Err(ExportError::NoColumnWidth { .. })));
    }

    #[test]
    fn test_bad_factor_is_named() {
        let flat = LayoutConfig {
            line_height_factor: 0.0,
            ..Default::default()
        };
        let err = flat.check().unwrap_err();
        assert!(matches!(
            err,
            ExportError::InvalidFactor { name: "line_height_factor", .. }
        ));
        assert!(err.to_string().contains("line_height_factor"));

        let squashed = LayoutConfig {
            char_width_factor: -0.2,
            ..Default::default()
        };
        assert!(matches!(
            squashed.check(),
            Err(ExportError::InvalidFactor { name: "char_width_factor", value }) if value == -0.2
        ));
    }

    #[test]
    fn test_pages_never_exceed_budget() {
        let layout = LayoutConfig::default();
        let tree = build_element_tree(&sample_rows(4, 6));
        let blocks = ExportFormatter::new(layout.clone())
            .unwrap()
            .format(&ExportSource::Elements(&tree))
            .unwrap();

        let heights = page_heights(&blocks);
        assert!(heights.len() > 1, "expected multiple pages");
        for h in &heights {
            assert!(*h <= layout.content_height() + 1e-6, "page holds {}", h);
        }
        for block in &blocks {
            if let ExportBlock::Paragraph { y, height, .. } | ExportBlock::Heading { y, height, .. } = block {
                assert!(*y + *height <= layout.page_height - layout.margin_bottom + 1e-6);
                assert!(*y >= layout.margin_top - 1e-6);
            }
        }
    }

    #[test]
    fn test_page_breaks_are_numbered_in_sequence() {
        let tree = build_element_tree(&sample_rows(4, 6));
        let blocks = ExportFormatter::new(LayoutConfig::default())
            .unwrap()
            .format(&ExportSource::Elements(&tree))
            .unwrap();

        let breaks: Vec<usize> = blocks
            .iter()
            .filter(|b| b.is_page_break())
            .map(ExportBlock::page)
            .collect();
        let expected: Vec<usize> = (2..=breaks.len() + 1).collect();
        assert_eq!(breaks, expected);
    }

    #[test]
    fn test_heading_never_orphaned() {
        let layout = LayoutConfig::default();
        let tree = build_element_tree(&sample_rows(4, 6));
        let blocks = ExportFormatter::new(layout.clone())
            .unwrap()
            .format(&ExportSource::Elements(&tree))
            .unwrap();

        for (i, block) in blocks.iter().enumerate() {
            if let ExportBlock::Heading { page, .. } = block {
                match blocks.get(i + 1) {
                    Some(next) => assert_eq!(next.page(), *page, "heading left alone at page end"),
                    None => panic!("document ends with a heading"),
                }
            }
        }
    }

    #[test]
    fn test_long_paragraph_split_across_pages() {
        let layout = LayoutConfig::default();
        let mut rows = sample_rows(1, 0);
        rows.elements[0].description = Some("word ".repeat(6000));
        let tree = build_element_tree(&rows);
        let blocks = ExportFormatter::new(layout.clone())
            .unwrap()
            .format(&ExportSource::Elements(&tree))
            .unwrap();

        let paragraph_pages: Vec<usize> = blocks
            .iter()
            .filter(|b| matches!(b, ExportBlock::Paragraph { .. }))
            .map(ExportBlock::page)
            .collect();
        assert!(paragraph_pages.iter().max().copied().unwrap_or(0) >= 3);
        for h in page_heights(&blocks) {
            assert!(h <= layout.content_height() + 1e-6);
        }
    }

    #[test]
    fn test_element_numbering() {
        let tree = build_element_tree(&sample_rows(2, 2));
        let blocks = ExportFormatter::new(LayoutConfig::default())
            .unwrap()
            .format(&ExportSource::Elements(&tree))
            .unwrap();

        let numbers: Vec<&str> = blocks
            .iter()
            .filter_map(|b| match b {
                ExportBlock::Heading { number, .. } if !number.is_empty() => Some(number.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(numbers, vec!["1", "1.1", "1.2", "2", "2.1", "2.2"]);
    }

    #[test]
    fn test_goal_export_lists_processes_and_measures() {
        let mut rows = sample_rows(1, 2);
        let goal = StrategicGoal::new(
            rows.elements[0].id.clone(),
            "Lower cost".to_string(),
            ScorecardCategory::Financial,
            "t".to_string(),
        );
        for p in &rows.processes {
            rows.measures.push(
                PerformanceMeasure::new(p.id.clone(), format!("Cost {}", p.process_number), "t".to_string())
                    .with_goal(goal.id.clone()),
            );
        }
        rows.goals.push(goal);

        let tree = build_goal_tree(&rows);
        let blocks = ExportFormatter::new(LayoutConfig::default())
            .unwrap()
            .with_subtitle("Generated today")
            .format(&ExportSource::Goals(&tree))
            .unwrap();

        let headings: Vec<String> = blocks
            .iter()
            .filter_map(|b| match b {
                ExportBlock::Heading { lines, .. } => Some(lines.join(" ")),
                _ => None,
            })
            .collect();
        assert_eq!(
            headings,
            vec![
                "Strategic Goals",
                "1 Lower cost",
                "1.1 OE-1.1 Process 1",
                "1.2 OE-1.2 Process 2"
            ]
        );
        let text = serde_json::to_string(&blocks).unwrap();
        assert!(text.contains("Generated today"));
        assert!(text.contains("- Cost OE-1.2"));
    }
}
