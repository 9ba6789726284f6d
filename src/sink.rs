//! Drawing surface the report writer talks to.
//!
//! [`DocumentSink`] is the only thing the writer knows about output. Coordinates
//! are in page units (millimetres for the bundled layouts), `y` grows downward
//! and pages are numbered from 1.

use log::{debug, info};
use std::path::Path;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::config::PageLayout;
use crate::{LoanViewError, LoanViewResult};

// point to millimetre, times the usual 1.15 line height
const LINE_FACTOR: f64 = 0.3528 * 1.15;
const RENDER_COLUMNS: usize = 100;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TextStyle {
    pub font_size: f64,
    pub align: Align,
}

impl TextStyle {
    pub fn heading() -> Self {
        Self {
            font_size: 18.0,
            align: Align::Left,
        }
    }

    pub fn title() -> Self {
        Self {
            font_size: 14.0,
            align: Align::Left,
        }
    }

    pub fn body() -> Self {
        Self {
            font_size: 9.0,
            align: Align::Left,
        }
    }

    pub fn muted() -> Self {
        Self {
            font_size: 10.0,
            align: Align::Right,
        }
    }

    pub fn footer() -> Self {
        Self {
            font_size: 8.0,
            align: Align::Center,
        }
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_FACTOR
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TableStyle {
    Plain,
    Grid,
    Striped,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Table {
    pub head: Option<Vec<String>>,
    pub body: Vec<Vec<String>>,
    pub style: TableStyle,
    pub bold_first_column: bool,
    pub font_size: f64,
    pub cell_padding: f64,
}

impl Table {
    pub fn new(style: TableStyle, font_size: f64, cell_padding: f64) -> Self {
        Self {
            head: None,
            body: Vec::new(),
            style,
            bold_first_column: false,
            font_size,
            cell_padding,
        }
    }

    pub fn with_head<S: Into<String>>(mut self, head: impl IntoIterator<Item = S>) -> Self {
        self.head = Some(head.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_bold_first_column(mut self) -> Self {
        self.bold_first_column = true;
        self
    }

    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.body.push(row.into_iter().map(Into::into).collect());
    }

    pub fn row_height(&self) -> f64 {
        self.font_size * LINE_FACTOR + 2.0 * self.cell_padding
    }
}

pub trait DocumentSink {
    fn page_layout(&self) -> PageLayout;

    /// Draws `lines` top-down starting at `y`, one line height apart.
    fn draw_text(&mut self, lines: &[String], x: f64, y: f64, style: &TextStyle)
        -> LoanViewResult<()>;

    fn draw_rule(&mut self, x1: f64, x2: f64, y: f64) -> LoanViewResult<()>;

    /// Draws `table` from `start_y`, continuing onto new pages as needed, and
    /// returns the cursor position below the last row.
    fn draw_table(&mut self, start_y: f64, table: &Table) -> LoanViewResult<f64>;

    fn new_page(&mut self) -> LoanViewResult<()>;

    fn page_count(&self) -> usize;

    fn set_page(&mut self, page: usize) -> LoanViewResult<()>;

    fn file_extension(&self) -> &str;

    fn save(&self, path: &Path) -> LoanViewResult<()>;

    /// Word-wraps `text` to `max_width`. Explicit newlines are kept, so a
    /// blank line between paragraphs survives.
    fn split_text(&self, text: &str, max_width: f64, style: &TextStyle) -> Vec<String> {
        // average glyph is about half an em wide
        let glyph = style.font_size * 0.3528 * 0.5;
        let max_chars = ((max_width / glyph).floor() as usize).max(1);

        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                let needed =
                    line.chars().count() + word.chars().count() + usize::from(!line.is_empty());
                if needed > max_chars && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(word);
            }
            lines.push(line);
        }
        lines
    }
}

#[derive(Clone, Debug)]
struct Placed {
    x: f64,
    y: f64,
    align: Align,
    text: String,
}

/// In-memory paginated plain-text document.
#[derive(Clone, Debug)]
pub struct TextDocument {
    layout: PageLayout,
    pages: Vec<Vec<Placed>>,
    current: usize,
}

impl TextDocument {
    pub fn new(layout: PageLayout) -> Self {
        Self {
            layout,
            pages: vec![Vec::new()],
            current: 0,
        }
    }

    fn place(&mut self, x: f64, y: f64, align: Align, text: String) {
        self.pages[self.current].push(Placed { x, y, align, text });
    }

    fn column(&self, x: f64) -> usize {
        ((x / self.layout.width) * RENDER_COLUMNS as f64).round().max(0.0) as usize
    }

    /// Renders the head plus `rows` with `tabled` and spreads the resulting
    /// lines evenly between `top` and `bottom`.
    fn place_table(&mut self, table: &Table, rows: &[&Vec<String>], top: f64, bottom: f64) {
        if table.head.is_none() && rows.is_empty() {
            return;
        }

        let mut builder = Builder::default();
        for record in table.head.iter().chain(rows.iter().copied()) {
            builder.push_record(record.iter().enumerate().map(|(i, cell)| {
                if table.bold_first_column && i == 0 {
                    cell.to_uppercase()
                } else {
                    cell.clone()
                }
            }));
        }

        let mut rendered = builder.build();
        match table.style {
            TableStyle::Grid => rendered.with(Style::ascii()),
            TableStyle::Striped => rendered.with(Style::psql()),
            TableStyle::Plain => rendered.with(Style::blank()),
        };

        let text = rendered.to_string();
        let lines: Vec<&str> = text.lines().collect();
        let step = (bottom - top) / lines.len().max(1) as f64;
        let x = self.layout.margin;
        for (i, line) in lines.into_iter().enumerate() {
            self.place(x, top + step * i as f64, Align::Left, line.trim_end().to_string());
        }
    }

    /// Renders every page, top to bottom, separated by form feeds. Items
    /// placed at the same height share a line.
    pub fn render(&self) -> String {
        let pages: Vec<String> = self.pages.iter().map(|page| self.render_page(page)).collect();
        pages.join("\n\u{c}\n")
    }

    fn render_page(&self, page: &[Placed]) -> String {
        let mut items: Vec<&Placed> = page.iter().collect();
        items.sort_by(|a, b| a.y.total_cmp(&b.y));

        let mut lines: Vec<String> = Vec::new();
        let mut last_y: Option<f64> = None;
        let mut buffer: Vec<char> = Vec::new();
        for item in items {
            if last_y.is_some_and(|y| (item.y - y).abs() > 0.01) {
                lines.push(buffer.iter().collect::<String>().trim_end().to_string());
                buffer.clear();
            }
            last_y = Some(item.y);

            let len = item.text.chars().count();
            let anchor = self.column(item.x);
            let start = match item.align {
                Align::Left => anchor,
                Align::Center => anchor.saturating_sub(len / 2),
                Align::Right => anchor.saturating_sub(len),
            };
            if buffer.len() < start + len {
                buffer.resize(start + len, ' ');
            }
            for (i, c) in item.text.chars().enumerate() {
                buffer[start + i] = c;
            }
        }
        if last_y.is_some() {
            lines.push(buffer.iter().collect::<String>().trim_end().to_string());
        }
        lines.join("\n")
    }
}

impl DocumentSink for TextDocument {
    fn page_layout(&self) -> PageLayout {
        self.layout
    }

    fn draw_text(
        &mut self,
        lines: &[String],
        x: f64,
        y: f64,
        style: &TextStyle,
    ) -> LoanViewResult<()> {
        let step = style.line_height();
        for (i, line) in lines.iter().enumerate() {
            self.place(x, y + step * i as f64, style.align, line.clone());
        }
        Ok(())
    }

    fn draw_rule(&mut self, x1: f64, x2: f64, y: f64) -> LoanViewResult<()> {
        let width = self.column(x2).saturating_sub(self.column(x1));
        self.place(x1, y, Align::Left, "-".repeat(width));
        Ok(())
    }

    fn draw_table(&mut self, start_y: f64, table: &Table) -> LoanViewResult<f64> {
        let row_height = table.row_height();
        let head_height = if table.head.is_some() { row_height } else { 0.0 };
        let floor = self.layout.height - self.layout.bottom_margin;

        let mut y = start_y;
        let mut top = start_y;
        let mut chunk: Vec<&Vec<String>> = Vec::new();
        for row in &table.body {
            let head_room = if chunk.is_empty() { head_height } else { 0.0 };
            if y + head_room + row_height > floor
                && (!chunk.is_empty() || y > self.layout.content_top)
            {
                debug!("table continues on page {}", self.pages.len() + 1);
                self.place_table(table, &chunk, top, y);
                chunk.clear();
                self.new_page()?;
                y = self.layout.content_top;
            }
            if chunk.is_empty() {
                top = y;
                y += head_height;
            }
            chunk.push(row);
            y += row_height;
        }
        if chunk.is_empty() {
            top = y;
            y += head_height;
        }
        self.place_table(table, &chunk, top, y);
        Ok(y)
    }

    fn new_page(&mut self) -> LoanViewResult<()> {
        self.pages.push(Vec::new());
        self.current = self.pages.len() - 1;
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn set_page(&mut self, page: usize) -> LoanViewResult<()> {
        if page == 0 || page > self.pages.len() {
            return Err(LoanViewError::PageOutOfRange {
                page,
                count: self.pages.len(),
            });
        }
        self.current = page - 1;
        Ok(())
    }

    fn file_extension(&self) -> &str {
        "txt"
    }

    fn save(&self, path: &Path) -> LoanViewResult<()> {
        std::fs::write(path, self.render())?;
        info!("saved {} page document to {}", self.pages.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Align, DocumentSink, Table, TableStyle, TextDocument, TextStyle};
    use crate::config::PageLayout;
    use crate::LoanViewError;
    use test_log::test;

    fn numbered_table(rows: usize) -> Table {
        let mut table = Table::new(TableStyle::Grid, 9.0, 2.0).with_head(["Month", "Balance"]);
        for i in 1..=rows {
            table.push_row([i.to_string(), format!("{}", 1000 - i)]);
        }
        table
    }

    #[test]
    fn test_table_fits_on_one_page() {
        let mut doc = TextDocument::new(PageLayout::default());
        let table = numbered_table(3);
        let end = doc.draw_table(40.0, &table).unwrap();

        assert_eq!(doc.page_count(), 1);
        assert!((end - (40.0 + 4.0 * table.row_height())).abs() < 1e-9);

        let text = doc.render();
        assert!(text.contains("| Month | Balance |"));
        assert!(text.contains("| 3     | 997     |"));
    }

    #[test]
    fn test_long_table_continues_with_head() {
        let mut doc = TextDocument::new(PageLayout::default());
        let table = numbered_table(60);
        let end = doc.draw_table(200.0, &table).unwrap();

        assert!(doc.page_count() >= 2);
        assert!(end <= 297.0 - 20.0);

        let rendered = doc.render();
        let pages: Vec<&str> = rendered.split('\u{c}').collect();
        assert_eq!(pages.len(), doc.page_count());
        for page in &pages {
            assert!(page.contains("| Month | Balance |"));
        }
        assert!(rendered.contains("| 60    | 940     |"));
    }

    #[test]
    fn test_table_styles() {
        let mut striped = Table::new(TableStyle::Striped, 9.0, 2.0).with_head(["Bank", "Rate"]);
        striped.push_row(["SBI", "8.40%"]);
        let mut plain = Table::new(TableStyle::Plain, 10.0, 3.0).with_bold_first_column();
        plain.push_row(["Loan Amount", "5,00,000"]);

        let mut doc = TextDocument::new(PageLayout::default());
        let end = doc.draw_table(40.0, &striped).unwrap();
        doc.draw_table(end + 10.0, &plain).unwrap();

        let rendered = doc.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines.iter().any(|l| l.contains("Bank | Rate")));
        assert!(lines.iter().any(|l| l.contains("-+-")));
        assert!(lines.iter().any(|l| l.contains("SBI  | 8.40%")));

        let plain_line = lines.iter().find(|l| l.contains("LOAN AMOUNT")).unwrap();
        assert!(plain_line.contains("5,00,000"));
        assert!(!plain_line.contains('|'));
    }

    #[test]
    fn test_alignment_on_shared_line() {
        let mut doc = TextDocument::new(PageLayout::default());
        doc.draw_text(&["LoanView".to_string()], 15.0, 20.0, &TextStyle::heading())
            .unwrap();
        doc.draw_text(&["Page 1 / 1".to_string()], 195.0, 20.0, &TextStyle::muted())
            .unwrap();
        doc.draw_text(
            &["footer".to_string()],
            105.0,
            287.0,
            &TextStyle::footer(),
        )
        .unwrap();

        let rendered = doc.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("       LoanView"));
        assert!(lines[0].ends_with("Page 1 / 1"));
        assert_eq!(lines[0].chars().count(), 93);
        assert_eq!(lines[1].trim(), "footer");
        assert_eq!(TextStyle::footer().align, Align::Center);
    }

    #[test]
    fn test_set_page_bounds() {
        let mut doc = TextDocument::new(PageLayout::default());
        doc.new_page().unwrap();
        assert!(doc.set_page(1).is_ok());
        assert!(doc.set_page(2).is_ok());

        let err = doc.set_page(3).unwrap_err();
        assert!(matches!(err, LoanViewError::PageOutOfRange { page: 3, count: 2 }));
        assert!(doc.set_page(0).is_err());
    }

    #[test]
    fn test_split_text_wraps_words() {
        let doc = TextDocument::new(PageLayout::default());
        let text = "one two three four five six seven eight nine ten\n\nafter";
        let lines = doc.split_text(text, 20.0, &TextStyle::body());

        assert!(lines.len() > 3);
        assert!(lines.iter().all(|l| l.chars().count() <= 12));
        assert_eq!(lines[lines.len() - 2], "");
        assert_eq!(lines[lines.len() - 1], "after");
    }

    #[test]
    fn test_save_writes_rendered_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");

        let mut doc = TextDocument::new(PageLayout::default());
        doc.draw_text(&["hello".to_string()], 15.0, 40.0, &TextStyle::body())
            .unwrap();
        doc.save(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), doc.render());
        assert_eq!(doc.file_extension(), "txt");

        let missing = dir.path().join("no-such-dir").join("report.txt");
        assert!(matches!(doc.save(&missing), Err(LoanViewError::Io(_))));
    }
}
