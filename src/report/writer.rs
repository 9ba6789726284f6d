use chrono::{Datelike, NaiveDate};
use log::{debug, info};

use super::{Block, Report, ReportSection, SectionKind};
use crate::config::ReportConfig;
use crate::sink::{DocumentSink, TextStyle};
use crate::LoanViewResult;

const TITLE_SPACING: f64 = 10.0;
const TITLE_RULE_LENGTH: f64 = 50.0;
const SECTION_GAP: f64 = 15.0;
const SUMMARY_TABLE_GAP: f64 = 5.0;
const TEXT_LINE_HEIGHT: f64 = 4.0;
const SUPPORT_LINE_GAP: f64 = 5.0;

/// Lays an assembled report out on a sink, one pass, top to bottom.
pub struct ReportWriter<'a> {
    config: &'a ReportConfig,
}

impl<'a> ReportWriter<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    pub fn write<S: DocumentSink>(
        &self,
        report: &Report,
        sink: &mut S,
        generated_on: NaiveDate,
    ) -> LoanViewResult<()> {
        let thresholds = &self.config.thresholds;
        let has_summary = report.section(SectionKind::ApplicationSummary).is_some();
        let mut y = sink.page_layout().content_top;

        for section in &report.sections {
            debug!("drawing {:?} at y {:.1}", section.kind, y);
            y = match section.kind {
                SectionKind::ApplicationSummary => {
                    let y = self.draw_tables(sink, section, y, SUMMARY_TABLE_GAP)?;
                    y + TITLE_SPACING
                }
                SectionKind::KeyFacts => {
                    let y = if has_summary {
                        self.break_if_short(sink, y, thresholds.key_facts)?
                    } else {
                        y
                    };
                    self.draw_tables(sink, section, y, 0.0)? + SECTION_GAP
                }
                SectionKind::MarketComparison => {
                    let y = self.break_if_short(sink, y, thresholds.market_comparison)?;
                    self.draw_tables(sink, section, y, 0.0)? + SECTION_GAP
                }
                SectionKind::AmortizationSchedule => {
                    let y = self.break_if_short(sink, y, thresholds.amortization)?;
                    self.draw_tables(sink, section, y, 0.0)?
                }
                SectionKind::NextSteps => {
                    let y = if sink.page_layout().height - y < thresholds.closing {
                        self.start_page(sink, y)?
                    } else {
                        y + SECTION_GAP
                    };
                    self.draw_paragraphs(sink, section, y)?
                }
                SectionKind::Disclaimers => self.draw_paragraphs(sink, section, y)?,
                SectionKind::SupportContact => self.draw_support(sink, section, y)?,
            };
        }

        self.decorate_pages(sink, generated_on)?;
        info!(
            "laid out {} sections on {} pages",
            report.sections.len(),
            sink.page_count()
        );
        Ok(())
    }

    fn break_if_short<S: DocumentSink>(
        &self,
        sink: &mut S,
        y: f64,
        needed: f64,
    ) -> LoanViewResult<f64> {
        if sink.page_layout().height - y < needed {
            return self.start_page(sink, y);
        }
        Ok(y)
    }

    fn start_page<S: DocumentSink>(&self, sink: &mut S, y: f64) -> LoanViewResult<f64> {
        let layout = sink.page_layout();
        sink.new_page()?;
        debug!(
            "{:.1} units left, moved to page {}",
            layout.height - y,
            sink.page_count()
        );
        Ok(layout.content_top)
    }

    fn draw_title<S: DocumentSink>(
        &self,
        sink: &mut S,
        title: &str,
        y: f64,
    ) -> LoanViewResult<f64> {
        let margin = sink.page_layout().margin;
        sink.draw_text(&[title.to_string()], margin, y, &TextStyle::title())?;
        sink.draw_rule(margin, margin + TITLE_RULE_LENGTH, y + 2.0)?;
        Ok(y + TITLE_SPACING)
    }

    fn draw_tables<S: DocumentSink>(
        &self,
        sink: &mut S,
        section: &ReportSection,
        y: f64,
        gap: f64,
    ) -> LoanViewResult<f64> {
        let mut y = self.draw_title(sink, &section.title, y)?;
        for (i, table) in section.tables().enumerate() {
            if i > 0 {
                y += gap;
            }
            y = sink.draw_table(y, table)?;
        }
        Ok(y)
    }

    fn draw_paragraphs<S: DocumentSink>(
        &self,
        sink: &mut S,
        section: &ReportSection,
        y: f64,
    ) -> LoanViewResult<f64> {
        let layout = sink.page_layout();
        let style = TextStyle::body();
        let text = paragraphs(section).join("\n");
        let lines = sink.split_text(&text, layout.width - 2.0 * layout.margin, &style);

        // title plus text must fit above the bottom margin
        let needed = TITLE_SPACING + lines.len() as f64 * TEXT_LINE_HEIGHT;
        let y = self.break_if_short(sink, y, needed + layout.bottom_margin)?;

        let y = self.draw_title(sink, &section.title, y)?;
        sink.draw_text(&lines, layout.margin, y, &style)?;
        Ok(y + lines.len() as f64 * TEXT_LINE_HEIGHT + TITLE_SPACING)
    }

    fn draw_support<S: DocumentSink>(
        &self,
        sink: &mut S,
        section: &ReportSection,
        y: f64,
    ) -> LoanViewResult<f64> {
        let layout = sink.page_layout();
        let style = TextStyle::body();
        let mut y = self.break_if_short(sink, y, SUPPORT_LINE_GAP * 2.0 + layout.bottom_margin)?;

        sink.draw_text(&[section.title.clone()], layout.margin, y, &style)?;
        for line in paragraphs(section) {
            y += SUPPORT_LINE_GAP;
            sink.draw_text(&[line], layout.margin, y, &style)?;
        }
        Ok(y)
    }

    /// Stamps the title, date, page number and copyright line on every page.
    fn decorate_pages<S: DocumentSink>(
        &self,
        sink: &mut S,
        generated_on: NaiveDate,
    ) -> LoanViewResult<()> {
        let layout = sink.page_layout();
        let right = layout.width - layout.margin;
        let count = sink.page_count();
        let generated = format!("Report Generated: {}", generated_on.format("%d/%m/%Y"));
        let footer = format!(
            "© {} {}. All rights reserved.",
            generated_on.year(),
            self.config.app_name
        );

        for page in 1..=count {
            sink.set_page(page)?;
            sink.draw_text(
                &[self.config.app_name.clone()],
                layout.margin,
                20.0,
                &TextStyle::heading(),
            )?;
            sink.draw_text(&[generated.clone()], right, 15.0, &TextStyle::muted())?;
            sink.draw_text(
                &[format!("Page {} / {}", page, count)],
                right,
                20.0,
                &TextStyle::muted(),
            )?;
            sink.draw_rule(layout.margin, right, 25.0)?;
            sink.draw_text(
                &[footer.clone()],
                layout.width / 2.0,
                layout.height - 10.0,
                &TextStyle::footer(),
            )?;
        }
        Ok(())
    }
}

fn paragraphs(section: &ReportSection) -> Vec<String> {
    section
        .blocks
        .iter()
        .filter_map(|b| match b {
            Block::Text(p) => Some(p.iter().cloned()),
            Block::Table(_) => None,
        })
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::ReportWriter;
    use crate::catalog::{Catalog, LoanTypeId};
    use crate::config::{PageLayout, ReportConfig};
    use crate::loan::calculate_loan_details;
    use crate::report::{ApplicationData, ReportAssembler, ReportLoan};
    use crate::sink::{DocumentSink, Table, TextDocument, TextStyle};
    use crate::LoanViewResult;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::path::Path;
    use test_log::test;

    #[derive(Debug, PartialEq)]
    enum Command {
        Text(usize, String),
        Table(usize, f64, usize),
        NewPage,
    }

    /// Records what the writer asks for; every table row is 10 units tall.
    struct RecordingSink {
        layout: PageLayout,
        pages: usize,
        current: usize,
        commands: Vec<Command>,
    }

    impl RecordingSink {
        fn new(layout: PageLayout) -> Self {
            Self {
                layout,
                pages: 1,
                current: 1,
                commands: Vec::new(),
            }
        }

        fn texts_on(&self, page: usize) -> Vec<&str> {
            self.commands
                .iter()
                .filter_map(|c| match c {
                    Command::Text(p, t) if *p == page => Some(t.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl DocumentSink for RecordingSink {
        fn page_layout(&self) -> PageLayout {
            self.layout
        }

        fn draw_text(
            &mut self,
            lines: &[String],
            _x: f64,
            _y: f64,
            _style: &TextStyle,
        ) -> LoanViewResult<()> {
            for line in lines {
                self.commands.push(Command::Text(self.current, line.clone()));
            }
            Ok(())
        }

        fn draw_rule(&mut self, _x1: f64, _x2: f64, _y: f64) -> LoanViewResult<()> {
            Ok(())
        }

        fn draw_table(&mut self, start_y: f64, table: &Table) -> LoanViewResult<f64> {
            let rows = table.body.len() + usize::from(table.head.is_some());
            self.commands.push(Command::Table(self.current, start_y, rows));
            Ok(start_y + 10.0 * rows as f64)
        }

        fn new_page(&mut self) -> LoanViewResult<()> {
            self.pages += 1;
            self.current = self.pages;
            self.commands.push(Command::NewPage);
            Ok(())
        }

        fn page_count(&self) -> usize {
            self.pages
        }

        fn set_page(&mut self, page: usize) -> LoanViewResult<()> {
            self.current = page;
            Ok(())
        }

        fn file_extension(&self) -> &str {
            "log"
        }

        fn save(&self, _path: &Path) -> LoanViewResult<()> {
            Ok(())
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_sample_report_layout() {
        let catalog = Catalog::standard();
        let config = ReportConfig::default();
        let report = ReportAssembler::new(&catalog, &config)
            .assemble(None, None)
            .unwrap();

        let mut sink = RecordingSink::new(config.page);
        ReportWriter::new(&config).write(&report, &mut sink, date()).unwrap();

        let tables: Vec<_> = sink
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::Table(page, y, rows) => Some((*page, *y, *rows)),
                _ => None,
            })
            .collect();
        // key facts under its title at the top, comparison 15 below it
        assert_eq!(tables[0], (1, 50.0, 6));
        assert_eq!(tables[1], (1, 135.0, 8));
        // 230 leaves 67 units, enough to start the schedule
        assert_eq!(tables[2], (1, 240.0, 61));

        // schedule ends far below the page, so the closing sections move on
        let breaks = sink.commands.iter().filter(|c| **c == Command::NewPage).count();
        assert_eq!(breaks, 1);
        let second = sink.texts_on(2);
        assert!(second.contains(&"Next Steps"));
        assert!(second.contains(&"Disclaimers"));
        assert!(second.contains(&"Customer Support"));
        assert!(second.contains(&"Helpline: 1-800-LOAN-VIEW"));
    }

    #[test]
    fn test_header_and_footer_on_every_page() {
        let catalog = Catalog::standard();
        let config = ReportConfig::default();
        let report = ReportAssembler::new(&catalog, &config)
            .assemble(Some(&ApplicationData::default()), None)
            .unwrap();

        let mut sink = RecordingSink::new(config.page);
        ReportWriter::new(&config).write(&report, &mut sink, date()).unwrap();

        let pages = sink.page_count();
        assert!(pages >= 2);
        for page in 1..=pages {
            let texts = sink.texts_on(page);
            assert!(texts.contains(&"LoanView"));
            assert!(texts.contains(&"Report Generated: 19/10/2026"));
            let numbering = format!("Page {} / {}", page, pages);
            assert!(texts.contains(&numbering.as_str()));
            assert!(texts.contains(&"© 2026 LoanView. All rights reserved."));
        }
    }

    #[test]
    fn test_key_facts_break_after_summary() {
        let catalog = Catalog::standard();
        let mut config = ReportConfig::default();
        config.page = PageLayout {
            height: 270.0,
            ..PageLayout::default()
        };
        let report = ReportAssembler::new(&catalog, &config)
            .assemble(Some(&ApplicationData::default()), None)
            .unwrap();

        // summary ends at 205 (title 10, 10 rows, gap 5, 4 rows, 10 after),
        // leaving 65 of the 80 units key facts needs
        let mut sink = RecordingSink::new(config.page);
        ReportWriter::new(&config).write(&report, &mut sink, date()).unwrap();

        let first_break = sink
            .commands
            .iter()
            .position(|c| *c == Command::NewPage)
            .unwrap();
        assert!(matches!(
            sink.commands[first_break + 1],
            Command::Text(2, ref t) if t == "Key Facts Statement"
        ));
        assert!(sink
            .commands
            .iter()
            .any(|c| *c == Command::Table(2, 50.0, 6)));
    }

    #[test]
    fn test_no_key_facts_break_without_summary() {
        let catalog = Catalog::standard();
        let mut config = ReportConfig::default();
        config.page = PageLayout {
            height: 120.0,
            ..PageLayout::default()
        };
        let details = calculate_loan_details(dec!(100000), dec!(9), 12).unwrap();
        let report = ReportAssembler::new(&catalog, &config)
            .assemble(None, Some(&ReportLoan::new(details, Some(LoanTypeId::Gold))))
            .unwrap();

        let mut sink = RecordingSink::new(config.page);
        ReportWriter::new(&config).write(&report, &mut sink, date()).unwrap();

        // key facts stay on page one even though less than 80 units remain
        assert!(matches!(sink.commands[1], Command::Table(1, 50.0, 6)));
    }

    #[test]
    fn test_text_document_end_to_end() {
        let catalog = Catalog::standard();
        let config = ReportConfig::default();
        let details = calculate_loan_details(dec!(5000000), dec!(8.5), 360).unwrap();
        let report = ReportAssembler::new(&catalog, &config)
            .assemble(None, Some(&ReportLoan::new(details, Some(LoanTypeId::Home))))
            .unwrap();

        let mut doc = TextDocument::new(config.page);
        ReportWriter::new(&config).write(&report, &mut doc, date()).unwrap();

        let rendered = doc.render();
        let pages = doc.page_count();
        assert_eq!(rendered.split('\u{c}').count(), pages);
        assert!(rendered.contains("Market Comparison for Home Loan"));
        assert!(rendered.contains("Bank of Baroda"));
        assert!(rendered.contains(&format!("Page {} / {}", pages, pages)));
        assert!(rendered.contains("Helpline: 1-800-LOAN-VIEW"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        doc.save(&path).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("Amortization Schedule"));
    }
}
