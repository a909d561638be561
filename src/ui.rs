use trade_dashboard::config::DashboardConfig;
use trade_dashboard::dataset::Dataset;
use trade_dashboard::format::{dollar, scale, short_usd, Unit};
use trade_dashboard::ranking::RankedRow;
use trade_dashboard::records::{Direction as TradeDirection, Measure};
use trade_dashboard::binning::BinnedBatch;
use trade_dashboard::views::{
    country_focus, overview, product_focus, CountryFocus, OverviewQuery, ProductFocus, ProductQuery, TradeOverview,
    TradeSummary,
};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    ProductFocus,
    CountryFocus,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Overview => Page::ProductFocus,
            Page::ProductFocus => Page::CountryFocus,
            Page::CountryFocus => Page::Overview,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Overview => Page::CountryFocus,
            Page::ProductFocus => Page::Overview,
            Page::CountryFocus => Page::ProductFocus,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Overview => "Trade Overview",
            Page::ProductFocus => "Product Focus",
            Page::CountryFocus => "Country Focus",
        }
    }
}

/// Step an index through a list of `len` options, wrapping at both ends
fn cycle(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (index + 1) % len
    } else if index == 0 {
        len - 1
    } else {
        index - 1
    }
}

pub struct App {
    pub dataset: Dataset,
    pub top_n: usize,
    pub wrap_width: usize,
    pub current_page: Page,
    pub years: Vec<i32>,
    pub year_index: usize,
    pub measure: Measure,
    pub products: Vec<String>,
    pub product_index: usize,
    pub partners: Vec<String>,
    pub partner_index: usize,
    pub direction: TradeDirection,
    pub state: TableState,
}

impl App {
    pub fn new(dataset: Dataset, config: &DashboardConfig) -> Self {
        let years = dataset.years();
        let products = dataset.product_types();
        let mut partners = dataset.country_partners();
        if partners.is_empty() {
            partners = dataset.partners();
        }

        let mut state = TableState::default();
        state.select(Some(0));

        Self {
            // latest year first, like the sidebar default
            year_index: years.len().saturating_sub(1),
            years,
            products,
            product_index: 0,
            partners,
            partner_index: 0,
            dataset,
            top_n: config.top_n,
            wrap_width: config.wrap_width,
            current_page: Page::Overview,
            measure: Measure::Export,
            direction: TradeDirection::Import,
            state,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        self.state.select(Some(0));
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
        self.state.select(Some(0));
    }

    pub fn cycle_year(&mut self, forward: bool) {
        self.year_index = cycle(self.year_index, self.years.len(), forward);
        self.state.select(Some(0));
    }

    pub fn cycle_measure(&mut self) {
        self.measure = self.measure.next();
        self.state.select(Some(0));
    }

    pub fn cycle_product(&mut self, forward: bool) {
        self.product_index = cycle(self.product_index, self.products.len(), forward);
        self.state.select(Some(0));
    }

    pub fn cycle_partner(&mut self, forward: bool) {
        self.partner_index = cycle(self.partner_index, self.partners.len(), forward);
        self.state.select(Some(0));
    }

    pub fn toggle_direction(&mut self) {
        self.direction = match self.direction {
            TradeDirection::Export => TradeDirection::Import,
            TradeDirection::Import => TradeDirection::Export,
        };
    }

    pub fn selected_year(&self) -> Option<i32> {
        self.years.get(self.year_index).copied()
    }

    pub fn selected_product(&self) -> Option<&str> {
        self.products.get(self.product_index).map(String::as_str)
    }

    pub fn selected_partner(&self) -> Option<&str> {
        self.partners.get(self.partner_index).map(String::as_str)
    }

    pub fn overview_view(&self) -> Option<TradeOverview> {
        let year = self.selected_year()?;
        Some(overview(
            &self.dataset,
            &OverviewQuery {
                year,
                measure: self.measure,
                top_n: self.top_n,
                wrap_width: self.wrap_width,
            },
        ))
    }

    pub fn product_view(&self) -> Option<ProductFocus> {
        let year = self.selected_year()?;
        let product = self.selected_product()?;
        Some(product_focus(
            &self.dataset,
            &ProductQuery {
                year,
                measure: self.measure,
                product: product.to_string(),
                top_n: self.top_n,
            },
        ))
    }

    pub fn country_view(&self) -> Option<CountryFocus> {
        let partner = self.selected_partner()?;
        Some(country_focus(&self.dataset, partner, self.direction, None))
    }

    /// Rows of the selectable table on the current page
    pub fn row_count(&self) -> usize {
        match self.current_page {
            Page::Overview => self.overview_view().map_or(0, |v| v.choropleth.values.len()),
            Page::ProductFocus => self.product_view().map_or(0, |v| v.choropleth.values.len()),
            Page::CountryFocus => self.country_view().map_or(0, |v| v.products.len()),
        }
    }

    pub fn next(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 || i >= len {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => app.next_page(),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('y') => app.cycle_year(true),
                KeyCode::Char('Y') => app.cycle_year(false),
                KeyCode::Char('m') => app.cycle_measure(),
                KeyCode::Char('p') => app.cycle_product(true),
                KeyCode::Char('P') => app.cycle_product(false),
                KeyCode::Char('n') => app.cycle_partner(true),
                KeyCode::Char('N') => app.cycle_partner(false),
                KeyCode::Char('d') => app.toggle_direction(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                _ => {}
            }
        }
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Overview => render_overview(f, chunks[1], app),
        Page::ProductFocus => render_product_focus(f, chunks[1], app),
        Page::CountryFocus => render_country_focus(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Overview, Page::ProductFocus, Page::CountryFocus];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    let selection = match app.current_page {
        Page::Overview => format!(
            "Year: {}  Data: {}",
            app.selected_year().map(|y| y.to_string()).unwrap_or_else(|| "-".to_string()),
            app.measure
        ),
        Page::ProductFocus => format!(
            "Year: {}  Data: {}  Product: {}",
            app.selected_year().map(|y| y.to_string()).unwrap_or_else(|| "-".to_string()),
            app.measure,
            app.selected_product().unwrap_or("-")
        ),
        Page::CountryFocus => format!(
            "Country: {}  View: {}s",
            app.selected_partner().unwrap_or("-"),
            app.direction
        ),
    };
    tab_spans.push(Span::styled(selection, Style::default().fg(Color::White)));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![Span::styled(
        format!(" Rows loaded: {} ", app.dataset.exports.len() + app.dataset.imports.len()),
        Style::default().fg(Color::Cyan),
    )];

    if !app.dataset.skipped.is_empty() {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            format!("Skipped: {}", app.dataset.skipped.len()),
            Style::default().fg(Color::Red),
        ));
    }

    let keys: &[(&str, &str)] = match app.current_page {
        Page::Overview => &[("Tab", " Page | "), ("y", " Year | "), ("m", " Data | ")],
        Page::ProductFocus => &[("Tab", " Page | "), ("y", " Year | "), ("m", " Data | "), ("p/P", " Product | ")],
        Page::CountryFocus => &[("Tab", " Page | "), ("n/N", " Country | "), ("d", " Imports/Exports | ")],
    };

    status_spans.push(Span::raw(" | "));
    for (key, label) in keys {
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(*label));
    }
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_empty(f: &mut Frame, area: Rect, title: &str) {
    let placeholder = Paragraph::new("No data for this selection").block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", title)),
    );
    f.render_widget(placeholder, area);
}

// ============================================================================
// PAGES
// ============================================================================

fn render_overview(f: &mut Frame, area: Rect, app: &mut App) {
    let view = match app.overview_view() {
        Some(v) => v,
        None => return render_empty(f, area, Page::Overview.title()),
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[1]);

    render_choropleth(f, top[0], &view.choropleth, &mut app.state);
    render_ranked(f, top[1], &view.top_partners_title, &view.top_partners, Unit::Billions);
    render_summary(f, bottom[0], &view.summary);

    let tile_rows = view.products.iter().map(|t| {
        Row::new(vec![
            Cell::from(truncate(&t.label, 40)),
            Cell::from(format!("{:.1} B", t.value)),
            Cell::from(format!("{:.2}%", t.share * 100.0)),
        ])
    });
    let tiles = Table::new(
        tile_rows,
        [Constraint::Min(20), Constraint::Length(12), Constraint::Length(10)],
    )
    .header(header_row(&["Product", "Value", "Share"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" {} ", view.products_title)),
    );
    f.render_widget(tiles, bottom[1]);
}

fn render_product_focus(f: &mut Frame, area: Rect, app: &mut App) {
    let view = match app.product_view() {
        Some(v) => v,
        None => return render_empty(f, area, Page::ProductFocus.title()),
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(rows[1]);

    render_choropleth(f, top[0], &view.choropleth, &mut app.state);
    render_ranked(f, top[1], &view.top_partners_title, &view.top_partners, Unit::HundredMillions);
    render_summary(f, bottom[0], &view.summary);

    let fill = if view.deficit { Color::Red } else { Color::White };
    let yearly_rows = view.yearly.iter().map(|r| {
        Row::new(vec![
            Cell::from(r.key.year.map(|y| y.to_string()).unwrap_or_default()),
            Cell::from(short_usd(r.export_value, Unit::Billions, 1)),
            Cell::from(short_usd(r.import_value, Unit::Billions, 1)).style(Style::default().fg(Color::Red)),
            Cell::from(short_usd(r.balance(), Unit::Billions, 1)).style(Style::default().fg(fill)),
        ])
    });
    let yearly = Table::new(
        yearly_rows,
        [
            Constraint::Length(6),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(header_row(&["Year", "Export", "Import", "Balance"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" {} for {} over the years ", view.measure, view.product)),
    );
    f.render_widget(yearly, bottom[1]);

    let images: Vec<Line> = view
        .images
        .iter()
        .map(|img| {
            Line::from(vec![
                Span::styled(format!("  {} ", img.caption), Style::default().fg(Color::Cyan)),
                Span::styled(img.url.clone(), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    let examples = Paragraph::new(images).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Example Products "),
    );
    f.render_widget(examples, bottom[2]);
}

fn render_country_focus(f: &mut Frame, area: Rect, app: &mut App) {
    let view = match app.country_view() {
        Some(v) => v,
        None => return render_empty(f, area, Page::CountryFocus.title()),
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let series_rows = view.series.iter().map(|r| {
        Row::new(vec![
            Cell::from(r.year.to_string()),
            Cell::from(dollar(r.import_value)).style(Style::default().fg(Color::Red)),
            Cell::from(dollar(r.export_value)).style(Style::default().fg(Color::LightYellow)),
        ])
    });
    let series = Table::new(
        series_rows,
        [Constraint::Length(6), Constraint::Length(22), Constraint::Length(22)],
    )
    .header(header_row(&["Year", "Imports", "Exports"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" US - {} Trade Over Time ", view.partner)),
    );
    f.render_widget(series, chunks[0]);

    let product_rows = view.products.iter().map(|p| {
        Row::new(vec![
            Cell::from(truncate(&p.product_name, 36)),
            Cell::from(format!("{:.0}", p.quantity)),
            Cell::from(dollar(p.value)),
            Cell::from(dollar(p.trade_deficit)).style(Style::default().fg(if p.trade_deficit > 0.0 {
                Color::Red
            } else {
                Color::Green
            })),
        ])
    });
    let products = Table::new(
        product_rows,
        [
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Length(20),
            Constraint::Length(20),
        ],
    )
    .header(header_row(&["Product", "Quantity", "Value", "Deficit"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" {} ", view.title)),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");
    f.render_stateful_widget(products, chunks[1], &mut app.state);
}

// ============================================================================
// WIDGETS
// ============================================================================

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn render_choropleth(f: &mut Frame, area: Rect, batch: &BinnedBatch, state: &mut TableState) {
    if batch.is_empty() {
        return render_empty(f, area, "Map");
    }

    let rows = batch.values.iter().map(|v| {
        let color = hex_color(v.color);
        Row::new(vec![
            Cell::from(truncate(&v.label, 28)),
            Cell::from(dollar(v.value)),
            Cell::from(format!("■ {}", v.bucket_label)).style(Style::default().fg(color)),
        ])
    });

    let table = Table::new(
        rows,
        [Constraint::Length(30), Constraint::Length(22), Constraint::Min(12)],
    )
    .header(header_row(&["Partner", "Value (USD)", "Category"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" Map categories ({}) ", batch.scheme.name)),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, state);
}

fn render_ranked(f: &mut Frame, area: Rect, title: &str, ranked: &[RankedRow], unit: Unit) {
    let rows = ranked.iter().map(|r| {
        Row::new(vec![
            Cell::from(format!("{:>2}", r.rank)),
            Cell::from(truncate(&r.label, 22)),
            Cell::from(format!("{:.2}", scale(r.display_value, unit))),
            Cell::from(progress_bar(r.progress, 12)).style(Style::default().fg(Color::Green)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(24),
            Constraint::Length(10),
            Constraint::Min(12),
        ],
    )
    .header(header_row(&["#", "Trade Partner", "Value", ""]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" {} ({} USD) ", title, unit.suffix())),
    );

    f.render_widget(table, area);
}

fn render_summary(f: &mut Frame, area: Rect, summary: &TradeSummary) {
    let lines: Vec<Line> = summary
        .bars
        .iter()
        .map(|bar| {
            let color = if bar.value < 0.0 { Color::Red } else { Color::LightYellow };
            Line::from(vec![
                Span::styled(format!("  {:<14}", bar.category), Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("{:>10.2} {} USD", bar.value, summary.unit.suffix()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Trade Summary "),
    );
    f.render_widget(paragraph, area);
}

fn progress_bar(progress: f64, width: usize) -> String {
    let filled = (progress.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Color::White;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::White,
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trade_dashboard::records::TradeRecord;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        let exports = vec![
            TradeRecord::new(2021, "China", "Machines", 120e9, TradeDirection::Export),
            TradeRecord::new(2022, "China", "Machines", 150e9, TradeDirection::Export),
            TradeRecord::new(2022, "Canada", "Vehicles", 300e9, TradeDirection::Export),
        ];
        let imports = vec![TradeRecord::new(2022, "China", "Machines", 500e9, TradeDirection::Import)];
        App::new(Dataset::from_records(exports, imports), &DashboardConfig::default())
    }

    #[test]
    fn test_app_starts_on_latest_year() {
        let app = app();
        assert_eq!(app.selected_year(), Some(2022));
        assert_eq!(app.selected_product(), Some("Machines"));
        // no country-year table, so partners fall back to the trade tables
        assert_eq!(app.selected_partner(), Some("Canada"));
    }

    #[test]
    fn test_selection_cycles_wrap() {
        let mut app = app();
        app.cycle_year(true);
        assert_eq!(app.selected_year(), Some(2021));
        app.cycle_year(false);
        assert_eq!(app.selected_year(), Some(2022));
        app.cycle_product(false);
        assert_eq!(app.selected_product(), Some("Vehicles"));
        app.cycle_measure();
        assert_eq!(app.measure, Measure::Import);
        app.toggle_direction();
        assert_eq!(app.direction, TradeDirection::Export);
    }

    #[test]
    fn test_row_selection_wraps_within_table() {
        let mut app = app();
        // 2022 exports: China and Canada
        assert_eq!(app.row_count(), 2);

        for _ in 0..50 {
            app.next();
        }
        assert_eq!(app.state.selected(), Some(0));

        app.previous();
        assert_eq!(app.state.selected(), Some(1));
        app.next();
        assert_eq!(app.state.selected(), Some(0));

        // country page has no product rows, so selection stays put
        app.next_page();
        app.next_page();
        assert_eq!(app.row_count(), 0);
        app.next();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_pages_cycle() {
        assert_eq!(Page::Overview.next().next().next(), Page::Overview);
        assert_eq!(Page::Overview.previous(), Page::CountryFocus);
    }

    #[test]
    fn test_every_page_renders() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();

        for _ in 0..3 {
            for _ in 0..3 {
                terminal.draw(|f| ui(f, &mut app)).unwrap();
                app.cycle_measure();
            }
            app.next_page();
        }
    }

    #[test]
    fn test_empty_dataset_renders_placeholder() {
        let mut app = App::new(Dataset::from_records(vec![], vec![]), &DashboardConfig::default());
        assert!(app.overview_view().is_none());
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();
    }

    #[test]
    fn test_helpers() {
        assert_eq!(hex_color("#ffeda0"), Color::Rgb(0xff, 0xed, 0xa0));
        assert_eq!(hex_color("red"), Color::White);
        assert_eq!(hex_color("#ffé0a"), Color::White);
        assert_eq!(hex_color("#gg0000"), Color::White);
        assert_eq!(progress_bar(0.5, 4), "██░░");
        assert_eq!(progress_bar(0.0, 3), "░░░");
        assert_eq!(truncate("United States of America", 10), "United ...");
    }
}
