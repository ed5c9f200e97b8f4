//! Terminal rendering

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use stock_engine::analysis::usd;
use stock_engine::{AnalysisReport, DcfValuation, NewsItem, ScreenerRow};

const MISSING: &str = "-";

fn table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn number(value: f64, decimals: usize) -> Cell {
    Cell::new(format!("{value:.decimals$}")).set_alignment(CellAlignment::Right)
}

fn optional(value: Option<f64>, decimals: usize) -> Cell {
    match value {
        Some(v) => number(v, decimals),
        None => Cell::new(MISSING).set_alignment(CellAlignment::Right),
    }
}

fn price(value: f64) -> Cell {
    Cell::new(usd(value)).set_alignment(CellAlignment::Right)
}

fn join_prices(levels: &[f64]) -> String {
    if levels.is_empty() {
        return MISSING.to_string();
    }
    levels.iter().map(|&p| usd(p)).collect::<Vec<_>>().join(", ")
}

pub fn screener_table(rows: &[ScreenerRow]) -> Table {
    let mut table = table(["#", "Ticker", "Price", "RSI", "vs EMA200 %", "PE", "PEG", "Score"]);
    for (rank, row) in rows.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&row.ticker),
            price(row.last_price),
            number(row.rsi, 1),
            optional(row.ema_distance_pct, 1),
            optional(row.pe, 1),
            optional(row.peg, 2),
            number(row.score, 2),
        ]);
    }
    table
}

pub fn report_overview(report: &AnalysisReport) -> Table {
    let mut table = table([format!("{} as of {}", report.symbol, report.as_of), String::new()]);

    let rsi = match (report.rsi, report.rsi_zone()) {
        (Some(value), Some(zone)) => format!("{value:.1} ({zone})"),
        _ => "warming up".to_string(),
    };
    let macd = match (report.macd, report.macd_signal) {
        (Some(line), Some(signal)) => format!("{line:.3} / signal {signal:.3}"),
        _ => MISSING.to_string(),
    };

    table.add_row(vec![Cell::new("Last price"), price(report.last_price)]);
    table.add_row(vec![Cell::new("RSI"), Cell::new(rsi)]);
    table.add_row(vec![Cell::new("MACD"), Cell::new(macd)]);
    table.add_row(vec![
        Cell::new("Intrinsic value"),
        Cell::new(format!("{} ({})", usd(report.intrinsic_value()), report.verdict)),
    ]);
    table
}

pub fn levels_table(report: &AnalysisReport) -> Table {
    let mut table = table(["Level", "Price"]);
    for level in report.fibonacci.iter() {
        table.add_row(vec![Cell::new(format!("Fib {}", level.label)), price(level.price)]);
    }
    table.add_row(vec![
        Cell::new("Supports"),
        Cell::new(join_prices(&report.supports)),
    ]);
    table.add_row(vec![
        Cell::new("Resistances"),
        Cell::new(join_prices(&report.resistances)),
    ]);
    table
}

pub fn dcf_table(dcf: &DcfValuation) -> Table {
    let mut table = table(["Year", "Cash flow", "Present value"]);
    for year in &dcf.projections {
        table.add_row(vec![
            Cell::new(year.year),
            price(year.cash_flow),
            price(year.present_value),
        ]);
    }

    let mut terminal = format!("Terminal @ {:.1}%", dcf.effective_terminal_growth_pct);
    if dcf.terminal_growth_clamped {
        terminal.push_str(" (clamped)");
    }
    table.add_row(vec![
        Cell::new(terminal),
        price(dcf.terminal_value),
        price(dcf.terminal_present_value),
    ]);
    table.add_row(vec![
        Cell::new("Intrinsic value"),
        Cell::new(""),
        price(dcf.intrinsic_value),
    ]);
    table
}

pub fn news_list(items: &[NewsItem]) -> String {
    let mut lines = Vec::with_capacity(items.len() * 2);
    for item in items {
        let source = if item.source.is_empty() {
            String::new()
        } else {
            format!(" [{}]", item.source)
        };
        lines.push(format!("{}{}  {}", item.published_label(), source, item.headline));
        if !item.url.is_empty() {
            lines.push(format!("    {}", item.url));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use stock_engine::{AnalysisParams, PriceSeries, analyze};

    fn row(ticker: &str, pe: Option<f64>) -> ScreenerRow {
        ScreenerRow {
            ticker: ticker.to_string(),
            last_price: 1234.5,
            rsi: 42.04,
            ema_distance_pct: Some(-3.25),
            score: 17.5,
            pe,
            peg: None,
        }
    }

    #[test]
    fn test_screener_table() {
        let rendered = screener_table(&[row("AAPL", Some(28.4)), row("NVDA", None)]).to_string();
        assert!(rendered.contains("Ticker"));
        assert!(rendered.contains("AAPL"));
        assert!(rendered.contains("$1,234.50"));
        assert!(rendered.contains("42.0"));
        assert!(rendered.contains("28.4"));
        assert!(rendered.contains(MISSING));
    }

    #[test]
    fn test_report_tables() {
        let closes: Vec<f64> = (0..120_i32)
            .map(|i| 50.0 + 5.0 * (f64::from(i) / 6.0).sin())
            .collect();
        let series = PriceSeries::from_closes(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), &closes);
        let report = analyze("WAVE", &series, &AnalysisParams::default()).unwrap();

        let overview = report_overview(&report).to_string();
        assert!(overview.contains("WAVE"));
        assert!(overview.contains(&report.verdict.to_string()));

        let levels = levels_table(&report).to_string();
        assert!(levels.contains("Fib 61.8%"));
        assert!(levels.contains("Supports"));

        let dcf = dcf_table(&report.dcf).to_string();
        assert!(dcf.contains("Terminal @ 2.5%"));
    }

    #[test]
    fn test_news_list() {
        let items = vec![NewsItem {
            headline: "Chipmaker beats estimates".to_string(),
            url: "https://example.com/a".to_string(),
            source: "Reuters".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 5, 2, 13, 30, 0).unwrap(),
            summary: String::new(),
        }];
        let rendered = news_list(&items);
        assert!(rendered.starts_with("2024-05-02 13:30 [Reuters]  Chipmaker beats estimates"));
        assert!(rendered.contains("https://example.com/a"));
    }

    #[test]
    fn test_join_prices() {
        assert_eq!(join_prices(&[]), MISSING);
        assert_eq!(join_prices(&[99.5, 1000.0]), "$99.50, $1,000.00");
    }
}
