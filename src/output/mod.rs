pub mod report;

use colored::{Color, Colorize};
use itertools::Itertools;
use serde::Serialize;

use crate::catalog::CatalogEntry;
use crate::cms::absolute_media_url;
use crate::matrix::{
    format_amount, BudgetColor, BudgetIndicator, Grid, PriceRange, Selection, Variant,
};
use crate::store::SelectionPolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Xml,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".xml") {
        return Some(OutputFormat::Xml);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Debug)]
pub struct ViewOptions {
    pub upload_prefix: String,
    pub media_base_url: Option<String>,
    pub policy: SelectionPolicy,
}

#[derive(Clone, Debug, Serialize)]
pub struct CellView {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    pub photo_url: Option<String>,
    pub photo_name: Option<String>,
    pub selected: bool,
    pub clickable: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct RowView {
    pub name: Option<String>,
    pub cells: Vec<CellView>,
}

/// Presentation-free view of a matrix under a selection.
#[derive(Clone, Debug, Serialize)]
pub struct MatrixView {
    pub title: String,
    pub variant: Variant,
    pub total_price: f64,
    pub column_names: Vec<Option<String>>,
    pub rows: Vec<RowView>,
    pub budget: BudgetIndicator,
}

pub fn build_view(grid: &Grid, selection: &Selection, options: &ViewOptions) -> MatrixView {
    let columns = grid.display_columns();
    let rows = (0..grid.display_rows())
        .map(|row| RowView {
            name: grid.row_name(row).map(str::to_string),
            cells: (0..columns)
                .map(|col| {
                    let relative = grid.photo_url(col, row, &options.upload_prefix);
                    let photo_url = relative.map(|url| match options.media_base_url.as_deref() {
                        Some(base) => absolute_media_url(base, url),
                        None => url.to_string(),
                    });
                    let photo_name = relative
                        .and_then(|_| grid.cell(col, row))
                        .and_then(|c| c.photo.as_ref())
                        .and_then(|p| p.name.clone());
                    let (price, price_range) = match grid.variant {
                        Variant::PointPrice => (Some(grid.cell_price(col, row)), None),
                        Variant::RangePrice => (None, Some(grid.cell_price_range(col, row))),
                    };
                    CellView {
                        text: grid.cell_text(col, row).to_string(),
                        price,
                        price_range,
                        photo_url,
                        photo_name,
                        selected: selection.is_selected(col, row),
                        clickable: options.policy.allows(col),
                    }
                })
                .collect(),
        })
        .collect();

    MatrixView {
        title: grid.title.clone(),
        variant: grid.variant,
        total_price: grid.total_price,
        column_names: (0..columns)
            .map(|col| grid.column_name(col).map(str::to_string))
            .collect(),
        rows,
        budget: grid.budget(selection),
    }
}

pub fn cell_price_label(cell: &CellView) -> String {
    match (cell.price, cell.price_range) {
        (Some(p), _) => format!("${}", format_amount(p)),
        (None, Some(r)) => format!("${r}"),
        (None, None) => String::new(),
    }
}

pub fn estimated_label(budget: &BudgetIndicator) -> String {
    match budget {
        BudgetIndicator::Point { selected_total, .. } => {
            format!("${}", format_amount(*selected_total))
        }
        BudgetIndicator::Range { selected, .. } => format!("${selected}"),
    }
}

pub fn utilization_label(budget: &BudgetIndicator) -> String {
    match budget {
        BudgetIndicator::Point {
            percent: Some(p), ..
        } => format!("{p:.1}%"),
        BudgetIndicator::Range {
            low_percent: Some(low),
            high_percent: Some(high),
            ..
        } => format!("{low:.1}%–{high:.1}%"),
        _ => "n/a".to_string(),
    }
}

fn terminal_color(color: BudgetColor) -> Color {
    match color {
        BudgetColor::Green => Color::Green,
        BudgetColor::Yellow => Color::Yellow,
        BudgetColor::Red => Color::Red,
    }
}

const BAR_WIDTH: usize = 40;

fn bar_fill(percent: f64) -> usize {
    let clamped = percent.clamp(0.0, 100.0);
    ((clamped / 100.0) * BAR_WIDTH as f64).round() as usize
}

fn render_bar(budget: &BudgetIndicator) -> String {
    match budget {
        BudgetIndicator::Point {
            percent: Some(p),
            color: Some(c),
            ..
        } => {
            let fill = bar_fill(*p);
            format!(
                "[{}{}]",
                "#".repeat(fill).color(terminal_color(*c)),
                ".".repeat(BAR_WIDTH - fill)
            )
        }
        BudgetIndicator::Range {
            low_percent: Some(low),
            high_percent: Some(high),
            gradient: Some(g),
            ..
        } => {
            let low_fill = bar_fill(*low);
            let high_fill = bar_fill(*high).max(low_fill);
            format!(
                "[{}{}{}]",
                "#".repeat(low_fill).color(terminal_color(g.from)),
                "=".repeat(high_fill - low_fill).color(terminal_color(g.to)),
                ".".repeat(BAR_WIDTH - high_fill)
            )
        }
        _ => format!("[{}]", " ".repeat(BAR_WIDTH)),
    }
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    format!("{}{}", value, " ".repeat(width.saturating_sub(len)))
}

pub fn render_text(view: &MatrixView) -> String {
    let mut header = vec!["Row Name".to_string()];
    header.extend(
        view.column_names
            .iter()
            .map(|n| n.clone().unwrap_or_default()),
    );

    let body: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|row| {
            let mut line = vec![row.name.clone().unwrap_or_default()];
            line.extend(row.cells.iter().map(|cell| {
                let marker = if cell.selected { "* " } else { "" };
                let label = format!("{marker}{} {}", cell.text, cell_price_label(cell));
                label.trim().to_string()
            }));
            line
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            std::iter::once(&header)
                .chain(body.iter())
                .filter_map(|line| line.get(i))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let separator = format!(
        "+{}+",
        widths.iter().map(|w| "-".repeat(w + 2)).join("+")
    );
    let render_line = |line: &[String]| {
        format!(
            "| {} |",
            line.iter()
                .zip(widths.iter())
                .map(|(s, w)| pad(s, *w))
                .join(" | ")
        )
    };

    let mut out = String::new();
    if !view.title.is_empty() {
        out.push_str(&view.title.bold().to_string());
        out.push('\n');
    }
    out.push_str(&separator);
    out.push('\n');
    out.push_str(&render_line(&header));
    out.push('\n');
    out.push_str(&separator);
    out.push('\n');
    for line in body.iter() {
        out.push_str(&render_line(line));
        out.push('\n');
    }
    out.push_str(&separator);
    out.push('\n');

    let photos: Vec<String> = view
        .rows
        .iter()
        .enumerate()
        .flat_map(|(r, row)| {
            row.cells.iter().enumerate().filter_map(move |(c, cell)| {
                cell.photo_url
                    .as_ref()
                    .map(|url| format!("  {}:{} {}", c + 1, r + 1, url))
            })
        })
        .collect();
    if !photos.is_empty() {
        out.push_str("Photos:\n");
        for line in photos {
            out.push_str(&line);
            out.push('\n');
        }
    }

    out.push_str(&format!(
        "Total Budget: ${}    Total Estimated Budget: {}\n",
        format_amount(view.total_price),
        estimated_label(&view.budget)
    ));
    out.push_str(&format!(
        "{} {}\n",
        render_bar(&view.budget),
        utilization_label(&view.budget)
    ));
    out
}

pub fn render_json(view: &MatrixView) -> Vec<u8> {
    serde_json::to_vec_pretty(view).unwrap_or_else(|_| b"{}\n".to_vec())
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn opt_percent(value: Option<f64>) -> String {
    value.map(|p| format!("{p:.2}")).unwrap_or_default()
}

pub fn render_xml(view: &MatrixView) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push('\n');
    out.push_str(&format!(
        "<matrix variant=\"{}\">\n",
        view.variant.label()
    ));
    out.push_str(&format!("  <title>{}</title>\n", escape_xml(&view.title)));
    out.push_str(&format!(
        "  <total_price>{}</total_price>\n",
        format_amount(view.total_price)
    ));
    out.push_str("  <columns>\n");
    for name in view.column_names.iter() {
        out.push_str(&format!(
            "    <column>{}</column>\n",
            escape_xml(name.as_deref().unwrap_or(""))
        ));
    }
    out.push_str("  </columns>\n");
    out.push_str("  <rows>\n");
    for row in view.rows.iter() {
        out.push_str(&format!(
            "    <row name=\"{}\">\n",
            escape_xml(row.name.as_deref().unwrap_or(""))
        ));
        for cell in row.cells.iter() {
            out.push_str(&format!(
                "      <cell selected=\"{}\" clickable=\"{}\">\n",
                cell.selected, cell.clickable
            ));
            out.push_str(&format!("        <text>{}</text>\n", escape_xml(&cell.text)));
            if let Some(price) = cell.price {
                out.push_str(&format!("        <price>{}</price>\n", format_amount(price)));
            }
            if let Some(range) = cell.price_range {
                out.push_str(&format!(
                    "        <price_low>{}</price_low>\n",
                    format_amount(range.low)
                ));
                out.push_str(&format!(
                    "        <price_high>{}</price_high>\n",
                    format_amount(range.high)
                ));
            }
            if let Some(url) = cell.photo_url.as_deref() {
                out.push_str(&format!("        <photo>{}</photo>\n", escape_xml(url)));
            }
            out.push_str("      </cell>\n");
        }
        out.push_str("    </row>\n");
    }
    out.push_str("  </rows>\n");
    out.push_str("  <budget>\n");
    match &view.budget {
        BudgetIndicator::Point {
            selected_total,
            percent,
            color,
        } => {
            out.push_str(&format!(
                "    <selected_total>{}</selected_total>\n",
                format_amount(*selected_total)
            ));
            out.push_str(&format!("    <percent>{}</percent>\n", opt_percent(*percent)));
            out.push_str(&format!(
                "    <color>{}</color>\n",
                color.map(|c| c.as_str()).unwrap_or("")
            ));
        }
        BudgetIndicator::Range {
            selected,
            low_percent,
            high_percent,
            gradient,
        } => {
            out.push_str(&format!(
                "    <selected_low>{}</selected_low>\n",
                format_amount(selected.low)
            ));
            out.push_str(&format!(
                "    <selected_high>{}</selected_high>\n",
                format_amount(selected.high)
            ));
            out.push_str(&format!(
                "    <low_percent>{}</low_percent>\n",
                opt_percent(*low_percent)
            ));
            out.push_str(&format!(
                "    <high_percent>{}</high_percent>\n",
                opt_percent(*high_percent)
            ));
            out.push_str(&format!(
                "    <gradient>{}</gradient>\n",
                gradient.map(|g| g.name()).unwrap_or_default()
            ));
        }
    }
    out.push_str("  </budget>\n");
    out.push_str("</matrix>\n");
    out.into_bytes()
}

pub fn render_html(view: &MatrixView) -> Vec<u8> {
    report::render_html(view)
}

pub fn render(view: &MatrixView, format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(view).into_bytes(),
        OutputFormat::Json => render_json(view),
        OutputFormat::Xml => render_xml(view),
        OutputFormat::Html => render_html(view),
    }
}

pub fn render_catalog_text(entries: &[CatalogEntry]) -> String {
    let mut out = String::new();
    for e in entries {
        let created = e
            .created_on
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        out.push_str(&format!(
            "{}  {}\n",
            e.title.bold(),
            format!("Created At: {created}").dimmed()
        ));
    }
    out
}

pub fn render_catalog(entries: &[CatalogEntry], format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Json => {
            serde_json::to_vec_pretty(entries).unwrap_or_else(|_| b"[]\n".to_vec())
        }
        OutputFormat::Xml => {
            let mut out = String::new();
            out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            out.push('\n');
            out.push_str("<matrices>\n");
            for e in entries {
                out.push_str(&format!(
                    "  <matrix id=\"{}\" created=\"{}\">{}</matrix>\n",
                    e.id,
                    e.created_on.map(|d| d.to_string()).unwrap_or_default(),
                    escape_xml(&e.title)
                ));
            }
            out.push_str("</matrices>\n");
            out.into_bytes()
        }
        OutputFormat::Html => report::render_catalog_html(entries),
        OutputFormat::Text => render_catalog_text(entries).into_bytes(),
    }
}
