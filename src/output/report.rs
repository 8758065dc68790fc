use crate::catalog::CatalogEntry;
use crate::matrix::{format_amount, BudgetIndicator};

use super::{cell_price_label, estimated_label, utilization_label, MatrixView};

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLE: &str = r#"
    .container { font-family: Arial, sans-serif; max-width: 100%; margin: 0 auto; padding: 20px; text-align: center; background-color: #f9f7f0; }
    .matrix-title { font-size: 40px; margin-bottom: 20px; color: black; text-align: left; }
    .table-container { display: block; max-width: 100%; overflow-x: auto; }
    table { border-collapse: collapse; margin-top: 20px; font-size: 14px; table-layout: auto; width: 100%; }
    th, td { border: 5px solid #0a32f4; padding: 10px; text-align: left; white-space: normal; word-break: break-word; font-weight: bold; color: black; }
    th { background-color: #245a99; color: white; }
    img { max-width: 60px; max-height: 60px; }
    .row-name { width: 80px; height: 80px; display: flex; align-items: center; justify-content: center; }
    .image-container { display: flex; justify-content: center; align-items: center; }
    td.clicked { background-color: #8ab7e8; }
    td.locked { background-color: #eeeeee; }
    .total-container { display: flex; justify-content: space-between; align-items: center; margin-top: 20px; font-weight: bold; color: black; }
    .total-container div { flex: 1; }
    .temperature-bar { margin-top: 20px; height: 40px; background-color: #f2f2f2; border-radius: 4px; overflow: hidden; }
    .temperature-bar div { height: 100%; border-radius: 4px; }
    .matrix-list { max-width: 800px; margin: 0 auto; padding: 20px; font-family: Arial, sans-serif; }
    .matrix-item { margin-bottom: 20px; border: 1px solid #ddd; padding: 10px; list-style: none; }
    .created-at { font-size: 14px; color: #666; margin-top: 5px; }
"#;

fn page(title: &str, body: &str) -> Vec<u8> {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title}</title>
  <style>{STYLE}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
    )
    .into_bytes()
}

fn bar_style(budget: &BudgetIndicator) -> String {
    match budget {
        BudgetIndicator::Point {
            percent: Some(p),
            color: Some(c),
            ..
        } => format!(
            "width: {:.2}%; background-color: {};",
            p.clamp(0.0, 100.0),
            c
        ),
        BudgetIndicator::Range {
            high_percent: Some(high),
            gradient: Some(g),
            ..
        } => format!(
            "width: {:.2}%; background: {};",
            high.clamp(0.0, 100.0),
            g.css()
        ),
        _ => "width: 0%;".to_string(),
    }
}

pub fn render_html(view: &MatrixView) -> Vec<u8> {
    let mut body = String::new();
    body.push_str("<div class=\"container\">\n");
    if !view.title.is_empty() {
        body.push_str(&format!(
            "  <h1 class=\"matrix-title\">{}</h1>\n",
            escape_html(&view.title)
        ));
    }
    body.push_str("  <div class=\"table-container\">\n    <table>\n      <thead>\n        <tr>\n");
    body.push_str("          <th>Row Name</th>\n");
    for name in view.column_names.iter() {
        body.push_str(&format!(
            "          <th>{}</th>\n",
            escape_html(name.as_deref().unwrap_or(""))
        ));
    }
    body.push_str("        </tr>\n      </thead>\n      <tbody>\n");
    for row in view.rows.iter() {
        body.push_str("        <tr>\n");
        body.push_str(&format!(
            "          <td class=\"rotate\"><div class=\"row-name\">{}</div></td>\n",
            escape_html(row.name.as_deref().unwrap_or(""))
        ));
        for cell in row.cells.iter() {
            let class = if !cell.clickable {
                "locked"
            } else if cell.selected {
                "clicked"
            } else {
                ""
            };
            let photo = match cell.photo_url.as_deref() {
                Some(url) => format!(
                    "<img src=\"{}\" alt=\"Photo {}\"/>",
                    escape_html(url),
                    escape_html(cell.photo_name.as_deref().unwrap_or(""))
                ),
                None => "N/A".to_string(),
            };
            body.push_str(&format!(
                "          <td class=\"{class}\"><div class=\"image-container\">{photo}</div><p>{}</p><p>Price: {}</p></td>\n",
                escape_html(&cell.text),
                escape_html(&cell_price_label(cell)),
            ));
        }
        body.push_str("        </tr>\n");
    }
    body.push_str("      </tbody>\n    </table>\n  </div>\n");
    body.push_str(&format!(
        "  <div class=\"total-container\">\n    <div class=\"total-price\"><p>Total Budget: ${}</p></div>\n    <div class=\"total-estimated-price\"><p>Total Estimated Budget: {}</p></div>\n    <div class=\"utilization\"><p>{}</p></div>\n  </div>\n",
        format_amount(view.total_price),
        escape_html(&estimated_label(&view.budget)),
        escape_html(&utilization_label(&view.budget)),
    ));
    body.push_str(&format!(
        "  <div class=\"temperature-bar\"><div style=\"{}\"></div></div>\n",
        bar_style(&view.budget)
    ));
    body.push_str("</div>");

    let title = if view.title.is_empty() {
        "Matrix"
    } else {
        view.title.as_str()
    };
    page(title, &body)
}

pub fn render_catalog_html(entries: &[CatalogEntry]) -> Vec<u8> {
    let mut body = String::new();
    body.push_str("<div class=\"matrix-list\">\n  <h1 class=\"matrix-list-title\">Matrix List</h1>\n  <ul>\n");
    for e in entries {
        let created = e
            .created_on
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        body.push_str(&format!(
            "    <li class=\"matrix-item\"><span class=\"matrix-link\">{}</span><p class=\"created-at\">Created At: {}</p></li>\n",
            escape_html(&e.title),
            created
        ));
    }
    body.push_str("  </ul>\n</div>");
    page("Matrix List", &body)
}
