// src/render.rs

//! Terminal rendering of conversation, product cards and analytics.

use crate::analytics::Dashboard;
use crate::chat::{ChatMessage, MessageStatus, QuickAsks, Role};
use crate::constants::{BUBBLE_WIDTH, CARD_CATEGORY_LIMIT, FREQUENCY_TABLE_LIMIT, SAMPLE_PRODUCT_ROWS};
use crate::models::{Product, RecommendedProduct};
use colored::Colorize;
use prettytable::{format, row, Table};

const MISSING: &str = "—";

/// Formats with Indian digit grouping and two decimals, e.g. `₹12,34,567.50`.
pub fn format_inr(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let grouped = if whole.len() <= 3 {
        whole.to_string()
    } else {
        let (head, tail) = whole.split_at(whole.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, right) = rest.split_at(rest.len() - 2);
            groups.push(right);
            rest = left;
        }
        groups.push(rest);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}₹{}.{}", sign, grouped, fraction)
}

pub fn format_usd(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Price as shown on a card: parsed rupees, else the raw label.
pub fn card_price(product: &Product) -> Option<String> {
    product
        .price
        .map(format_inr)
        .or_else(|| product.price_label.clone())
}

/// Price as shown in the analytics table.
pub fn table_price(product: &Product) -> String {
    product
        .price
        .map(format_usd)
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn health_label(backend_ok: Option<bool>) -> String {
    match backend_ok {
        None => "Checking...".dimmed().to_string(),
        Some(true) => "API online".green().to_string(),
        Some(false) => "API offline".red().to_string(),
    }
}

fn wrap(text: &str, indent: &str) -> String {
    let options = textwrap::Options::new(BUBBLE_WIDTH)
        .initial_indent(indent)
        .subsequent_indent(indent);
    textwrap::fill(text, options)
}

/// One chat bubble. System messages render as nothing.
pub fn render_message(message: &ChatMessage) -> Option<String> {
    let label = match message.role {
        Role::System => return None,
        Role::User => "You".yellow().bold(),
        Role::Assistant => "Assistant".green().bold(),
    };
    let body = wrap(&message.content, "  ");
    let body = match message.status {
        MessageStatus::Pending => body.dimmed().to_string(),
        MessageStatus::Errored => body.red().to_string(),
        MessageStatus::Resolved => body,
    };
    Some(format!("{}\n{}", label, body))
}

pub fn render_card(item: &RecommendedProduct) -> String {
    let product = &item.product;
    let mut lines = Vec::new();

    let mut header = product.title.bold().to_string();
    if let Some(score) = item.score {
        header.push_str(&format!("  {}", format!("Score: {:.2}", score).cyan()));
    }
    lines.push(header);
    lines.push(format!("  id: {}", product.uniq_id.dimmed()));

    let chips: Vec<&str> = [&product.brand, &product.material, &product.color]
        .into_iter()
        .filter_map(|c| c.as_deref())
        .collect();
    if !chips.is_empty() {
        lines.push(format!("  [{}]", chips.join("] [")));
    }

    if let Some(price) = card_price(product) {
        lines.push(format!("  {}", price.bold()));
    }

    if !product.categories.is_empty() {
        let shown: Vec<&str> = product
            .categories
            .iter()
            .take(CARD_CATEGORY_LIMIT)
            .map(String::as_str)
            .collect();
        lines.push(format!("  {}", shown.join(" · ").italic()));
    }

    match product.primary_image() {
        Some(url) => lines.push(format!("  {}", url.underline())),
        None => lines.push(format!("  {}", "No image".dimmed())),
    }

    if let Some(text) = item.display_text() {
        lines.push(wrap(text, "  "));
    }

    lines.join("\n")
}

pub fn render_cards(items: &[RecommendedProduct]) -> String {
    if items.is_empty() {
        return "No recommendations yet. Try asking for a style, material, or budget."
            .dimmed()
            .to_string();
    }
    let mut out = format!("{} ({} items)\n\n", "Recommendations".bold(), items.len());
    out.push_str(
        &items
            .iter()
            .map(render_card)
            .collect::<Vec<_>>()
            .join("\n\n"),
    );
    out
}

pub fn render_quick_asks(asks: &QuickAsks) -> String {
    let mut out = String::from("Try asking:\n");
    for (i, prompt) in asks.visible().iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, prompt));
    }
    let prev = if asks.can_prev() { "/prev ‹" } else { "" };
    let next = if asks.can_next() { "› /next" } else { "" };
    out.push_str(&format!("  {}  {}", prev, next).dimmed().to_string());
    out
}

pub fn frequency_table(label: &str, rows: &[(String, u64)]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row![label, "Count"]);
    for (name, count) in rows {
        table.add_row(row![name, r->count]);
    }
    table
}

pub fn sample_table(products: &[Product], limit: usize) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["Title", "Brand", "Price", "Material", "Color"]);
    for p in products.iter().take(limit) {
        let title: String = p.title.chars().take(48).collect();
        table.add_row(row![
            title,
            p.brand.as_deref().unwrap_or(MISSING),
            table_price(p),
            p.material.as_deref().unwrap_or(MISSING),
            p.color.as_deref().unwrap_or(MISSING)
        ]);
    }
    table
}

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let avg = dashboard
        .average_price()
        .map(format_usd)
        .unwrap_or_else(|| MISSING.to_string());
    let top_brand_count = if dashboard.summary.top_brands.is_empty() {
        MISSING.to_string()
    } else {
        dashboard.summary.top_brands.len().to_string()
    };

    let mut out = format!("{}\n\n", "Dataset Analytics".bold());
    out.push_str(&format!(
        "  Total Products: {}   Avg. Price: {}   Top Brands Count: {}\n\n",
        dashboard.total_products().to_string().bold(),
        avg.bold(),
        top_brand_count.bold()
    ));

    out.push_str(&format!("{}\n", "Top Categories".bold()));
    out.push_str(
        &frequency_table("Category", &dashboard.top_categories(FREQUENCY_TABLE_LIMIT)).to_string(),
    );
    out.push_str(&format!("\n{}\n", "Top Brands".bold()));
    out.push_str(&frequency_table("Brand", &dashboard.top_brands(FREQUENCY_TABLE_LIMIT)).to_string());
    out.push_str(&format!("\n{}\n", "Sample Products".bold()));
    out.push_str(&sample_table(&dashboard.products, SAMPLE_PRODUCT_ROWS).to_string());
    out
}
