//! Plain-text report rendering

use std::fmt::Write;

use tokcount::types::{Report, TokenBucket};

const RULE_WIDTH: usize = 70;
const MODEL_WIDTH: usize = 30;

/// Format an integer with thousands separators (1234567 → "1,234,567")
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Truncate to at most `width` characters
fn truncate(s: &str, width: usize) -> &str {
    match s.char_indices().nth(width) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn rule(out: &mut String, ch: char) {
    let _ = writeln!(out, "{}", ch.to_string().repeat(RULE_WIDTH));
}

/// Render the full text report
pub fn render(report: &Report) -> String {
    let mut out = String::new();
    render_summary(&mut out, report);
    render_models(&mut out, report);
    render_dates(&mut out, report);
    out
}

fn render_summary(out: &mut String, report: &Report) {
    let total = &report.total;

    rule(out, '=');
    let _ = writeln!(out, "Claude Token Usage Summary");
    rule(out, '=');
    let _ = writeln!(out);

    let _ = writeln!(out, "Total Sessions: {}", format_number(report.sessions_count as u64));
    let _ = writeln!(out, "Total Messages: {}", format_number(total.messages));
    let _ = writeln!(out);
    let _ = writeln!(out, "Input Tokens:     {:>12}", format_number(total.input));
    let _ = writeln!(out, "Output Tokens:    {:>12}", format_number(total.output));
    let _ = writeln!(out, "Cache Write:      {:>12}", format_number(total.cache_write));
    let _ = writeln!(out, "Cache Read:       {:>12}", format_number(total.cache_read));
    let _ = writeln!(out, "Total Cache:      {:>12}", format_number(total.cache_tokens()));
    let _ = writeln!(out, "Total Tokens:     {:>12}", format_number(total.total_tokens()));

    if let Some(cost) = total.cost {
        let _ = writeln!(out, "Total Cost:        ${:>10.2}", cost);
    }
    let _ = writeln!(out);
}

fn render_models(out: &mut String, report: &Report) {
    if report.by_model.is_empty() {
        return;
    }
    let priced = report.has_cost();

    rule(out, '-');
    let _ = writeln!(out, "Usage by Model");
    rule(out, '-');
    if priced {
        let _ = writeln!(
            out,
            "{:<30} {:>9} {:>9} {:>9} {:>9} {:>9} {:>10} {:>5}",
            "Model", "Input", "Output", "CWrite", "CRead", "Tokens", "Cost", "Msgs"
        );
    } else {
        let _ = writeln!(
            out,
            "{:<30} {:>10} {:>10} {:>10} {:>10} {:>12} {:>5}",
            "Model", "Input", "Output", "CWrite", "CRead", "Total", "Msgs"
        );
    }
    rule(out, '-');

    let mut models: Vec<(&String, &TokenBucket)> = report.by_model.iter().collect();
    // Largest first; name breaks ties so output is stable
    models.sort_by(|a, b| {
        b.1.total_tokens()
            .cmp(&a.1.total_tokens())
            .then_with(|| a.0.cmp(b.0))
    });

    for (model, bucket) in models {
        let name = truncate(model, MODEL_WIDTH);
        if priced {
            let _ = writeln!(
                out,
                "{:<30} {:>9} {:>9} {:>9} {:>9} {:>9} ${:>9.2} {:>5}",
                name,
                format_number(bucket.input),
                format_number(bucket.output),
                format_number(bucket.cache_write),
                format_number(bucket.cache_read),
                format_number(bucket.total_tokens()),
                bucket.cost.unwrap_or(0.0),
                bucket.messages
            );
        } else {
            let _ = writeln!(
                out,
                "{:<30} {:>10} {:>10} {:>10} {:>10} {:>12} {:>5}",
                name,
                format_number(bucket.input),
                format_number(bucket.output),
                format_number(bucket.cache_write),
                format_number(bucket.cache_read),
                format_number(bucket.total_tokens()),
                bucket.messages
            );
        }
    }
    let _ = writeln!(out);
}

fn render_dates(out: &mut String, report: &Report) {
    if report.by_date.is_empty() {
        return;
    }
    let priced = report.has_cost();

    rule(out, '-');
    let _ = writeln!(out, "Usage by Date");
    rule(out, '-');
    if priced {
        let _ = writeln!(
            out,
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>5}",
            "Date", "Input", "Output", "CWrite", "CRead", "Total", "Cost", "Msgs"
        );
    } else {
        let _ = writeln!(
            out,
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>12} {:>5}",
            "Date", "Input", "Output", "CWrite", "CRead", "Total", "Msgs"
        );
    }
    rule(out, '-');

    // BTreeMap iteration is already date-ascending
    for (date, bucket) in &report.by_date {
        if priced {
            let _ = writeln!(
                out,
                "{:<12} {:>10} {:>10} {:>10} {:>10} {:>10} ${:>9.2} {:>5}",
                date,
                format_number(bucket.input),
                format_number(bucket.output),
                format_number(bucket.cache_write),
                format_number(bucket.cache_read),
                format_number(bucket.total_tokens()),
                bucket.cost.unwrap_or(0.0),
                bucket.messages
            );
        } else {
            let _ = writeln!(
                out,
                "{:<12} {:>10} {:>10} {:>10} {:>10} {:>12} {:>5}",
                date,
                format_number(bucket.input),
                format_number(bucket.output),
                format_number(bucket.cache_write),
                format_number(bucket.cache_read),
                format_number(bucket.total_tokens()),
                bucket.messages
            );
        }
    }
    let _ = writeln!(out);
}
