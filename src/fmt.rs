/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let sign = if val < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    format!("{sign}${}.{dec_part}", group_thousands(int_part))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Compact dollar label for chart axes and heatmap cells: $950, $1.2k, $3M.
pub fn compact_money(val: f64) -> String {
    // Units are chosen after rounding so 999.6 reads $1k, not $1000.
    let abs = val.abs();
    if abs.round() < 1000.0 {
        return format!("${}", abs.round() as u64);
    }
    let tenths = |unit: f64| (abs / unit * 10.0).round() / 10.0;
    let (scaled, suffix) = if tenths(1000.0) < 1000.0 {
        (tenths(1000.0), "k")
    } else {
        (tenths(1_000_000.0), "M")
    };
    if scaled == scaled.floor() {
        format!("${}{suffix}", scaled as u64)
    } else {
        format!("${scaled:.1}{suffix}")
    }
}

/// Horizontal bar of `width` cells filled in proportion to `fraction`.
pub fn bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
