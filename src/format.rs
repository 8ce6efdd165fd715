//! Number formatting for chart titles, readouts and slider mapping.

/// Format a number rounded to an integer with `,` thousands separators
pub fn format_grouped(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parameter `k` for a logarithmic slider position `v` (`k = 10^v`)
pub fn slider_to_k(v: f64) -> u64 {
    let k = 10_f64.powf(v).round();
    if k.is_finite() && k >= 1.0 {
        k as u64
    } else {
        1
    }
}

/// Slider position showing parameter `k`
pub fn k_to_slider(k: u64) -> f64 {
    (k.max(1) as f64).log10()
}
