//! Line colors for multi-fund charts.
//!
//! Colors are assigned by selection index and cycle when there are more funds
//! than palette entries.

pub const PALETTE: [&str; 6] = ["#8884d8", "#82ca9d", "#ffc658", "#ff7300", "#0088FE", "#00C49F"];

/// Hex color for the `index`-th selected fund.
pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// `(code, color)` pairs in selection order.
pub fn assign_colors(codes: &[String]) -> Vec<(String, &'static str)> {
    codes
        .iter()
        .enumerate()
        .map(|(i, code)| (code.clone(), color_for(i)))
        .collect()
}

/// `#rrggbb` → `(r, g, b)`.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
