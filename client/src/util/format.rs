//! Display formatting shared by pages and components.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

use uuid::Uuid;

/// Integer with comma thousands separators, e.g. `1,000,000`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Owner id shortened to its first and last six characters.
pub fn short_id(id: Uuid) -> String {
    let full = id.to_string();
    format!("{}…{}", &full[..6], &full[full.len() - 6..])
}

/// `Brick #N (x=.., y=..)`.
pub fn brick_label(index: u32, x: u32, y: u32) -> String {
    format!("Brick #{index} (x={x}, y={y})")
}
