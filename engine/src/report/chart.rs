// Horizontal bar chart drawn with text, used for totals per product
use shared::models::NumberFormat;
use shared::utils::format_currency;

const BAR_CHAR: char = '#';

pub struct BarChart {
    title: String,
    width: usize,
}

impl BarChart {
    pub fn new(title: impl Into<String>, width: usize) -> Self {
        Self {
            title: title.into(),
            width: width.max(1),
        }
    }

    /// Bars are scaled so the largest value fills `width`; zero and negative
    /// values get an empty bar.
    pub fn render(&self, entries: &[(String, f64)], currency_symbol: &str, number_format: NumberFormat) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        if entries.is_empty() {
            out.push_str("(no data)\n");
            return out;
        }

        let label_width = entries.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
        let max_value = entries.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

        for (label, value) in entries {
            let bar_len = if max_value > 0.0 && *value > 0.0 {
                ((value / max_value) * self.width as f64).round().max(1.0) as usize
            } else {
                0
            };
            let bar: String = std::iter::repeat(BAR_CHAR).take(bar_len).collect();
            let label_fill = " ".repeat(label_width - label.chars().count());
            let bar_fill = " ".repeat(self.width - bar_len);
            out.push_str(&format!(
                "{}{} | {}{} {}\n",
                label,
                label_fill,
                bar,
                bar_fill,
                format_currency(currency_symbol, *value, number_format)
            ));
        }
        out
    }
}
