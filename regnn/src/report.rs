use std::fmt::Write;

const LABEL_WIDTH: usize = 10;
const X_LABEL: &str = "epoch number";
const Y_LABEL: &str = "mean square error";

/// The two result lines printed after training, errors rounded to two decimals.
pub fn summary_lines(best_mse: f64) -> [String; 2] {
    [format!("MSE: {best_mse:.2}"), format!("RMSE: {:.2}", best_mse.sqrt())]
}

/// Renders the error history as a plain-text line chart.
///
/// Each of the `width` columns shows the epoch closest to its position, the `height` rows
/// span the range between the lowest and highest error. The top and bottom rows are labelled
/// with those two values.
pub fn render_chart(history: &[f64], width: usize, height: usize) -> String {
    let width = width.max(2);
    let height = height.max(2);
    let mut out = String::new();
    let _ = writeln!(out, "{Y_LABEL}");

    if history.is_empty() {
        let _ = writeln!(out, "{:>LABEL_WIDTH$} +{}", "", "-".repeat(width));
        let _ = writeln!(out, "{:>LABEL_WIDTH$}  {X_LABEL}", "");
        return out;
    }

    let min = history.iter().copied().fold(f64::INFINITY, f64::min);
    let max = history.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let last = history.len() - 1;

    let mut grid = vec![vec![' '; width]; height];
    for col in 0..width {
        let epoch = (col * last + (width - 1) / 2) / (width - 1);
        let level = if span > 0.0 {
            ((history[epoch] - min) / span * (height - 1) as f64).round() as usize
        } else {
            0
        };
        grid[height - 1 - level.min(height - 1)][col] = '*';
    }

    for (row, cells) in grid.iter().enumerate() {
        let label = match row {
            0 => format!("{max:.3}"),
            r if r == height - 1 => format!("{min:.3}"),
            _ => String::new(),
        };
        let line: String = cells.iter().collect();
        let _ = writeln!(out, "{label:>LABEL_WIDTH$} |{}", line.trim_end());
    }

    let _ = writeln!(out, "{:>LABEL_WIDTH$} +{}", "", "-".repeat(width));
    let last_label = last.to_string();
    let gap = width.saturating_sub(1 + last_label.len());
    let _ = writeln!(out, "{:>LABEL_WIDTH$}  0{}{last_label}", "", " ".repeat(gap));
    let pad = LABEL_WIDTH + 2 + width.saturating_sub(X_LABEL.len()) / 2;
    let _ = writeln!(out, "{}{X_LABEL}", " ".repeat(pad));
    out
}
