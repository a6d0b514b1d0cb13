//! Plain-text line charts for terminal output.

/// One plotted line: `(day number, value)` pairs drawn with `glyph`.
pub struct Line<'a> {
    pub glyph: char,
    pub points: &'a [(i64, f64)],
}

const LABEL_WIDTH: usize = 10;

/// Render `lines` onto a `width` x `height` grid with a value axis on the
/// left and `x_labels` (first, last) under the plot. Later lines are drawn
/// over earlier ones.
pub fn render(lines: &[Line<'_>], width: usize, height: usize, x_labels: (&str, &str)) -> Vec<String> {
    let finite = || {
        lines
            .iter()
            .flat_map(|line| line.points.iter())
            .filter(|(_, y)| y.is_finite())
    };
    let Some(&(first_x, first_y)) = finite().next() else {
        return Vec::new();
    };
    if width < 2 || height < 2 {
        return Vec::new();
    }

    let (mut x_min, mut x_max, mut y_min, mut y_max) = (first_x, first_x, first_y, first_y);
    for &(x, y) in finite() {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    let x_span = (x_max - x_min).max(1) as f64;
    let y_span = if y_max > y_min { y_max - y_min } else { 1.0 };

    let mut grid = vec![vec![' '; width]; height];
    for line in lines {
        for &(x, y) in line.points.iter().filter(|(_, y)| y.is_finite()) {
            let col = ((x - x_min) as f64 / x_span * (width - 1) as f64).round() as usize;
            let level = ((y - y_min) / y_span * (height - 1) as f64).round() as usize;
            let row = height - 1 - level.min(height - 1);
            grid[row][col.min(width - 1)] = line.glyph;
        }
    }

    let mut out = Vec::with_capacity(height + 2);
    for (row, cells) in grid.into_iter().enumerate() {
        let label = if row == 0 {
            format!("{y_max:>LABEL_WIDTH$.2}")
        } else if row == height - 1 {
            format!("{y_min:>LABEL_WIDTH$.2}")
        } else if row == (height - 1) / 2 {
            format!("{:>LABEL_WIDTH$.2}", y_min + y_span / 2.0)
        } else {
            " ".repeat(LABEL_WIDTH)
        };
        let body = cells.into_iter().collect::<String>();
        out.push(format!("{label} |{}", body.trim_end()));
    }
    out.push(format!("{} +{}", " ".repeat(LABEL_WIDTH), "-".repeat(width)));

    let (left, right) = x_labels;
    let gap = width.saturating_sub(left.len() + right.len()).max(1);
    out.push(format!("{}  {left}{}{right}", " ".repeat(LABEL_WIDTH), " ".repeat(gap)));
    out
}
