//! ASCII renderings of a charge-percentage series.

const LEVELS: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];
const FLAT: char = '=';

/// Pick `target` evenly spaced values; shorter inputs pass through.
fn downsample(values: &[f64], target: usize) -> Vec<f64> {
    if target == 0 || values.len() <= target {
        return values.to_vec();
    }
    let step = values.len() as f64 / target as f64;
    (0..target)
        .map(|i| values[((i as f64 * step) as usize).min(values.len() - 1)])
        .collect()
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

/// One-line trend, `"41% .:-=+*#%@ 88%"`, at most `width` glyphs wide.
///
/// Returns `None` for an empty series.
pub fn sparkline(values: &[f64], width: usize) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let values = downsample(values, width);
    let (min, max) = min_max(&values);
    let span = max - min;
    let top = LEVELS.len() - 1;

    let line: String = if span < 1e-9 {
        std::iter::repeat(FLAT).take(values.len()).collect()
    } else {
        values
            .iter()
            .map(|v| LEVELS[(((v - min) / span * top as f64) as usize).min(top)])
            .collect()
    };

    Some(format!("{min:.0}% {line} {max:.0}%"))
}

/// Multi-line bar graph scaled to 0–100% with tick labels every 25%.
///
/// Returns an empty string for an empty series.
pub fn bar_graph(values: &[f64], height: usize, width: usize) -> String {
    if values.is_empty() {
        return String::new();
    }

    let rows = (height.max(4) - 1).max(4);
    let rows = (rows + 2) / 4 * 4;
    let clamped: Vec<f64> = values.iter().map(|v| v.clamp(0.0, 100.0)).collect();
    let sampled = downsample(&clamped, width);
    let levels: Vec<usize> = sampled
        .iter()
        .map(|v| (v / 100.0 * rows as f64).round() as usize)
        .collect();

    let tick = |row: usize| (row % (rows / 4) == 0).then(|| row * 100 / rows);

    let mut lines: Vec<String> = (0..=rows)
        .rev()
        .map(|row| {
            let label = tick(row);
            let axis = label.map_or_else(|| "    ".to_string(), |pct| format!("{pct:>3}%"));
            let bars: String = levels
                .iter()
                .map(|level| match (*level >= row, label) {
                    (true, _) => '#',
                    (false, Some(_)) => '-',
                    (false, None) => ' ',
                })
                .collect();
            format!("{axis} | {bars}")
        })
        .collect();

    let (min, max) = min_max(&sampled);
    let avg = sampled.iter().sum::<f64>() / sampled.len() as f64;
    lines.push(format!("     +{}", "-".repeat(sampled.len() + 1)));
    lines.push(format!(
        "     min {min:>5.1}%  avg {avg:>5.1}%  max {max:>5.1}%"
    ));
    lines.join("\n")
}
