//! Terminal charts.
//!
//! Every renderer writes plain text to an `io::Write` and scales its bars to a
//! caller-supplied width. Empty inputs print a "(no data)" line.

use std::io::{self, Write};

use crate::models::{SpreadStat, TeamSeasonMatrix, TeamWinTotals};

const BAR: char = '█';
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

fn heading<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "─".repeat(title.chars().count()))
}

fn no_data<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "  (no data)")
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}

fn pad(label: &str, width: usize) -> String {
    let len = label.chars().count();
    if len >= width {
        label.to_string()
    } else {
        format!("{}{}", label, " ".repeat(width - len))
    }
}

/// Format a value without a trailing ".00" for whole numbers.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

fn scaled(value: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || value <= 0.0 {
        0
    } else {
        ((value / max) * width as f64).round() as usize
    }
}

/// Share of each category, with proportional bars and one-decimal percentages.
pub fn pie<W: Write>(
    out: &mut W,
    title: &str,
    items: &[(String, u32)],
    width: usize,
) -> io::Result<()> {
    heading(out, title)?;
    let total: u32 = items.iter().map(|(_, c)| c).sum();
    if total == 0 {
        return no_data(out);
    }

    let lw = label_width(items.iter().map(|(l, _)| l.as_str()));
    for (label, count) in items {
        let share = *count as f64 * 100.0 / total as f64;
        let bar = BAR.to_string().repeat(scaled(share, 100.0, width));
        writeln!(
            out,
            "  {} {:>5.1}% {} ({})",
            pad(label, lw),
            share,
            bar,
            count
        )?;
    }
    Ok(())
}

/// Horizontal bar chart.
pub fn bar<W: Write>(
    out: &mut W,
    title: &str,
    items: &[(String, f64)],
    width: usize,
) -> io::Result<()> {
    heading(out, title)?;
    if items.is_empty() {
        return no_data(out);
    }

    let lw = label_width(items.iter().map(|(l, _)| l.as_str()));
    let max = items.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    for (label, value) in items {
        let bar = BAR.to_string().repeat(scaled(*value, max, width));
        writeln!(out, "  {} │{} {}", pad(label, lw), bar, format_value(*value))?;
    }
    Ok(())
}

/// Sparkline of a series with its range.
pub fn line<W: Write>(out: &mut W, title: &str, points: &[(String, f64)]) -> io::Result<()> {
    heading(out, title)?;
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return no_data(out);
    };

    let min = points.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let max = points
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    let spark: String = points
        .iter()
        .map(|(_, v)| {
            let level = if span <= 0.0 {
                SPARKS.len() / 2
            } else {
                (((v - min) / span) * (SPARKS.len() - 1) as f64).round() as usize
            };
            SPARKS[level.min(SPARKS.len() - 1)]
        })
        .collect();

    writeln!(out, "  {}", spark)?;
    writeln!(out, "  {} … {}", first.0, last.0)?;
    let (min_label, _) = points
        .iter()
        .find(|(_, v)| *v == min)
        .unwrap_or(first);
    let (max_label, _) = points
        .iter()
        .find(|(_, v)| *v == max)
        .unwrap_or(first);
    writeln!(
        out,
        "  min {} ({})  max {} ({})",
        format_value(min),
        min_label,
        format_value(max),
        max_label
    )
}

/// Box plots on a shared axis: `├──[══|══]──┤` spans min, q1, median, q3, max.
pub fn box_plot<W: Write>(
    out: &mut W,
    title: &str,
    stats: &[SpreadStat],
    width: usize,
) -> io::Result<()> {
    heading(out, title)?;
    if stats.is_empty() {
        return no_data(out);
    }

    let width = width.max(1);
    let labels: Vec<String> = stats.iter().map(|s| s.key.label()).collect();
    let lw = label_width(labels.iter().map(String::as_str));
    let lo = stats.iter().map(|s| s.min).fold(f64::INFINITY, f64::min);
    let hi = stats.iter().map(|s| s.max).fold(f64::NEG_INFINITY, f64::max);
    let span = (hi - lo).max(1.0);
    let last = width.saturating_sub(1);
    let pos = |v: f64| ((((v - lo) / span) * last as f64).round() as usize).min(last);

    for (label, s) in labels.iter().zip(stats) {
        let mut strip = vec![' '; width];
        let (p_min, p_q1, p_med, p_q3, p_max) =
            (pos(s.min), pos(s.q1), pos(s.median), pos(s.q3), pos(s.max));
        for c in strip.iter_mut().take(p_max + 1).skip(p_min) {
            *c = '─';
        }
        for c in strip.iter_mut().take(p_q3 + 1).skip(p_q1) {
            *c = '═';
        }
        strip[p_min] = '├';
        strip[p_max] = '┤';
        strip[p_q1] = '[';
        strip[p_q3] = ']';
        strip[p_med] = '|';

        writeln!(
            out,
            "  {} {}  n={} med={} iqr={}-{}",
            pad(label, lw),
            strip.into_iter().collect::<String>(),
            s.count,
            format_value(s.median),
            format_value(s.q1),
            format_value(s.q3)
        )?;
    }
    writeln!(
        out,
        "  {} {}{}",
        " ".repeat(lw),
        pad(&format_value(lo), width.saturating_sub(format_value(hi).len())),
        format_value(hi)
    )
}

fn shade(value: u32, max: u32) -> char {
    if value == 0 || max == 0 {
        return SHADES[0];
    }
    let levels = (SHADES.len() - 1) as f64;
    let level = ((value as f64 / max as f64) * levels).ceil() as usize;
    SHADES[level.clamp(1, SHADES.len() - 1)]
}

/// Team x season grid, two characters per season, shaded by value.
pub fn heatmap<W: Write>(out: &mut W, title: &str, matrix: &TeamSeasonMatrix) -> io::Result<()> {
    heading(out, title)?;
    if matrix.is_empty() {
        return no_data(out);
    }

    let max = matrix.max_value();
    let lw = label_width(matrix.teams.iter().map(String::as_str));
    if let (Some(first), Some(last)) = (matrix.seasons.first(), matrix.seasons.last()) {
        writeln!(
            out,
            "  {} {} → {} ({} seasons)",
            " ".repeat(lw),
            first,
            last,
            matrix.seasons.len()
        )?;
    }

    for (team, row) in matrix.teams.iter().zip(&matrix.cells) {
        let cells: String = row
            .iter()
            .flat_map(|v| {
                let c = shade(*v, max);
                [c, c]
            })
            .collect();
        let total: u32 = row.iter().sum();
        writeln!(out, "  {} │{}│ {}", pad(team, lw), cells, total)?;
    }

    let legend: String = SHADES[1..].iter().collect();
    writeln!(out, "  {} '{}' = 1..{} wins", " ".repeat(lw), legend, max)
}

/// Dot plot of total, home and away wins per team.
pub fn dot_plot<W: Write>(
    out: &mut W,
    title: &str,
    totals: &[TeamWinTotals],
    width: usize,
) -> io::Result<()> {
    heading(out, title)?;
    if totals.is_empty() {
        return no_data(out);
    }

    let lw = label_width(totals.iter().map(|t| t.team.as_str()));
    let panel = (width / 3).max(5);
    let max = totals.iter().map(|t| t.total_wins).max().unwrap_or(0) as f64;
    let last = panel - 1;
    let dot = |value: u32| {
        let mut strip = vec!['·'; panel];
        let p = ((value as f64 / max.max(1.0)) * last as f64).round() as usize;
        strip[p.min(last)] = '●';
        strip.into_iter().collect::<String>()
    };

    writeln!(
        out,
        "  {} {} {} {}",
        " ".repeat(lw),
        pad("Total Wins", panel),
        pad("Home Wins", panel),
        pad("Away Wins", panel)
    )?;
    for t in totals {
        writeln!(
            out,
            "  {} {} {} {}  ({}/{}/{})",
            pad(&t.team, lw),
            dot(t.total_wins),
            dot(t.home_wins),
            dot(t.visitor_wins),
            t.total_wins,
            t.home_wins,
            t.visitor_wins
        )?;
    }
    writeln!(out, "  {} 0 .. {} wins", " ".repeat(lw), format_value(max))
}

/// Column-aligned table. Numeric-looking cells are right-aligned.
pub fn table<W: Write>(
    out: &mut W,
    title: &str,
    headers: &[&str],
    rows: &[Vec<String>],
) -> io::Result<()> {
    heading(out, title)?;
    if rows.is_empty() {
        return no_data(out);
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect();
    writeln!(out, "  {}", header.join("  ").trim_end())?;

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| {
                if cell.parse::<f64>().is_ok() {
                    format!("{:>width$}", cell, width = *w)
                } else {
                    pad(cell, *w)
                }
            })
            .collect();
        writeln!(out, "  {}", cells.join("  ").trim_end())?;
    }
    Ok(())
}
