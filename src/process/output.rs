// ABOUTME: Bounded rendering of captured process output for logs.
// ABOUTME: Long output keeps its first and last lines around an ellipsis.

const HEAD_LINES: usize = 10;
const TAIL_LINES: usize = 10;

/// Trim `output` to a head+tail window when it exceeds `HEAD_LINES + TAIL_LINES` lines.
pub fn format_output(output: &str) -> String {
    let lines: Vec<&str> = output.trim().lines().collect();

    if lines.len() <= HEAD_LINES + TAIL_LINES {
        return lines.join("\n");
    }

    lines[..HEAD_LINES]
        .iter()
        .chain(std::iter::once(&"..."))
        .chain(lines[lines.len() - TAIL_LINES..].iter())
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}
