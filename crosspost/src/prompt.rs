use std::io::{self, Write};

/// Read one trimmed line from stdin after printing a label. Blocking is
/// fine here: every operation runs to completion before the next prompt.
pub fn prompt(label: &str) -> io::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompt with a default used when the user just presses Enter.
pub fn prompt_or(label: &str, default: &str) -> io::Result<String> {
    let value = prompt(&format!("{label} [{default}]"))?;
    Ok(if value.is_empty() {
        default.to_string()
    } else {
        value
    })
}

pub fn confirm(label: &str) -> io::Result<bool> {
    let answer = prompt(&format!("{label} (y/N)"))?;
    Ok(matches!(answer.as_str(), "y" | "Y" | "yes"))
}

/// Parse a 1-based menu choice; `None` for anything out of range.
pub fn parse_choice(input: &str, options: usize) -> Option<usize> {
    let n: usize = input.trim().parse().ok()?;
    if (1..=options).contains(&n) {
        Some(n)
    } else {
        None
    }
}
