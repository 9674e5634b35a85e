use std::io::{self, BufRead, Write};
use std::ops::RangeInclusive;

/// Asks until the answer parses and falls in `range`. `None` on end of input.
pub fn read_in_range<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    range: RangeInclusive<u64>,
) -> io::Result<Option<u64>> {
    let mut line = String::new();
    loop {
        write!(output, "{question} ({}-{}): ", range.start(), range.end())?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<u64>() {
            Ok(n) if range.contains(&n) => return Ok(Some(n)),
            Ok(_) => writeln!(
                output,
                "Please enter a number between {} and {}.",
                range.start(),
                range.end()
            )?,
            Err(_) => writeln!(output, "Invalid input. Please enter a number.")?,
        }
    }
}
