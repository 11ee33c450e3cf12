//! Word wrapping for console output

/// Characters a line may be broken after
const BREAK_CHARS: [char; 11] = [' ', ',', '.', '?', '!', ':', ';', '-', '\n', '\r', '\t'];

/// Characters trimmed from both ends of every emitted line
const TRIM_CHARS: [char; 4] = [' ', '\r', '\n', '\t'];

/// Reflow `text` into lines of at most `max_line_length` characters.
///
/// Each line ends just after the last break character (whitespace or
/// `,.?!:;-`) inside the next `max_line_length` characters. When the window
/// holds no break character the line is cut hard at exactly
/// `max_line_length` characters. Lines are trimmed of surrounding whitespace
/// and each one is terminated by `\n`, so `""` wraps to `"\n"`.
///
/// Lengths count `char`s, not bytes. A width of `0` is treated as `1`.
#[must_use]
pub fn word_wrap(text: &str, max_line_length: usize) -> String {
    let max = max_line_length.max(1);
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut result = String::with_capacity(text.len() + text.len() / max + 1);
    let mut last = 0;
    loop {
        let end = if last + max >= len { len } else { break_point(&chars, last, max) };

        let line: String = chars[last..end].iter().collect();
        result.push_str(line.trim_matches(&TRIM_CHARS[..]));
        result.push('\n');

        last = end;
        if last >= len {
            break;
        }
    }

    result
}

/// Index one past the break for the line starting at `last`.
///
/// Requires `last + max < chars.len()`.
fn break_point(chars: &[char], last: usize, max: usize) -> usize {
    let limit = last + max;

    // Whitespace right after the window is trimmed off, so the line still fits
    if TRIM_CHARS.contains(&chars[limit]) {
        return limit + 1;
    }

    (last..limit).rev().find(|&i| BREAK_CHARS.contains(&chars[i])).map_or(limit, |i| i + 1)
}
