use std::fmt;
use termion::style::{Underline, Reset};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Print rows as a table fitted to the terminal's width.
///
/// If the table is too wide the last column is truncated.
pub fn print_table<R>(header: &[&str], rows: &[R])
where
    R: AsRef<[String]>,
{
    let (terminal_width, _) = termion::terminal_size().unwrap_or((80, 20));
    let widths = column_widths(header, rows, usize::from(terminal_width));

    for (inx, width) in widths.iter().enumerate() {
        if inx > 0 {
            print!(" ");
        }
        print!("{}{}{}", Underline, Column(header[inx], *width), Reset);
    }
    println!();

    for row in rows {
        for (inx, width) in widths.iter().enumerate() {
            if inx > 0 {
                print!(" ");
            }
            let value = row.as_ref().get(inx).map_or("", String::as_str);
            print!("{}", Column(value, *width));
        }
        println!();
    }
}

/// Compute widths of columns, shrinking the last one so that the whole
/// table fits in `max_width`.
fn column_widths<R>(header: &[&str], rows: &[R], max_width: usize) -> Vec<usize>
where
    R: AsRef<[String]>,
{
    let mut widths = header.iter()
        .map(|h| UnicodeWidthStr::width(*h))
        .collect::<Vec<_>>();

    for row in rows {
        for (width, value) in widths.iter_mut().zip(row.as_ref()) {
            *width = (*width).max(UnicodeWidthStr::width(value.as_str()));
        }
    }

    // Sum of all longest widths and spaces separating them.
    let total_width = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);

    if total_width > max_width {
        if let Some(last) = widths.last_mut() {
            let overflow = total_width - max_width;
            *last = last.saturating_sub(overflow).max(1);
        }
    }

    widths
}

/// A value padded or truncated to a fixed display width.
struct Column<'a>(&'a str, usize);

impl<'a> fmt::Display for Column<'a> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let (len, end) = self.0.char_indices()
            .scan(0, |total_len, (inx, chr)| {
                *total_len += UnicodeWidthChar::width(chr).unwrap_or(0);
                if *total_len > self.1 {
                    None
                } else {
                    Some((*total_len, inx + chr.len_utf8()))
                }
            })
            .last()
            .unwrap_or((0, 0));

        let pad = self.1.saturating_sub(len);

        write!(fmt, "{0}{1:2$}", &self.0[..end], "", pad)
    }
}
