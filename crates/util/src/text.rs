//! Plain text transformations applied to authored content before it is
//! stored.

use std::fmt::Write as _;

/// Turn a title into a URL slug.
///
/// The result contains only lowercase ASCII letters, digits and single dashes
/// between them. Common accented Latin letters are folded to their ASCII
/// counterparts, everything else separates words. A title with nothing
/// usable in it becomes `untitled`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut dash = false;

    for chr in title.chars().flat_map(char::to_lowercase) {
        if chr.is_ascii_alphanumeric() {
            push_word(&mut slug, &mut dash, chr.encode_utf8(&mut [0; 4]));
        } else if let Some(folded) = fold(chr) {
            push_word(&mut slug, &mut dash, folded);
        } else {
            dash = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("untitled");
    }

    slug
}

fn push_word(slug: &mut String, dash: &mut bool, text: &str) {
    if *dash && !slug.is_empty() {
        slug.push('-');
    }
    *dash = false;
    slug.push_str(text);
}

/// Fold a lowercase accented letter to ASCII.
fn fold(chr: char) -> Option<&'static str> {
    Some(match chr {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' => "s",
        'ß' => "ss",
        'ť' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'þ' => "th",
        _ => return None,
    })
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for chr in text.chars() {
        match chr {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(chr),
        }
    }

    out
}

/// Render plain text as HTML.
///
/// Blocks are separated by blank lines. Within a block lines starting with
/// `# ` and `## ` become `<h2>` and `<h3>` headings, runs of lines starting
/// with `- ` or `* ` become unordered lists, and the remaining lines form
/// paragraphs with `<br>` between lines.
pub fn text_to_html(text: &str) -> String {
    let mut html = String::new();

    for block in blocks(text) {
        let mut paragraph: Vec<&str> = Vec::new();
        let mut items: Vec<&str> = Vec::new();

        for line in block {
            if let Some((level, heading)) = heading(line) {
                flush_paragraph(&mut html, &mut paragraph);
                flush_list(&mut html, &mut items);
                let _ = writeln!(html, "<h{0}>{1}</h{0}>", level, escape_html(heading));
            } else if let Some(item) = list_item(line) {
                flush_paragraph(&mut html, &mut paragraph);
                items.push(item);
            } else {
                flush_list(&mut html, &mut items);
                paragraph.push(line);
            }
        }

        flush_paragraph(&mut html, &mut paragraph);
        flush_list(&mut html, &mut items);
    }

    html
}

/// Split text into blocks of non-blank lines.
fn blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::replace(&mut current, Vec::new()));
            }
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn list_item(line: &str) -> Option<&str> {
    let line = line.trim_start();

    if line.starts_with("- ") || line.starts_with("* ") {
        Some(line[2..].trim())
    } else {
        None
    }
}

fn heading(line: &str) -> Option<(u8, &str)> {
    if line.starts_with("## ") {
        Some((3, line[3..].trim()))
    } else if line.starts_with("# ") {
        Some((2, line[2..].trim()))
    } else {
        None
    }
}

fn flush_list(html: &mut String, items: &mut Vec<&str>) {
    if items.is_empty() {
        return;
    }

    html.push_str("<ul>\n");
    for item in items.drain(..) {
        let _ = writeln!(html, "<li>{}</li>", escape_html(item));
    }
    html.push_str("</ul>\n");
}

fn flush_paragraph(html: &mut String, lines: &mut Vec<&str>) {
    if lines.is_empty() {
        return;
    }

    html.push_str("<p>");
    for (inx, line) in lines.drain(..).enumerate() {
        if inx > 0 {
            html.push_str("<br>\n");
        }
        html.push_str(&escape_html(line.trim()));
    }
    html.push_str("</p>\n");
}
