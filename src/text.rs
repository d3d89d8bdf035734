/// Characters allowed in XML 1.0 text content.
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

/// Escapes a user-supplied label for use inside an SVG `<text>` element.
///
/// Characters XML cannot carry at all (most C0 controls) are dropped rather
/// than escaped, otherwise the whole canvas would fail to parse.
pub fn escape_label(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars().filter(|&c| is_valid_xml_char(c)) {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{capitalize, escape_label};

    #[test]
    fn capitalize_lowercases_the_tail() {
        assert_eq!(capitalize("fighting"), "Fighting");
        assert_eq!(capitalize("ETHEREUM"), "Ethereum");
        assert_eq!(capitalize("bitCoin cash"), "Bitcoin cash");
        assert_eq!(capitalize("élan"), "Élan");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn escape_label_handles_markup_and_controls() {
        assert_eq!(escape_label("R&D <bot>"), "R&amp;D &lt;bot&gt;");
        assert_eq!(escape_label("a\u{0007}b"), "ab");
        assert_eq!(escape_label("₹1L"), "₹1L");
    }
}
