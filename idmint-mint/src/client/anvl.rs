//! ANVL ("A Name-Value Language") encoding as used by EZID.
//!
//! One `name: value` pair per line. `%` and line breaks are percent-escaped
//! in names and values; `:` is additionally escaped in names.

/// Escapes a name.
pub fn escape_name(name: &str) -> String {
    escape(name, true)
}

/// Escapes a value.
pub fn escape_value(value: &str) -> String {
    escape(value, false)
}

fn escape(s: &str, is_name: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            '\n' => out.push_str("%0A"),
            '\r' => out.push_str("%0D"),
            ':' if is_name => out.push_str("%3A"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverses percent-escaping. Malformed escapes are kept verbatim.
pub fn unescape(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Encodes pairs as an ANVL document, one line per pair.
pub fn encode<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .map(|(name, value)| format!("{}: {}", escape_name(name), escape_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes an ANVL document. Lines without a `:` separator are ignored.
pub fn decode(body: &str) -> Vec<(String, String)> {
    body.lines()
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((unescape(name.trim()), unescape(value.trim())))
        })
        .collect()
}
