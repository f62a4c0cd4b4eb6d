/// Best-effort `<title>` extraction for the metadata index.
///
/// Takes the first `<title>...</title>` occurrence, non-greedy, with no
/// nested-tag handling. This is a display hint, not a parser; anything
/// fancier belongs in the client.
pub fn extract_title(html: &str) -> String {
    let Some(start) = html.find("<title>") else {
        return String::new();
    };
    let rest = &html[start + "<title>".len()..];
    let Some(end) = rest.find("</title>") else {
        return String::new();
    };
    rest[..end].to_string()
}
