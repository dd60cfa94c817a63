//! Minimal HTML text extraction for scraped pages.
//!
//! Only what the scrapers need: locate an element by tag and class, take its
//! inner text with tags stripped, entities decoded and whitespace collapsed.
//! Lookups that fail return `None`; callers turn that into an unknown field.

/// Inner text of the first `<tag>` whose `class` attribute contains `class`.
///
/// Matching is ASCII case-insensitive on tag and attribute names. Nested
/// elements of the same tag are balanced, so the whole element is returned.
pub fn text_by_class(html: &str, tag: &str, class: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let open = format!("<{}", tag.to_ascii_lowercase());
    let close = format!("</{}", tag.to_ascii_lowercase());

    let mut from = 0;
    while let Some(rel) = lower[from..].find(&open) {
        let start = from + rel;
        let after_name = start + open.len();
        from = after_name;
        if !is_tag_boundary(lower.as_bytes().get(after_name).copied()) {
            continue;
        }
        let tag_end = after_name + lower[after_name..].find('>')?;
        if !has_class(&html[start..tag_end], class) {
            continue;
        }
        let inner_start = tag_end + 1;
        let inner_end = matching_close(&lower, inner_start, &open, &close)?;
        let text = clean_text(&html[inner_start..inner_end]);
        return Some(text);
    }
    None
}

fn is_tag_boundary(b: Option<u8>) -> bool {
    matches!(b, Some(b'>') | Some(b'/')) || b.is_some_and(|b| b.is_ascii_whitespace())
}

/// Whether the `class` attribute of `open_tag` lists `class` as a token.
///
/// The attribute name must follow whitespace, so `data-class` does not
/// count; spaces around `=` are allowed.
fn has_class(open_tag: &str, class: &str) -> bool {
    let lower = open_tag.to_ascii_lowercase();
    let mut from = 0;
    while let Some(rel) = lower[from..].find("class") {
        let at = from + rel;
        from = at + "class".len();
        if !lower[..at].ends_with(|c: char| c.is_ascii_whitespace()) {
            continue;
        }
        let Some(rest) = open_tag[from..].trim_start().strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        let value = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => rest[1..].split(q).next().unwrap_or(""),
            _ => rest.split(|c: char| c.is_whitespace() || c == '>').next().unwrap_or(""),
        };
        return value.split_whitespace().any(|c| c == class);
    }
    false
}

/// Byte offset of the close tag balancing an element whose content starts
/// at `from`.
fn matching_close(lower: &str, from: usize, open: &str, close: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut pos = from;
    loop {
        let next_close = pos + lower[pos..].find(close)?;
        match lower[pos..next_close].find(open) {
            Some(rel) => {
                depth += 1;
                pos = pos + rel + open.len();
            }
            None => {
                depth -= 1;
                if depth == 0 {
                    return Some(next_close);
                }
                pos = next_close + close.len();
            }
        }
    }
}

/// Strip tags, decode common entities, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&decode_entities(&out))
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_div_by_class() {
        let html = r#"<html><body>
            <div class="header">Case</div>
            <DIV Class="case-info status">  Preliminary   Injunction <b>Granted</b> </DIV>
        </body></html>"#;
        assert_eq!(
            text_by_class(html, "div", "status").as_deref(),
            Some("Preliminary Injunction Granted")
        );
    }

    #[test]
    fn class_must_match_whole_token() {
        let html = r#"<div class="status-bar">x</div><div class='status'>Pending</div>"#;
        assert_eq!(text_by_class(html, "div", "status").as_deref(), Some("Pending"));
    }

    #[test]
    fn only_the_class_attribute_counts() {
        let html = r#"<div data-class="status">no</div><div id="s" class = "status">yes</div>"#;
        assert_eq!(text_by_class(html, "div", "status").as_deref(), Some("yes"));
        assert!(!has_class(r#"<div subclass="status""#, "status"));
        assert!(has_class("<div\tclass=status", "status"));
    }

    #[test]
    fn nested_elements_balanced() {
        let html = r#"<div class="last-update"><div>Mar 14,</div> <div>2025</div></div><div>after</div>"#;
        assert_eq!(
            text_by_class(html, "div", "last-update").as_deref(),
            Some("Mar 14, 2025")
        );
    }

    #[test]
    fn similar_tag_names_ignored() {
        let html = r#"<divider class="status">no</divider><div class="status">yes</div>"#;
        assert_eq!(text_by_class(html, "div", "status").as_deref(), Some("yes"));
    }

    #[test]
    fn missing_element_is_none() {
        assert_eq!(text_by_class("<p>nothing</p>", "div", "status"), None);
        assert_eq!(text_by_class(r#"<div class="status">unclosed"#, "div", "status"), None);
    }

    #[test]
    fn entities_decoded() {
        assert_eq!(clean_text("Smith&nbsp;&amp;&nbsp;Jones"), "Smith & Jones");
    }
}
