//! Minimal scanning of section-listing pages.
//!
//! Only `<td>` cells are inspected. Tag and attribute names are matched
//! case-insensitively; the lower-cased copy of the document keeps the same
//! byte offsets because only ASCII is folded.

/// Returns the text of the first `<td>` whose `id` starts with `id_prefix`.
pub fn find_cell_text(html: &str, id_prefix: &str) -> Option<String> {
    let lc = html.to_ascii_lowercase();
    let mut from = 0;

    while let Some(rel) = lc[from..].find("<td") {
        let start = from + rel;
        let after_name = start + "<td".len();
        if !lc[after_name..].starts_with(|c: char| c == '>' || c.is_ascii_whitespace()) {
            from = after_name;
            continue;
        }
        let open_end = after_name + lc[after_name..].find('>')?;
        from = open_end + 1;

        let open_tag = &html[start..open_end];
        if id_attr(open_tag).is_some_and(|id| id.starts_with(id_prefix)) {
            let close = lc[from..]
                .find("</td")
                .map_or(html.len(), |end| from + end);
            return Some(strip_tags(&html[from..close]));
        }
    }
    None
}

/// Value of the `id` attribute within an opening tag.
///
/// Whitespace is allowed around the `=`.
fn id_attr(open_tag: &str) -> Option<&str> {
    let lc = open_tag.to_ascii_lowercase();
    let mut from = 0;

    while let Some(rel) = lc[from..].find("id") {
        let pos = from + rel;
        from = pos + "id".len();
        let preceded_by_space = lc[..pos]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_whitespace());
        if !preceded_by_space {
            continue;
        }
        let Some(after_eq) = open_tag[from..].trim_start().strip_prefix('=') else {
            continue;
        };

        let rest = after_eq.trim_start();
        return match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let value = &rest[1..];
                Some(value.find(quote).map_or(value, |end| &value[..end]))
            }
            Some(_) => {
                let end = rest
                    .find(|c: char| c.is_ascii_whitespace() || c == '/')
                    .unwrap_or(rest.len());
                Some(&rest[..end])
            }
            None => None,
        };
    }
    None
}

/// Drops markup, decodes the common entities and collapses whitespace.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <table>
          <tr>
            <td class="item">2011</td>
            <TD id="availability-2011-a" class="seats">
              <span>Waitlist:</span>&nbsp;3 of 5
            </TD>
          </tr>
          <tr>
            <td data-id="availability-3050" id='availability-3050x'>12 seats</td>
            <td id=availability-4001>Class full</td>
          </tr>
        </table>
    "#;

    #[test]
    fn test_find_cell_by_id_prefix() {
        assert_eq!(
            find_cell_text(PAGE, "availability-2011").as_deref(),
            Some("Waitlist: 3 of 5")
        );
        assert_eq!(
            find_cell_text(PAGE, "availability-3050").as_deref(),
            Some("12 seats")
        );
        assert_eq!(
            find_cell_text(PAGE, "availability-4001").as_deref(),
            Some("Class full")
        );
    }

    #[test]
    fn test_missing_cell() {
        assert_eq!(find_cell_text(PAGE, "availability-9999"), None);
        assert_eq!(find_cell_text("", "availability-1"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let html = r#"<td id="availability-101">5</td><td id="availability-101">9</td>"#;
        assert_eq!(
            find_cell_text(html, "availability-101").as_deref(),
            Some("5")
        );
    }

    #[test]
    fn test_ignores_data_id_and_non_td_tags() {
        let html = r#"<tdx id="availability-7">1</tdx><td data-id="availability-7">2</td>"#;
        assert_eq!(find_cell_text(html, "availability-7"), None);
    }

    #[test]
    fn test_id_with_spaces_around_equals() {
        let html = "<td id = \"availability-201-a\">4 seats</td><td ID\t=availability-305>Class full</td>";
        assert_eq!(
            find_cell_text(html, "availability-201").as_deref(),
            Some("4 seats")
        );
        assert_eq!(
            find_cell_text(html, "availability-305").as_deref(),
            Some("Class full")
        );
    }

    #[test]
    fn test_id_attr_ignores_similar_names() {
        assert_eq!(id_attr(r#"<td idx="a" id="b">"#), Some("b"));
        assert_eq!(id_attr(r#"<td data-id="a">"#), None);
        assert_eq!(id_attr("<td id>"), None);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>4</b>&nbsp;seats &amp; more"), "4 seats & more");
    }
}
