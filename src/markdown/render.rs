//! Markdown to HTML rendering for the presentation shells

use pulldown_cmark::{Event, Options, Parser, Tag, html};
use tracing::warn;

use crate::TripSageError;

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Link schemes a report may use. Links without a scheme are relative.
const ALLOWED_LINK_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Scheme of a link destination, ignoring the whitespace and control
/// characters browsers strip before resolving it
fn link_scheme(destination: &str) -> Option<String> {
    let compact: String = destination
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();
    let (scheme, _) = compact.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then(|| scheme.to_ascii_lowercase())
}

/// Render agent markdown as HTML.
///
/// Raw HTML and links with schemes other than http(s) or mailto are not
/// passed through: a report containing either fails to render.
pub fn render_markdown(markdown: &str) -> crate::Result<String> {
    let mut events = Vec::new();
    for event in Parser::new_ext(markdown, options()) {
        match &event {
            Event::Html(tag) | Event::InlineHtml(tag) => {
                return Err(TripSageError::render(format!(
                    "raw HTML is not allowed in reports: {}",
                    tag.trim()
                )));
            }
            Event::Start(Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. }) => {
                if let Some(scheme) = link_scheme(dest_url)
                    && !ALLOWED_LINK_SCHEMES.contains(&scheme.as_str())
                {
                    return Err(TripSageError::render(format!(
                        "link scheme '{scheme}' is not allowed in reports"
                    )));
                }
            }
            _ => {}
        }
        events.push(event);
    }

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    Ok(output)
}

/// Render markdown, falling back to escaped plain text when rendering fails
#[must_use]
pub fn render_or_plain(markdown: &str) -> String {
    match render_markdown(markdown) {
        Ok(html) => html,
        Err(e) => {
            warn!("Falling back to plain text: {}", e);
            format!("<pre class=\"plain\">{}</pre>", escape_html(markdown))
        }
    }
}

/// Escape text for use in HTML element content and quoted attributes
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_renders_images_and_headers() {
        let html = render_markdown("## Louvre\n\n![Pyramid](https://example.com/p.jpg)\n").unwrap();
        assert!(html.contains("<h2>Louvre</h2>"));
        assert!(html.contains("<img src=\"https://example.com/p.jpg\" alt=\"Pyramid\""));
    }

    #[test]
    fn test_renders_tables() {
        let html = render_markdown("| Airline | Price |\n|---|---|\n| Air France | ₹45000 |\n")
            .unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>Air France</td>"));
    }

    #[test]
    fn test_raw_html_fails_to_render() {
        let err = render_markdown("Hello <script>alert(1)</script>").unwrap_err();
        assert!(matches!(err, TripSageError::Render { .. }));

        let err = render_markdown("<div>\nblock\n</div>\n").unwrap_err();
        assert!(matches!(err, TripSageError::Render { .. }));
    }

    #[rstest]
    #[case("[click](javascript:alert(1))")]
    #[case("[click](JavaScript:alert(1))")]
    #[case("<javascript:alert(1)>")]
    #[case("[file](file:///etc/passwd)")]
    #[case("![x](data:image/svg+xml;base64,PHN2Zz4=)")]
    fn test_unsafe_links_fail_to_render(#[case] markdown: &str) {
        let err = render_markdown(markdown).unwrap_err();
        assert!(matches!(err, TripSageError::Render { .. }));
        assert!(render_or_plain(markdown).starts_with("<pre class=\"plain\">"));
    }

    #[rstest]
    #[case("[Louvre](https://www.louvre.fr)", "href=\"https://www.louvre.fr\"")]
    #[case("[site](http://example.com/a:b)", "href=\"http://example.com/a:b\"")]
    #[case("[mail](mailto:info@example.com)", "href=\"mailto:info@example.com\"")]
    #[case("[map](maps/paris.html)", "href=\"maps/paris.html\"")]
    #[case("[top](#day-1)", "href=\"#day-1\"")]
    fn test_safe_links_render(#[case] markdown: &str, #[case] expected: &str) {
        let html = render_markdown(markdown).unwrap();
        assert!(html.contains(expected), "{html}");
    }

    #[test]
    fn test_fallback_shows_escaped_text() {
        let output = render_or_plain("Tips <b>pack light</b> & enjoy");
        assert_eq!(
            output,
            "<pre class=\"plain\">Tips &lt;b&gt;pack light&lt;/b&gt; &amp; enjoy</pre>"
        );
    }

    #[test]
    fn test_escape_html_quotes() {
        assert_eq!(escape_html("a \"b\" 'c'"), "a &quot;b&quot; &#39;c&#39;");
    }
}
