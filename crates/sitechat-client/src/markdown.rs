use pulldown_cmark::{html, Event, Options, Parser};

/// Collapse runs of blank lines into a single newline and trim the result
///
/// Assistant replies tend to arrive with generous vertical whitespace; the
/// transcript renders them compactly.
pub fn clean_content(content: &str) -> String {
    let mut cleaned = String::with_capacity(content.len());
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if !cleaned.is_empty() {
            cleaned.push('\n');
        }
        cleaned.push_str(line);
    }
    cleaned.trim().to_string()
}

/// Render markdown to HTML
///
/// Single newlines become hard `<br>` breaks, matching how the backend
/// formats its replies. pulldown-cmark never generates heading anchors or
/// auto-links bare identifiers, so nothing needs disabling there.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// Render an assistant reply: clean up the raw content, then convert
pub fn render_assistant_content(content: &str) -> String {
    render_markdown(&clean_content(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_collapses_blank_runs() {
        assert_eq!(clean_content("a\n\n\nb"), "a\nb");
        assert_eq!(clean_content("a\n   \nb"), "a\nb");
        assert_eq!(clean_content("  a\nb  "), "a\nb");
    }

    #[test]
    fn test_clean_keeps_single_newlines() {
        assert_eq!(clean_content("a\nb\nc"), "a\nb\nc");
    }

    #[test]
    fn test_render_bold() {
        let html = render_markdown("**hi**");
        assert!(html.contains("<strong>hi</strong>"));
        assert!(!html.contains("**"));
    }

    #[test]
    fn test_render_newline_as_hard_break() {
        let html = render_markdown("a\nb");
        assert!(html.contains("<br"));
    }

    #[test]
    fn test_render_gfm_table() {
        let html = render_markdown("| a | b |\n| - | - |\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_render_assistant_cleans_first() {
        let html = render_assistant_content("line one\n\n\nline two");
        // After collapsing, the two lines sit in one paragraph joined by <br>
        assert!(html.contains("<br"));
        assert_eq!(html.matches("<p>").count(), 1);
    }
}
