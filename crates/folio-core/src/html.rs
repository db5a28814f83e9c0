//! Sanitising of admin-edited HTML fragments.

/// Strip scripts, event-handler attributes and `javascript:` URLs, keeping
/// ordinary formatting markup.
pub fn sanitize(html: &str) -> String {
    ammonia::clean(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_script_tags() {
        let cleaned = sanitize("<p>Hello</p><script>alert(1)</script>");
        assert_eq!(cleaned, "<p>Hello</p>");
    }

    #[test]
    fn test_removes_event_handlers() {
        let cleaned = sanitize(r#"<img src="me.jpg" onerror="steal()">"#);
        assert!(!cleaned.contains("onerror"));
        assert!(cleaned.contains("me.jpg"));
    }

    #[test]
    fn test_removes_javascript_urls() {
        let cleaned = sanitize(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!cleaned.contains("javascript:"));
    }

    #[test]
    fn test_keeps_formatting() {
        let html = "<h2>About</h2><p>I like <strong>maps</strong> and <em>books</em>.</p>";
        assert_eq!(sanitize(html), html);
    }
}
