use scraper::ElementRef;

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

fn descendant_elements<'a>(root: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    // `descendants` starts with the node itself.
    root.descendants().skip(1).filter_map(ElementRef::wrap)
}

fn has_class_substring(element: &ElementRef, tag_name: &str, substring: &str) -> bool {
    element.value().name() == tag_name
        && element
            .value()
            .attr("class")
            .is_some_and(|class| class.contains(substring))
}

pub fn find_by_class_substring<'a>(
    root: ElementRef<'a>,
    tag_name: &str,
    substring: &str,
) -> Option<ElementRef<'a>> {
    descendant_elements(root).find(|element| has_class_substring(element, tag_name, substring))
}

pub fn find_all_by_class_substring<'a>(
    root: ElementRef<'a>,
    tag_name: &str,
    substring: &str,
) -> Vec<ElementRef<'a>> {
    descendant_elements(root)
        .filter(|element| has_class_substring(element, tag_name, substring))
        .collect()
}

pub fn find_by_id<'a>(root: ElementRef<'a>, tag_name: &str, id: &str) -> Option<ElementRef<'a>> {
    descendant_elements(root)
        .find(|element| element.value().name() == tag_name && element.value().id() == Some(id))
}

pub fn join_url(url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub fn get_parent_url(url: &str) -> String {
    if url.matches('/').count() <= 2 {
        return url.to_string();
    }
    let trimmed = url.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    const HTML_SAMPLE: &str = r#"
        <html>
            <body>
                <div class="some-class">Content 1</div>
                <div class="another-class">Content 2</div>
                <p class="test-class">Paragraph 1</p>
                <p class="test-class-other">Paragraph 2</p>
                <script id="payload">{}</script>
            </body>
        </html>
    "#;

    #[test]
    fn finds_first_tag_by_class_substring() {
        let html = Html::parse_document(HTML_SAMPLE);
        let root = html.root_element();
        let tag = find_by_class_substring(root, "p", "test-class").unwrap();
        assert_eq!(extract_text(tag), "Paragraph 1");
        let span = find_by_class_substring(root, "span", "test-class");
        assert!(span.is_none());
    }

    #[test]
    fn finds_all_tags_by_class_substring() {
        let html = Html::parse_document(HTML_SAMPLE);
        let root = html.root_element();
        let tags = find_all_by_class_substring(root, "div", "class");
        let texts: Vec<_> = tags.into_iter().map(extract_text).collect();
        assert_eq!(texts, vec!["Content 1", "Content 2"]);
        let item_tags = find_all_by_class_substring(root, "div", "item-tag");
        assert!(item_tags.is_empty());
    }

    #[test]
    fn finds_tag_by_id() {
        let html = Html::parse_document(HTML_SAMPLE);
        let root = html.root_element();
        assert!(find_by_id(root, "script", "payload").is_some());
        assert!(find_by_id(root, "div", "payload").is_none());
    }

    #[test]
    fn joins_urls_with_single_slash() {
        let base = "http://example.com";
        assert_eq!(join_url(base, "subpage"), "http://example.com/subpage");
        assert_eq!(
            join_url("http://example.com/", "/subpage"),
            "http://example.com/subpage"
        );
        assert_eq!(
            join_url("http://example.com/", "subpage/"),
            "http://example.com/subpage/"
        );
        assert_eq!(
            join_url("http://example.com//", "//subpage"),
            "http://example.com/subpage"
        );
    }

    #[test]
    fn parent_url_drops_last_segment() {
        assert_eq!(
            get_parent_url("http://example.com/page"),
            "http://example.com"
        );
        assert_eq!(
            get_parent_url("http://example.com/page/"),
            "http://example.com"
        );
        assert_eq!(
            get_parent_url("http://example.com/section/page"),
            "http://example.com/section"
        );
        assert_eq!(get_parent_url("http://example.com"), "http://example.com");
    }
}
