use scraper::{Html, Selector};

/// Read-only structural queries over a parsed page.
///
/// Selectors are plain CSS strings so extraction rules can live in data. An
/// unparseable selector matches nothing.
pub trait HtmlQuery {
    /// First matching element with a non-empty value for `attr`.
    fn attr(&self, selector: &str, attr: &str) -> Option<String>;

    /// Every non-empty value of `attr` across matching elements, in document order.
    fn attrs(&self, selector: &str, attr: &str) -> Vec<String>;

    /// Trimmed text of the first matching element whose text is non-empty.
    fn text(&self, selector: &str) -> Option<String>;

    fn meta(&self, property: &str) -> Option<String> {
        self.attr(&format!("meta[property='{}']", property), "content")
    }
}

pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::warn!("[html] invalid selector {:?}: {:?}", selector, e);
            None
        }
    }
}

impl HtmlQuery for HtmlDocument {
    fn attr(&self, selector: &str, attr: &str) -> Option<String> {
        let sel = parse_selector(selector)?;
        self.html
            .select(&sel)
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn attrs(&self, selector: &str, attr: &str) -> Vec<String> {
        let Some(sel) = parse_selector(selector) else {
            return Vec::new();
        };
        self.html
            .select(&sel)
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn text(&self, selector: &str) -> Option<String> {
        let sel = parse_selector(selector)?;
        self.html
            .select(&sel)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .find(|t| !t.is_empty())
    }
}
