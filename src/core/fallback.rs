use dlmate_core::{DlMateError, Platform};
use serde::{Deserialize, Serialize};

use super::html::{HtmlDocument, HtmlQuery};
use super::http_client::{HttpClient, HttpRequest};

/// One candidate location for a field inside a returned page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldRule {
    Text { selector: String },
    Attr { selector: String, attr: String },
}

impl FieldRule {
    pub fn text(selector: &str) -> Self {
        FieldRule::Text {
            selector: selector.to_string(),
        }
    }

    pub fn attr(selector: &str, attr: &str) -> Self {
        FieldRule::Attr {
            selector: selector.to_string(),
            attr: attr.to_string(),
        }
    }

    pub fn meta(property: &str) -> Self {
        FieldRule::attr(&format!("meta[property='{}']", property), "content")
    }

    fn apply(&self, doc: &dyn HtmlQuery) -> Option<String> {
        match self {
            FieldRule::Text { selector } => doc.text(selector),
            FieldRule::Attr { selector, attr } => doc.attr(selector, attr),
        }
    }
}

/// Ordered candidates per field; the first non-empty match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRules {
    #[serde(default)]
    pub title: Vec<FieldRule>,
    #[serde(default)]
    pub primary_link: Vec<FieldRule>,
    #[serde(default)]
    pub secondary_link: Vec<FieldRule>,
    #[serde(default)]
    pub thumbnail: Vec<FieldRule>,
}

fn first_match(rules: &[FieldRule], doc: &dyn HtmlQuery) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(doc))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ServiceRequest {
    /// POST the input as a single form field, with `Referer` set to the endpoint.
    FormPost { field: String },
    /// GET the endpoint; `{url}` and `{encoded_url}` are replaced by the input.
    Get,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub endpoint: String,
    pub request: ServiceRequest,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    pub rules: ExtractionRules,
}

impl ServiceDescriptor {
    fn build_request(&self, input: &str) -> HttpRequest {
        let request = match &self.request {
            ServiceRequest::FormPost { field } => {
                HttpRequest::post_form(&self.endpoint, vec![(field.clone(), input.to_string())])
                    .header("Referer", &self.endpoint)
            }
            ServiceRequest::Get => HttpRequest::get(
                self.endpoint
                    .replace("{encoded_url}", &urlencoding::encode(input))
                    .replace("{url}", input),
            ),
        };

        self.headers
            .iter()
            .fold(request, |req, (name, value)| req.header(name, value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedMedia {
    pub service: String,
    pub title: Option<String>,
    pub primary_link: Option<String>,
    pub secondary_link: Option<String>,
    pub thumbnail: Option<String>,
}

/// Makes a scraped link absolute against the page it came from. Anchors,
/// `javascript:` and other non-http(s) values are not usable links.
fn resolve_link(base: &str, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    let resolved = match url::Url::parse(raw) {
        Ok(u) => u,
        Err(url::ParseError::RelativeUrlWithoutBase) => url::Url::parse(base).ok()?.join(raw).ok()?,
        Err(_) => return None,
    };

    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Applies a service's rules to its response. `None` when no usable link was
/// found, regardless of title or thumbnail.
pub fn scrape(service: &ServiceDescriptor, page_url: &str, markup: &str) -> Option<ScrapedMedia> {
    let doc = HtmlDocument::parse(markup);
    let rules = &service.rules;

    let primary_link = first_match(&rules.primary_link, &doc).and_then(|l| resolve_link(page_url, &l));
    let secondary_link =
        first_match(&rules.secondary_link, &doc).and_then(|l| resolve_link(page_url, &l));

    if primary_link.is_none() && secondary_link.is_none() {
        return None;
    }

    Some(ScrapedMedia {
        service: service.name.clone(),
        title: first_match(&rules.title, &doc),
        primary_link,
        secondary_link,
        thumbnail: first_match(&rules.thumbnail, &doc).and_then(|l| resolve_link(page_url, &l)),
    })
}

/// Tries each service in order and returns the first one that yields a link.
/// Per-service failures are logged and skipped.
pub async fn extract_via_fallback(
    http: &dyn HttpClient,
    platform: Platform,
    input: &str,
    services: &[ServiceDescriptor],
) -> Result<ScrapedMedia, DlMateError> {
    for service in services {
        tracing::debug!(platform = %platform, service = %service.name, "trying fallback service");

        let request = service.build_request(input);
        let page_url = request.url.clone();

        let body = match http.send(request).await {
            Ok(response) => response.body,
            Err(e) => {
                tracing::warn!(platform = %platform, service = %service.name, "service failed: {}", e);
                continue;
            }
        };

        match scrape(service, &page_url, &body) {
            Some(media) => {
                tracing::debug!(platform = %platform, service = %service.name, "service yielded links");
                return Ok(media);
            }
            None => {
                tracing::warn!(platform = %platform, service = %service.name, "service yielded no download links");
            }
        }
    }

    Err(DlMateError::NoDownloadLinksFound { platform })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http_client::{HttpError, Method, RequestBody};
    use crate::core::testing::StubHttp;

    fn rules() -> ExtractionRules {
        ExtractionRules {
            title: vec![FieldRule::text("h1.title"), FieldRule::text("title")],
            primary_link: vec![FieldRule::attr("a.hd", "href"), FieldRule::attr("a.download", "href")],
            secondary_link: vec![FieldRule::attr("a.sd", "href")],
            thumbnail: vec![FieldRule::attr("img.thumb", "src")],
        }
    }

    fn service(name: &str) -> ServiceDescriptor {
        ServiceDescriptor {
            name: name.to_string(),
            endpoint: format!("https://{}.example/download", name),
            request: ServiceRequest::FormPost {
                field: "URL".to_string(),
            },
            headers: Vec::new(),
            rules: rules(),
        }
    }

    const INPUT: &str = "https://x.com/jack/status/20";

    #[tokio::test]
    async fn only_third_service_has_links() {
        let services = vec![service("one"), service("two"), service("three")];
        let http = StubHttp::new()
            .fail("https://one.example/download", HttpError::Timeout)
            .ok(
                "https://two.example/download",
                r#"<h1 class="title">Only a title</h1><img class="thumb" src="https://cdn/t.jpg">"#,
            )
            .ok(
                "https://three.example/download",
                r#"<h1 class="title">Clip</h1><a class="download" href="https://cdn/hd.mp4">HD</a>"#,
            );

        let media = extract_via_fallback(&http, Platform::X, INPUT, &services)
            .await
            .unwrap();

        assert_eq!(media.service, "three");
        assert_eq!(media.title.as_deref(), Some("Clip"));
        assert_eq!(media.primary_link.as_deref(), Some("https://cdn/hd.mp4"));
        assert_eq!(media.secondary_link, None);
        assert_eq!(http.calls_to("https://one.example/download"), 1);
        assert_eq!(http.calls_to("https://two.example/download"), 1);
        assert_eq!(http.calls_to("https://three.example/download"), 1);
    }

    #[tokio::test]
    async fn first_success_stops_the_chain() {
        let services = vec![service("one"), service("two")];
        let http = StubHttp::new()
            .ok("https://one.example/download", r#"<a class="sd" href="https://cdn/sd.mp4">SD</a>"#)
            .ok("https://two.example/download", r#"<a class="hd" href="https://cdn/hd.mp4">HD</a>"#);

        let media = extract_via_fallback(&http, Platform::X, INPUT, &services)
            .await
            .unwrap();

        assert_eq!(media.service, "one");
        assert_eq!(media.secondary_link.as_deref(), Some("https://cdn/sd.mp4"));
        assert_eq!(http.calls_to("https://two.example/download"), 0);
    }

    #[tokio::test]
    async fn exhausted_chain_reports_no_links() {
        let services = vec![service("one"), service("two"), service("three")];
        let http = StubHttp::new()
            .ok("https://one.example/download", "<p>nothing</p>")
            .fail(
                "https://two.example/download",
                HttpError::Status {
                    status: 500,
                    body: String::new(),
                },
            )
            .ok("https://three.example/download", r##"<a class="hd" href="#">HD</a>"##);

        let err = extract_via_fallback(&http, Platform::X, INPUT, &services)
            .await
            .unwrap_err();

        assert_eq!(err, DlMateError::NoDownloadLinksFound { platform: Platform::X });
        assert_eq!(http.requests().len(), 3);
    }

    #[tokio::test]
    async fn empty_service_list_reports_no_links() {
        let http = StubHttp::new();
        let err = extract_via_fallback(&http, Platform::Instagram, INPUT, &[])
            .await
            .unwrap_err();
        assert_eq!(err, DlMateError::NoDownloadLinksFound { platform: Platform::Instagram });
    }

    #[tokio::test]
    async fn form_post_carries_input_and_referer() {
        let services = vec![service("one")];
        let http = StubHttp::new().ok(
            "https://one.example/download",
            r#"<a class="hd" href="https://cdn/hd.mp4">HD</a>"#,
        );

        extract_via_fallback(&http, Platform::X, INPUT, &services)
            .await
            .unwrap();

        let request = &http.requests()[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(
            request.body,
            Some(RequestBody::Form(vec![("URL".to_string(), INPUT.to_string())]))
        );
        assert!(request
            .headers
            .contains(&("Referer".to_string(), "https://one.example/download".to_string())));
    }

    #[tokio::test]
    async fn get_template_substitutes_input() {
        let svc = ServiceDescriptor {
            name: "lookup".into(),
            endpoint: "https://lookup.example/?q={encoded_url}".into(),
            request: ServiceRequest::Get,
            headers: vec![("Accept".into(), "text/html".into())],
            rules: rules(),
        };
        let expected_url = "https://lookup.example/?q=https%3A%2F%2Fx.com%2Fjack%2Fstatus%2F20";
        let http = StubHttp::new().ok(expected_url, r#"<a class="hd" href="/files/hd.mp4">HD</a>"#);

        let media = extract_via_fallback(&http, Platform::X, INPUT, &[svc])
            .await
            .unwrap();

        assert_eq!(media.primary_link.as_deref(), Some("https://lookup.example/files/hd.mp4"));
        assert_eq!(http.requests()[0].method, Method::Get);
        assert_eq!(http.requests()[0].headers, vec![("Accept".to_string(), "text/html".to_string())]);
    }

    #[test]
    fn title_falls_back_to_later_candidates() {
        let media = scrape(
            &service("one"),
            "https://one.example/download",
            r#"<title> Page </title><a class="hd" href="https://cdn/a.mp4">x</a>"#,
        )
        .unwrap();
        assert_eq!(media.title.as_deref(), Some("Page"));
    }

    #[test]
    fn non_http_links_are_unusable() {
        assert_eq!(resolve_link("https://a.example/", "javascript:void(0)"), None);
        assert_eq!(resolve_link("https://a.example/", "#top"), None);
        assert_eq!(resolve_link("https://a.example/", "   "), None);
        assert_eq!(
            resolve_link("https://a.example/dl/page", "file.mp4").as_deref(),
            Some("https://a.example/dl/file.mp4")
        );
    }

    #[test]
    fn rules_load_from_json() {
        let json = r#"{
            "name": "twdown",
            "endpoint": "https://twdown.net/download.php",
            "request": { "method": "form_post", "field": "URL" },
            "rules": {
                "primary_link": [
                    { "kind": "attr", "selector": "tr:nth-child(1) > td:nth-child(4) > a", "attr": "href" }
                ],
                "title": [ { "kind": "text", "selector": "p" } ]
            }
        }"#;
        let svc: ServiceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(svc.rules.primary_link.len(), 1);
        assert!(svc.rules.secondary_link.is_empty());
        assert!(svc.headers.is_empty());
        assert_eq!(svc.request, ServiceRequest::FormPost { field: "URL".into() });
    }
}
