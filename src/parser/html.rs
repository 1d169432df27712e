use std::time::Duration;

use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{ElementRef, Html, Node, Selector};

use crate::app::{Result, TributaryError};
use crate::domain::{Attribute, Attributes, FetchDefinition, MemoryContent};
use crate::parser::ContentParser;

const META_SCRIPT: &str = r#"script[type="text/uic-meta"]"#;
const FETCH_TAG: &str = "uic-fetch";
const FRAGMENT_TAG: &str = "uic-fragment";
const TAIL_TAG: &str = "uic-tail";

/// Parser for composable HTML fragments.
///
/// Recognised markup:
///
/// ```html
/// <head>
///   <script type="text/uic-meta">{"title": "Home"}</script>
///   <link rel="stylesheet" href="/layout.css">
/// </head>
/// <body>
///   <uic-fetch src="http://content/article" name="content" timeout="2000"></uic-fetch>
///   <uic-fragment name="header">...</uic-fragment>
///   <uic-tail>...</uic-tail>
/// </body>
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlContentParser;

impl HtmlContentParser {
    pub fn new() -> Self {
        Self
    }
}

impl ContentParser for HtmlContentParser {
    fn parse(&self, content: &mut MemoryContent, body: &[u8]) -> Result<()> {
        let text = String::from_utf8_lossy(body);
        let document = Html::parse_document(&text);

        for script in document.select(&selector(META_SCRIPT)?) {
            let json: String = script.text().collect();
            if json.trim().is_empty() {
                continue;
            }
            let meta: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&json)?;
            content.meta.extend(meta);
        }

        for fetch in document.select(&selector(FETCH_TAG)?) {
            content.required_content.push(fetch_definition(&fetch)?);
        }

        content.stylesheets = document
            .select(&selector(r#"link[rel~="stylesheet"]"#)?)
            .map(|el| attributes(&el))
            .collect();
        content.scripts = document
            .select(&selector("head script[src]")?)
            .map(|el| attributes(&el))
            .collect();

        if let Some(head) = document.select(&selector("head")?).next() {
            let markup: String = head
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| !is_extracted_head_element(el))
                .map(|el| el.html())
                .collect();
            if !markup.trim().is_empty() {
                content.head = Some(markup);
            }
        }

        let mut has_fragments = false;
        for fragment in document.select(&selector(FRAGMENT_TAG)?) {
            has_fragments = true;
            let name = fragment.value().attr("name").unwrap_or_default();
            content
                .body
                .insert(name.to_string(), stripped_markup(&fragment));
        }

        if let Some(body) = document.select(&selector("body")?).next() {
            if !has_fragments {
                content.body.insert(String::new(), stripped_markup(&body));
            }
        }

        if let Some(tail) = document.select(&selector(TAIL_TAG)?).next() {
            content.tail = Some(tail.inner_html());
        }

        Ok(())
    }
}

fn selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| TributaryError::Parse(format!("selector {s:?}: {e}")))
}

/// Attributes of a declaration, sorted by key so that source attribute
/// order does not matter downstream.
fn attributes(el: &ElementRef) -> Attributes {
    let mut attrs: Attributes = el
        .value()
        .attrs()
        .map(|(key, val)| Attribute::new(key, val))
        .collect();
    attrs.sort_by(|a, b| a.key.cmp(&b.key));
    attrs
}

fn fetch_definition(el: &ElementRef) -> Result<FetchDefinition> {
    let value = el.value();
    let mut def = FetchDefinition::new(value.attr("src").unwrap_or_default())
        .with_name(value.attr("name").unwrap_or_default());

    if let Some(timeout) = value.attr("timeout") {
        let millis = timeout.trim().parse::<u64>().map_err(|_| {
            TributaryError::Parse(format!("invalid timeout {timeout:?} on <{FETCH_TAG}>"))
        })?;
        def = def.with_timeout(Duration::from_millis(millis));
    }

    if let Some(required) = value.attr("required") {
        def = def.with_required(!required.trim().eq_ignore_ascii_case("false"));
    }

    Ok(def)
}

fn is_extracted_head_element(el: &ElementRef) -> bool {
    let value = el.value();
    (value.name() == "script" && value.attr("src").is_some()) || is_composition_element(el)
}

/// Elements that never reach the composed page as markup: composition
/// instructions, metadata and stylesheet declarations.
fn is_composition_element(el: &ElementRef) -> bool {
    let value = el.value();
    match value.name() {
        FETCH_TAG | TAIL_TAG => true,
        "script" => value.attr("type") == Some("text/uic-meta"),
        "link" => value
            .attr("rel")
            .is_some_and(|rel| rel.split_ascii_whitespace().any(|r| r == "stylesheet")),
        _ => false,
    }
}

/// Inner markup of `el` without composition elements, at any depth.
fn stripped_markup(el: &ElementRef) -> String {
    let mut markup = String::new();
    write_children(&mut markup, el);
    markup.trim().to_string()
}

fn write_children(markup: &mut String, parent: &ElementRef) {
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => markup.push_str(&encode_text(&**text)),
            Node::Comment(comment) => {
                markup.push_str("<!--");
                markup.push_str(comment);
                markup.push_str("-->");
            }
            Node::Element(_) => {
                let Some(el) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_composition_element(&el) {
                    continue;
                }
                let nested = el
                    .descendants()
                    .skip(1)
                    .filter_map(ElementRef::wrap)
                    .any(|d| is_composition_element(&d));
                if !nested {
                    markup.push_str(&el.html());
                    continue;
                }

                let value = el.value();
                markup.push('<');
                markup.push_str(value.name());
                for (key, val) in value.attrs() {
                    markup.push(' ');
                    markup.push_str(key);
                    markup.push_str("=\"");
                    markup.push_str(&encode_double_quoted_attribute(val));
                    markup.push('"');
                }
                markup.push('>');
                write_children(markup, &el);
                markup.push_str("</");
                markup.push_str(value.name());
                markup.push('>');
            }
            _ => {}
        }
    }
}
