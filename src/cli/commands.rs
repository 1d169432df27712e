use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::app::{AppContext, Result, TributaryError};
use crate::dedup::collect_stylesheets;
use crate::domain::{attr_value, FetchDefinition, FetchResult};
use crate::fetcher::metadata_for_request;

/// Run one composition session over `urls` and print what was fetched.
pub async fn compose(ctx: &AppContext, urls: &[String], meta: &[(String, String)]) -> Result<()> {
    let mut initial = initial_meta(meta);
    // templates can refer to the first root as the page request
    if let Some(Ok(url)) = urls.first().map(|u| Url::parse(u)) {
        initial
            .entry("request".to_string())
            .or_insert_with(|| metadata_for_request(&url, &HeaderMap::new()));
    }
    let session = ctx.session(initial);

    for url in urls {
        session.add_fetch_job(FetchDefinition::new(url.as_str()).with_timeout(ctx.config.loader.timeout()));
    }

    let results = session.wait_for_results().await;

    println!("Fetched {} fragments:", results.len());
    let mut errors = 0;
    for result in &results {
        println!("  {}", describe(result));
        if let Some(e) = result.error() {
            errors += 1;
            eprintln!("    error: {}", e);
        }
    }

    let stylesheets = collect_stylesheets(&results, ctx.deduplication.as_ref());
    if !stylesheets.is_empty() {
        println!("Stylesheets:");
        for attrs in &stylesheets {
            println!("  {}", attr_value(attrs, "href").unwrap_or("(inline)"));
        }
    }

    println!("Metadata:");
    println!("{}", serde_json::to_string_pretty(&session.meta())?);

    println!("Composition complete: {} fragments, {} errors", results.len(), errors);
    Ok(())
}

/// Print the fingerprint of `url` requested with `headers`.
pub fn hash(url: &str, headers: &[(String, String)]) -> Result<()> {
    let mut def = FetchDefinition::new(url);
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TributaryError::Other(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TributaryError::Other(format!("invalid header value {value:?}: {e}")))?;
        def = def.with_header(name, value);
    }

    println!("{}", def.hash());
    Ok(())
}

fn initial_meta(pairs: &[(String, String)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| {
            let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.clone()));
            (key.clone(), value)
        })
        .collect()
}

fn describe(result: &FetchResult) -> String {
    let name = if result.def.name.is_empty() {
        String::new()
    } else {
        format!(" [{}]", result.def.name)
    };
    let status = match (result.content(), result.error()) {
        (Some(content), _) => content.status_code().as_u16().to_string(),
        (None, Some(e)) => e.status_code().as_u16().to_string(),
        (None, None) => "-".to_string(),
    };

    format!("{} {} {}{}", &result.hash[..8], status, result.def.url, name)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_initial_meta_parses_json_values() {
        let meta = initial_meta(&[
            ("page".into(), "2".into()),
            ("lang".into(), "de".into()),
            ("flags".into(), r#"{"beta": true}"#.into()),
        ]);

        assert_eq!(meta["page"], json!(2));
        assert_eq!(meta["lang"], json!("de"));
        assert_eq!(meta["flags"]["beta"], json!(true));
    }

    #[test]
    fn test_describe_not_fetched() {
        let def = FetchDefinition::new("http://a.local/").with_name("layout");
        let hash = def.hash();
        let line = describe(&FetchResult::new(def, hash.clone()));

        assert_eq!(line, format!("{} 502 http://a.local/ [layout]", &hash[..8]));
    }

    #[test]
    fn test_hash_rejects_invalid_header() {
        let err = hash("http://a.local/", &[("bad header".into(), "x".into())]).unwrap_err();
        assert!(matches!(err, TributaryError::Other(_)));
    }
}
