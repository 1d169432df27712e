use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::app::{Result, TributaryError};

static TEMPLATE_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"§\[\s*([^\]§]+?)\s*\]§").expect("valid template variable regex"));

/// Replace every `§[ path ]§` in `template` with the value at `path` in
/// `meta`. Paths are dot separated and walk into nested objects.
pub fn expand_template_vars(template: &str, meta: &HashMap<String, Value>) -> Result<String> {
    if !template.contains('§') {
        return Ok(template.to_string());
    }

    let mut missing = None;
    let expanded = TEMPLATE_VAR.replace_all(template, |caps: &Captures| {
        let path = &caps[1];
        match lookup(meta, path) {
            Some(value) => value,
            None => {
                missing.get_or_insert_with(|| path.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(path) => Err(TributaryError::Template(format!(
            "missing value for template variable {path:?} in {template:?}"
        ))),
        None => Ok(expanded.into_owned()),
    }
}

fn lookup(meta: &HashMap<String, Value>, path: &str) -> Option<String> {
    let mut keys = path.split('.');
    let mut value = meta.get(keys.next()?)?;
    for key in keys {
        value = value.get(key)?;
    }

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn meta() -> HashMap<String, Value> {
        HashMap::from([
            ("host".to_string(), json!("content.local")),
            ("page".to_string(), json!(3)),
            ("request".to_string(), json!({"base_url": "http://shop.local", "path": "/cart"})),
            ("tags".to_string(), json!(["a", "b"])),
        ])
    }

    #[test]
    fn test_expand_without_variables() {
        let url = "http://example.com/plain";
        assert_eq!(expand_template_vars(url, &meta()).unwrap(), url);
    }

    #[test]
    fn test_expand_simple_and_numeric() {
        let url = expand_template_vars("http://§[host]§/list?page=§[ page ]§", &meta()).unwrap();
        assert_eq!(url, "http://content.local/list?page=3");
    }

    #[test]
    fn test_expand_nested_path() {
        let url = expand_template_vars("§[ request.base_url ]§/api§[request.path]§", &meta()).unwrap();
        assert_eq!(url, "http://shop.local/api/cart");
    }

    #[test]
    fn test_expand_missing_key() {
        let err = expand_template_vars("http://§[ undefined ]§/", &meta()).unwrap_err();
        assert!(matches!(err, TributaryError::Template(_)));
        assert!(err.to_string().contains("undefined"));
    }

    #[test]
    fn test_expand_non_scalar_value() {
        let result = expand_template_vars("http://x/§[ tags ]§", &meta());
        assert!(matches!(result, Err(TributaryError::Template(_))));
    }
}
