//! Path template helpers.
//!
//! Path templates use `{param}` placeholders. The generator never fills them
//! in itself: generated methods pass the template through untouched and the
//! emitted `replacePathParams` function substitutes at call time.
//! [`substitute_path_params`] implements the same contract in Rust.

use serde_json::{Map, Value};
use tracing::warn;

/// Extracts placeholder names from a path template, in order.
///
/// ## Examples
///
/// ```
/// use nestsdk_gen::parser::extract_path_params;
///
/// assert_eq!(extract_path_params("/applications"), Vec::<&str>::new());
/// assert_eq!(
///     extract_path_params("/page-node/{typeId}/{id}"),
///     vec!["typeId", "id"]
/// );
/// ```
pub fn extract_path_params(path: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut rest = path;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if close > 0 => {
                params.push(&after[..close]);
                rest = &after[close + 1..];
            }
            Some(_) => rest = after,
            None => break,
        }
    }

    params
}

/// Substitutes `{name}` placeholders with values from `values`.
///
/// Strings and numbers are substituted. A placeholder whose key is absent is
/// left as is; one whose value has another type is left as is and logged.
///
/// ## Examples
///
/// ```
/// use serde_json::json;
/// use nestsdk_gen::parser::substitute_path_params;
///
/// let values = json!({ "id": 1, "typeId": 2 });
/// let path = substitute_path_params("/page-node/{typeId}/{id}", values.as_object().unwrap());
/// assert_eq!(path, "/page-node/2/1");
/// ```
pub fn substitute_path_params(path: &str, values: &Map<String, Value>) -> String {
    let mut result = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if close > 0 => {
                let name = &after[..close];
                let placeholder = &rest[open..open + close + 2];
                match values.get(name) {
                    Some(Value::String(s)) => result.push_str(s),
                    Some(Value::Number(n)) => result.push_str(&n.to_string()),
                    Some(other) => {
                        warn!(param = %name, value = %other, "path parameter is not a string or number");
                        result.push_str(placeholder);
                    }
                    None => result.push_str(placeholder),
                }
                rest = &after[close + 1..];
            }
            _ => {
                result.push('{');
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    fn substitute(path: &str, values: Value) -> String {
        substitute_path_params(path, values.as_object().unwrap())
    }

    #[test]
    fn extract_no_params() {
        assert_eq!(extract_path_params("/"), Vec::<&str>::new());
        assert_eq!(extract_path_params("/v1/models"), Vec::<&str>::new());
    }

    #[test]
    fn extract_consecutive_params() {
        assert_eq!(extract_path_params("/{a}/{b}"), vec!["a", "b"]);
        assert_eq!(extract_path_params("/{a}{b}"), vec!["a", "b"]);
    }

    #[test]
    fn extract_ignores_empty_and_unclosed() {
        assert_eq!(extract_path_params("/{}/x"), Vec::<&str>::new());
        assert_eq!(extract_path_params("/{open"), Vec::<&str>::new());
        assert_eq!(extract_path_params("/{}/{id}"), vec!["id"]);
    }

    #[test]
    fn substitute_strings_and_numbers() {
        assert_eq!(
            substitute("/users/{name}/posts/{n}", json!({ "name": "ada", "n": 7 })),
            "/users/ada/posts/7"
        );
    }

    #[test]
    fn substitute_repeated_placeholder() {
        assert_eq!(substitute("/{id}/{id}", json!({ "id": "x" })), "/x/x");
    }

    #[test]
    fn substitute_missing_param_unchanged() {
        assert_eq!(
            substitute("/page-node/{typeId}/{id}", json!({ "id": 1 })),
            "/page-node/{typeId}/1"
        );
    }

    #[test]
    fn substitute_no_params() {
        assert_eq!(substitute("/models", json!({ "id": 1 })), "/models");
    }

    #[test]
    fn substitute_keeps_empty_and_unclosed_braces() {
        assert_eq!(substitute("/{}/{id", json!({ "id": 1 })), "/{}/{id");
    }

    #[test]
    #[traced_test]
    fn substitute_other_types_left_and_logged() {
        assert_eq!(
            substitute("/flags/{on}/{meta}", json!({ "on": true, "meta": { "a": 1 } })),
            "/flags/{on}/{meta}"
        );
        assert!(logs_contain("path parameter is not a string or number"));
    }
}
