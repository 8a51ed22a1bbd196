//! Template helper functions.
//!
//! Helpers are plain callable values registered as environment globals, so a
//! render context can shadow any of them (which is how layouts get their
//! `yield`).

use minijinja::value::{Rest, Value, ValueKind};
use minijinja::{Error, ErrorKind};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::assets::{AssetKind, AssetPipeline};

/// Named helper values.
pub type Helpers = BTreeMap<String, Value>;

/// Generic helpers available in every template.
pub fn builtin() -> Helpers {
    let mut helpers = Helpers::new();
    helpers.insert("join".into(), Value::from_function(join));
    helpers.insert("noescape".into(), Value::from_function(noescape));
    helpers.insert("slug".into(), Value::from_function(slugify));
    helpers.insert("title".into(), Value::from_function(title));
    helpers.insert("when".into(), Value::from_function(when));
    helpers.insert("yield".into(), Value::from_function(empty_yield));
    helpers
}

/// `paste`, `tpl`, `md`, `css` and `js`, backed by the asset pipeline.
pub fn asset_helpers(pipeline: Arc<AssetPipeline>) -> Helpers {
    AssetKind::ALL
        .into_iter()
        .map(|kind| {
            let pipeline = Arc::clone(&pipeline);
            let helper = Value::from_function(move |args: Rest<Value>| -> Result<Value, Error> {
                let references = flatten(&args)?;
                pipeline
                    .render(kind, &references)
                    .map(Value::from_safe_string)
                    .map_err(|e| {
                        Error::new(ErrorKind::InvalidOperation, format!("{} helper failed", kind.name()))
                            .with_source(e)
                    })
            });
            (kind.name().to_string(), helper)
        })
        .collect()
}

/// Flatten strings and nested sequences into a reference list.
///
/// Other values are stringified.
pub fn flatten(values: &[Value]) -> Result<Vec<String>, Error> {
    let mut out = Vec::new();
    for value in values {
        match value.kind() {
            ValueKind::Seq | ValueKind::Iterable => {
                let items = value.try_iter()?.collect::<Vec<_>>();
                out.extend(flatten(&items)?);
            }
            _ => match value.as_str() {
                Some(s) => out.push(s.to_string()),
                None => out.push(value.to_string()),
            },
        }
    }
    Ok(out)
}

fn join(items: Vec<String>, sep: String) -> String {
    items.join(&sep)
}

fn noescape(s: String) -> Value {
    Value::from_safe_string(s)
}

fn slugify(s: String) -> String {
    slug::slugify(s)
}

fn when(condition: Value, then: Value, otherwise: Value) -> Value {
    if condition.is_true() {
        then
    } else {
        otherwise
    }
}

fn empty_yield() -> Value {
    Value::from_safe_string(String::new())
}

/// Uppercase the first letter of every word.
pub fn title(s: String) -> String {
    let mut out = String::with_capacity(s.len());
    let mut boundary = true;
    for c in s.chars() {
        if boundary && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        boundary = !(c.is_alphanumeric() || c == '_' || c == '\'');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::{context, Environment};

    fn env() -> Environment<'static> {
        let mut env = Environment::new();
        for (name, value) in builtin() {
            env.add_global(name, value);
        }
        env
    }

    fn render(source: &str) -> String {
        env().render_str(source, context! { items => vec!["a", "b"], on => true }).unwrap()
    }

    #[test]
    fn test_generic_helpers() {
        assert_eq!(render("{{ join(items, ', ') }}"), "a, b");
        assert_eq!(render("{{ slug('Hello World!') }}"), "hello-world");
        assert_eq!(render("{{ title('hello big world') }}"), "Hello Big World");
        assert_eq!(render("{{ when(on, 'yes', 'no') }}"), "yes");
        assert_eq!(render("{{ when(false, 'yes', 'no') }}"), "no");
        assert_eq!(render("[{{ yield() }}]"), "[]");
    }

    #[test]
    fn test_noescape() {
        let mut env = env();
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::Html);
        let out = env
            .render_str("{{ raw }}|{{ noescape(raw) }}", context! { raw => "<b>" })
            .unwrap();
        assert_eq!(out, "&lt;b&gt;|<b>");
    }

    #[test]
    fn test_flatten_nested() {
        let values = vec![
            Value::from("a.js"),
            Value::from(vec![Value::from("b.js"), Value::from(vec!["c.js"])]),
            Value::from(7),
        ];
        assert_eq!(flatten(&values).unwrap(), vec!["a.js", "b.js", "c.js", "7"]);
    }

    #[test]
    fn test_title_word_boundaries() {
        assert_eq!(title("don't stop-me".into()), "Don't Stop-Me");
    }
}
