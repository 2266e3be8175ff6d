//! Template loading and management

use crate::naming;
use crate::types::{js_type, python_type};
use specforge_common::{GeneratorError, Result, TypeDescriptor};
use std::collections::HashMap;
use tera::{Tera, Value};

pub const ASYNC_CLIENT: &str = "client.py";
pub const JS_CLIENT: &str = "client.js";
pub const DOCS_MARKDOWN: &str = "docs.md";
pub const DOCS_HTML: &str = "docs.html";
pub const MOCK_SERVER: &str = "mock_server.py";

/// Load all built-in templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("snake_case", snake_case_filter);
    tera.register_filter("camel_case", camel_case_filter);
    tera.register_filter("pascal_case", pascal_case_filter);
    tera.register_filter("py_type", py_type_filter);
    tera.register_filter("js_type", js_type_filter);
    tera.register_filter("jsdoc_type", jsdoc_type_filter);
    tera.register_filter("display_type", display_type_filter);

    let builtin = [
        (ASYNC_CLIENT, include_str!("../templates/client.py.tera")),
        (JS_CLIENT, include_str!("../templates/client.js.tera")),
        (DOCS_MARKDOWN, include_str!("../templates/docs.md.tera")),
        (DOCS_HTML, include_str!("../templates/docs.html.tera")),
        (MOCK_SERVER, include_str!("../templates/mock_server.py.tera")),
    ];
    for (name, source) in builtin {
        tera.add_raw_template(name, source).map_err(|e| {
            GeneratorError::Generation(format!(
                "Failed to load {} template: {}",
                name,
                describe(&e)
            ))
        })?;
    }

    Ok(tera)
}

/// Replace a built-in template with user-supplied source
pub fn override_template(tera: &mut Tera, name: &str, source: &str) -> Result<()> {
    tera.add_raw_template(name, source).map_err(|e| {
        GeneratorError::Generation(format!(
            "Failed to load custom {} template: {}",
            name,
            describe(&e)
        ))
    })
}

/// Flatten a tera error and its sources into one line
///
/// Tera's top-level message is usually just "Failed to render 'x'"; the
/// actual cause sits further down the chain.
pub fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn string_arg<'a>(value: &'a Value, filter: &str) -> tera::Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("{} filter expects a string", filter)))
}

fn descriptor_arg(value: &Value, filter: &str) -> tera::Result<TypeDescriptor> {
    serde_json::from_value(value.clone()).map_err(|e| {
        tera::Error::msg(format!("{} filter expects a type descriptor: {}", filter, e))
    })
}

fn snake_case_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(naming::snake_case(string_arg(value, "snake_case")?)))
}

fn camel_case_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(naming::camel_case(string_arg(value, "camel_case")?)))
}

fn pascal_case_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(naming::pascal_case(string_arg(value, "pascal_case")?)))
}

/// Type descriptor to Python annotation
fn py_type_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let ty = descriptor_arg(value, "py_type")?;
    Ok(Value::String(python_type(&ty)))
}

/// Type descriptor to JSDoc type expression
fn js_type_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let ty = descriptor_arg(value, "js_type")?;
    Ok(Value::String(js_type(&ty)))
}

/// Same as `js_type`, wrapped in braces for `@param`/`@typedef`
fn jsdoc_type_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let ty = descriptor_arg(value, "jsdoc_type")?;
    Ok(Value::String(format!("{{{}}}", js_type(&ty))))
}

/// Type descriptor in its neutral notation (`array<Pet>`)
fn display_type_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let ty = descriptor_arg(value, "display_type")?;
    Ok(Value::String(ty.to_string()))
}
