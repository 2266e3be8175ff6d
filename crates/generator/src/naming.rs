//! Identifier conversion for generated code

use specforge_common::EndpointDescriptor;

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

const JS_RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "yield", "let", "static", "await",
];

/// `listPets` → `list_pets`, `X-Request-Id` → `x_request_id`
///
/// Any character that cannot appear in an identifier becomes `_`; runs of
/// separators collapse and never lead or trail.
pub fn snake_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev_lower_or_digit = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if ch.is_ascii_uppercase() && prev_lower_or_digit {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower_or_digit = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        } else {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower_or_digit = false;
        }
    }

    while out.ends_with('_') {
        out.pop();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// `list_pets` → `listPets`
pub fn camel_case(input: &str) -> String {
    let snake = snake_case(input);
    let mut words = snake.split('_').filter(|w| !w.is_empty());
    let mut out = words.next().unwrap_or_default().to_string();
    for word in words {
        out.push_str(&capitalize(word));
    }
    out
}

/// `new_pet` → `NewPet`
pub fn pascal_case(input: &str) -> String {
    snake_case(input)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// snake_case identifier that is not a Python keyword (`from` → `from_`)
pub fn python_ident(name: &str) -> String {
    let ident = snake_case(name);
    if ident.is_empty() {
        "value".to_string()
    } else if PYTHON_KEYWORDS.contains(&ident.as_str()) {
        ident + "_"
    } else {
        ident
    }
}

/// camelCase identifier that is not a JavaScript reserved word
pub fn js_ident(name: &str) -> String {
    let ident = camel_case(name);
    if ident.is_empty() {
        "value".to_string()
    } else if JS_RESERVED.contains(&ident.as_str()) {
        ident + "_"
    } else {
        ident
    }
}

/// Rewrite `{name}` path segments through `ident`, wrapping each in `open`..`close`
///
/// `/pets/{petId}` with `python_ident` and `{`..`}` gives `/pets/{pet_id}`.
pub fn path_template(
    path: &str,
    ident: impl Fn(&str) -> String,
    open: &str,
    close: &str,
) -> String {
    let mut out = String::with_capacity(path.len() + 8);
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start + 1..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(open);
        out.push_str(&ident(&rest[start + 1..start + 1 + len]));
        out.push_str(close);
        rest = &rest[start + len + 2..];
    }
    out.push_str(rest);
    out
}

/// Method name for an endpoint: its operation id, or `<method>_<path segments>`
pub fn method_name(endpoint: &EndpointDescriptor) -> String {
    if !endpoint.operation_id.is_empty() {
        let name = snake_case(&endpoint.operation_id);
        if !name.is_empty() {
            return name;
        }
    }
    snake_case(&format!(
        "{}_{}",
        endpoint.method.as_str().to_ascii_lowercase(),
        endpoint.path
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use specforge_common::HttpMethod;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("listPets"), "list_pets");
        assert_eq!(snake_case("showPetById"), "show_pet_by_id");
        assert_eq!(snake_case("X-Request-Id"), "x_request_id");
        assert_eq!(snake_case("already_snake"), "already_snake");
        assert_eq!(snake_case("HTTPServer"), "httpserver");
        assert_eq!(snake_case("/pets/{petId}"), "pets_pet_id");
        assert_eq!(snake_case("2fa"), "_2fa");
    }

    #[test]
    fn test_camel_and_pascal_case() {
        assert_eq!(camel_case("list_pets"), "listPets");
        assert_eq!(camel_case("showPetById"), "showPetById");
        assert_eq!(pascal_case("new_pet"), "NewPet");
        assert_eq!(pascal_case("Pet"), "Pet");
    }

    #[test]
    fn test_reserved_identifiers() {
        assert_eq!(python_ident("from"), "from_");
        assert_eq!(python_ident("petId"), "pet_id");
        assert_eq!(js_ident("default"), "default_");
        assert_eq!(js_ident("X-Request-Id"), "xRequestId");
    }

    #[test]
    fn test_path_template() {
        assert_eq!(
            path_template("/pets/{petId}/toys/{toy_id}", python_ident, "{", "}"),
            "/pets/{pet_id}/toys/{toy_id}"
        );
        assert_eq!(
            path_template("/pets/{petId}", js_ident, "${encodeURIComponent(", ")}"),
            "/pets/${encodeURIComponent(petId)}"
        );
        assert_eq!(path_template("/pets", python_ident, "{", "}"), "/pets");
    }

    #[test]
    fn test_method_name_fallback() {
        let mut endpoint = EndpointDescriptor {
            method: HttpMethod::Get,
            path: "/pets/{petId}".to_string(),
            summary: String::new(),
            description: String::new(),
            operation_id: String::new(),
            parameters: Vec::new(),
            request_body: None,
            responses: Default::default(),
            security: Vec::new(),
            tags: Vec::new(),
        };
        assert_eq!(method_name(&endpoint), "get_pets_pet_id");

        endpoint.operation_id = "showPetById".to_string();
        assert_eq!(method_name(&endpoint), "show_pet_by_id");
    }
}
