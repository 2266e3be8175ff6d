//! Integration tests for OpenAPI ingestion

use specforge_common::{GeneratorError, HttpMethod, ParameterLocation, TypeDescriptor};
use specforge_parser::{create_parser, ingest, DocumentFormat, SpecFormat, SpecParser};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_parse_petstore_yaml() {
    let parser = create_parser(fixture("petstore.yaml"), SpecFormat::OpenApi, None).unwrap();
    let model = parser.parse().unwrap();

    assert_eq!(model.info.title, "Swagger Petstore");
    assert_eq!(model.info.version, "1.0.0");
    assert_eq!(model.info.license.get("name").unwrap(), "MIT");
    assert_eq!(model.servers.len(), 1);
    assert_eq!(model.servers[0].url, "https://petstore.example.com/v1");
    assert_eq!(model.tags[0].name, "pets");
    assert!(model.security_schemes.contains_key("api_key"));

    let keys: Vec<&String> = model.endpoints.keys().collect();
    assert_eq!(
        keys,
        vec![
            "GET /pets",
            "POST /pets",
            "GET /pets/{petId}",
            "DELETE /pets/{petId}"
        ]
    );

    let list = model.endpoint(HttpMethod::Get, "/pets").unwrap();
    assert_eq!(list.operation_id, "listPets");
    assert_eq!(
        list.response_type(),
        TypeDescriptor::array_of(TypeDescriptor::named("Pet"))
    );
}

#[test]
fn test_path_level_parameters_are_merged() {
    let parser = create_parser(fixture("petstore.yaml"), SpecFormat::OpenApi, None).unwrap();
    let model = parser.parse().unwrap();

    let list = model.endpoint(HttpMethod::Get, "/pets").unwrap();
    let names: Vec<&str> = list.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["X-Request-Id", "limit"]);

    let limit = list.parameters_in(ParameterLocation::Query)[0];
    assert_eq!(limit.required, Some(false));
    assert_eq!(limit.default, Some(serde_json::json!(20)));
    assert_eq!(limit.schema, TypeDescriptor::primitive("integer"));
}

#[test]
fn test_referenced_parameter_and_body() {
    let parser = create_parser(fixture("petstore.yaml"), SpecFormat::OpenApi, None).unwrap();
    let model = parser.parse().unwrap();

    let show = model.endpoint(HttpMethod::Get, "/pets/{petId}").unwrap();
    assert_eq!(show.parameters.len(), 1);
    assert_eq!(show.parameters[0].name, "petId");
    assert_eq!(show.parameters[0].location, ParameterLocation::Path);
    assert_eq!(show.parameters[0].required, Some(true));

    let create = model.endpoint(HttpMethod::Post, "/pets").unwrap();
    let body = create.request_body.as_ref().unwrap();
    assert!(body.required);
    assert_eq!(create.request_body_type(), TypeDescriptor::named("NewPet"));
    assert_eq!(create.response_type(), TypeDescriptor::named("Pet"));
}

#[test]
fn test_component_schemas_are_inferred() {
    let parser = create_parser(fixture("petstore.yaml"), SpecFormat::OpenApi, None).unwrap();
    let model = parser.parse().unwrap();

    let TypeDescriptor::ObjectOf(fields) = &model.schemas["Pet"] else {
        panic!("Pet should be an object, got {:?}", model.schemas["Pet"]);
    };
    assert_eq!(fields["id"], TypeDescriptor::primitive("integer"));
    assert!(matches!(fields["status"], TypeDescriptor::Enum(ref v) if v.len() == 3));
    assert_eq!(
        fields["tags"],
        TypeDescriptor::array_of(TypeDescriptor::primitive("string"))
    );
}

#[test]
fn test_yaml_and_json_produce_identical_models() {
    let from_yaml = create_parser(fixture("petstore.yaml"), SpecFormat::OpenApi, None)
        .unwrap()
        .parse()
        .unwrap();
    let from_json = create_parser(fixture("petstore.json"), SpecFormat::OpenApi, None)
        .unwrap()
        .parse()
        .unwrap();

    assert_eq!(from_yaml, from_json);
}

#[test]
fn test_parsing_is_idempotent() {
    let parser = create_parser(fixture("petstore.yaml"), SpecFormat::OpenApi, None).unwrap();
    assert_eq!(parser.parse().unwrap(), parser.parse().unwrap());
}

#[test]
fn test_api_version_filter() {
    let parser = create_parser(fixture("petstore.yaml"), SpecFormat::OpenApi, Some("2")).unwrap();
    let model = parser.parse().unwrap();

    assert!(model.endpoints.contains_key("GET /pets"));
    assert!(model.endpoints.contains_key("GET /pets/{petId}"));
    assert!(!model.endpoints.contains_key("DELETE /pets/{petId}"));

    // The raw document is filtered too
    assert!(parser.document()["paths"]["/pets/{petId}"]
        .get("delete")
        .is_none());
}

#[test]
fn test_missing_file_is_not_found() {
    let err = create_parser(fixture("absent.yaml"), SpecFormat::OpenApi, None)
        .err()
        .unwrap();
    assert!(matches!(err, GeneratorError::NotFound(_)));
}

#[test]
fn test_unsupported_extension() {
    let err = create_parser(fixture("petstore.toml"), SpecFormat::OpenApi, None)
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "Unsupported file format: toml");
}

#[test]
fn test_malformed_text_is_decode_error() {
    let err = ingest("{not json", DocumentFormat::Json, SpecFormat::OpenApi, None).unwrap_err();
    assert!(matches!(err, GeneratorError::Decode(_)));
    assert!(err
        .to_string()
        .starts_with("Error parsing specification file"));
}

#[test]
fn test_empty_document_yields_empty_model() {
    let model = ingest("{}", DocumentFormat::Json, SpecFormat::OpenApi, None).unwrap();
    assert!(model.endpoints.is_empty());
    assert!(model.schemas.is_empty());
    assert_eq!(model.info.title, "");
}
