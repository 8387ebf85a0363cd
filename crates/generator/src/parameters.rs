//! Path and query parameter extraction

use crate::binding::HttpBinding;
use crate::openapi::{Parameter, ParameterLocation};
use crate::schema::SchemaBuilder;
use protoc_gen_openapiv3_common::{FieldSpec, MessageType};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// `{name}` or `{name=pattern}` in a URL template
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([^{}=]+)(?:=[^{}]*)?\}").expect("placeholder pattern is valid")
});

/// Placeholder names of a URL template
///
/// ```
/// use protoc_gen_openapiv3_generator::parameters::placeholder_names;
///
/// let names = placeholder_names("/v1/{parent=shelves/*}/books/{bookId}");
/// assert!(names.contains("parent"));
/// assert!(names.contains("bookId"));
/// ```
pub fn placeholder_names(template: &str) -> BTreeSet<String> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().trim().to_string())
        .collect()
}

/// Query keys of an additional binding template
///
/// Only the part after `?` is read when present; it is a flat
/// `key={value}&key2={value2}` list.
pub fn query_keys(template: &str) -> BTreeSet<String> {
    let query = template
        .split_once('?')
        .map(|(_, query)| query)
        .unwrap_or(template);

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, _)| key.trim())
        .filter(|key| !key.is_empty() && !key.contains('/'))
        .map(str::to_string)
        .collect()
}

/// Path and query parameters of a bound method, sorted by name
///
/// Fields named by a template placeholder become required path parameters.
/// Fields named by a query key of an additional binding become optional
/// query parameters, unless already bound to the path.
pub fn extract_parameters(
    builder: &SchemaBuilder<'_>,
    input: &MessageType,
    binding: &HttpBinding,
) -> Vec<Parameter> {
    let placeholders = placeholder_names(&binding.template);
    let query: BTreeSet<String> = binding
        .additional_templates
        .iter()
        .flat_map(|template| query_keys(template))
        .collect();

    let mut parameters = Vec::new();

    for field in &input.fields {
        let (name, location) = if let Some(name) = bound_name(&placeholders, field) {
            (name, ParameterLocation::Path)
        } else if let Some(name) = bound_name(&query, field) {
            (name, ParameterLocation::Query)
        } else {
            continue;
        };

        let (schema, example) = builder.parameter(field);
        parameters.push(Parameter {
            name: name.to_string(),
            location,
            required: location == ParameterLocation::Path,
            schema,
            example: Some(example),
        });
    }

    parameters.sort_by(|a, b| a.name.cmp(&b.name));
    parameters
}

/// Template name a field is bound under
///
/// The parameter carries the name written in the template so that every
/// `{placeholder}` has a declared parameter. The JSON name is preferred when
/// the template names the field both ways.
fn bound_name<'a>(names: &'a BTreeSet<String>, field: &FieldSpec) -> Option<&'a str> {
    names
        .get(&field.json_name)
        .or_else(|| names.get(&field.name))
        .map(String::as_str)
}
