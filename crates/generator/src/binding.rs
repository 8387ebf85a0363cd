//! HTTP binding resolution

use protoc_gen_openapiv3_common::HttpRule;
use std::fmt;

/// HTTP verb of a bound method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Put,
    Post,
    Delete,
    Patch,
}

impl HttpVerb {
    /// Lowercase name, as used for path item keys
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "get",
            HttpVerb::Put => "put",
            HttpVerb::Post => "post",
            HttpVerb::Delete => "delete",
            HttpVerb::Patch => "patch",
        }
    }

    /// Whether operations with this verb carry a request body
    pub fn has_body(&self) -> bool {
        matches!(self, HttpVerb::Post | HttpVerb::Put | HttpVerb::Patch)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved HTTP binding of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBinding {
    pub verb: HttpVerb,

    /// Primary URL template, e.g. `/v1/items/{itemId}`
    pub template: String,

    /// Templates of the additional bindings; only read for query keys
    pub additional_templates: Vec<String>,
}

/// First set, non-empty pattern in priority order post, get, put, delete, patch
fn primary_pattern(rule: &HttpRule) -> Option<(HttpVerb, &str)> {
    [
        (HttpVerb::Post, &rule.post),
        (HttpVerb::Get, &rule.get),
        (HttpVerb::Put, &rule.put),
        (HttpVerb::Delete, &rule.delete),
        (HttpVerb::Patch, &rule.patch),
    ]
    .into_iter()
    .find_map(|(verb, pattern)| {
        pattern
            .as_deref()
            .filter(|template| !template.is_empty())
            .map(|template| (verb, template))
    })
}

/// Resolve a method's HTTP rule
///
/// Returns `None` when there is no rule or the rule sets none of the
/// understood patterns. Additional bindings contribute their templates
/// regardless of verb.
pub fn resolve_binding(rule: Option<&HttpRule>) -> Option<HttpBinding> {
    let rule = rule?;
    let (verb, template) = primary_pattern(rule)?;

    let additional_templates = rule
        .additional_bindings
        .iter()
        .filter_map(|binding| primary_pattern(binding).map(|(_, template)| template.to_string()))
        .collect();

    Some(HttpBinding {
        verb,
        template: template.to_string(),
        additional_templates,
    })
}
