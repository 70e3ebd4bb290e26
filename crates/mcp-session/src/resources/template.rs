//! URI templates: `{name}` placeholders resolved against concrete URIs.
//!
//! Each placeholder captures one non-empty path segment (never a `/`), and a
//! match must consume the whole URI. Literal text is compared literally.

use regex::Regex;

use crate::types::{McpError, McpResult};

/// A compiled URI template.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    pattern: String,
    regex: Regex,
    param_names: Vec<String>,
}

/// Captured placeholder values, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateParams(Vec<(String, String)>);

impl TemplateParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl UriTemplate {
    pub fn compile(pattern: &str) -> McpResult<Self> {
        let invalid = |reason: &str| McpError::Template {
            template: pattern.to_string(),
            reason: reason.to_string(),
        };

        let mut source = String::from("^");
        let mut param_names: Vec<String> = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | None => return Err(invalid("unclosed placeholder")),
                            Some(c) => name.push(c),
                        }
                    }
                    if name.is_empty() {
                        return Err(invalid("empty placeholder name"));
                    }
                    if param_names.contains(&name) {
                        return Err(invalid("duplicate placeholder name"));
                    }
                    source.push_str(&regex::escape(&std::mem::take(&mut literal)));
                    source.push_str("([^/]+)");
                    param_names.push(name);
                }
                '}' => return Err(invalid("unmatched '}'")),
                c => literal.push(c),
            }
        }
        source.push_str(&regex::escape(&literal));
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            param_names,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Match a whole URI, returning the captured placeholder values.
    ///
    /// Captures are greedy, so `{name}.{ext}` splits "a.b.c" as ("a.b", "c").
    pub fn match_uri(&self, uri: &str) -> Option<TemplateParams> {
        let caps = self.regex.captures(uri)?;
        let values = self
            .param_names
            .iter()
            .zip(caps.iter().skip(1))
            .map(|(name, value)| Some((name.clone(), value?.as_str().to_string())))
            .collect::<Option<Vec<_>>>()?;
        Some(TemplateParams(values))
    }
}
