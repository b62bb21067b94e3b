//! Renders an endpoint description into copy-pasteable client code.
//!
//! Output is a pure function of the base URL, path, method, request body and
//! target language: no timestamps, no randomness, and request bodies keep the
//! key order they were authored with.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{DocError, DocResult};
use crate::model::{Document, Endpoint, HttpMethod};

pub const DEFAULT_BASE_URL: &str = "https://api.example.com";

/// Client languages examples can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Curl,
    JavaScript,
    Python,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Curl, Language::JavaScript, Language::Python];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Curl => "curl",
            Language::JavaScript => "javascript",
            Language::Python => "python",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::Curl => "cURL",
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
        }
    }

    /// Grammar name a syntax highlighter should use for the example
    pub fn highlight_syntax(&self) -> &'static str {
        match self {
            Language::Curl => "bash",
            Language::JavaScript => "javascript",
            Language::Python => "python",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "curl" => Ok(Language::Curl),
            "javascript" => Ok(Language::JavaScript),
            "python" => Ok(Language::Python),
            _ => Err(DocError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// The parts of an endpoint an example depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallDescriptor<'a> {
    pub path: &'a str,
    pub method: HttpMethod,
    pub request_body: Option<&'a Document>,
}

impl<'a> From<&'a Endpoint> for CallDescriptor<'a> {
    fn from(endpoint: &'a Endpoint) -> Self {
        Self {
            path: &endpoint.path,
            method: endpoint.method,
            request_body: endpoint.request_body(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleSynthesizer {
    base_url: String,
}

impl Default for ExampleSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ExampleSynthesizer {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Permissive entry point: an unknown language yields an empty string
    pub fn synthesize<'a>(&self, call: impl Into<CallDescriptor<'a>>, language: &str) -> String {
        match language.parse::<Language>() {
            Ok(language) => self.synthesize_for(call, language),
            Err(_) => {
                debug!("No example template for language '{}'", language);
                String::new()
            }
        }
    }

    /// Strict entry point: an unknown language is an error
    pub fn try_synthesize<'a>(
        &self,
        call: impl Into<CallDescriptor<'a>>,
        language: &str,
    ) -> DocResult<String> {
        let language = language.parse::<Language>()?;
        Ok(self.synthesize_for(call, language))
    }

    pub fn synthesize_for<'a>(&self, call: impl Into<CallDescriptor<'a>>, language: Language) -> String {
        let call = call.into();
        match language {
            Language::Curl => self.curl(&call),
            Language::JavaScript => self.javascript(&call),
            Language::Python => self.python(&call),
        }
    }

    fn url(&self, call: &CallDescriptor<'_>) -> String {
        // JSON string quoting is also valid in shell double quotes, JS and Python
        Document::String(format!("{}{}", self.base_url, call.path)).to_pretty_string()
    }

    fn curl(&self, call: &CallDescriptor<'_>) -> String {
        let mut out = format!("curl -X {} {}", call.method, self.url(call));
        if let Some(body) = call.request_body {
            let payload = body.to_pretty_string().replace('\'', "'\\''");
            out.push_str(" -H \"Content-Type: application/json\"");
            out.push_str(&format!(" -d '{}'", payload));
        }
        out
    }

    fn javascript(&self, call: &CallDescriptor<'_>) -> String {
        let mut out = format!("fetch({}, {{\n  method: \"{}\",\n", self.url(call), call.method);
        if let Some(body) = call.request_body {
            out.push_str("  headers: {\n    \"Content-Type\": \"application/json\",\n  },\n");
            out.push_str(&format!(
                "  body: JSON.stringify({}),\n",
                indent_continuation(&body.to_pretty_string(), "  ")
            ));
        }
        out.push_str("})\n");
        out.push_str("  .then(response => response.json())\n");
        out.push_str("  .then(data => console.log(data))\n");
        out.push_str("  .catch(error => console.error('Error:', error));");
        out
    }

    fn python(&self, call: &CallDescriptor<'_>) -> String {
        let mut out = String::from("import requests\n\n");
        out.push_str(&format!("response = requests.{}(\n    {}", call.method.verb(), self.url(call)));
        if let Some(body) = call.request_body {
            out.push_str(&format!(
                ",\n    json={}",
                indent_continuation(&body.to_pretty_string(), "    ")
            ));
        }
        out.push_str("\n)\n\nprint(response.json())");
        out
    }
}

fn indent_continuation(text: &str, indent: &str) -> String {
    text.replace('\n', &format!("\n{}", indent))
}
