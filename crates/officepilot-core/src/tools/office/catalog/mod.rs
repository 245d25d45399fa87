//! Static description of every Office endpoint exposed as a tool

mod excel;
mod powerpoint;
mod word;

pub use excel::excel_specs;
pub use powerpoint::powerpoint_specs;
pub use word::word_specs;

use serde_json::{json, Map, Value};

use super::normalize::Normalizer;
use super::{HttpMethod, OfficeApp};

/// One catalog entry
#[derive(Clone)]
pub struct OfficeToolSpec {
    pub app: OfficeApp,
    /// Tool name as seen by the LLM (`<app>_<name>`)
    pub name: String,
    /// Endpoint the call is forwarded to
    pub method: &'static str,
    pub http: HttpMethod,
    pub description: &'static str,
    pub parameters: Value,
    pub normalize: Option<Normalizer>,
}

impl OfficeToolSpec {
    fn new(app: OfficeApp, method: &'static str, http: HttpMethod, description: &'static str) -> Self {
        Self {
            app,
            name: format!("{}_{}", app.id(), method),
            method,
            http,
            description,
            parameters: json!({ "type": "object", "properties": {} }),
            normalize: None,
        }
    }

    pub(crate) fn post(app: OfficeApp, method: &'static str, description: &'static str) -> Self {
        Self::new(app, method, HttpMethod::Post, description)
    }

    pub(crate) fn get(app: OfficeApp, method: &'static str, description: &'static str) -> Self {
        Self::new(app, method, HttpMethod::Get, description)
    }

    /// Expose the tool under a different name than the endpoint it calls
    pub(crate) fn named(mut self, tool_suffix: &str) -> Self {
        self.name = format!("{}_{}", self.app.id(), tool_suffix);
        self
    }

    pub(crate) fn params(mut self, properties: Value, required: &[&str]) -> Self {
        self.parameters = json!({
            "type": "object",
            "properties": properties,
            "required": required,
        });
        self
    }

    pub(crate) fn normalize_with(mut self, normalizer: Normalizer) -> Self {
        self.normalize = Some(normalizer);
        self
    }
}

/// Catalog for one application
pub fn specs_for(app: OfficeApp) -> Vec<OfficeToolSpec> {
    match app {
        OfficeApp::Word => word_specs(),
        OfficeApp::Excel => excel_specs(),
        OfficeApp::PowerPoint => powerpoint_specs(),
    }
}

// Schema fragments shared by the three catalogs

pub(crate) fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

pub(crate) fn integer(description: &str) -> Value {
    json!({ "type": "integer", "description": description })
}

pub(crate) fn number(description: &str) -> Value {
    json!({ "type": "number", "description": description })
}

pub(crate) fn boolean(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

pub(crate) fn one_of(values: &[&str], description: &str) -> Value {
    json!({ "type": "string", "enum": values, "description": description })
}

pub(crate) fn color(description: &str) -> Value {
    json!({
        "type": "string",
        "description": format!("{} (hex such as #FF0000, or a basic color name)", description)
    })
}

/// Build a `properties` object from `(name, schema)` pairs
pub(crate) fn props(entries: Vec<(&str, Value)>) -> Value {
    let map: Map<String, Value> = entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    Value::Object(map)
}

/// Parameters shared by every app's launch/open/save/close endpoints
pub(crate) fn lifecycle_specs(app: OfficeApp) -> Vec<OfficeToolSpec> {
    vec![
        OfficeToolSpec::post(app, "launch", "Start the application (or attach to a running instance).")
            .params(props(vec![("visible", boolean("Show the application window (default true)"))]), &[]),
        OfficeToolSpec::post(app, "create", "Create a new, empty file and make it active."),
        OfficeToolSpec::post(app, "open", "Open an existing file and make it active.")
            .params(props(vec![("path", string("Absolute path of the file to open"))]), &["path"]),
        OfficeToolSpec::post(app, "save", "Save the active file. Pass path to save under a new name.")
            .params(props(vec![("path", string("Absolute path to save to (omit to save in place)"))]), &[]),
        OfficeToolSpec::post(app, "close", "Close the active file.")
            .params(props(vec![("save", boolean("Save before closing (default false)"))]), &[]),
    ]
}
