//! Office automation tools
//!
//! One tool per automation-server endpoint, named `<app>_<method>`. The
//! tools are table-driven: each catalog entry carries its schema and an
//! optional argument normalizer, and `OfficeTool` does the shared
//! validate, normalize, call and map steps.

mod catalog;
mod client;
mod group;
mod normalize;
mod tool;
mod work_request;

pub use catalog::{excel_specs, powerpoint_specs, specs_for, word_specs, OfficeToolSpec};
pub use client::{AutomationClient, AutomationResponse, HttpAutomationClient};
pub use group::{office_tool_group, OfficeGroupLifecycle};
pub use normalize::{build_average, build_countif, build_sumif, normalize_color, normalize_colors, Normalizer};
pub use tool::{map_response, OfficeTool};
pub use work_request::{OfficeWorkRequest, WorkRequestSettings};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An Office application reachable through the automation server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfficeApp {
    Word,
    Excel,
    PowerPoint,
}

impl OfficeApp {
    pub const ALL: [OfficeApp; 3] = [OfficeApp::Word, OfficeApp::Excel, OfficeApp::PowerPoint];

    /// Lowercase id used in tool names, group ids and URL paths
    pub fn id(self) -> &'static str {
        match self {
            OfficeApp::Word => "word",
            OfficeApp::Excel => "excel",
            OfficeApp::PowerPoint => "powerpoint",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            OfficeApp::Word => "Microsoft Word",
            OfficeApp::Excel => "Microsoft Excel",
            OfficeApp::PowerPoint => "Microsoft PowerPoint",
        }
    }
}

impl fmt::Display for OfficeApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for OfficeApp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "word" => Ok(OfficeApp::Word),
            "excel" => Ok(OfficeApp::Excel),
            "powerpoint" | "ppt" => Ok(OfficeApp::PowerPoint),
            other => Err(format!("Unknown Office application: {}", other)),
        }
    }
}

/// HTTP verb of an automation endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}
