// crates/shared/src/schemas
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterSchema>,
}

#[derive(Debug, Clone)]
pub struct ParameterSchema {
    pub name: &'static str,
    pub type_name: &'static str,
    pub description: &'static str,
    pub required: bool,
    /// Enumerated values advertised to the model. Not enforced locally.
    pub allowed: &'static [&'static str],
}

#[derive(Serialize, Clone, Debug)]
pub struct Tool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Serialize, Clone, Debug)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ParameterSchema {
    pub const fn required(name: &'static str, type_name: &'static str, description: &'static str) -> Self {
        Self { name, type_name, description, required: true, allowed: &[] }
    }

    pub const fn optional(name: &'static str, type_name: &'static str, description: &'static str) -> Self {
        Self { name, type_name, description, required: false, allowed: &[] }
    }

    pub const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }
}

impl ToolSchema {
    pub fn to_tool(&self) -> Tool {
        let mut properties = json!({});
        let mut required = vec![];

        for param in &self.parameters {
            properties[param.name] = json!({
                "type": param.type_name,
                "description": param.description
            });
            if !param.allowed.is_empty() {
                properties[param.name]["enum"] = json!(param.allowed);
            }
            if param.required {
                required.push(param.name);
            }
        }

        Tool {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: self.name.to_string(),
                description: self.description.to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": properties,
                    "required": required
                }),
            },
        }
    }
}
