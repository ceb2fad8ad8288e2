//! Accumulates command text and positional parameters for one generated command.

use serde::Serialize;

use crate::query_model::{ConstantRef, Value};

use super::projection::ProjectionExpr;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandParameter {
    pub name: String,
    pub value: Value,
}

/// The generated command: SQL text, its parameters in order, and the projection that
/// turns a result row back into a value of the query's item type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlCommandData {
    pub command_text: String,
    pub parameters: Vec<CommandParameter>,
    pub projection: ProjectionExpr,
}

impl SqlCommandData {
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|parameter| parameter.name == name)
            .map(|parameter| &parameter.value)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone)]
pub struct SqlCommandBuilder {
    text: String,
    parameter_prefix: String,
    /// Parameters in creation order, with the constant each one was created for.
    parameters: Vec<(ConstantRef, CommandParameter)>,
}

impl Default for SqlCommandBuilder {
    fn default() -> Self {
        SqlCommandBuilder::new("@")
    }
}

impl SqlCommandBuilder {
    pub fn new(parameter_prefix: &str) -> Self {
        SqlCommandBuilder {
            text: String::new(),
            parameter_prefix: parameter_prefix.to_string(),
            parameters: Vec::new(),
        }
    }

    pub fn append(&mut self, text: &str) -> &mut Self {
        self.text.push_str(text);
        self
    }

    /// Appends `[name]`; `dbo.ChefTable` becomes `[dbo].[ChefTable]`.
    pub fn append_identifier(&mut self, name: &str) -> &mut Self {
        for (i, part) in name.split('.').enumerate() {
            if i > 0 {
                self.text.push('.');
            }
            self.text.push('[');
            self.text.push_str(part);
            self.text.push(']');
        }
        self
    }

    pub fn append_separated<T>(
        &mut self,
        separator: &str,
        items: impl IntoIterator<Item = T>,
        mut append_item: impl FnMut(&mut Self, T),
    ) -> &mut Self {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.text.push_str(separator);
            }
            append_item(self, item);
        }
        self
    }

    /// The parameter standing for `constant`, created on first request.
    ///
    /// The same constant always yields the same parameter; equal values held by
    /// distinct constants yield distinct parameters.
    pub fn get_or_add_parameter(&mut self, constant: &ConstantRef) -> String {
        if let Some((_, parameter)) = self.parameters.iter().find(|(owner, _)| owner == constant) {
            return parameter.name.clone();
        }
        self.add_parameter(constant.clone(), constant.value().clone())
    }

    /// A parameter for one item of a list constant; never shared.
    pub fn add_list_item_parameter(&mut self, constant: &ConstantRef, value: Value) -> String {
        self.add_parameter(constant.clone(), value)
    }

    fn add_parameter(&mut self, owner: ConstantRef, value: Value) -> String {
        let name = format!("{}{}", self.parameter_prefix, self.parameters.len() + 1);
        log::trace!("Parameter {} = {}", name, value);
        self.parameters.push((
            owner,
            CommandParameter {
                name: name.clone(),
                value,
            },
        ));
        name
    }

    pub fn command_text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> Vec<CommandParameter> {
        self.parameters
            .iter()
            .map(|(_, parameter)| parameter.clone())
            .collect()
    }

    pub fn into_command(self, projection: ProjectionExpr) -> SqlCommandData {
        SqlCommandData {
            command_text: self.text,
            parameters: self
                .parameters
                .into_iter()
                .map(|(_, parameter)| parameter)
                .collect(),
            projection,
        }
    }
}
