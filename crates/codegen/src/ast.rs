//! Expression tree consumed by the code generator.

use drygen_common::U256;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    Number(U256),
    String(String),
    Identifier(String),
    Call(FunctionCall),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<Expression>,
}

impl Expression {
    pub fn number(value: impl Into<U256>) -> Self {
        Self::Number(value.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    pub fn call(name: impl Into<String>, arguments: Vec<Expression>) -> Self {
        Self::Call(FunctionCall {
            name: name.into(),
            arguments,
        })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Number(_) | Self::String(_))
    }
}
