use serde::{Deserialize, Serialize};

use crate::lang::MarkupContent;
use crate::types::Type;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionParameter {
    pub name: String,
    #[serde(default)]
    pub description: MarkupContent,
    #[serde(rename = "type")]
    pub ty: Type,
}

/// Signature of a function callable from expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    #[serde(default)]
    pub description: MarkupContent,
    #[serde(default)]
    pub params: Vec<FunctionParameter>,
    #[serde(default)]
    pub variadic_param: Option<FunctionParameter>,
    pub return_type: Type,
}

impl FunctionSignature {
    /// `(name type, ...) type`
    pub fn detail(&self) -> String {
        let mut params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{} {}", p.name, p.ty.type_signature()))
            .collect();
        if let Some(variadic) = &self.variadic_param {
            params.push(format!("…{} {}", variadic.name, variadic.ty.type_signature()));
        }
        format!("({}) {}", params.join(", "), self.return_type.type_signature())
    }

    /// Type expected for the argument at `index`, taking the variadic
    /// parameter into account.
    pub fn param_type(&self, index: usize) -> Option<&Type> {
        self.params
            .get(index)
            .or(self.variadic_param.as_ref())
            .map(|p| &p.ty)
    }
}
