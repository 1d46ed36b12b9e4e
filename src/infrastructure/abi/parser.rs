//! Calldata parser implementation using alloy-dyn-abi

use std::collections::HashMap;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Bytes, Selector};

use crate::domain::abi::{
    schema_of, selector_from_declaration, Calldata, CalldataParser, DecodeError, FieldValue,
    RegistryError, WantedField,
};

/// Parser for one function shape, bound to its declaration, argument names
/// and wanted output slots
#[derive(Debug, Clone)]
pub struct TxDataParser {
    declaration: String,
    selector: Selector,
    schema: DynSolType,
    arity: usize,
    names: Vec<String>,
    wanted: Vec<WantedField>,
    meta_transaction: bool,
}

impl TxDataParser {
    /// Create a parser for `declaration`.
    ///
    /// `names` must line up with the declaration's argument types; a mismatch
    /// is not rejected here and surfaces through `ParserRegistry::check`.
    pub fn new<N>(
        declaration: impl Into<String>,
        names: N,
        wanted: Vec<WantedField>,
    ) -> Result<Self, RegistryError>
    where
        N: IntoIterator,
        N::Item: Into<String>,
    {
        let declaration = declaration.into();
        let schema_text = schema_of(&declaration);
        let schema = DynSolType::parse(schema_text).map_err(|err| RegistryError::InvalidSchema {
            declaration: declaration.clone(),
            reason: err.to_string(),
        })?;
        let arity = match &schema {
            DynSolType::Tuple(types) => types.len(),
            _ => {
                return Err(RegistryError::InvalidSchema {
                    declaration,
                    reason: "argument list is not a tuple".to_string(),
                })
            }
        };

        Ok(Self {
            selector: selector_from_declaration(&declaration),
            declaration,
            schema,
            arity,
            names: names.into_iter().map(Into::into).collect(),
            wanted,
            meta_transaction: false,
        })
    }

    /// Create a parser from plain wanted names and the two policy flags.
    ///
    /// With `use_sender_address` the first wanted name is only a placeholder
    /// and its slot is filled from the transaction sender instead.
    pub fn from_flags<N, W>(
        declaration: impl Into<String>,
        names: N,
        want_fields: W,
        is_meta_transaction: bool,
        use_sender_address: bool,
    ) -> Result<Self, RegistryError>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        W: IntoIterator,
        W::Item: Into<String>,
    {
        let mut wanted: Vec<WantedField> = want_fields
            .into_iter()
            .map(|name| WantedField::Calldata(name.into()))
            .collect();
        if use_sender_address {
            if let Some(first) = wanted.first_mut() {
                *first = WantedField::Sender;
            }
        }

        let parser = Self::new(declaration, names, wanted)?;
        Ok(if is_meta_transaction {
            parser.meta_transaction()
        } else {
            parser
        })
    }

    /// Mark the call as a wrapper around another call
    pub fn meta_transaction(mut self) -> Self {
        self.meta_transaction = true;
        self
    }

    /// Argument tuple type, e.g. `(string,address,uint256,bytes32,bytes)`
    pub fn schema(&self) -> &str {
        schema_of(&self.declaration)
    }
}

impl CalldataParser for TxDataParser {
    fn declaration(&self) -> &str {
        &self.declaration
    }

    fn selector(&self) -> Selector {
        self.selector
    }

    fn argument_names(&self) -> &[String] {
        &self.names
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn wanted(&self) -> &[WantedField] {
        &self.wanted
    }

    fn is_meta_transaction(&self) -> bool {
        self.meta_transaction
    }

    fn decode(&self, calldata: Calldata<'_>) -> Result<Vec<FieldValue>, DecodeError> {
        let data = calldata.to_bytes()?;
        let args_data = data
            .get(4..)
            .ok_or(DecodeError::TooShort { len: data.len() })?;

        let decoded = self
            .schema
            .abi_decode_params(args_data)
            .map_err(|err| DecodeError::Abi {
                schema: self.schema().to_string(),
                reason: err.to_string(),
            })?;

        let values = match decoded {
            DynSolValue::Tuple(values) => values,
            other => vec![other],
        };

        // Later duplicates of a name shadow earlier ones
        let by_name: HashMap<&str, DynSolValue> = self
            .names
            .iter()
            .map(String::as_str)
            .zip(values)
            .collect();

        Ok(self
            .wanted
            .iter()
            .map(|field| match field {
                WantedField::Sender => FieldValue::Sender,
                WantedField::Calldata(name) => by_name
                    .get(name.as_str())
                    .map(to_field_value)
                    .unwrap_or(FieldValue::Missing),
            })
            .collect())
    }
}

fn to_field_value(value: &DynSolValue) -> FieldValue {
    match value {
        DynSolValue::Address(addr) => FieldValue::Address(*addr),
        DynSolValue::Uint(u, _) => FieldValue::Uint(*u),
        DynSolValue::Bytes(bytes) => FieldValue::Bytes(Bytes::from(bytes.clone())),
        other => FieldValue::Other(format_dyn_sol_value(other)),
    }
}

/// Format a DynSolValue for diagnostics
fn format_dyn_sol_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => {
            format!("0x{}", hex::encode(&word[..(*size).min(32)]))
        }
        DynSolValue::Address(addr) => addr.to_string(),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => format!("\"{s}\""),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            let items: Vec<String> = items.iter().map(format_dyn_sol_value).collect();
            format!("[{}]", items.join(", "))
        }
        DynSolValue::Tuple(fields) => {
            let items: Vec<String> = fields.iter().map(format_dyn_sol_value).collect();
            format!("({})", items.join(", "))
        }
        other => format!("{other:?}"),
    }
}
