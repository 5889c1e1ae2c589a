//! Runtime ABI handling: resolve a function from a JSON ABI by name,
//! coerce string arguments to the declared Solidity types, and encode or
//! decode call data.

use alloy::dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier};
use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::Bytes;

use crate::account::parse_address;
use crate::error::{PolygonError, Result};

/// The standard ERC-20 `balanceOf(address) -> uint256` read method, as a
/// single-entry JSON ABI.
pub const ERC20_BALANCE_OF_ABI: &str = r#"[
    {
        "type": "function",
        "name": "balanceOf",
        "inputs": [{ "name": "owner", "type": "address" }],
        "outputs": [{ "name": "", "type": "uint256" }],
        "stateMutability": "view"
    }
]"#;

/// A function resolved against an ABI with its arguments already coerced.
#[derive(Debug, Clone)]
pub struct ContractFunction {
    function: Function,
    args: Vec<DynSolValue>,
}

impl ContractFunction {
    /// Parses `abi_json`, looks up `name` and coerces `args` positionally.
    ///
    /// Overloads are narrowed by argument count first; among the
    /// remaining candidates the first one whose parameter types accept
    /// every argument wins.
    pub fn resolve<S: AsRef<str>>(abi_json: &str, name: &str, args: &[S]) -> Result<Self> {
        let abi = parse_abi(abi_json)?;
        let candidates = abi
            .function(name)
            .ok_or_else(|| PolygonError::FunctionNotFound(name.to_string()))?;

        let same_arity: Vec<&Function> = candidates
            .iter()
            .filter(|f| f.inputs.len() == args.len())
            .collect();
        if same_arity.is_empty() {
            let expected: Vec<String> = candidates.iter().map(|f| f.inputs.len().to_string()).collect();
            return Err(PolygonError::InvalidArguments {
                function: name.to_string(),
                reason: format!(
                    "expected {} argument(s), got {}",
                    expected.join(" or "),
                    args.len()
                ),
            });
        }

        let mut last_error = None;
        for function in same_arity {
            match coerce_args(function, args) {
                Ok(values) => {
                    return Ok(Self {
                        function: function.clone(),
                        args: values,
                    })
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(PolygonError::InvalidArguments {
            function: name.to_string(),
            reason: last_error.unwrap_or_else(|| "no matching overload".to_string()),
        })
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Canonical signature, e.g. `balanceOf(address)`
    pub fn signature(&self) -> String {
        self.function.signature()
    }

    pub fn args(&self) -> &[DynSolValue] {
        &self.args
    }

    /// True for `view` and `pure` functions
    pub fn is_read_only(&self) -> bool {
        use alloy::json_abi::StateMutability;
        matches!(
            self.function.state_mutability,
            StateMutability::View | StateMutability::Pure
        )
    }

    /// Selector followed by the ABI-encoded arguments
    pub fn calldata(&self) -> Result<Bytes> {
        self.function
            .abi_encode_input(&self.args)
            .map(Bytes::from)
            .map_err(|e| PolygonError::InvalidArguments {
                function: self.function.name.clone(),
                reason: e.to_string(),
            })
    }

    /// Decodes `eth_call` return data into the declared outputs
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<DynSolValue>> {
        self.function
            .abi_decode_output(data)
            .map_err(|e| PolygonError::Decode {
                function: self.function.name.clone(),
                reason: e.to_string(),
            })
    }
}

fn parse_abi(abi_json: &str) -> Result<JsonAbi> {
    serde_json::from_str(abi_json).map_err(|e| PolygonError::InvalidAbi(e.to_string()))
}

fn coerce_args<S: AsRef<str>>(
    function: &Function,
    args: &[S],
) -> std::result::Result<Vec<DynSolValue>, String> {
    function
        .inputs
        .iter()
        .zip(args)
        .enumerate()
        .map(|(i, (param, arg))| {
            let ty = param
                .resolve()
                .map_err(|e| format!("parameter {i} has unsupported type {}: {e}", param.ty))?;
            // Addresses go through the same EIP-55 check as every other address input
            if ty == DynSolType::Address {
                return parse_address(arg.as_ref())
                    .map(DynSolValue::Address)
                    .map_err(|e| format!("argument {i}: {e}"));
            }
            ty.coerce_str(arg.as_ref())
                .map_err(|e| format!("argument {i} ({}) is not a valid {ty}: {e}", arg.as_ref()))
        })
        .collect()
}
