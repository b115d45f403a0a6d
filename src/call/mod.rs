//! Runtime call codec
//!
//! Converts a JSON call document into the canonical runtime message carried
//! by a transaction, and back.
//!
//! A call document names a module, then a method, then the method's
//! arguments:
//!
//! ```json
//! { "bank": { "freeze": { "token_id": "token_1rwrh8gn2py0dl4vv65twgctmlwck6esm2as9dftumcw89kqqn3nqrduss6" } } }
//! ```
//!
//! The runtime message is the Borsh encoding of the typed call: module index
//! (`u8`), method index (`u8`), then the arguments in declaration order with
//! little-endian fixed-width integers and `u32` length prefixes.

pub mod modules;
pub mod types;

use crate::error::WasmHubError;
use borsh::{BorshDeserialize, BorshSerialize};
use modules::{AccountsCall, BankCall, CoreCall, ValueSetterCall};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, Read, Write};

/// A call into one of the runtime's modules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum RuntimeCall {
    Bank(BankCall),
    ValueSetter(ValueSetterCall),
    Accounts(AccountsCall),
    Core(CoreCall),
}

struct ModuleEntry {
    name: &'static str,
    index: u8,
    methods: &'static [MethodEntry],
}

struct MethodEntry {
    name: &'static str,
    index: u8,
    encodable: bool,
}

const fn method(name: &'static str, index: u8, encodable: bool) -> MethodEntry {
    MethodEntry {
        name,
        index,
        encodable,
    }
}

const BANK: u8 = 0;
const VALUE_SETTER: u8 = 2;
const ACCOUNTS: u8 = 5;
const CORE: u8 = 9;

/// Every module of the runtime, in dispatch order
///
/// Modules without methods exist on chain but have no call this codec
/// encodes.
const RUNTIME_MODULES: &[ModuleEntry] = &[
    ModuleEntry {
        name: "bank",
        index: BANK,
        methods: &[
            method("create_token", 0, true),
            method("transfer", 1, true),
            method("burn", 2, true),
            method("mint", 3, true),
            method("freeze", 4, true),
        ],
    },
    ModuleEntry {
        name: "sequencer_registry",
        index: 1,
        methods: &[],
    },
    ModuleEntry {
        name: "value_setter",
        index: VALUE_SETTER,
        methods: &[
            method("set_value", 0, true),
            method("set_many_values", 1, true),
        ],
    },
    ModuleEntry {
        name: "attester_incentives",
        index: 3,
        methods: &[],
    },
    ModuleEntry {
        name: "prover_incentives",
        index: 4,
        methods: &[],
    },
    ModuleEntry {
        name: "accounts",
        index: ACCOUNTS,
        methods: &[method("insert_credential_id", 0, true)],
    },
    ModuleEntry {
        name: "nonces",
        index: 6,
        methods: &[],
    },
    ModuleEntry {
        name: "nft",
        index: 7,
        methods: &[],
    },
    ModuleEntry {
        name: "evm",
        index: 8,
        methods: &[],
    },
    ModuleEntry {
        name: "core",
        index: CORE,
        methods: &[
            method("init", 0, false),
            method("propose_criteria", 1, false),
            method("confirm_criteria", 2, true),
            method("reject_criteria", 3, true),
            method("index_campaign", 4, true),
            method("post_segment", 5, false),
            method("register_indexer", 6, true),
            method("unregister_indexer", 7, true),
        ],
    },
];

fn check_supported<'a>(
    module: Option<&'a ModuleEntry>,
    method: impl Fn(&'a ModuleEntry) -> Option<&'a MethodEntry>,
    describe: impl Fn() -> String,
) -> Result<(), WasmHubError> {
    let module = module
        .ok_or_else(|| WasmHubError::unsupported(format!("unknown module {}", describe())))?;
    match method(module) {
        Some(m) if m.encodable => Ok(()),
        Some(m) => Err(WasmHubError::unsupported(format!(
            "{}.{} is not encodable by this codec",
            module.name, m.name
        ))),
        None if module.methods.is_empty() => Err(WasmHubError::unsupported(format!(
            "module {} has no encodable calls",
            module.name
        ))),
        None => Err(WasmHubError::unsupported(format!(
            "unknown method {}",
            describe()
        ))),
    }
}

/// Extract the module and method names from a call document
fn call_names(doc: &Value) -> Result<(&str, &str), WasmHubError> {
    let (module, body) = single_entry(doc)
        .ok_or_else(|| WasmHubError::malformed("call must be an object with one module key"))?;

    let method = match body {
        // Unit calls are written as a bare method name
        Value::String(name) => name.as_str(),
        _ => {
            single_entry(body)
                .ok_or_else(|| {
                    WasmHubError::malformed(format!(
                        "{} call must be an object with one method key",
                        module
                    ))
                })?
                .0
        }
    };

    Ok((module, method))
}

fn single_entry(value: &Value) -> Option<(&str, &Value)> {
    match value {
        Value::Object(map) if map.len() == 1 => map.iter().next().map(|(k, v)| (k.as_str(), v)),
        _ => None,
    }
}

impl RuntimeCall {
    /// Parse a JSON call document
    ///
    /// Unknown modules and methods, and calls this codec cannot encode, are
    /// `UnsupportedVariant`. Every other schema violation is `MalformedInput`.
    pub fn from_json(json: &str) -> Result<Self, WasmHubError> {
        let doc: Value = serde_json::from_str(json)?;
        let (module, method) = call_names(&doc)?;

        check_supported(
            RUNTIME_MODULES.iter().find(|m| m.name == module),
            |m| m.methods.iter().find(|e| e.name == method),
            || format!("{}.{}", module, method),
        )?;

        // Parse from the text, not the `Value`: duplicate keys are rejected
        // there and integers keep full precision.
        serde_json::from_str(json).map_err(WasmHubError::from)
    }

    /// Canonical runtime message bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, WasmHubError> {
        borsh::to_vec(self).map_err(WasmHubError::from)
    }

    /// Decode a runtime message, rejecting trailing bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WasmHubError> {
        let (module, method) = match bytes {
            [module, method, ..] => (*module, *method),
            _ => {
                return Err(WasmHubError::malformed(format!(
                    "runtime message too short: {} bytes",
                    bytes.len()
                )))
            }
        };

        check_supported(
            RUNTIME_MODULES.iter().find(|m| m.index == module),
            |m| m.methods.iter().find(|e| e.index == method),
            || format!("index {}.{}", module, method),
        )?;

        borsh::from_slice(bytes).map_err(WasmHubError::from)
    }

    /// Module and method names, as written in the call document
    pub fn name(&self) -> (&'static str, &'static str) {
        match self {
            RuntimeCall::Bank(call) => ("bank", call.method_name()),
            RuntimeCall::ValueSetter(call) => ("value_setter", call.method_name()),
            RuntimeCall::Accounts(call) => ("accounts", call.method_name()),
            RuntimeCall::Core(call) => ("core", call.method_name()),
        }
    }

    pub fn to_json(&self) -> Result<String, WasmHubError> {
        serde_json::to_string(self).map_err(WasmHubError::from)
    }

    fn module_index(&self) -> u8 {
        match self {
            RuntimeCall::Bank(_) => BANK,
            RuntimeCall::ValueSetter(_) => VALUE_SETTER,
            RuntimeCall::Accounts(_) => ACCOUNTS,
            RuntimeCall::Core(_) => CORE,
        }
    }
}

impl BorshSerialize for RuntimeCall {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        BorshSerialize::serialize(&self.module_index(), writer)?;
        match self {
            RuntimeCall::Bank(call) => BorshSerialize::serialize(call, writer),
            RuntimeCall::ValueSetter(call) => BorshSerialize::serialize(call, writer),
            RuntimeCall::Accounts(call) => BorshSerialize::serialize(call, writer),
            RuntimeCall::Core(call) => BorshSerialize::serialize(call, writer),
        }
    }
}

impl BorshDeserialize for RuntimeCall {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let index = u8::deserialize_reader(reader)?;
        match index {
            BANK => Ok(RuntimeCall::Bank(BankCall::deserialize_reader(reader)?)),
            VALUE_SETTER => Ok(RuntimeCall::ValueSetter(
                ValueSetterCall::deserialize_reader(reader)?,
            )),
            ACCOUNTS => Ok(RuntimeCall::Accounts(AccountsCall::deserialize_reader(
                reader,
            )?)),
            CORE => Ok(RuntimeCall::Core(CoreCall::deserialize_reader(reader)?)),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown module index {}", index),
            )),
        }
    }
}

/// Encode a JSON call document into a runtime message
pub fn encode_call(json: &str) -> Result<Vec<u8>, WasmHubError> {
    let call = RuntimeCall::from_json(json)?;
    let bytes = call.to_bytes()?;

    let (module, method) = call.name();
    tracing::debug!(module, method, len = bytes.len(), "encoded runtime call");

    Ok(bytes)
}

/// Decode a runtime message back into its call
pub fn decode_call(bytes: &[u8]) -> Result<RuntimeCall, WasmHubError> {
    RuntimeCall::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::modules::*;
    use super::types::{Coins, CredentialId};
    use crate::address::{Address, TokenId};
    use rstest::rstest;

    const ADDR_1: &str = "sov1qyqszqgpqyqszqgpqyqszqgpqyqszqgpm9peqd";
    const ADDR_2: &str = "sov1qgpqyqszqgpqyqszqgpqyqszqgpqyqsz2p8utm";
    const TOKEN: &str = "token_1rwrh8gn2py0dl4vv65twgctmlwck6esm2as9dftumcw89kqqn3nqrduss6";

    const RUNTIME_CALL_JSON: &str = r#"{"bank":{"freeze":{"token_id":"token_1rwrh8gn2py0dl4vv65twgctmlwck6esm2as9dftumcw89kqqn3nqrduss6"}}}"#;
    const RUNTIME_CALL_SERIALIZED: [u8; 34] = [
        0, 4, 27, 135, 115, 162, 106, 9, 30, 223, 213, 140, 213, 22, 228, 97, 123, 251, 177, 109,
        102, 27, 87, 96, 86, 165, 124, 222, 28, 114, 216, 0, 156, 102,
    ];

    fn transfer_json(to: &str, amount: &str) -> String {
        format!(
            r#"{{"bank":{{"transfer":{{"to":"{}","coins":{{"amount":{},"token_id":"{}"}}}}}}}}"#,
            to, amount, TOKEN
        )
    }

    #[test]
    fn test_reference_vector() {
        let bytes = encode_call(RUNTIME_CALL_JSON).unwrap();
        assert_eq!(bytes, RUNTIME_CALL_SERIALIZED);
    }

    #[test]
    fn test_deterministic_and_order_independent() {
        let a = transfer_json(ADDR_1, "10");
        let b = format!(
            r#"{{"bank":{{"transfer":{{"coins":{{"token_id":"{}","amount":"10"}},"to":"{}"}}}}}}"#,
            TOKEN, ADDR_1
        );
        let first = encode_call(&a).unwrap();
        assert_eq!(first, encode_call(&a).unwrap());
        assert_eq!(first, encode_call(&b).unwrap());
    }

    #[test]
    fn test_transfer_layout() {
        let bytes = encode_call(&transfer_json(ADDR_2, "10")).unwrap();
        // module, method, address, u128 amount, token id
        assert_eq!(bytes.len(), 2 + 20 + 16 + 32);
        assert_eq!(&bytes[..2], &[0, 1]);
        assert_eq!(&bytes[2..22], &[2u8; 20]);
        assert_eq!(bytes[22], 10);
        assert_eq!(&bytes[38..], &RUNTIME_CALL_SERIALIZED[2..]);
    }

    #[test]
    fn test_distinct_calls_distinct_bytes() {
        let docs = [
            transfer_json(ADDR_1, "10"),
            transfer_json(ADDR_1, "11"),
            transfer_json(ADDR_2, "10"),
            RUNTIME_CALL_JSON.to_string(),
            r#"{"value_setter":{"set_value":10}}"#.to_string(),
            r#"{"value_setter":{"set_many_values":[10]}}"#.to_string(),
            r#"{"core":{"reject_criteria":{"campaign_id":10}}}"#.to_string(),
            r#"{"core":{"index_campaign":{"campaign_id":10}}}"#.to_string(),
            r#"{"core":{"confirm_criteria":{"campaign_id":10}}}"#.to_string(),
            r#"{"core":{"confirm_criteria":{"campaign_id":10,"proposal_id":0}}}"#.to_string(),
        ];
        let encoded: Vec<Vec<u8>> = docs.iter().map(|d| encode_call(d).unwrap()).collect();
        for i in 0..encoded.len() {
            for j in (i + 1)..encoded.len() {
                assert_ne!(encoded[i], encoded[j], "{} vs {}", docs[i], docs[j]);
            }
        }
    }

    #[rstest]
    #[case::freeze(RUNTIME_CALL_JSON.to_string())]
    #[case::transfer(transfer_json(ADDR_1, "\"340282366920938463463374607431768211455\""))]
    #[case::create_token(format!(
        r#"{{"bank":{{"create_token":{{"token_name":"hub","token_decimals":8,"initial_balance":"1000","mint_to_address":"{}","authorized_minters":["{}","{}"]}}}}}}"#,
        ADDR_1, ADDR_1, ADDR_2
    ))]
    #[case::mint(format!(
        r#"{{"bank":{{"mint":{{"coins":{{"amount":"5","token_id":"{}"}},"mint_to_address":"{}"}}}}}}"#,
        TOKEN, ADDR_2
    ))]
    #[case::set_many_values(r#"{"value_setter":{"set_many_values":[1,2,3]}}"#.to_string())]
    #[case::insert_credential(format!(
        r#"{{"accounts":{{"insert_credential_id":"0x{}"}}}}"#,
        "11".repeat(32)
    ))]
    #[case::register_indexer(format!(r#"{{"core":{{"register_indexer":["{}","idx"]}}}}"#, ADDR_1))]
    #[case::unregister_indexer(format!(r#"{{"core":{{"unregister_indexer":"{}"}}}}"#, ADDR_2))]
    fn test_decode_recovers_call(#[case] json: String) {
        let call = RuntimeCall::from_json(&json).unwrap();
        let bytes = encode_call(&json).unwrap();
        let decoded = decode_call(&bytes).unwrap();
        assert_eq!(decoded, call);

        // The JSON written back encodes to the same bytes
        assert_eq!(encode_call(&decoded.to_json().unwrap()).unwrap(), bytes);
    }

    #[rstest]
    #[case::unknown_module(r#"{"staking":{"bond":{"amount":1}}}"#)]
    #[case::unknown_method(r#"{"bank":{"steal":{"amount":1}}}"#)]
    #[case::module_without_calls(r#"{"nft":{"mint":{"id":1}}}"#)]
    #[case::non_encodable_method(r#"{"core":{"init":{"criteria":[]}}}"#)]
    fn test_unsupported_variant(#[case] json: &str) {
        assert!(matches!(
            encode_call(json),
            Err(WasmHubError::UnsupportedVariant(_))
        ));
    }

    #[rstest]
    #[case::not_json("bank.transfer")]
    #[case::not_an_object(r#"["bank"]"#)]
    #[case::two_modules(r#"{"bank":{"freeze":{}},"core":{"index_campaign":{"campaign_id":1}}}"#)]
    #[case::missing_field(r#"{"core":{"index_campaign":{}}}"#)]
    #[case::unknown_field(r#"{"core":{"index_campaign":{"campaign_id":1,"extra":true}}}"#)]
    #[case::wrong_type(r#"{"core":{"index_campaign":{"campaign_id":"one"}}}"#)]
    #[case::negative(r#"{"core":{"index_campaign":{"campaign_id":-1}}}"#)]
    #[case::out_of_range(r#"{"value_setter":{"set_value":4294967296}}"#)]
    #[case::duplicate_field(r#"{"core":{"index_campaign":{"campaign_id":1,"campaign_id":2}}}"#)]
    #[case::bad_address(r#"{"core":{"unregister_indexer":"sov1notanaddress"}}"#)]
    fn test_malformed_input(#[case] json: &str) {
        assert!(matches!(
            encode_call(json),
            Err(WasmHubError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_bytes() {
        let mut trailing = RUNTIME_CALL_SERIALIZED.to_vec();
        trailing.push(0);
        assert!(matches!(
            decode_call(&trailing),
            Err(WasmHubError::MalformedInput(_))
        ));
        assert!(matches!(
            decode_call(&RUNTIME_CALL_SERIALIZED[..20]),
            Err(WasmHubError::MalformedInput(_))
        ));
        assert!(matches!(
            decode_call(&[0]),
            Err(WasmHubError::MalformedInput(_))
        ));
        assert!(matches!(
            decode_call(&[42, 0]),
            Err(WasmHubError::UnsupportedVariant(_))
        ));
        assert!(matches!(
            decode_call(&[9, 5]),
            Err(WasmHubError::UnsupportedVariant(_))
        ));
    }

    #[test]
    fn test_call_table_matches_encoding() {
        let token_id = TokenId([3u8; 32]);
        let coins = Coins {
            amount: 1,
            token_id,
        };
        let calls = [
            RuntimeCall::Bank(BankCall::CreateToken {
                token_name: "t".to_string(),
                token_decimals: None,
                initial_balance: 1,
                mint_to_address: Address([1u8; 20]),
                authorized_minters: vec![],
            }),
            RuntimeCall::Bank(BankCall::Transfer {
                to: Address([1u8; 20]),
                coins: coins.clone(),
            }),
            RuntimeCall::Bank(BankCall::Burn {
                coins: coins.clone(),
            }),
            RuntimeCall::Bank(BankCall::Mint {
                coins,
                mint_to_address: Address([1u8; 20]),
            }),
            RuntimeCall::Bank(BankCall::Freeze { token_id }),
            RuntimeCall::ValueSetter(ValueSetterCall::SetValue(1)),
            RuntimeCall::ValueSetter(ValueSetterCall::SetManyValues(vec![])),
            RuntimeCall::Accounts(AccountsCall::InsertCredentialId(CredentialId([0u8; 32]))),
            RuntimeCall::Core(CoreCall::ConfirmCriteria {
                campaign_id: 1,
                proposal_id: None,
            }),
            RuntimeCall::Core(CoreCall::RejectCriteria { campaign_id: 1 }),
            RuntimeCall::Core(CoreCall::IndexCampaign { campaign_id: 1 }),
            RuntimeCall::Core(CoreCall::RegisterIndexer(
                Address([1u8; 20]),
                String::new(),
            )),
            RuntimeCall::Core(CoreCall::UnregisterIndexer(Address([1u8; 20]))),
        ];

        for call in calls {
            let json = call.to_json().unwrap();
            let bytes = call.to_bytes().unwrap();
            let (module, method) = call.name();
            let entry = RUNTIME_MODULES.iter().find(|m| m.name == module).unwrap();
            assert_eq!(entry.index, bytes[0], "{}", json);
            let method_entry = entry.methods.iter().find(|e| e.name == method).unwrap();
            assert_eq!(method_entry.index, bytes[1], "{}", json);
            assert!(json.contains(module) && json.contains(method), "{}", json);
            assert_eq!(encode_call(&json).unwrap(), call.to_bytes().unwrap());
        }
    }
}
