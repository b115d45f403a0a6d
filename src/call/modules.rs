//! Call messages of the runtime modules the codec can encode
//!
//! Variant order is the on-chain Borsh variant index. Reordering or inserting
//! a variant is a breaking wire change.

use super::types::{amount, Coins, CredentialId};
use crate::address::{Address, TokenId};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};

// =============================================================================
// Bank module
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum BankCall {
    /// Create a new token, minting the initial supply to `mint_to_address`
    CreateToken {
        token_name: String,
        token_decimals: Option<u8>,
        #[serde(with = "amount")]
        initial_balance: u128,
        mint_to_address: Address,
        authorized_minters: Vec<Address>,
    },
    Transfer {
        to: Address,
        coins: Coins,
    },
    Burn {
        coins: Coins,
    },
    Mint {
        coins: Coins,
        mint_to_address: Address,
    },
    /// Permanently disable minting of a token
    Freeze {
        token_id: TokenId,
    },
}

impl BankCall {
    pub fn method_name(&self) -> &'static str {
        match self {
            BankCall::CreateToken { .. } => "create_token",
            BankCall::Transfer { .. } => "transfer",
            BankCall::Burn { .. } => "burn",
            BankCall::Mint { .. } => "mint",
            BankCall::Freeze { .. } => "freeze",
        }
    }
}

// =============================================================================
// Value setter module
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ValueSetterCall {
    SetValue(u32),
    SetManyValues(Vec<u8>),
}

impl ValueSetterCall {
    pub fn method_name(&self) -> &'static str {
        match self {
            ValueSetterCall::SetValue(_) => "set_value",
            ValueSetterCall::SetManyValues(_) => "set_many_values",
        }
    }
}

// =============================================================================
// Accounts module
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum AccountsCall {
    /// Bind an additional credential to the sender's account
    InsertCredentialId(CredentialId),
}

impl AccountsCall {
    pub fn method_name(&self) -> &'static str {
        match self {
            AccountsCall::InsertCredentialId(_) => "insert_credential_id",
        }
    }
}

// =============================================================================
// Core module
// =============================================================================

/// Core module calls with flat arguments
///
/// Campaign creation, criteria proposals and segment posting carry nested
/// campaign documents and are not encodable here. Their variant indices are
/// still reserved, so the encodable variants keep their on-chain index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum CoreCall {
    ConfirmCriteria {
        campaign_id: u64,
        proposal_id: Option<u64>,
    },
    RejectCriteria {
        campaign_id: u64,
    },
    IndexCampaign {
        campaign_id: u64,
    },
    RegisterIndexer(Address, String),
    UnregisterIndexer(Address),
}

impl CoreCall {
    const CONFIRM_CRITERIA: u8 = 2;
    const REJECT_CRITERIA: u8 = 3;
    const INDEX_CAMPAIGN: u8 = 4;
    const REGISTER_INDEXER: u8 = 6;
    const UNREGISTER_INDEXER: u8 = 7;

    pub fn method_name(&self) -> &'static str {
        match self {
            CoreCall::ConfirmCriteria { .. } => "confirm_criteria",
            CoreCall::RejectCriteria { .. } => "reject_criteria",
            CoreCall::IndexCampaign { .. } => "index_campaign",
            CoreCall::RegisterIndexer(..) => "register_indexer",
            CoreCall::UnregisterIndexer(..) => "unregister_indexer",
        }
    }

    fn variant_index(&self) -> u8 {
        match self {
            CoreCall::ConfirmCriteria { .. } => Self::CONFIRM_CRITERIA,
            CoreCall::RejectCriteria { .. } => Self::REJECT_CRITERIA,
            CoreCall::IndexCampaign { .. } => Self::INDEX_CAMPAIGN,
            CoreCall::RegisterIndexer(..) => Self::REGISTER_INDEXER,
            CoreCall::UnregisterIndexer(..) => Self::UNREGISTER_INDEXER,
        }
    }
}

impl BorshSerialize for CoreCall {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        BorshSerialize::serialize(&self.variant_index(), writer)?;
        match self {
            CoreCall::ConfirmCriteria {
                campaign_id,
                proposal_id,
            } => {
                BorshSerialize::serialize(campaign_id, writer)?;
                BorshSerialize::serialize(proposal_id, writer)
            }
            CoreCall::RejectCriteria { campaign_id } | CoreCall::IndexCampaign { campaign_id } => {
                BorshSerialize::serialize(campaign_id, writer)
            }
            CoreCall::RegisterIndexer(address, alias) => {
                BorshSerialize::serialize(address, writer)?;
                BorshSerialize::serialize(alias, writer)
            }
            CoreCall::UnregisterIndexer(address) => BorshSerialize::serialize(address, writer),
        }
    }
}

impl BorshDeserialize for CoreCall {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let index = u8::deserialize_reader(reader)?;
        match index {
            Self::CONFIRM_CRITERIA => Ok(CoreCall::ConfirmCriteria {
                campaign_id: u64::deserialize_reader(reader)?,
                proposal_id: Option::<u64>::deserialize_reader(reader)?,
            }),
            Self::REJECT_CRITERIA => Ok(CoreCall::RejectCriteria {
                campaign_id: u64::deserialize_reader(reader)?,
            }),
            Self::INDEX_CAMPAIGN => Ok(CoreCall::IndexCampaign {
                campaign_id: u64::deserialize_reader(reader)?,
            }),
            Self::REGISTER_INDEXER => Ok(CoreCall::RegisterIndexer(
                Address::deserialize_reader(reader)?,
                String::deserialize_reader(reader)?,
            )),
            Self::UNREGISTER_INDEXER => Ok(CoreCall::UnregisterIndexer(
                Address::deserialize_reader(reader)?,
            )),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown core call index {}", index),
            )),
        }
    }
}
