use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

/// Supported chains. Each one resolves to exactly one [`AddressRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Polygon,
    Arbitrum,
    Optimism,
    Base,
    Bitcoin,
    Solana,
    Sui,
    Aptos,
}

/// Address shape families shared between chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressRule {
    Evm,
    Bitcoin,
    Solana,
    Move,
}

/// Every identifier the registry accepts, in listing order.
pub const SUPPORTED_CHAINS: &[&str] = &[
    "ethereum", "eth", "polygon", "matic", "arbitrum", "optimism", "base", "bitcoin", "btc",
    "solana", "sol", "sui", "aptos",
];

impl Chain {
    /// Case-insensitive lookup; aliases fold onto their chain.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ethereum" | "eth" => Some(Chain::Ethereum),
            "polygon" | "matic" => Some(Chain::Polygon),
            "arbitrum" => Some(Chain::Arbitrum),
            "optimism" => Some(Chain::Optimism),
            "base" => Some(Chain::Base),
            "bitcoin" | "btc" => Some(Chain::Bitcoin),
            "solana" | "sol" => Some(Chain::Solana),
            "sui" => Some(Chain::Sui),
            "aptos" => Some(Chain::Aptos),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Polygon => "polygon",
            Chain::Arbitrum => "arbitrum",
            Chain::Optimism => "optimism",
            Chain::Base => "base",
            Chain::Bitcoin => "bitcoin",
            Chain::Solana => "solana",
            Chain::Sui => "sui",
            Chain::Aptos => "aptos",
        }
    }

    pub fn rule(&self) -> AddressRule {
        match self {
            Chain::Ethereum | Chain::Polygon | Chain::Arbitrum | Chain::Optimism | Chain::Base => {
                AddressRule::Evm
            }
            Chain::Bitcoin => AddressRule::Bitcoin,
            Chain::Solana => AddressRule::Solana,
            Chain::Sui | Chain::Aptos => AddressRule::Move,
        }
    }

    /// Chain whose validation rule this one borrows. EVM L2s validate as ethereum.
    pub fn canonical(&self) -> Chain {
        match self.rule() {
            AddressRule::Evm => Chain::Ethereum,
            _ => *self,
        }
    }
}

static EVM_ADDRESS: OnceLock<Regex> = OnceLock::new();
static BTC_LEGACY_ADDRESS: OnceLock<Regex> = OnceLock::new();
static BTC_BECH32_ADDRESS: OnceLock<Regex> = OnceLock::new();
static SOLANA_ADDRESS: OnceLock<Regex> = OnceLock::new();
static MOVE_ADDRESS: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("address pattern must compile"))
}

impl AddressRule {
    pub fn matches(&self, address: &str) -> bool {
        match self {
            AddressRule::Evm => compiled(&EVM_ADDRESS, r"^0x[a-fA-F0-9]{40}$").is_match(address),
            AddressRule::Bitcoin => {
                compiled(&BTC_LEGACY_ADDRESS, r"^[13][a-km-zA-HJ-NP-Z1-9]{25,34}$")
                    .is_match(address)
                    || compiled(&BTC_BECH32_ADDRESS, r"^bc1[a-z0-9]{39,59}$").is_match(address)
            }
            AddressRule::Solana => {
                compiled(&SOLANA_ADDRESS, r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").is_match(address)
            }
            AddressRule::Move => compiled(&MOVE_ADDRESS, r"^0x[a-fA-F0-9]{64}$").is_match(address),
        }
    }

    pub fn expected_shape(&self) -> &'static str {
        match self {
            AddressRule::Evm => "0x followed by 40 hex characters",
            AddressRule::Bitcoin => "a legacy (1.../3...) or bech32 (bc1...) address",
            AddressRule::Solana => "32-44 base58 characters",
            AddressRule::Move => "0x followed by 64 hex characters",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Address is required")]
    MissingAddress,

    #[error("Chain is required")]
    MissingChain,

    #[error("Unsupported chain: {0}. Supported chains: {list}", list = SUPPORTED_CHAINS.join(", "))]
    UnsupportedChain(String),

    #[error("Invalid {chain} address: expected {expected}")]
    InvalidFormat {
        chain: String,
        expected: &'static str,
    },
}

/// Checks `address` against the shape rule of `chain`.
///
/// Pure and deterministic. Surrounding whitespace is ignored on both inputs,
/// but the address is matched in its original case.
pub fn validate_address(address: &str, chain: &str) -> Result<Chain, AddressError> {
    let address = address.trim();
    let chain_name = chain.trim().to_ascii_lowercase();
    if address.is_empty() {
        return Err(AddressError::MissingAddress);
    }
    if chain_name.is_empty() {
        return Err(AddressError::MissingChain);
    }

    let resolved =
        Chain::parse(&chain_name).ok_or_else(|| AddressError::UnsupportedChain(chain_name.clone()))?;
    let rule = resolved.rule();
    if !rule.matches(address) {
        return Err(AddressError::InvalidFormat {
            chain: chain_name,
            expected: rule.expected_shape(),
        });
    }

    Ok(resolved)
}
