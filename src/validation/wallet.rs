use crate::models::{CreateWalletRequest, UpdateWalletRequest, Wallet};

use super::{address::SUPPORTED_CHAINS, trimmed, validate_address, Chain, ValidationErrors};

/// Wallet fields in their stored form. Chain aliases are folded onto the
/// chain they name, so `eth` is stored as `ethereum`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletFields {
    pub label: String,
    pub address: String,
    pub chain: String,
}

fn unsupported_chain_message(chain: &str) -> String {
    format!(
        "Unsupported chain: {}. Supported chains: {}",
        chain,
        SUPPORTED_CHAINS.join(", ")
    )
}

/// Validates a creation payload, collecting every field problem.
///
/// The address shape check runs only when both address and a supported chain
/// are present, so a single bad chain does not report twice.
pub fn validate_new_wallet(
    req: &CreateWalletRequest,
) -> std::result::Result<WalletFields, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let label = trimmed(req.label.as_deref());
    if label.is_none() {
        errors.push("label", "Label is required");
    }
    let address = trimmed(req.address.as_deref());
    if address.is_none() {
        errors.push("address", "Address is required");
    }
    let submitted_chain = trimmed(req.chain.as_deref()).map(str::to_ascii_lowercase);
    let chain = match submitted_chain.as_deref() {
        None => {
            errors.push("chain", "Chain is required");
            None
        }
        Some(name) => match Chain::parse(name) {
            None => {
                errors.push("chain", unsupported_chain_message(name));
                None
            }
            Some(resolved) => {
                if let Some(address) = address {
                    if let Err(reason) = validate_address(address, name) {
                        errors.push("address", reason.to_string());
                    }
                }
                Some(resolved)
            }
        },
    };

    errors.finish(WalletFields {
        label: label.unwrap_or_default().to_string(),
        address: address.unwrap_or_default().to_ascii_lowercase(),
        chain: chain.map(|c| c.as_str().to_string()).unwrap_or_default(),
    })
}

/// Validates a partial patch against `existing` and returns the merged fields.
///
/// The address is checked against whichever chain is final after the patch,
/// and the chain against whichever address is final. A patched address is
/// matched in the case it was submitted in before being lower-cased for
/// storage.
pub fn validate_wallet_patch(
    existing: &Wallet,
    patch: &UpdateWalletRequest,
) -> std::result::Result<WalletFields, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let label = match patch.label.as_deref() {
        Some(raw) => match trimmed(Some(raw)) {
            Some(value) => value.to_string(),
            None => {
                errors.push("label", "Label cannot be empty");
                existing.label.clone()
            }
        },
        None => existing.label.clone(),
    };

    let address = match patch.address.as_deref() {
        Some(raw) => match trimmed(Some(raw)) {
            Some(value) => Some(value.to_string()),
            None => {
                errors.push("address", "Address cannot be empty");
                None
            }
        },
        None => Some(existing.address.clone()),
    };

    let chain = match patch.chain.as_deref() {
        Some(raw) => match trimmed(Some(raw)).map(str::to_ascii_lowercase) {
            Some(value) => match Chain::parse(&value) {
                Some(resolved) => Some(resolved.as_str().to_string()),
                None => {
                    errors.push("chain", unsupported_chain_message(&value));
                    None
                }
            },
            None => {
                errors.push("chain", "Chain cannot be empty");
                None
            }
        },
        None => Some(existing.chain.clone()),
    };

    // A chain-only patch revalidates the stored address. Stored addresses are
    // lower-cased, so a base58 address that had upper-case letters no longer
    // matches its rule and the caller must resubmit the address with the chain.
    let touches_pair = patch.address.is_some() || patch.chain.is_some();
    if let (true, Some(address), Some(chain)) = (touches_pair, address.as_deref(), chain.as_deref())
    {
        if let Err(reason) = validate_address(address, chain) {
            errors.push("address", reason.to_string());
        }
    }

    errors.finish(WalletFields {
        label,
        address: address.unwrap_or_default().to_ascii_lowercase(),
        chain: chain.unwrap_or_default(),
    })
}
