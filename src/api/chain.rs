use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    models::ApiResponse,
    validation::{address::SUPPORTED_CHAINS, validate_address, AddressRule, Chain},
};

use super::json_body;

#[derive(Debug, Serialize)]
pub struct ChainInfo {
    pub id: &'static str,
    pub chain: &'static str,
    pub canonical_chain: Chain,
    pub rule: AddressRule,
    pub expected_format: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ValidateAddressRequest {
    pub address: Option<String>,
    pub chain: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateAddressResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_chain: Option<Chain>,
}

/// GET /api/v1/chains
pub async fn list_chains() -> Json<ApiResponse<Vec<ChainInfo>>> {
    let chains = SUPPORTED_CHAINS
        .iter()
        .copied()
        .filter_map(|id| {
            let chain = Chain::parse(id)?;
            let rule = chain.rule();
            Some(ChainInfo {
                id,
                chain: chain.as_str(),
                canonical_chain: chain.canonical(),
                rule,
                expected_format: rule.expected_shape(),
            })
        })
        .collect();

    Json(ApiResponse::success(chains))
}

/// POST /api/v1/chains/validate-address
///
/// A failed check is still a successful request; the verdict is in `valid`.
pub async fn validate_address_handler(
    payload: std::result::Result<Json<ValidateAddressRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ValidateAddressResponse>>> {
    let req = json_body(payload)?;
    let verdict = validate_address(
        req.address.as_deref().unwrap_or_default(),
        req.chain.as_deref().unwrap_or_default(),
    );

    let response = match verdict {
        Ok(chain) => ValidateAddressResponse {
            valid: true,
            reason: None,
            canonical_chain: Some(chain.canonical()),
        },
        Err(err) => ValidateAddressResponse {
            valid: false,
            reason: Some(err.to_string()),
            canonical_chain: None,
        },
    };
    Ok(Json(ApiResponse::success(response)))
}
