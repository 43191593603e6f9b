use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    constants::DEFAULT_GOAL_STATUS,
    models::{CreateGoalRequest, Goal, GoalType, UpdateGoalRequest},
};

use super::{trimmed, validate_address, Chain, ValidationErrors};

/// Normalized creation payload, ready to be stamped with ids and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalFields {
    pub name: String,
    pub description: String,
    pub status: String,
    pub progress: f64,
    pub coin: String,
    pub coin_symbol: String,
    pub current_amount: f64,
    pub target_amount: f64,
    pub target_date: Option<DateTime<Utc>>,
    pub wallet_id: Option<Uuid>,
    pub wallet_address: Option<String>,
    pub wallet_chain: Option<String>,
    pub goal_type: GoalType,
    pub parent_goal_id: Option<Uuid>,
    pub is_aggregate: bool,
    pub milestones: serde_json::Value,
    pub notes: String,
}

fn goal_type_message() -> String {
    let names: Vec<&str> = GoalType::ALL.iter().map(GoalType::as_str).collect();
    format!("goal_type must be one of: {}", names.join(", "))
}

fn check_current_amount(errors: &mut ValidationErrors, value: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.push(
            "current_amount",
            "current_amount must be greater than or equal to 0",
        );
    }
}

fn check_target_amount(errors: &mut ValidationErrors, value: f64) {
    if !value.is_finite() || value <= 0.0 {
        errors.push("target_amount", "target_amount must be greater than 0");
    }
}

fn check_amount_order(errors: &mut ValidationErrors, current: f64, target: f64) {
    if current > target {
        errors.push(
            "current_amount",
            "current_amount cannot exceed target_amount",
        );
    }
}

fn check_progress(errors: &mut ValidationErrors, value: Option<f64>) {
    if let Some(progress) = value {
        if !(0.0..=100.0).contains(&progress) {
            errors.push("progress", "progress must be between 0 and 100");
        }
    }
}

fn parse_goal_type(errors: &mut ValidationErrors, raw: &str) -> Option<GoalType> {
    let parsed = GoalType::parse(raw);
    if parsed.is_none() {
        errors.push("goal_type", goal_type_message());
    }
    parsed
}

// Blank ids are treated as absent, so a blank id in a patch clears the link.
fn parse_optional_id(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: Option<&str>,
) -> Option<Uuid> {
    let value = trimmed(raw)?;
    match Uuid::parse_str(value) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(field, format!("{} is not a valid id", field));
            None
        }
    }
}

/// Linked wallet address/chain, normalized like wallet records.
fn wallet_link(
    errors: &mut ValidationErrors,
    address: Option<&str>,
    chain: Option<&str>,
) -> (Option<String>, Option<String>) {
    let address = trimmed(address);
    let chain = trimmed(chain).map(str::to_ascii_lowercase);
    let mut stored_chain = None;
    if let Some(name) = chain.as_deref() {
        match Chain::parse(name) {
            None => errors.push("wallet_chain", format!("Unsupported chain: {}", name)),
            Some(resolved) => {
                if let Some(address) = address {
                    if let Err(reason) = validate_address(address, name) {
                        errors.push("wallet_address", reason.to_string());
                    }
                }
                stored_chain = Some(resolved.as_str().to_string());
            }
        }
    }
    (address.map(str::to_ascii_lowercase), stored_chain)
}

/// Validates a creation payload, collecting every failed check.
///
/// The amount ordering check runs independently of the per-amount checks.
pub fn validate_new_goal(
    req: &CreateGoalRequest,
) -> std::result::Result<GoalFields, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = trimmed(req.name.as_deref());
    if name.is_none() {
        errors.push("name", "Name is required");
    }
    let coin = trimmed(req.coin.as_deref());
    if coin.is_none() {
        errors.push("coin", "Coin is required");
    }
    let coin_symbol = trimmed(req.coin_symbol.as_deref());
    if coin_symbol.is_none() {
        errors.push("coin_symbol", "Coin symbol is required");
    }

    match req.current_amount {
        Some(value) => check_current_amount(&mut errors, value),
        None => errors.push("current_amount", "current_amount must be a number"),
    }
    match req.target_amount {
        Some(value) => check_target_amount(&mut errors, value),
        None => errors.push("target_amount", "target_amount must be a number"),
    }
    if let (Some(current), Some(target)) = (req.current_amount, req.target_amount) {
        check_amount_order(&mut errors, current, target);
    }

    let goal_type = match req.goal_type.as_deref() {
        Some(raw) => parse_goal_type(&mut errors, raw),
        None => Some(GoalType::Regular),
    };
    let parent_goal_id =
        parse_optional_id(&mut errors, "parent_goal_id", req.parent_goal_id.as_deref());
    let wallet_id = parse_optional_id(&mut errors, "wallet_id", req.wallet_id.as_deref());
    let (wallet_address, wallet_chain) = wallet_link(
        &mut errors,
        req.wallet_address.as_deref(),
        req.wallet_chain.as_deref(),
    );
    check_progress(&mut errors, req.progress);

    errors.finish(GoalFields {
        name: name.unwrap_or_default().to_string(),
        description: req.description.as_deref().unwrap_or_default().trim().to_string(),
        status: trimmed(req.status.as_deref())
            .unwrap_or(DEFAULT_GOAL_STATUS)
            .to_string(),
        progress: req.progress.unwrap_or(0.0),
        coin: coin.unwrap_or_default().to_string(),
        coin_symbol: coin_symbol.unwrap_or_default().to_string(),
        current_amount: req.current_amount.unwrap_or_default(),
        target_amount: req.target_amount.unwrap_or_default(),
        target_date: req.target_date,
        wallet_id,
        wallet_address,
        wallet_chain,
        goal_type: goal_type.unwrap_or(GoalType::Regular),
        parent_goal_id,
        is_aggregate: req.is_aggregate.unwrap_or(false),
        milestones: req
            .milestones
            .clone()
            .unwrap_or_else(|| serde_json::Value::Array(Vec::new())),
        notes: req.notes.as_deref().unwrap_or_default().trim().to_string(),
    })
}

/// Validates the fields present in `patch` and returns `existing` with the
/// patch applied. Amount ordering is checked on the merged values.
pub fn apply_goal_patch(
    existing: &Goal,
    patch: &UpdateGoalRequest,
) -> std::result::Result<Goal, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let mut goal = existing.clone();

    for (field, raw, slot, message) in [
        ("name", patch.name.as_deref(), &mut goal.name, "Name cannot be empty"),
        ("coin", patch.coin.as_deref(), &mut goal.coin, "Coin cannot be empty"),
        (
            "coin_symbol",
            patch.coin_symbol.as_deref(),
            &mut goal.coin_symbol,
            "Coin symbol cannot be empty",
        ),
    ] {
        if let Some(raw) = raw {
            match trimmed(Some(raw)) {
                Some(value) => *slot = value.to_string(),
                None => errors.push(field, message),
            }
        }
    }

    if let Some(value) = patch.current_amount {
        check_current_amount(&mut errors, value);
        goal.current_amount = value;
    }
    if let Some(value) = patch.target_amount {
        check_target_amount(&mut errors, value);
        goal.target_amount = value;
    }
    check_amount_order(&mut errors, goal.current_amount, goal.target_amount);

    if let Some(raw) = patch.goal_type.as_deref() {
        if let Some(goal_type) = parse_goal_type(&mut errors, raw) {
            goal.goal_type = goal_type.as_str().to_string();
        }
    }
    if patch.parent_goal_id.is_some() {
        let parent = parse_optional_id(&mut errors, "parent_goal_id", patch.parent_goal_id.as_deref());
        if parent == Some(existing.id) {
            errors.push("parent_goal_id", "A goal cannot be its own parent");
        }
        goal.parent_goal_id = parent;
    }
    if patch.wallet_id.is_some() {
        goal.wallet_id = parse_optional_id(&mut errors, "wallet_id", patch.wallet_id.as_deref());
    }
    if patch.wallet_address.is_some() || patch.wallet_chain.is_some() {
        let address = patch
            .wallet_address
            .as_deref()
            .or(existing.wallet_address.as_deref());
        let chain = patch
            .wallet_chain
            .as_deref()
            .or(existing.wallet_chain.as_deref());
        let (address, chain) = wallet_link(&mut errors, address, chain);
        goal.wallet_address = address;
        goal.wallet_chain = chain;
    }

    check_progress(&mut errors, patch.progress);
    if let Some(progress) = patch.progress {
        goal.progress = progress;
    }
    if let Some(status) = trimmed(patch.status.as_deref()) {
        goal.status = status.to_string();
    }
    if let Some(description) = patch.description.as_deref() {
        goal.description = description.trim().to_string();
    }
    if let Some(notes) = patch.notes.as_deref() {
        goal.notes = notes.trim().to_string();
    }
    if patch.target_date.is_some() {
        goal.target_date = patch.target_date;
    }
    if let Some(is_aggregate) = patch.is_aggregate {
        goal.is_aggregate = is_aggregate;
    }
    if let Some(milestones) = patch.milestones.clone() {
        goal.milestones = milestones;
    }

    errors.finish(goal)
}

/// Checks a dedicated progress update against the goal's target.
pub fn validate_progress_amount(
    goal: &Goal,
    current_amount: Option<f64>,
) -> std::result::Result<f64, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let Some(value) = current_amount else {
        errors.push("current_amount", "current_amount must be a number");
        return Err(errors);
    };
    check_current_amount(&mut errors, value);
    check_amount_order(&mut errors, value, goal.target_amount);
    errors.finish(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn save_request() -> CreateGoalRequest {
        CreateGoalRequest {
            user_id: Some(Uuid::new_v4().to_string()),
            name: Some("Save".to_string()),
            coin: Some("Sui".to_string()),
            coin_symbol: Some("SUI".to_string()),
            current_amount: Some(250.0),
            target_amount: Some(1000.0),
            goal_type: Some("regular".to_string()),
            ..Default::default()
        }
    }

    fn stored_goal() -> Goal {
        let fields = validate_new_goal(&save_request()).unwrap();
        let now = Utc::now();
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: fields.name,
            description: fields.description,
            status: fields.status,
            progress: fields.progress,
            coin: fields.coin,
            coin_symbol: fields.coin_symbol,
            current_amount: fields.current_amount,
            target_amount: fields.target_amount,
            target_date: None,
            wallet_id: None,
            wallet_address: None,
            wallet_chain: None,
            goal_type: fields.goal_type.as_str().to_string(),
            parent_goal_id: None,
            is_aggregate: false,
            milestones: fields.milestones,
            notes: fields.notes,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_applies_defaults() {
        let mut req = save_request();
        req.goal_type = None;
        let fields = validate_new_goal(&req).unwrap();
        assert_eq!(fields.goal_type, GoalType::Regular);
        assert_eq!(fields.status, DEFAULT_GOAL_STATUS);
        assert_eq!(fields.milestones, serde_json::json!([]));
        assert!(!fields.is_aggregate);
    }

    #[test]
    fn create_accepts_current_equal_to_target() {
        let mut req = save_request();
        req.current_amount = Some(1000.0);
        assert!(validate_new_goal(&req).is_ok());
    }

    #[test]
    fn create_rejects_current_above_target() {
        let mut req = save_request();
        req.current_amount = Some(1500.0);
        let err = validate_new_goal(&req).unwrap_err();
        assert_eq!(err.to_string(), "current_amount cannot exceed target_amount");
    }

    #[test]
    fn create_collects_independent_amount_checks() {
        let mut req = save_request();
        req.current_amount = Some(-1.0);
        req.target_amount = Some(-5.0);
        let err = validate_new_goal(&req).unwrap_err();
        let messages: Vec<&str> = err.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "current_amount must be greater than or equal to 0",
                "target_amount must be greater than 0",
                "current_amount cannot exceed target_amount",
            ]
        );
    }

    #[test]
    fn create_collects_text_enum_and_id_errors() {
        let req = CreateGoalRequest {
            name: Some("  ".to_string()),
            goal_type: Some("weekly".to_string()),
            parent_goal_id: Some("not-an-id".to_string()),
            current_amount: Some(0.0),
            target_amount: Some(1.0),
            ..Default::default()
        };
        let err = validate_new_goal(&req).unwrap_err();
        for field in ["name", "coin", "coin_symbol", "goal_type", "parent_goal_id"] {
            assert!(err.has_field(field), "missing error for {}", field);
        }
        assert!(err
            .to_string()
            .contains("goal_type must be one of: regular, parent, subgoal"));
    }

    #[test]
    fn create_requires_numeric_amounts() {
        let mut req = save_request();
        req.current_amount = None;
        req.target_amount = None;
        let err = validate_new_goal(&req).unwrap_err();
        assert_eq!(
            err.to_string(),
            "current_amount must be a number, target_amount must be a number"
        );
    }

    #[test]
    fn create_validates_wallet_link() {
        let mut req = save_request();
        req.wallet_chain = Some("Sui".to_string());
        req.wallet_address = Some("0x1".to_string());
        let err = validate_new_goal(&req).unwrap_err();
        assert!(err.has_field("wallet_address"));

        req.wallet_address = Some(format!("0x{}", "B".repeat(64)));
        let fields = validate_new_goal(&req).unwrap();
        assert_eq!(fields.wallet_chain.as_deref(), Some("sui"));
        assert_eq!(fields.wallet_address, Some(format!("0x{}", "b".repeat(64))));
    }

    #[test]
    fn create_rejects_progress_out_of_range() {
        let mut req = save_request();
        req.progress = Some(120.0);
        let err = validate_new_goal(&req).unwrap_err();
        assert!(err.has_field("progress"));
    }

    #[test]
    fn patch_checks_order_on_merged_view() {
        let goal = stored_goal();
        let lower_target = UpdateGoalRequest {
            target_amount: Some(100.0),
            ..Default::default()
        };
        let err = apply_goal_patch(&goal, &lower_target).unwrap_err();
        assert_eq!(err.to_string(), "current_amount cannot exceed target_amount");

        let both = UpdateGoalRequest {
            current_amount: Some(50.0),
            target_amount: Some(100.0),
            ..Default::default()
        };
        let updated = apply_goal_patch(&goal, &both).unwrap();
        assert_eq!(updated.progress_percentage(), 50);
    }

    #[test]
    fn patch_leaves_advisory_progress_alone() {
        let goal = stored_goal();
        let patch = UpdateGoalRequest {
            current_amount: Some(900.0),
            ..Default::default()
        };
        let updated = apply_goal_patch(&goal, &patch).unwrap();
        assert_eq!(updated.progress, goal.progress);
        assert_eq!(updated.progress_percentage(), 90);

        let patch = UpdateGoalRequest {
            progress: Some(10.0),
            ..Default::default()
        };
        let updated = apply_goal_patch(&goal, &patch).unwrap();
        assert_eq!(updated.progress, 10.0);
        assert_eq!(updated.progress_percentage(), 25);
    }

    #[test]
    fn patch_validates_present_fields_only() {
        let goal = stored_goal();
        let patch = UpdateGoalRequest {
            name: Some(" ".to_string()),
            goal_type: Some("bogus".to_string()),
            ..Default::default()
        };
        let err = apply_goal_patch(&goal, &patch).unwrap_err();
        assert_eq!(err.errors().len(), 2);

        let patch = UpdateGoalRequest {
            goal_type: Some("Parent".to_string()),
            status: Some("paused".to_string()),
            ..Default::default()
        };
        let updated = apply_goal_patch(&goal, &patch).unwrap();
        assert_eq!(updated.goal_type, "parent");
        assert_eq!(updated.status, "paused");
        assert_eq!(updated.name, goal.name);
    }

    #[test]
    fn patch_rejects_self_parent() {
        let goal = stored_goal();
        let patch = UpdateGoalRequest {
            parent_goal_id: Some(goal.id.to_string()),
            ..Default::default()
        };
        let err = apply_goal_patch(&goal, &patch).unwrap_err();
        assert!(err.to_string().contains("cannot be its own parent"));
    }

    #[test]
    fn patch_blank_parent_clears_link() {
        let mut goal = stored_goal();
        goal.parent_goal_id = Some(Uuid::new_v4());
        goal.wallet_id = Some(Uuid::new_v4());
        let patch = UpdateGoalRequest {
            parent_goal_id: Some("  ".to_string()),
            wallet_id: Some(String::new()),
            ..Default::default()
        };
        let updated = apply_goal_patch(&goal, &patch).unwrap();
        assert_eq!(updated.parent_goal_id, None);
        assert_eq!(updated.wallet_id, None);
    }

    #[test]
    fn patch_absent_parent_keeps_link() {
        let mut goal = stored_goal();
        let parent = Uuid::new_v4();
        goal.parent_goal_id = Some(parent);
        let patch = UpdateGoalRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = apply_goal_patch(&goal, &patch).unwrap();
        assert_eq!(updated.parent_goal_id, Some(parent));
    }

    #[test]
    fn patch_folds_wallet_chain_alias() {
        let goal = stored_goal();
        let patch = UpdateGoalRequest {
            wallet_address: Some(format!("0x{}", "b".repeat(40))),
            wallet_chain: Some("ETH".to_string()),
            ..Default::default()
        };
        let updated = apply_goal_patch(&goal, &patch).unwrap();
        assert_eq!(updated.wallet_chain.as_deref(), Some("ethereum"));
    }

    #[test]
    fn progress_amount_bounded_by_target() {
        let goal = stored_goal();
        assert!(validate_progress_amount(&goal, Some(1500.0)).is_err());
        assert!(validate_progress_amount(&goal, Some(-1.0)).is_err());
        assert!(validate_progress_amount(&goal, None).is_err());
        assert_eq!(validate_progress_amount(&goal, Some(1000.0)), Ok(1000.0));
    }
}
