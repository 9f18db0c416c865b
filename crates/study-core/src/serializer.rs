//! Study file (de)serialization and schema upgrades.

use serde_json::{json, Map, Value as JsonValue};
use tracing::debug;

use crate::error::StudyError;
use crate::model::{MoveId, StudyFile, VariantId, CURRENT_STORAGE_VERSION, STANDARD_START_FEN};

/// Pretty-printed JSON, two-space indent.
pub fn to_json(study: &StudyFile) -> Result<String, StudyError> {
    Ok(serde_json::to_string_pretty(study)?)
}

pub fn from_json(text: &str) -> Result<StudyFile, StudyError> {
    let value: JsonValue = serde_json::from_str(text)?;
    from_value(value)
}

/// Upgrade a raw payload of any known schema version to the current one.
pub fn from_value(mut value: JsonValue) -> Result<StudyFile, StudyError> {
    upgrade(&mut value)?;
    Ok(serde_json::from_value(value)?)
}

fn upgrade(value: &mut JsonValue) -> Result<(), StudyError> {
    let file = value
        .as_object_mut()
        .ok_or_else(|| StudyError::Format("study file must be a JSON object".into()))?;

    let loaded_version = file
        .get("version")
        .and_then(JsonValue::as_str)
        .unwrap_or("unversioned")
        .to_string();

    if !file.contains_key("rootFEN") {
        debug!(version = %loaded_version, "Study has no rootFEN, assuming the standard position");
        file.insert("rootFEN".into(), json!(STANDARD_START_FEN));
    }
    file.entry("header").or_insert_with(|| json!({ "title": null }));

    let moves = file.entry("moves").or_insert_with(|| json!([]));
    let moves = moves
        .as_array_mut()
        .ok_or_else(|| StudyError::Format("'moves' must be an array".into()))?;
    for mv in moves.iter_mut() {
        upgrade_main_move(mv)?;
    }

    if loaded_version != CURRENT_STORAGE_VERSION {
        debug!(from = %loaded_version, to = CURRENT_STORAGE_VERSION, "Upgraded study file");
        file.insert("version".into(), json!(CURRENT_STORAGE_VERSION));
    }
    Ok(())
}

fn move_object(value: &mut JsonValue) -> Result<&mut Map<String, JsonValue>, StudyError> {
    value
        .as_object_mut()
        .ok_or_else(|| StudyError::Format("every move must be a JSON object".into()))
}

/// Fill in annotation defaults and a move id. Returns the move's id.
fn upgrade_node(mv: &mut Map<String, JsonValue>) -> Result<String, StudyError> {
    mv.entry("shapes").or_insert_with(|| json!([]));
    mv.entry("comment").or_insert(JsonValue::Null);
    let id = mv
        .entry("moveId")
        .or_insert_with(|| json!(MoveId::generate().as_str()));
    match id.as_str() {
        Some(id) => Ok(id.to_string()),
        None => {
            let san = mv.get("san").and_then(JsonValue::as_str).unwrap_or("?");
            Err(StudyError::Format(format!("move '{san}' has a non-string moveId")))
        }
    }
}

fn upgrade_main_move(value: &mut JsonValue) -> Result<(), StudyError> {
    let mv = move_object(value)?;
    let parent_id = upgrade_node(mv)?;

    let raw = match mv.remove("variants") {
        Some(JsonValue::Array(raw)) => raw,
        Some(JsonValue::Null) | None => Vec::new(),
        Some(_) => return Err(StudyError::Format("'variants' must be an array".into())),
    };

    let mut variants = Vec::with_capacity(raw.len());
    for entry in raw {
        // early files stored each variant as a bare array of moves
        let mut variant = match entry {
            JsonValue::Array(moves) => json!({ "moves": moves }),
            other => other,
        };
        let fields = variant
            .as_object_mut()
            .ok_or_else(|| StudyError::Format("every variant must be an object or array".into()))?;

        fields
            .entry("variantId")
            .or_insert_with(|| json!(VariantId::generate().as_str()));
        fields.insert("parentMoveId".into(), json!(parent_id));

        let moves = fields.entry("moves").or_insert_with(|| json!([]));
        let moves = moves
            .as_array_mut()
            .ok_or_else(|| StudyError::Format("variant 'moves' must be an array".into()))?;
        for variant_move in moves.iter_mut() {
            let variant_move = move_object(variant_move)?;
            // variants are one level deep
            variant_move.remove("variants");
            upgrade_node(variant_move)?;
        }

        if moves.is_empty() {
            continue;
        }
        variants.push(variant);
    }

    mv.insert("variants".into(), JsonValue::Array(variants));
    Ok(())
}
