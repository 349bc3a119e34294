//! Treatment plan knowledge base and rendering.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{WoundError, WoundResult};

/// Care instructions for one wound type. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreatmentPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<String>>,
    /// Step text keyed by its position, e.g. `"1"`, `"2"`, `"10"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precautions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_to_seek_help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_self_treatable: Option<bool>,
}

/// Treatment plans keyed by wound type.
pub type KnowledgeBase = HashMap<String, TreatmentPlan>;

/// Read the whole knowledge base from a JSON file.
pub fn load_knowledge_base(path: &Path) -> WoundResult<KnowledgeBase> {
    if !path.exists() {
        return Err(WoundError::KnowledgeBaseNotFound(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Known wound types, sorted.
pub fn wound_types(kb: &KnowledgeBase) -> Vec<String> {
    let mut types: Vec<String> = kb.keys().cloned().collect();
    types.sort();
    types
}

/// Load the knowledge base and render the plan for `wound_type`.
///
/// Always answers with text; load failures become a one-line message.
pub fn treatment_plan(wound_type: &str, path: &Path) -> String {
    match load_knowledge_base(path) {
        Ok(kb) => render_treatment_plan(wound_type, &kb),
        Err(e) => {
            tracing::error!("Failed to load treatment plans from {}: {e}", path.display());
            format!("Error loading treatment plan: {e}")
        }
    }
}

/// Render a plan as markdown-like text in a fixed section order.
pub fn render_treatment_plan(wound_type: &str, kb: &KnowledgeBase) -> String {
    let Some(plan) = kb.get(wound_type) else {
        return format!("No treatment plan found for wound type '{wound_type}'.");
    };

    let mut blocks: Vec<String> = Vec::new();

    if let Some(name) = &plan.name {
        blocks.push(format!("# {name}"));
    }
    if let Some(description) = &plan.description {
        blocks.push(description.clone());
    }
    if let Some(materials) = &plan.materials {
        let mut block = String::from("## Materials Needed");
        for item in materials {
            block.push_str(&format!("\n- {item}"));
        }
        blocks.push(block);
    }
    if let Some(steps) = &plan.steps {
        let mut block = String::from("## Steps");
        for (index, text) in ordered_steps(steps) {
            block.push_str(&format!("\n{index}. {text}"));
        }
        blocks.push(block);
    }

    let trailing = [
        ("Precautions", plan.precautions.clone()),
        ("When to Seek Help", plan.when_to_seek_help.clone()),
        ("Estimated Duration", plan.duration.clone()),
        (
            "Self-Treatable",
            plan.is_self_treatable
                .map(|yes| (if yes { "Yes" } else { "No" }).to_string()),
        ),
    ];
    for (label, value) in trailing {
        if let Some(value) = value {
            blocks.push(format!("**{label}:** {value}"));
        }
    }

    blocks.join("\n\n")
}

/// Steps sorted by the numeric value of their keys.
///
/// Keys that are not integers follow the numeric ones in lexicographic order.
fn ordered_steps(steps: &HashMap<String, String>) -> Vec<(&str, &str)> {
    let mut ordered: Vec<(&str, &str)> = steps
        .iter()
        .map(|(k, v)| (k.trim(), v.as_str()))
        .collect();

    ordered.sort_by(|(a, _), (b, _)| match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn abrasion_kb() -> KnowledgeBase {
        serde_json::from_value(serde_json::json!({
            "abrasion": {
                "name": "Abrasion",
                "description": "A superficial scrape of the skin.",
                "materials": ["gauze", "saline"],
                "steps": { "2": "clean", "1": "assess" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_steps_sorted_numerically() {
        let text = render_treatment_plan("abrasion", &abrasion_kb());
        let assess = text.find("1. assess").unwrap();
        let clean = text.find("2. clean").unwrap();
        assert!(assess < clean);
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        let steps: HashMap<String, String> = [("10", "ten"), ("9", "nine"), ("1", "one")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let ordered = ordered_steps(&steps);
        assert_eq!(ordered, vec![("1", "one"), ("9", "nine"), ("10", "ten")]);
    }

    #[test]
    fn test_non_numeric_keys_follow() {
        let steps: HashMap<String, String> = [("b", "later"), ("2", "two"), ("a", "after")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let ordered = ordered_steps(&steps);
        assert_eq!(ordered, vec![("2", "two"), ("a", "after"), ("b", "later")]);
    }

    #[test]
    fn test_full_render_layout() {
        let mut kb = abrasion_kb();
        let plan = kb.get_mut("abrasion").unwrap();
        plan.precautions = Some("Avoid cotton wool.".to_string());
        plan.when_to_seek_help = Some("Signs of infection.".to_string());
        plan.duration = Some("3-7 days".to_string());
        plan.is_self_treatable = Some(true);

        let expected = "# Abrasion\n\n\
                        A superficial scrape of the skin.\n\n\
                        ## Materials Needed\n- gauze\n- saline\n\n\
                        ## Steps\n1. assess\n2. clean\n\n\
                        **Precautions:** Avoid cotton wool.\n\n\
                        **When to Seek Help:** Signs of infection.\n\n\
                        **Estimated Duration:** 3-7 days\n\n\
                        **Self-Treatable:** Yes";
        assert_eq!(render_treatment_plan("abrasion", &kb), expected);
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let mut kb = KnowledgeBase::new();
        kb.insert(
            "burn".to_string(),
            TreatmentPlan {
                name: Some("Minor Burn".to_string()),
                is_self_treatable: Some(false),
                ..Default::default()
            },
        );
        let text = render_treatment_plan("burn", &kb);
        assert_eq!(text, "# Minor Burn\n\n**Self-Treatable:** No");
        assert!(!text.contains("Materials"));
        assert!(!text.contains("Steps"));
        assert!(!text.contains("Precautions"));
    }

    #[test]
    fn test_unknown_wound_type() {
        let text = render_treatment_plan("laceration", &abrasion_kb());
        assert!(text.contains("laceration"));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_missing_file_is_distinct_failure() {
        let err = load_knowledge_base(Path::new("/nonexistent/plans.json")).unwrap_err();
        assert!(matches!(err, WoundError::KnowledgeBaseNotFound(_)));

        let text = treatment_plan("abrasion", Path::new("/nonexistent/plans.json"));
        assert!(text.starts_with("Error loading treatment plan:"));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"abrasion\": ").unwrap();
        let err = load_knowledge_base(file.path()).unwrap_err();
        assert!(matches!(err, WoundError::Json(_)));
        assert!(treatment_plan("abrasion", file.path()).starts_with("Error loading treatment plan:"));
    }

    #[test]
    fn test_reads_file_per_call() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&abrasion_kb()).unwrap()).unwrap();
        file.flush().unwrap();

        let text = treatment_plan("abrasion", file.path());
        assert!(text.starts_with("# Abrasion"));

        let kb = load_knowledge_base(file.path()).unwrap();
        assert_eq!(wound_types(&kb), vec!["abrasion".to_string()]);
    }
}
