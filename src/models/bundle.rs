use serde::{Deserialize, Serialize};

use super::action::ActionPlan;

/// Replay strategy a bundle was compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayType {
    ExactReplay,
}

/// Compiled task handed to the executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayBundle {
    pub ultimate_goal: String,
    pub task_id: String,
    #[serde(rename = "type")]
    pub replay_type: ReplayType,
    pub action_list: ActionPlan,
}

impl ReplayBundle {
    pub fn exact(ultimate_goal: String, task_id: String, action_list: ActionPlan) -> Self {
        Self {
            ultimate_goal,
            task_id,
            replay_type: ReplayType::ExactReplay,
            action_list,
        }
    }

    /// Parse a bundle, rejecting unknown replay types and action names
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Action;

    #[test]
    fn test_bundle_document_shape() {
        let bundle = ReplayBundle::exact(
            "Find a keyboard".to_string(),
            "task-1".to_string(),
            ActionPlan::from(vec![Action::open_tab("https://example.com/")]),
        );
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["type"], "exact_replay");
        assert_eq!(value["task_id"], "task-1");
        assert_eq!(value["action_list"][0]["action"], "open_tab");
        assert_eq!(value["action_list"][0]["action_params"]["url"], "https://example.com/");
    }

    #[test]
    fn test_from_json_rejects_unknown_action() {
        let json = r#"{
            "ultimate_goal": "g",
            "task_id": "t",
            "type": "exact_replay",
            "action_list": [{ "action": "hover", "action_params": {} }]
        }"#;
        let err = ReplayBundle::from_json(json).unwrap_err();
        assert!(err.to_string().contains("hover"));
    }

    #[test]
    fn test_from_json_rejects_smart_replay() {
        let json = r#"{
            "ultimate_goal": "g",
            "task_id": "t",
            "type": "smart_replay",
            "action_list": []
        }"#;
        assert!(ReplayBundle::from_json(json).is_err());
    }

    #[test]
    fn test_pretty_json_keeps_non_ascii() {
        let bundle = ReplayBundle::exact("Café menü".to_string(), "t".to_string(), ActionPlan::new());
        let json = bundle.to_pretty_json().unwrap();
        assert!(json.contains("Café menü"));
        assert_eq!(ReplayBundle::from_json(&json).unwrap(), bundle);
    }
}
