// src/make/workflow.rs
// Intent-driven entry points: check-first execution, intent analysis, suggestions

use super::{MakeCommandBridge, MakeCommandResult};
use crate::intent::MatchResult;
use crate::suggest::{
    AutoSuggestionResult, ContextualAdvice, Priority, ProjectState, SafetyLevel, SuggestionContext,
};
use crate::utils::timestamp;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// A direct mapping above this runs straight away
pub const AUTO_RUN_DIRECT_THRESHOLD: f64 = 0.85;

/// A safe top suggestion above this runs straight away
pub const AUTO_RUN_SUGGESTION_THRESHOLD: f64 = 0.75;

/// Returned when nothing in the request is recognized
const FALLBACK_HINTS: &[(&str, &str)] = &[
    ("make dev-status", "Check development environment status"),
    ("make dev-up", "Start development environment"),
    ("make help", "Show all available commands"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandHint {
    pub command: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_level: Option<SafetyLevel>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub requires_confirmation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckFirstResponse {
    pub executed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MakeCommandResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<Vec<String>>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<CommandHint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<ContextualAdvice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionView {
    pub command: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub safety_level: SafetyLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Vec<String>>,
    pub usage: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    AutoExecute,
    SuggestExecute,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub command: String,
    pub description: String,
    pub confidence: f64,
    pub args: BTreeMap<String, String>,
    pub requires_confirmation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_mapping: Option<MatchResult>,
    pub should_execute_directly: bool,
    pub suggestions: Vec<SuggestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contextual_advice: Option<ContextualAdvice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IntentAnalysisResponse {
    Analyzed {
        intent: String,
        analysis: IntentAnalysis,
        timestamp: String,
        #[serde(rename = "recommendedAction", skip_serializing_if = "Option::is_none")]
        recommended_action: Option<RecommendedAction>,
    },
    NoIntent {
        error: String,
        suggestions: Vec<SuggestionView>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextInfo {
    pub project_root: PathBuf,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSuggestionsResponse {
    pub intent: String,
    pub suggestions: Vec<SuggestionView>,
    pub context_info: ContextInfo,
}

impl MakeCommandBridge {
    /// Primary entry point: map a free-text request and run it when confident enough
    pub async fn check_make_commands_first(
        &self,
        user_request: &str,
        auto_execute: bool,
    ) -> CheckFirstResponse {
        info!(request = %user_request, "Checking make commands first");
        let analysis = self.auto_engine.analyze_intent(user_request, None).await;

        if auto_execute
            && let Some(direct) = analysis
                .direct_mapping
                .as_ref()
                .filter(|d| d.confidence > AUTO_RUN_DIRECT_THRESHOLD)
        {
            // Free text is never the caller's confirmation
            if direct.confirm {
                info!(make_target = %direct.make_target, "Mapping requires confirmation, not executing");
                return CheckFirstResponse {
                    executed: false,
                    command: Some(direct.make_target.clone()),
                    result: None,
                    confidence: Some(direct.confidence),
                    follow_up: None,
                    message: format!(
                        "make {} requires confirmation. Run it with execute_make_command and confirm: true.",
                        direct.make_target
                    ),
                    suggestions: vec![CommandHint {
                        command: format!("make {}", direct.make_target),
                        description: direct.description.clone(),
                        confidence: Some(direct.confidence),
                        safety_level: None,
                        requires_confirmation: true,
                    }],
                    advice: analysis.contextual_advice,
                };
            }

            info!(make_target = %direct.make_target, confidence = direct.confidence, "High confidence mapping, executing");
            let args: BTreeMap<String, Value> = direct
                .args
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            let result = self
                .execute_make_command(&direct.make_target, &args, false)
                .await;
            self.auto_engine
                .learn_from_execution(user_request, &direct.make_target, result.success);

            return CheckFirstResponse {
                executed: true,
                command: Some(direct.make_target.clone()),
                result: Some(result),
                confidence: Some(direct.confidence),
                follow_up: Some(direct.follow_up.clone()),
                message: format!("Executed: make {}", direct.make_target),
                suggestions: Vec::new(),
                advice: None,
            };
        }

        let Some(top) = analysis.suggestions.first() else {
            return CheckFirstResponse {
                executed: false,
                command: None,
                result: None,
                confidence: None,
                follow_up: None,
                message: "No direct Make command match found. Try \"list all make commands\" or be more specific."
                    .to_string(),
                suggestions: FALLBACK_HINTS
                    .iter()
                    .map(|(command, description)| CommandHint {
                        command: command.to_string(),
                        description: description.to_string(),
                        confidence: None,
                        safety_level: None,
                        requires_confirmation: false,
                    })
                    .collect(),
                advice: None,
            };
        };

        if auto_execute
            && top.confidence > AUTO_RUN_SUGGESTION_THRESHOLD
            && top.safety_level == SafetyLevel::Safe
        {
            info!(make_target = %top.make_target, confidence = top.confidence, "Executing top suggestion");
            let result = self
                .execute_make_command(&top.make_target, &BTreeMap::new(), false)
                .await;
            self.auto_engine
                .learn_from_execution(user_request, &top.make_target, result.success);

            return CheckFirstResponse {
                executed: true,
                command: Some(top.make_target.clone()),
                result: Some(result),
                confidence: Some(top.confidence),
                follow_up: None,
                message: format!("Based on your request, I executed: make {}", top.make_target),
                suggestions: Vec::new(),
                advice: None,
            };
        }

        CheckFirstResponse {
            executed: false,
            command: None,
            result: None,
            confidence: None,
            follow_up: None,
            message: "Here are relevant Make commands for your request:".to_string(),
            suggestions: analysis
                .suggestions
                .iter()
                .map(|s| CommandHint {
                    command: format!("make {}", s.make_target),
                    description: s.description.clone(),
                    confidence: Some(s.confidence),
                    safety_level: Some(s.safety_level),
                    requires_confirmation: false,
                })
                .collect(),
            advice: analysis.contextual_advice,
        }
    }

    /// Full analysis envelope with a recommended action when a direct mapping exists
    pub async fn analyze_user_intent(
        &self,
        intent: Option<&str>,
        current_state: Option<ProjectState>,
    ) -> IntentAnalysisResponse {
        let Some(intent) = intent.filter(|i| !i.trim().is_empty()) else {
            return IntentAnalysisResponse::NoIntent {
                error: "No intent provided".to_string(),
                suggestions: Vec::new(),
            };
        };

        let AutoSuggestionResult {
            direct_mapping,
            suggestions,
            contextual_advice,
            should_execute_directly,
        } = self.auto_engine.analyze_intent(intent, current_state).await;

        let recommended_action = direct_mapping.as_ref().map(|d| RecommendedAction {
            kind: if should_execute_directly {
                ActionKind::AutoExecute
            } else {
                ActionKind::SuggestExecute
            },
            command: d.make_target.clone(),
            description: d.description.clone(),
            confidence: d.confidence,
            args: d.args.clone(),
            requires_confirmation: d.confirm,
        });

        IntentAnalysisResponse::Analyzed {
            intent: intent.to_string(),
            analysis: IntentAnalysis {
                direct_mapping,
                should_execute_directly,
                suggestions: suggestions
                    .into_iter()
                    .map(|s| SuggestionView {
                        usage: format!("make {}", s.make_target),
                        command: s.make_target,
                        description: s.description,
                        priority: s.priority,
                        category: s.category,
                        safety_level: s.safety_level,
                        confidence: Some(s.confidence),
                        prerequisites: None,
                    })
                    .collect(),
                contextual_advice,
            },
            timestamp: timestamp(),
            recommended_action,
        }
    }

    /// Rule-based suggestions only, with project context attached
    pub async fn get_command_suggestions(
        &self,
        intent: Option<&str>,
        current_state: Option<ProjectState>,
    ) -> CommandSuggestionsResponse {
        let context = SuggestionContext {
            user_intent: intent.map(str::to_string),
            project_state: current_state,
            current_directory: Some(self.project_root.clone()),
            ..Default::default()
        };
        let suggestions = self.suggestion_engine.get_suggestions(&context).await;

        CommandSuggestionsResponse {
            intent: intent.unwrap_or("general").to_string(),
            suggestions: suggestions
                .into_iter()
                .map(|s| SuggestionView {
                    usage: format!("make {}", s.command),
                    command: s.command,
                    description: s.reason,
                    priority: s.priority,
                    category: s.category,
                    safety_level: s.safety_level,
                    confidence: None,
                    prerequisites: Some(s.prerequisites),
                })
                .collect(),
            context_info: ContextInfo {
                project_root: self.project_root.clone(),
                timestamp: timestamp(),
            },
        }
    }
}
