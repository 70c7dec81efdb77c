//! System preamble and greeting templates
//!
//! The guide answers questions about the spot a visitor is standing at.
//! [`ContextInfo`] carries what is known about that spot; every field falls
//! back to a localized default when absent or empty.

use serde::{Deserialize, Serialize};

/// Place name used in the preamble when none is known
pub const DEFAULT_PLACE_NAME: &str = "学校大门";

/// Placeholder for a missing brief or detail
pub const DEFAULT_FIELD_TEXT: &str = "暂无";

/// Appended to a bot answer that was stopped by the user
pub const CANCEL_MARKER: &str = "\n\n[已取消]";

/// Error text shown when a failure carries no message of its own
pub const STREAM_FAILURE_FALLBACK: &str = "流读取出错";

/// What is known about the visitor's current location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextInfo {
    /// Place name
    #[serde(default)]
    pub name: Option<String>,
    /// One-line description
    #[serde(default)]
    pub brief: Option<String>,
    /// Longer description
    #[serde(default)]
    pub detail: Option<String>,
}

impl ContextInfo {
    /// Creates a fully populated context
    pub fn new(
        name: impl Into<String>,
        brief: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            brief: Some(brief.into()),
            detail: Some(detail.into()),
        }
    }
}

/// Names that appear in the templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptIdentity<'a> {
    /// Assistant persona name
    pub assistant_name: &'a str,
    /// Short school name
    pub school_name: &'a str,
    /// District prefix used when introducing the school
    pub school_location: &'a str,
}

fn field_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value.as_deref().filter(|s| !s.is_empty()).unwrap_or(fallback)
}

/// Builds the system preamble sent ahead of every conversation
///
/// # Examples
///
/// ```
/// use guidechat::prompts::{build_system_prompt, ContextInfo, PromptIdentity};
///
/// let identity = PromptIdentity {
///     assistant_name: "小嘉",
///     school_name: "嘉祥外国语学校",
///     school_location: "成都市锦江区",
/// };
/// let prompt = build_system_prompt(&identity, &ContextInfo::default());
/// assert!(prompt.contains("小嘉"));
/// assert!(prompt.contains("学校大门"));
/// assert!(prompt.contains("暂无"));
/// ```
pub fn build_system_prompt(identity: &PromptIdentity<'_>, info: &ContextInfo) -> String {
    let place = field_or(&info.name, DEFAULT_PLACE_NAME);
    let brief = field_or(&info.brief, DEFAULT_FIELD_TEXT);
    let detail = field_or(&info.detail, DEFAULT_FIELD_TEXT);

    format!(
        "你的名字叫{assistant}，你将为来到{location}{school}的来宾介绍学校。\n\
         现在用户正在{place}。\n\
         有一些关于{place}的相关信息：\n\
         简介：{brief}\n\
         详细：{detail}\n\
         如果没有相关信息，请据实回答不要编造。如果用户询问无关的问题，请礼貌拒绝回答。",
        assistant = identity.assistant_name,
        location = identity.school_location,
        school = identity.school_name,
        place = place,
        brief = brief,
        detail = detail,
    )
}

/// Builds the greeting shown when a session starts
///
/// # Examples
///
/// ```
/// use guidechat::prompts::{build_greeting, ContextInfo};
///
/// let info = ContextInfo::new("图书馆", "学校图书中心", "藏书丰富。");
/// assert_eq!(build_greeting("嘉祥外国语学校", &info), "这里是 图书馆。藏书丰富。");
/// assert_eq!(build_greeting("嘉祥外国语学校", &ContextInfo::default()), "这里是 嘉祥外国语学校。");
/// ```
pub fn build_greeting(school_name: &str, info: &ContextInfo) -> String {
    format!(
        "这里是 {}。{}",
        field_or(&info.name, school_name),
        field_or(&info.detail, "")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> PromptIdentity<'static> {
        PromptIdentity {
            assistant_name: "小嘉",
            school_name: "嘉祥外国语学校",
            school_location: "成都市锦江区",
        }
    }

    #[test]
    fn test_system_prompt_uses_context_fields() {
        let info = ContextInfo::new("体育馆", "学校体育活动场所", "这里有各种体育设施。");
        let prompt = build_system_prompt(&identity(), &info);
        assert!(prompt.contains("现在用户正在体育馆"));
        assert!(prompt.contains("简介：学校体育活动场所"));
        assert!(prompt.contains("详细：这里有各种体育设施。"));
        assert!(prompt.contains("成都市锦江区嘉祥外国语学校"));
        assert!(!prompt.contains(DEFAULT_FIELD_TEXT));
    }

    #[test]
    fn test_system_prompt_treats_empty_fields_as_missing() {
        let info = ContextInfo {
            name: Some(String::new()),
            brief: None,
            detail: Some(String::new()),
        };
        let prompt = build_system_prompt(&identity(), &info);
        assert!(prompt.contains("现在用户正在学校大门"));
        assert!(prompt.contains("简介：暂无"));
        assert!(prompt.contains("详细：暂无"));
    }

    #[test]
    fn test_greeting_without_detail() {
        let info = ContextInfo {
            name: Some("图书馆".into()),
            ..Default::default()
        };
        assert_eq!(build_greeting("嘉祥外国语学校", &info), "这里是 图书馆。");
    }

    #[test]
    fn test_context_info_deserializes_partial_json() {
        let info: ContextInfo = serde_json::from_str(r#"{"name":"图书馆"}"#).unwrap();
        assert_eq!(info.name.as_deref(), Some("图书馆"));
        assert!(info.brief.is_none());
    }
}
