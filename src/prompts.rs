//! Instruction templates for the vision model and their placeholder rendering.

use crate::models::UserData;

pub const ANALYSIS_SYSTEM: &str = include_str!("../data/prompts/analysis_system.txt");
pub const ANALYSIS_USER: &str = include_str!("../data/prompts/analysis_user.txt");

pub const NOT_SPECIFIED: &str = "Not specified";
pub const GENERAL_IMPROVEMENT: &str = "General improvement";

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Fill the gender, age range and focus area placeholders of `template`.
///
/// Blank or missing values fall back to "Not specified", and an empty focus
/// list to "General improvement".
pub fn build_analysis_prompt(template: &str, user_data: Option<&UserData>) -> String {
    let gender = user_data
        .and_then(|u| u.gender)
        .and_then(|g| g.as_prompt_value())
        .unwrap_or(NOT_SPECIFIED);

    let age_range = user_data
        .and_then(|u| u.age_range.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NOT_SPECIFIED);

    let focus_areas = user_data
        .and_then(|u| u.focus_areas.as_ref())
        .map(|areas| {
            areas
                .iter()
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| GENERAL_IMPROVEMENT.to_string());

    render(
        template,
        &[
            ("gender", gender),
            ("ageRange", age_range),
            ("focusAreas", &focus_areas),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, MetricCategory};
    use crate::tier::Tier;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        assert_eq!(render("{{a}} {{b}}", &[("a", "x")]), "x {{b}}");
    }

    #[test]
    fn test_prompts_are_non_empty() {
        assert!(!ANALYSIS_SYSTEM.is_empty());
        assert!(ANALYSIS_SYSTEM.contains("JSON"));
        assert!(!ANALYSIS_USER.is_empty());
    }

    #[test]
    fn test_user_template_has_placeholders() {
        assert!(ANALYSIS_USER.contains("{{gender}}"));
        assert!(ANALYSIS_USER.contains("{{ageRange}}"));
        assert!(ANALYSIS_USER.contains("{{focusAreas}}"));
    }

    #[test]
    fn test_defaults_without_user_data() {
        let prompt = build_analysis_prompt(ANALYSIS_USER, None);
        assert!(prompt.contains("- Gender: Not specified"));
        assert!(prompt.contains("- Age Range: Not specified"));
        assert!(prompt.contains("- Focus Areas: General improvement"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_substitutes_user_data() {
        let user = UserData {
            name: Some("Sam".to_string()),
            gender: Some(Gender::Male),
            age_range: Some("18-24".to_string()),
            focus_areas: Some(vec!["jawline".to_string(), "skin".to_string()]),
        };

        let prompt = build_analysis_prompt(ANALYSIS_USER, Some(&user));
        assert!(prompt.contains("- Gender: male"));
        assert!(prompt.contains("- Age Range: 18-24"));
        assert!(prompt.contains("- Focus Areas: jawline, skin"));
        // the name is not part of the instructions
        assert!(!prompt.contains("Sam"));
    }

    #[test]
    fn test_partial_user_data_falls_back_per_field() {
        let user = UserData {
            gender: Some(Gender::Female),
            focus_areas: Some(vec![]),
            ..Default::default()
        };

        let prompt = build_analysis_prompt(ANALYSIS_USER, Some(&user));
        assert!(prompt.contains("- Gender: female"));
        assert!(prompt.contains("- Age Range: Not specified"));
        assert!(prompt.contains("- Focus Areas: General improvement"));
    }

    #[test]
    fn test_template_lists_metrics_in_canonical_order() {
        let mut cursor = 0;
        for category in MetricCategory::ALL {
            let id = format!("\"id\": \"{}\"", category.id());
            let label = format!("\"label\": \"{}\"", category.label());
            let id_at = ANALYSIS_USER[cursor..]
                .find(&id)
                .unwrap_or_else(|| panic!("missing or out of order: {}", category.id()));
            assert!(ANALYSIS_USER[cursor + id_at..].starts_with(&id));
            assert!(ANALYSIS_USER[cursor + id_at..].contains(&label));
            cursor += id_at + id.len();
        }
    }

    #[test]
    fn test_template_key_order_is_stable() {
        let keys = [
            "\"currentScore\"",
            "\"potentialScore\"",
            "\"currentTier\"",
            "\"potentialTier\"",
            "\"metrics\"",
            "\"summary\"",
            "\"priorityActions\"",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| ANALYSIS_USER.find(k).expect("key present"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_template_names_every_tier() {
        for tier in Tier::ALL {
            assert!(ANALYSIS_USER.contains(tier.as_str()));
        }
        assert!(ANALYSIS_USER.contains("1-10"));
    }

    #[test]
    fn test_template_braces_are_balanced() {
        let opens = ANALYSIS_USER.matches('{').count();
        let closes = ANALYSIS_USER.matches('}').count();
        assert_eq!(opens, closes);
        let opens = ANALYSIS_USER.matches('[').count();
        let closes = ANALYSIS_USER.matches(']').count();
        assert_eq!(opens, closes);
    }
}
