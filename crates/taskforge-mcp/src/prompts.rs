//! Static prompt catalog served through `prompts/list` and `prompts/get`.

use serde_json::{json, Value};

use crate::dispatch::DispatchError;

/// Catalog listing for `prompts/list`.
#[must_use]
pub fn list() -> Value {
    json!({
        "prompts": [
            {
                "name": "project_summary",
                "description": "Generate a comprehensive summary of a project and its tasks"
            },
            {
                "name": "task_report",
                "description": "Generate a detailed report of tasks by status"
            },
            {
                "name": "project_planning",
                "description": "Help plan a new project with suggested tasks"
            }
        ]
    })
}

/// Resolve a `prompts/get` request into a message template.
///
/// # Errors
///
/// Returns invalid-params for an unknown prompt name or missing arguments.
pub fn get(params: Option<&Value>) -> Result<Value, DispatchError> {
    let params = params
        .ok_or_else(|| DispatchError::InvalidParams("missing params".to_string()))?;
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| DispatchError::InvalidParams("missing prompt name".to_string()))?;
    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    let (description, text) = match name {
        "project_summary" => {
            let project_id = numeric_argument(&arguments, "projectId")?;
            (
                "Generates a comprehensive summary of a project",
                format!(
                    "Please provide a comprehensive summary of project ID {project_id} \
                     including all tasks, their current status, and any notable insights."
                ),
            )
        }
        "task_report" => {
            let status = arguments
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("TODO");
            (
                "Generates a report of tasks by status",
                format!(
                    "Generate a detailed report of all tasks with status '{status}'. \
                     Include task titles, descriptions, and the projects they belong to."
                ),
            )
        }
        "project_planning" => {
            let project_name = arguments
                .get("projectName")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    DispatchError::InvalidParams("missing argument 'projectName'".to_string())
                })?;
            (
                "Helps plan a new project",
                format!(
                    "I'm planning a new project called '{project_name}'. Can you help me \
                     break it down into manageable tasks? Please suggest appropriate task \
                     titles, descriptions, and recommended statuses."
                ),
            )
        }
        other => {
            return Err(DispatchError::InvalidParams(format!(
                "unknown prompt: {other}"
            )))
        }
    };

    Ok(json!({
        "description": description,
        "messages": [{
            "role": "user",
            "content": { "type": "text", "text": text }
        }]
    }))
}

fn numeric_argument(arguments: &Value, key: &str) -> Result<i64, DispatchError> {
    let value = arguments
        .get(key)
        .ok_or_else(|| DispatchError::InvalidParams(format!("missing argument '{key}'")))?;
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| DispatchError::InvalidParams(format!("argument '{key}' must be numeric")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_three_prompts() {
        let listing = list();
        assert_eq!(listing["prompts"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn project_summary_requires_project_id() {
        let params = json!({"name": "project_summary", "arguments": {"projectId": 4}});
        let result = get(Some(&params)).unwrap();
        let text = result["messages"][0]["content"]["text"].as_str().unwrap();
        assert!(text.contains("project ID 4"));

        let params = json!({"name": "project_summary"});
        assert!(get(Some(&params)).is_err());
    }

    #[test]
    fn task_report_defaults_to_todo() {
        let params = json!({"name": "task_report"});
        let result = get(Some(&params)).unwrap();
        let text = result["messages"][0]["content"]["text"].as_str().unwrap();
        assert!(text.contains("'TODO'"));
    }

    #[test]
    fn unknown_prompt_is_invalid_params() {
        let params = json!({"name": "nope"});
        let err = get(Some(&params)).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidParams(_)));
    }
}
