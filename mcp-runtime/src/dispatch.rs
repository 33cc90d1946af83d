//! Maps a tool name plus its JSON arguments onto exactly one client operation.
//!
//! Arguments are read lazily: a missing required field is reported when the
//! operation first needs it, not by pre-validating against the schema.

use chrono::Utc;
use serde_json::{Map, Value, json};
use singularity_core::models::{
    DEFAULT_MAX_COUNT, HabitProgress, HabitProgressMark, HabitQuery, NewChecklistItem, NewHabit,
    NewProject, NewTag, NewTask, Priority, ProjectPatch, ProjectQuery, TagPatch, TagQuery,
    TaskPatch, TaskQuery,
};

use crate::client::SingularityClient;
use crate::error::ToolError;

pub async fn execute_tool(
    client: &SingularityClient,
    name: &str,
    args: &Map<String, Value>,
) -> Result<Value, ToolError> {
    match name {
        // Tasks
        "list_tasks" => {
            let query = task_query(client, args)?;
            Ok(Value::Array(client.list_tasks(&query).await?))
        }
        "list_inbox_tasks" => {
            let query = TaskQuery {
                include_archived: arg_bool(args, "include_archived", false)?,
                max_count: Some(max_count(args)?),
                ..TaskQuery::default()
            };
            Ok(Value::Array(client.list_inbox_tasks(&query).await?))
        }
        "get_task" => {
            let task_id = required_id(args, "task_id")?;
            Ok(client.get_task(&task_id).await?)
        }
        "create_task" => {
            let task = NewTask {
                title: required_string(args, "title")?,
                priority: arg_priority(args)?.unwrap_or_default(),
                start: arg_optional_string(args, "start")?,
                note: arg_optional_string(args, "note")?,
                project: None,
                parent: arg_optional_string(args, "parent")?,
            };
            let project_id = arg_raw_string(args, "project_id")?;
            Ok(client.create_task(task, project_id.as_deref()).await?)
        }
        "update_task" => {
            let task_id = required_id(args, "task_id")?;
            let patch = TaskPatch {
                title: arg_optional_string(args, "title")?,
                start: arg_optional_string(args, "start")?,
                note: arg_optional_string(args, "note")?,
                priority: arg_priority(args)?,
                ..TaskPatch::default()
            };
            let project_id = arg_raw_string(args, "project_id")?;
            Ok(client
                .update_task(&task_id, patch, project_id.as_deref())
                .await?)
        }
        "complete_task" => {
            let task_id = required_id(args, "task_id")?;
            Ok(client.complete_task(&task_id).await?)
        }
        "delete_task" => {
            let task_id = required_id(args, "task_id")?;
            client.delete_task(&task_id).await?;
            Ok(deleted("task_id", task_id))
        }
        "set_task_tags" => {
            let task_id = required_id(args, "task_id")?;
            let tag_ids = arg_string_list(args, "tag_ids")?
                .ok_or_else(|| ToolError::MissingArgument("tag_ids".to_string()))?;
            Ok(client.set_task_tags(&task_id, tag_ids).await?)
        }
        "add_task_tag" => {
            let task_id = required_id(args, "task_id")?;
            let tag_id = required_id(args, "tag_id")?;
            Ok(client.add_task_tag(&task_id, &tag_id).await?)
        }
        "remove_task_tag" => {
            let task_id = required_id(args, "task_id")?;
            let tag_id = required_id(args, "tag_id")?;
            Ok(client.remove_task_tag(&task_id, &tag_id).await?)
        }

        // Projects
        "list_projects" => {
            let query = ProjectQuery {
                include_archived: arg_bool(args, "include_archived", false)?,
                include_removed: arg_bool(args, "include_removed", false)?,
                max_count: Some(max_count(args)?),
            };
            Ok(Value::Array(client.list_projects(&query).await?))
        }
        "get_project" => {
            let project_id = required_id(args, "project_id")?;
            Ok(client.get_project(&project_id).await?)
        }
        "create_project" => {
            let project = NewProject {
                title: required_string(args, "title")?,
                note: arg_optional_string(args, "note")?,
                color: arg_optional_string(args, "color")?,
                emoji: arg_optional_string(args, "emoji")?,
            };
            Ok(client.create_project(&project).await?)
        }
        "update_project" => {
            let project_id = required_id(args, "project_id")?;
            let patch = ProjectPatch {
                title: arg_optional_string(args, "title")?,
                note: arg_optional_string(args, "note")?,
                color: arg_optional_string(args, "color")?,
                emoji: arg_optional_string(args, "emoji")?,
            };
            Ok(client.update_project(&project_id, &patch).await?)
        }
        "delete_project" => {
            let project_id = required_id(args, "project_id")?;
            client.delete_project(&project_id).await?;
            Ok(deleted("project_id", project_id))
        }

        // Habits
        "list_habits" => {
            let query = HabitQuery {
                max_count: Some(max_count(args)?),
            };
            Ok(Value::Array(client.list_habits(&query).await?))
        }
        "create_habit" => {
            let habit = NewHabit {
                title: required_string(args, "title")?,
                description: arg_optional_string(args, "description")?,
                color: arg_optional_string(args, "color")?,
            };
            Ok(client.create_habit(&habit).await?)
        }
        "delete_habit" => {
            let habit_id = required_id(args, "habit_id")?;
            client.delete_habit(&habit_id).await?;
            Ok(deleted("habit_id", habit_id))
        }
        "mark_habit" => {
            let habit = required_id(args, "habit_id")?;
            let date = match arg_optional_string(args, "date")? {
                Some(date) => date,
                None => client.zone().local_midnight(Utc::now()),
            };
            let progress = match arg_optional_i64(args, "progress")? {
                Some(code) => HabitProgress::from_code(code)
                    .map_err(|e| ToolError::invalid("progress", e.to_string()))?,
                None => HabitProgress::from_done(arg_bool(args, "done", true)?),
            };
            let mark = HabitProgressMark {
                habit,
                date,
                progress,
            };
            Ok(client.mark_habit(&mark).await?)
        }

        // Tags
        "list_tags" => {
            let query = TagQuery {
                include_removed: arg_bool(args, "include_removed", false)?,
                max_count: Some(max_count(args)?),
            };
            Ok(Value::Array(client.list_tags(&query).await?))
        }
        "get_tag" => {
            let tag_id = required_id(args, "tag_id")?;
            Ok(client.get_tag(&tag_id).await?)
        }
        "create_tag" => {
            let tag = NewTag {
                title: required_string(args, "title")?,
                parent: arg_optional_string(args, "parent")?,
            };
            Ok(client.create_tag(&tag).await?)
        }
        "update_tag" => {
            let tag_id = required_id(args, "tag_id")?;
            let patch = TagPatch {
                title: arg_optional_string(args, "title")?,
                parent: arg_optional_string(args, "parent")?,
            };
            Ok(client.update_tag(&tag_id, &patch).await?)
        }
        "delete_tag" => {
            let tag_id = required_id(args, "tag_id")?;
            client.delete_tag(&tag_id).await?;
            Ok(deleted("tag_id", tag_id))
        }

        // Checklist
        "add_checklist_item" => {
            let parent = required_id(args, "task_id")?;
            let title = required_string(args, "title")?;
            let item = NewChecklistItem { title, parent };
            Ok(client.create_checklist_item(&item).await?)
        }

        "get_today_tasks" => Ok(Value::Array(client.today_tasks().await?)),

        _ => Err(ToolError::UnknownOperation(name.to_string())),
    }
}

fn task_query(client: &SingularityClient, args: &Map<String, Value>) -> Result<TaskQuery, ToolError> {
    let convert = arg_bool(args, "convert_to_utc", false)?;
    Ok(TaskQuery {
        project_id: arg_optional_string(args, "project_id")?,
        tag_ids: arg_string_list(args, "tag_ids")?.unwrap_or_default(),
        include_archived: arg_bool(args, "include_archived", false)?,
        include_removed: arg_bool(args, "include_removed", false)?,
        include_all_recurrence_instances: arg_optional_bool(
            args,
            "include_all_recurrence_instances",
        )?,
        start_date_from: date_filter(client, args, "start_date_from", convert)?,
        start_date_to: date_filter(client, args, "start_date_to", convert)?,
        max_count: Some(max_count(args)?),
    })
}

/// Date filters pass through verbatim unless the caller asked for UTC conversion.
fn date_filter(
    client: &SingularityClient,
    args: &Map<String, Value>,
    key: &str,
    convert: bool,
) -> Result<Option<String>, ToolError> {
    let Some(raw) = arg_optional_string(args, key)? else {
        return Ok(None);
    };
    if !convert {
        return Ok(Some(raw));
    }
    client
        .zone()
        .normalize_filter(&raw)
        .map(Some)
        .map_err(|e| ToolError::invalid(key, e.to_string()))
}

fn deleted(key: &str, id: String) -> Value {
    let mut payload = json!({ "status": "deleted" });
    payload[key] = Value::String(id);
    payload
}

fn max_count(args: &Map<String, Value>) -> Result<u64, ToolError> {
    Ok(arg_optional_u64(args, "max_count")?.unwrap_or(DEFAULT_MAX_COUNT))
}

fn arg_priority(args: &Map<String, Value>) -> Result<Option<Priority>, ToolError> {
    arg_optional_i64(args, "priority")?
        .map(|code| Priority::from_code(code).map_err(|e| ToolError::invalid("priority", e.to_string())))
        .transpose()
}

/// Text is passed through as given; only all-blank values are refused.
fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Err(ToolError::MissingArgument(key.to_string())),
        Some(Value::String(v)) if v.trim().is_empty() => {
            Err(ToolError::invalid(key, "must not be empty"))
        }
        Some(Value::String(v)) => Ok(v.clone()),
        Some(_) => Err(ToolError::invalid(key, "must be a string")),
    }
}

/// Identifiers lose surrounding whitespace picked up from copy and paste.
fn required_id(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    required_string(args, key).map(|id| id.trim().to_string())
}

/// Empty strings count as absent.
fn arg_optional_string(args: &Map<String, Value>, key: &str) -> Result<Option<String>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(v)) if v.trim().is_empty() => Ok(None),
        Some(Value::String(v)) => Ok(Some(v.clone())),
        Some(_) => Err(ToolError::invalid(key, "must be a string")),
    }
}

/// Like [`arg_optional_string`] but keeps empty strings, so the client can
/// tell "not given" from "given but blank".
fn arg_raw_string(args: &Map<String, Value>, key: &str) -> Result<Option<String>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(v)) => Ok(Some(v.clone())),
        Some(_) => Err(ToolError::invalid(key, "must be a string")),
    }
}

fn arg_bool(args: &Map<String, Value>, key: &str, default: bool) -> Result<bool, ToolError> {
    Ok(arg_optional_bool(args, key)?.unwrap_or(default))
}

fn arg_optional_bool(args: &Map<String, Value>, key: &str) -> Result<Option<bool>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(v)) => Ok(Some(*v)),
        Some(_) => Err(ToolError::invalid(key, "must be a boolean")),
    }
}

fn arg_optional_u64(args: &Map<String, Value>, key: &str) -> Result<Option<u64>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| ToolError::invalid(key, "must be an unsigned integer")),
        Some(_) => Err(ToolError::invalid(key, "must be an unsigned integer")),
    }
}

fn arg_optional_i64(args: &Map<String, Value>, key: &str) -> Result<Option<i64>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| ToolError::invalid(key, "must be an integer")),
        Some(_) => Err(ToolError::invalid(key, "must be an integer")),
    }
}

/// Accepts an array of strings or one comma-separated string. Blank entries are dropped.
fn arg_string_list(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<String>>, ToolError> {
    let items: Vec<&str> = match args.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(joined)) => joined.split(',').collect(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| ToolError::invalid(key, "items must be strings"))
            })
            .collect::<Result<_, _>>()?,
        Some(_) => {
            return Err(ToolError::invalid(
                key,
                "must be an array of strings or a comma-separated string",
            ));
        }
    };
    Ok(Some(
        items
            .into_iter()
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    ))
}
