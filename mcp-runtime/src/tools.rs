//! Static tool catalog advertised through `tools/list`.

use serde_json::{Value, json};

#[derive(Debug)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }
}

fn string_prop(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn max_count_prop(noun: &str) -> Value {
    json!({
        "type": "integer",
        "description": format!("Maximum number of {noun} to return"),
        "default": 100,
        "minimum": 0
    })
}

fn id_only_schema(field: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": { field: string_prop(description) },
        "required": [field]
    })
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        // Tasks
        ToolDefinition {
            name: "list_tasks",
            description: "Get list of tasks from SingularityApp. Can filter by project, tags, date range, etc.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "project_id": string_prop("Filter by project ID (e.g., P-123)"),
                    "tag_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Only tasks carrying these tag IDs"
                    },
                    "start_date_from": string_prop(
                        "Filter tasks starting from this date (ISO 8601, e.g., 2024-01-01T00:00:00)"
                    ),
                    "start_date_to": string_prop(
                        "Filter tasks up to this date (ISO 8601, e.g., 2024-01-01T23:59:59)"
                    ),
                    "convert_to_utc": {
                        "type": "boolean",
                        "description": "Convert start_date_from/start_date_to to UTC first; values without an offset are read as local time",
                        "default": false
                    },
                    "include_archived": {
                        "type": "boolean",
                        "description": "Include archived tasks",
                        "default": false
                    },
                    "include_removed": {
                        "type": "boolean",
                        "description": "Include removed tasks",
                        "default": false
                    },
                    "include_all_recurrence_instances": {
                        "type": "boolean",
                        "description": "Expand every instance of recurring tasks"
                    },
                    "max_count": max_count_prop("tasks")
                }
            }),
        },
        ToolDefinition {
            name: "list_inbox_tasks",
            description: "Get tasks that belong to no project (the Inbox)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "include_archived": {
                        "type": "boolean",
                        "description": "Include archived tasks",
                        "default": false
                    },
                    "max_count": max_count_prop("tasks")
                }
            }),
        },
        ToolDefinition {
            name: "get_task",
            description: "Get a specific task by ID",
            input_schema: id_only_schema("task_id", "Task ID (e.g., T-123)"),
        },
        ToolDefinition {
            name: "create_task",
            description: "Create a new task in SingularityApp",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": string_prop("Task title"),
                    "start": string_prop(
                        "Start date (ISO 8601, e.g., 2024-01-01T00:00:00). If not specified, the task goes to Inbox."
                    ),
                    "note": string_prop("Task description/notes"),
                    "priority": {
                        "type": "integer",
                        "description": "Priority: 0=high, 1=normal, 2=low",
                        "default": 1,
                        "enum": [0, 1, 2]
                    },
                    "project_id": string_prop(
                        "Project ID to add the task to (must start with P-; anything else creates the task without a project)"
                    ),
                    "parent": string_prop("Parent task ID (for creating subtasks)")
                },
                "required": ["title"]
            }),
        },
        ToolDefinition {
            name: "update_task",
            description: "Update an existing task. Only the supplied fields change.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "task_id": string_prop("Task ID to update"),
                    "title": string_prop("New task title"),
                    "start": string_prop("New start date (ISO 8601, e.g., 2024-01-01T00:00:00)"),
                    "note": string_prop("New task description"),
                    "priority": {
                        "type": "integer",
                        "description": "New priority: 0=high, 1=normal, 2=low",
                        "enum": [0, 1, 2]
                    },
                    "project_id": string_prop("Move the task to this project (must start with P-)")
                },
                "required": ["task_id"]
            }),
        },
        ToolDefinition {
            name: "complete_task",
            description: "Mark a task as completed today",
            input_schema: id_only_schema("task_id", "Task ID to complete"),
        },
        ToolDefinition {
            name: "delete_task",
            description: "Delete a task permanently",
            input_schema: id_only_schema("task_id", "Task ID to delete"),
        },
        ToolDefinition {
            name: "set_task_tags",
            description: "Replace all tags on a task",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "task_id": string_prop("Task ID"),
                    "tag_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Complete list of tag IDs; an empty list clears all tags"
                    }
                },
                "required": ["task_id", "tag_ids"]
            }),
        },
        ToolDefinition {
            name: "add_task_tag",
            description: "Add one tag to a task, keeping its other tags",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "task_id": string_prop("Task ID"),
                    "tag_id": string_prop("Tag ID to add")
                },
                "required": ["task_id", "tag_id"]
            }),
        },
        ToolDefinition {
            name: "remove_task_tag",
            description: "Remove one tag from a task, keeping its other tags",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "task_id": string_prop("Task ID"),
                    "tag_id": string_prop("Tag ID to remove")
                },
                "required": ["task_id", "tag_id"]
            }),
        },
        // Projects
        ToolDefinition {
            name: "list_projects",
            description: "Get list of all projects",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "include_archived": {
                        "type": "boolean",
                        "description": "Include archived projects",
                        "default": false
                    },
                    "include_removed": {
                        "type": "boolean",
                        "description": "Include removed projects",
                        "default": false
                    },
                    "max_count": max_count_prop("projects")
                }
            }),
        },
        ToolDefinition {
            name: "get_project",
            description: "Get a specific project by ID",
            input_schema: id_only_schema("project_id", "Project ID (e.g., P-123)"),
        },
        ToolDefinition {
            name: "create_project",
            description: "Create a new project",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": string_prop("Project title"),
                    "note": string_prop("Project description"),
                    "color": string_prop("Project color in HEX format (e.g., #ad1457)"),
                    "emoji": string_prop("Emoji code point in hex (e.g., 1f49e)")
                },
                "required": ["title"]
            }),
        },
        ToolDefinition {
            name: "update_project",
            description: "Update an existing project. Only the supplied fields change.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "project_id": string_prop("Project ID to update"),
                    "title": string_prop("New project title"),
                    "note": string_prop("New project description"),
                    "color": string_prop("New color in HEX format"),
                    "emoji": string_prop("New emoji code point in hex")
                },
                "required": ["project_id"]
            }),
        },
        ToolDefinition {
            name: "delete_project",
            description: "Delete a project permanently",
            input_schema: id_only_schema("project_id", "Project ID to delete"),
        },
        // Habits
        ToolDefinition {
            name: "list_habits",
            description: "Get list of all habits",
            input_schema: json!({
                "type": "object",
                "properties": { "max_count": max_count_prop("habits") }
            }),
        },
        ToolDefinition {
            name: "create_habit",
            description: "Create a new habit",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": string_prop("Habit title"),
                    "description": string_prop("Habit description"),
                    "color": string_prop("Color name (red, pink, purple, blue, green, etc.)")
                },
                "required": ["title"]
            }),
        },
        ToolDefinition {
            name: "delete_habit",
            description: "Delete a habit permanently",
            input_schema: id_only_schema("habit_id", "Habit ID to delete"),
        },
        ToolDefinition {
            name: "mark_habit",
            description: "Record habit progress for a specific date",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "habit_id": string_prop("Habit ID"),
                    "date": string_prop(
                        "Date (ISO 8601, e.g., 2024-01-01T00:00:00). Defaults to local midnight today."
                    ),
                    "done": {
                        "type": "boolean",
                        "description": "true=done, false=not done (keeps streak)",
                        "default": true
                    },
                    "progress": {
                        "type": "integer",
                        "description": "Explicit progress code: 0=no change, 1=not done (keeps streak), 2=done. Overrides 'done'.",
                        "enum": [0, 1, 2]
                    }
                },
                "required": ["habit_id"]
            }),
        },
        // Tags
        ToolDefinition {
            name: "list_tags",
            description: "Get list of all tags",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "include_removed": {
                        "type": "boolean",
                        "description": "Include removed tags",
                        "default": false
                    },
                    "max_count": max_count_prop("tags")
                }
            }),
        },
        ToolDefinition {
            name: "get_tag",
            description: "Get a specific tag by ID",
            input_schema: id_only_schema("tag_id", "Tag ID"),
        },
        ToolDefinition {
            name: "create_tag",
            description: "Create a new tag",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": string_prop("Tag title"),
                    "parent": string_prop("Parent tag ID for nested tags")
                },
                "required": ["title"]
            }),
        },
        ToolDefinition {
            name: "update_tag",
            description: "Rename a tag or move it under another parent",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "tag_id": string_prop("Tag ID to update"),
                    "title": string_prop("New tag title"),
                    "parent": string_prop("New parent tag ID")
                },
                "required": ["tag_id"]
            }),
        },
        ToolDefinition {
            name: "delete_tag",
            description: "Delete a tag permanently",
            input_schema: id_only_schema("tag_id", "Tag ID to delete"),
        },
        // Checklist
        ToolDefinition {
            name: "add_checklist_item",
            description: "Add a checklist item to a task",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "task_id": string_prop("Task ID to add the checklist item to"),
                    "title": string_prop("Checklist item text")
                },
                "required": ["task_id", "title"]
            }),
        },
        // Utility
        ToolDefinition {
            name: "get_today_tasks",
            description: "Get all tasks scheduled for today in the configured local timezone",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
    ]
}

pub fn tools_list_payload() -> Value {
    let tools: Vec<Value> = tool_definitions()
        .iter()
        .map(ToolDefinition::to_value)
        .collect();
    json!({ "tools": tools })
}
