//! Normalized client: one method per remote capability.
//!
//! Each method shapes its arguments into the exact query/body the API expects,
//! performs the call(s), and reconciles the response into one canonical shape.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use singularity_core::ids::{IdKind, ProjectAttachment, ValidationWarning, check_prefix};
use singularity_core::models::{
    DEFAULT_MAX_COUNT, HabitProgressMark, HabitQuery, NewChecklistItem, NewHabit, NewProject,
    NewTag, NewTask, ProjectPatch, ProjectQuery, TagPatch, TagQuery, TaskPatch, TaskQuery,
};
use singularity_core::reconcile::{
    CollectionKind, CollectionShape, EntityShape, task_has_project, task_tag_ids,
};
use singularity_core::time::LocalZone;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::transport::{ApiRequest, Transport};

#[derive(Clone)]
pub struct SingularityClient {
    transport: Arc<dyn Transport>,
    zone: LocalZone,
}

impl SingularityClient {
    pub fn new(transport: Arc<dyn Transport>, zone: LocalZone) -> Self {
        Self { transport, zone }
    }

    pub fn zone(&self) -> LocalZone {
        self.zone
    }

    // ---- tasks ----

    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Value>, ClientError> {
        let request = ApiRequest::get(&["task"]).with_query(query.to_query_pairs());
        let body = self.transport.execute(request).await?;
        let tasks = collection(CollectionKind::Tasks, body);
        debug!(count = tasks.len(), "tasks listed");
        Ok(tasks)
    }

    /// Tasks without a project. The API has no inbox filter, so this lists and
    /// filters locally.
    pub async fn list_inbox_tasks(&self, query: &TaskQuery) -> Result<Vec<Value>, ClientError> {
        let query = TaskQuery {
            project_id: None,
            ..query.clone()
        };
        let tasks = self.list_tasks(&query).await?;
        Ok(tasks
            .into_iter()
            .filter(|task| !task_has_project(task))
            .collect())
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Value, ClientError> {
        note_prefix("task_id", task_id, IdKind::Task);
        let body = self
            .transport
            .execute(ApiRequest::get(&["task", task_id]))
            .await?;
        Ok(entity(body))
    }

    /// Creates a task. `project_id` is attached only when it is non-empty and
    /// `P-`-prefixed; otherwise the task is created without a project.
    pub async fn create_task(
        &self,
        mut task: NewTask,
        project_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        task.project = attach_project(project_id);
        info!(
            title = %task.title,
            project = task.project.as_deref().unwrap_or("<none>"),
            priority = task.priority.code(),
            "creating task"
        );
        let body = self
            .transport
            .execute(ApiRequest::post(&["task"], to_body(&task)?))
            .await?;
        let created = entity(body);
        let task_id = created
            .get("id")
            .and_then(|id| id.as_str())
            .unwrap_or("<unknown>");
        info!(task_id, "task created");
        Ok(created)
    }

    /// Partial update. Only fields set on `patch` are sent.
    pub async fn update_task(
        &self,
        task_id: &str,
        mut patch: TaskPatch,
        project_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        patch.project = attach_project(project_id);
        self.patch_task(task_id, &patch).await
    }

    pub async fn complete_task(&self, task_id: &str) -> Result<Value, ClientError> {
        self.complete_task_at(task_id, Utc::now()).await
    }

    /// Completes a task by stamping its journal date with the local calendar
    /// day containing `now`.
    pub async fn complete_task_at(
        &self,
        task_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Value, ClientError> {
        let date = self.zone.today(now).format("%Y-%m-%d").to_string();
        self.patch_task(task_id, &TaskPatch::completion(date)).await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<(), ClientError> {
        note_prefix("task_id", task_id, IdKind::Task);
        self.transport
            .execute(ApiRequest::delete(&["task", task_id]))
            .await?;
        Ok(())
    }

    /// Replaces the task's whole tag set.
    pub async fn set_task_tags(
        &self,
        task_id: &str,
        tag_ids: Vec<String>,
    ) -> Result<Value, ClientError> {
        self.patch_task(task_id, &TaskPatch::tags(tag_ids)).await
    }

    /// Adds a tag by reading the current set and writing it back.
    ///
    /// Not atomic: a concurrent writer of the same task's tags between the
    /// read and the write loses its update. The API offers no compare-and-swap.
    pub async fn add_task_tag(&self, task_id: &str, tag_id: &str) -> Result<Value, ClientError> {
        let task = self.task_for_tag_edit(task_id).await?;
        let mut tags = task_tag_ids(&task);
        if tags.iter().any(|tag| tag == tag_id) {
            debug!(task_id, tag_id, "tag already on task; nothing to write");
            return Ok(Value::Object(task));
        }
        tags.push(tag_id.to_string());
        self.set_task_tags(task_id, tags).await
    }

    /// Removes a tag by reading the current set and writing it back. Same race
    /// as [`Self::add_task_tag`].
    pub async fn remove_task_tag(
        &self,
        task_id: &str,
        tag_id: &str,
    ) -> Result<Value, ClientError> {
        let task = self.task_for_tag_edit(task_id).await?;
        let mut tags = task_tag_ids(&task);
        if !tags.iter().any(|tag| tag == tag_id) {
            debug!(task_id, tag_id, "tag not on task; nothing to write");
            return Ok(Value::Object(task));
        }
        tags.retain(|tag| tag != tag_id);
        self.set_task_tags(task_id, tags).await
    }

    /// Reads a task whose tag set is about to be rewritten.
    ///
    /// Stricter than [`Self::get_task`]: the write replaces the whole set, so a
    /// body the current tags cannot be read from fails the call instead of
    /// degrading to an empty set.
    async fn task_for_tag_edit(&self, task_id: &str) -> Result<Map<String, Value>, ClientError> {
        note_prefix("task_id", task_id, IdKind::Task);
        let body = self
            .transport
            .execute(ApiRequest::get(&["task", task_id]))
            .await?;
        let task = match EntityShape::classify(body) {
            EntityShape::Object(task) => task,
            EntityShape::Unrecognized(found) => {
                return Err(unreadable_tags(task_id, &format!("task came back as {found}")));
            }
        };
        if !task.contains_key("id") {
            return Err(unreadable_tags(task_id, "task has no 'id' field"));
        }
        match task.get("tags") {
            None | Some(Value::Null) => Ok(task),
            Some(Value::Array(items)) if task_tag_ids(&task).len() == items.len() => Ok(task),
            Some(Value::Array(_)) => Err(unreadable_tags(
                task_id,
                "'tags' holds entries without an id",
            )),
            Some(_) => Err(unreadable_tags(task_id, "'tags' is not a list")),
        }
    }

    async fn patch_task(&self, task_id: &str, patch: &TaskPatch) -> Result<Value, ClientError> {
        note_prefix("task_id", task_id, IdKind::Task);
        let body = self
            .transport
            .execute(ApiRequest::patch(&["task", task_id], to_body(patch)?))
            .await?;
        Ok(entity(body))
    }

    pub async fn today_tasks(&self) -> Result<Vec<Value>, ClientError> {
        self.today_tasks_at(Utc::now()).await
    }

    /// Tasks starting within the local calendar day that contains `now`,
    /// without expanding recurring instances.
    pub async fn today_tasks_at(&self, now: DateTime<Utc>) -> Result<Vec<Value>, ClientError> {
        let range = self.zone.day_range(now);
        let query = TaskQuery {
            start_date_from: Some(range.start_param()),
            start_date_to: Some(range.end_param()),
            include_all_recurrence_instances: Some(false),
            max_count: Some(DEFAULT_MAX_COUNT),
            ..TaskQuery::default()
        };
        info!(
            zone = %self.zone.describe(),
            from = query.start_date_from.as_deref().unwrap_or_default(),
            to = query.start_date_to.as_deref().unwrap_or_default(),
            "listing today's tasks"
        );
        self.list_tasks(&query).await
    }

    // ---- projects ----

    pub async fn list_projects(&self, query: &ProjectQuery) -> Result<Vec<Value>, ClientError> {
        let request = ApiRequest::get(&["project"]).with_query(query.to_query_pairs());
        let body = self.transport.execute(request).await?;
        Ok(collection(CollectionKind::Projects, body))
    }

    pub async fn get_project(&self, project_id: &str) -> Result<Value, ClientError> {
        note_prefix("project_id", project_id, IdKind::Project);
        let body = self
            .transport
            .execute(ApiRequest::get(&["project", project_id]))
            .await?;
        Ok(entity(body))
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<Value, ClientError> {
        let body = self
            .transport
            .execute(ApiRequest::post(&["project"], to_body(project)?))
            .await?;
        Ok(entity(body))
    }

    pub async fn update_project(
        &self,
        project_id: &str,
        patch: &ProjectPatch,
    ) -> Result<Value, ClientError> {
        note_prefix("project_id", project_id, IdKind::Project);
        let body = self
            .transport
            .execute(ApiRequest::patch(
                &["project", project_id],
                to_body(patch)?,
            ))
            .await?;
        Ok(entity(body))
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<(), ClientError> {
        note_prefix("project_id", project_id, IdKind::Project);
        self.transport
            .execute(ApiRequest::delete(&["project", project_id]))
            .await?;
        Ok(())
    }

    // ---- habits ----

    pub async fn list_habits(&self, query: &HabitQuery) -> Result<Vec<Value>, ClientError> {
        let request = ApiRequest::get(&["habit"]).with_query(query.to_query_pairs());
        let body = self.transport.execute(request).await?;
        Ok(collection(CollectionKind::Habits, body))
    }

    pub async fn create_habit(&self, habit: &NewHabit) -> Result<Value, ClientError> {
        let body = self
            .transport
            .execute(ApiRequest::post(&["habit"], to_body(habit)?))
            .await?;
        Ok(entity(body))
    }

    pub async fn delete_habit(&self, habit_id: &str) -> Result<(), ClientError> {
        self.transport
            .execute(ApiRequest::delete(&["habit", habit_id]))
            .await?;
        Ok(())
    }

    pub async fn mark_habit(&self, mark: &HabitProgressMark) -> Result<Value, ClientError> {
        let body = self
            .transport
            .execute(ApiRequest::post(&["habit-progress"], to_body(mark)?))
            .await?;
        Ok(entity(body))
    }

    // ---- tags ----

    pub async fn list_tags(&self, query: &TagQuery) -> Result<Vec<Value>, ClientError> {
        let request = ApiRequest::get(&["tag"]).with_query(query.to_query_pairs());
        let body = self.transport.execute(request).await?;
        Ok(collection(CollectionKind::Tags, body))
    }

    pub async fn get_tag(&self, tag_id: &str) -> Result<Value, ClientError> {
        let body = self
            .transport
            .execute(ApiRequest::get(&["tag", tag_id]))
            .await?;
        Ok(entity(body))
    }

    pub async fn create_tag(&self, tag: &NewTag) -> Result<Value, ClientError> {
        let body = self
            .transport
            .execute(ApiRequest::post(&["tag"], to_body(tag)?))
            .await?;
        Ok(entity(body))
    }

    pub async fn update_tag(&self, tag_id: &str, patch: &TagPatch) -> Result<Value, ClientError> {
        let body = self
            .transport
            .execute(ApiRequest::patch(&["tag", tag_id], to_body(patch)?))
            .await?;
        Ok(entity(body))
    }

    pub async fn delete_tag(&self, tag_id: &str) -> Result<(), ClientError> {
        self.transport
            .execute(ApiRequest::delete(&["tag", tag_id]))
            .await?;
        Ok(())
    }

    // ---- checklist ----

    pub async fn create_checklist_item(
        &self,
        item: &NewChecklistItem,
    ) -> Result<Value, ClientError> {
        note_prefix("task_id", &item.parent, IdKind::Task);
        let body = self
            .transport
            .execute(ApiRequest::post(&["checklist-item"], to_body(item)?))
            .await?;
        Ok(entity(body))
    }
}

fn collection(kind: CollectionKind, body: Option<Value>) -> Vec<Value> {
    let shape = CollectionShape::classify(kind, body);
    if let CollectionShape::Unrecognized(found) = &shape {
        warn!(
            collection = kind.envelope_key(),
            found = %found,
            "unrecognized collection shape; returning an empty list"
        );
    }
    shape.into_items()
}

fn unreadable_tags(task_id: &str, reason: &str) -> ClientError {
    warn!(task_id, reason, "refusing to rewrite tags");
    ClientError::Decode(format!(
        "cannot read current tags of task {task_id} ({reason}); tags left unchanged"
    ))
}

fn entity_map(body: Option<Value>) -> Map<String, Value> {
    let shape = EntityShape::classify(body);
    if let EntityShape::Unrecognized(found) = &shape {
        warn!(found = %found, "unrecognized entity shape; returning an empty object");
    }
    shape.into_map()
}

fn entity(body: Option<Value>) -> Value {
    Value::Object(entity_map(body))
}

fn attach_project(project_id: Option<&str>) -> Option<String> {
    let attachment = ProjectAttachment::resolve("project_id", project_id);
    if let Some(warning) = attachment.warning() {
        record(warning);
    }
    attachment.project_id().map(str::to_string)
}

fn note_prefix(field: &str, id: &str, kind: IdKind) {
    if let Some(warning) = check_prefix(field, id, kind) {
        record(&warning);
    }
}

fn record(warning: &ValidationWarning) {
    warn!(field = %warning.field, "{}", warning.message);
}

fn to_body<T: Serialize>(value: &T) -> Result<Value, ClientError> {
    serde_json::to_value(value)
        .map_err(|e| ClientError::Decode(format!("failed to encode request body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;
    use reqwest::Method;
    use serde_json::json;
    use singularity_core::models::{HabitProgress, Priority};

    fn client(transport: &Arc<FakeTransport>) -> SingularityClient {
        let zone = LocalZone::from_offset_hours(3).unwrap();
        SingularityClient::new(transport.clone(), zone)
    }

    fn query_value<'a>(request: &'a ApiRequest, key: &str) -> Option<&'a str> {
        request
            .query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn list_tasks_accepts_bare_and_wrapped_responses() {
        let items = json!([{"id": "T-1"}, {"id": "T-2"}]);
        let transport = FakeTransport::with_responses(vec![
            Ok(Some(items.clone())),
            Ok(Some(json!({ "tasks": items }))),
            Ok(Some(json!({"unexpected": true}))),
        ]);
        let client = client(&transport);
        let bare = client.list_tasks(&TaskQuery::default()).await.unwrap();
        let wrapped = client.list_tasks(&TaskQuery::default()).await.unwrap();
        let drifted = client.list_tasks(&TaskQuery::default()).await.unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare.len(), 2);
        assert!(drifted.is_empty());
    }

    #[tokio::test]
    async fn list_tasks_shapes_query_parameters() {
        let transport = FakeTransport::with_responses(vec![Ok(Some(json!([])))]);
        let query = TaskQuery {
            project_id: Some("P-1".to_string()),
            tag_ids: vec!["G-1".to_string(), "G-2".to_string()],
            start_date_from: Some("2024-01-01".to_string()),
            max_count: Some(10),
            ..TaskQuery::default()
        };
        client(&transport).list_tasks(&query).await.unwrap();

        let request = transport.single_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path(), "/task");
        assert_eq!(query_value(&request, "projectId"), Some("P-1"));
        assert_eq!(query_value(&request, "tagIds"), Some("G-1,G-2"));
        assert_eq!(query_value(&request, "startDateFrom"), Some("2024-01-01"));
        assert_eq!(query_value(&request, "startDateTo"), None);
        assert_eq!(query_value(&request, "maxCount"), Some("10"));
        assert_eq!(query_value(&request, "includeArchived"), Some("false"));
    }

    #[tokio::test]
    async fn list_inbox_tasks_keeps_only_tasks_without_project() {
        let transport = FakeTransport::with_responses(vec![Ok(Some(json!({"tasks": [
            {"id": "T-1", "projectId": "P-1"},
            {"id": "T-2"},
            {"id": "T-3", "projectId": null}
        ]})))]);
        let query = TaskQuery {
            project_id: Some("P-9".to_string()),
            ..TaskQuery::default()
        };
        let inbox = client(&transport).list_inbox_tasks(&query).await.unwrap();
        let ids: Vec<_> = inbox.iter().map(|t| t["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["T-2", "T-3"]);
        assert_eq!(query_value(&transport.single_request(), "projectId"), None);
    }

    #[tokio::test]
    async fn get_task_with_non_object_response_is_empty_object() {
        let transport = FakeTransport::with_responses(vec![Ok(Some(json!(["odd"])))]);
        let task = client(&transport).get_task("T-1").await.unwrap();
        assert_eq!(task, json!({}));
        assert_eq!(transport.single_request().path(), "/task/T-1");
    }

    #[tokio::test]
    async fn create_task_with_empty_project_matches_no_project() {
        let transport = FakeTransport::with_responses(vec![
            Ok(Some(json!({"id": "T-1"}))),
            Ok(Some(json!({"id": "T-2"}))),
        ]);
        let client = client(&transport);
        let draft = NewTask {
            title: "Call mom".to_string(),
            ..NewTask::default()
        };
        client.create_task(draft.clone(), Some("")).await.unwrap();
        client.create_task(draft, None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].body, requests[1].body);
        assert_eq!(
            requests[0].body,
            Some(json!({"title": "Call mom", "priority": 1}))
        );
    }

    #[tokio::test]
    async fn create_task_with_unprefixed_project_omits_project() {
        let transport = FakeTransport::with_responses(vec![Ok(Some(json!({"id": "T-1"})))]);
        let draft = NewTask {
            title: "Plan trip".to_string(),
            priority: Priority::High,
            ..NewTask::default()
        };
        let created = client(&transport)
            .create_task(draft, Some("12345"))
            .await
            .unwrap();
        assert_eq!(created["id"], "T-1");
        let body = transport.single_request().body.unwrap();
        assert!(body.get("project").is_none());
        assert_eq!(body["priority"], 0);
    }

    #[tokio::test]
    async fn create_task_attaches_prefixed_project() {
        let transport = FakeTransport::with_responses(vec![Ok(Some(json!({"id": "T-1"})))]);
        let draft = NewTask {
            title: "Write report".to_string(),
            start: Some("2024-06-15T10:00:00".to_string()),
            parent: Some("T-0".to_string()),
            ..NewTask::default()
        };
        client(&transport)
            .create_task(draft, Some("P-42"))
            .await
            .unwrap();
        let request = transport.single_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.body,
            Some(json!({
                "title": "Write report",
                "priority": 1,
                "start": "2024-06-15T10:00:00",
                "project": "P-42",
                "parent": "T-0"
            }))
        );
    }

    #[tokio::test]
    async fn update_task_with_only_title_sends_only_title() {
        let transport = FakeTransport::with_responses(vec![Ok(Some(json!({"id": "T-1"})))]);
        let patch = TaskPatch {
            title: Some("New title".to_string()),
            ..TaskPatch::default()
        };
        client(&transport)
            .update_task("T-1", patch, None)
            .await
            .unwrap();
        let request = transport.single_request();
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.path(), "/task/T-1");
        assert_eq!(request.body, Some(json!({"title": "New title"})));
    }

    #[tokio::test]
    async fn complete_task_stamps_local_journal_date() {
        let transport = FakeTransport::with_responses(vec![Ok(Some(json!({"id": "T-1"})))]);
        let now = DateTime::parse_from_rfc3339("2024-06-14T22:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        client(&transport)
            .complete_task_at("T-1", now)
            .await
            .unwrap();
        assert_eq!(
            transport.single_request().body,
            Some(json!({"journalDate": "2024-06-15"}))
        );
    }

    #[tokio::test]
    async fn delete_task_accepts_no_content() {
        let transport = FakeTransport::with_responses(vec![Ok(None)]);
        client(&transport).delete_task("T-1").await.unwrap();
        let request = transport.single_request();
        assert_eq!(request.method, Method::DELETE);
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn add_task_tag_is_idempotent() {
        let transport = FakeTransport::with_responses(vec![
            Ok(Some(json!({"id": "T-1", "tags": ["G-1"]}))),
            Ok(Some(json!({"id": "T-1", "tags": ["G-1", "G-2"]}))),
            Ok(Some(json!({"id": "T-1", "tags": ["G-1", "G-2"]}))),
        ]);
        let client = client(&transport);
        let first = client.add_task_tag("T-1", "G-2").await.unwrap();
        let second = client.add_task_tag("T-1", "G-2").await.unwrap();

        for task in [&first, &second] {
            let count = task["tags"]
                .as_array()
                .unwrap()
                .iter()
                .filter(|tag| *tag == "G-2")
                .count();
            assert_eq!(count, 1);
        }
        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].method, Method::PATCH);
        assert_eq!(requests[1].body, Some(json!({"tags": ["G-1", "G-2"]})));
        assert_eq!(requests[2].method, Method::GET);
    }

    #[tokio::test]
    async fn remove_absent_tag_issues_no_write() {
        let task = json!({"id": "T-1", "tags": ["G-1"]});
        let transport = FakeTransport::with_responses(vec![Ok(Some(task.clone()))]);
        let result = client(&transport)
            .remove_task_tag("T-1", "G-9")
            .await
            .unwrap();
        assert_eq!(result, task);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn add_task_tag_never_writes_over_an_unreadable_task() {
        let bodies = [
            json!([{"id": "T-1", "tags": ["G-1", "G-2"]}]),
            json!({"title": "no id", "tags": ["G-1"]}),
            json!({"id": "T-1", "tags": "G-1,G-2"}),
            json!({"id": "T-1", "tags": ["G-1", 7]}),
        ];
        for body in bodies {
            let transport = FakeTransport::with_responses(vec![Ok(Some(body.clone()))]);
            let err = client(&transport)
                .add_task_tag("T-1", "G-3")
                .await
                .unwrap_err();
            assert!(matches!(err, ClientError::Decode(_)), "{body}");
            let requests = transport.requests();
            assert_eq!(requests.len(), 1, "{body}");
            assert_eq!(requests[0].method, Method::GET);
        }
    }

    #[tokio::test]
    async fn remove_task_tag_on_empty_body_issues_no_write() {
        let transport = FakeTransport::with_responses(vec![Ok(None)]);
        let err = client(&transport)
            .remove_task_tag("T-1", "G-1")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn task_without_tags_field_gains_first_tag() {
        let transport = FakeTransport::with_responses(vec![
            Ok(Some(json!({"id": "T-1"}))),
            Ok(Some(json!({"id": "T-1", "tags": ["G-1"]}))),
        ]);
        client(&transport).add_task_tag("T-1", "G-1").await.unwrap();
        assert_eq!(transport.requests()[1].body, Some(json!({"tags": ["G-1"]})));
    }

    #[tokio::test]
    async fn remove_present_tag_writes_remaining_set() {
        let transport = FakeTransport::with_responses(vec![
            Ok(Some(json!({"id": "T-1", "tags": ["G-1", "G-2"]}))),
            Ok(Some(json!({"id": "T-1", "tags": ["G-2"]}))),
        ]);
        client(&transport)
            .remove_task_tag("T-1", "G-1")
            .await
            .unwrap();
        assert_eq!(
            transport.requests()[1].body,
            Some(json!({"tags": ["G-2"]}))
        );
    }

    #[tokio::test]
    async fn today_tasks_query_covers_local_day_in_utc() {
        let transport = FakeTransport::with_responses(vec![Ok(Some(json!({"tasks": []})))]);
        let now = DateTime::parse_from_rfc3339("2024-06-15T10:00:00+03:00")
            .unwrap()
            .with_timezone(&Utc);
        client(&transport).today_tasks_at(now).await.unwrap();
        let request = transport.single_request();
        assert_eq!(query_value(&request, "startDateFrom"), Some("2024-06-14T21:00:00Z"));
        assert_eq!(query_value(&request, "startDateTo"), Some("2024-06-15T21:00:00Z"));
        assert_eq!(
            query_value(&request, "includeAllRecurrenceInstances"),
            Some("false")
        );
    }

    #[tokio::test]
    async fn mark_habit_posts_progress_record() {
        let transport = FakeTransport::with_responses(vec![Ok(Some(json!({"habit": "H-1"})))]);
        let mark = HabitProgressMark {
            habit: "H-1".to_string(),
            date: "2024-06-15T00:00:00".to_string(),
            progress: HabitProgress::Done,
        };
        client(&transport).mark_habit(&mark).await.unwrap();
        let request = transport.single_request();
        assert_eq!(request.path(), "/habit-progress");
        assert_eq!(request.body.unwrap()["progress"], 2);
    }

    #[tokio::test]
    async fn remote_errors_propagate() {
        let transport = FakeTransport::with_responses(vec![Err(ClientError::Remote {
            status: 401,
            message: "Unauthorized".to_string(),
        })]);
        let err = client(&transport)
            .list_projects(&ProjectQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Remote { status: 401, .. }));
    }

    #[tokio::test]
    async fn checklist_item_is_posted_with_parent_task() {
        let transport = FakeTransport::with_responses(vec![Ok(Some(json!({"id": "C-1"})))]);
        let item = NewChecklistItem {
            title: "Pack charger".to_string(),
            parent: "T-5".to_string(),
        };
        client(&transport)
            .create_checklist_item(&item)
            .await
            .unwrap();
        assert_eq!(
            transport.single_request().body,
            Some(json!({"title": "Pack charger", "parent": "T-5"}))
        );
    }
}
