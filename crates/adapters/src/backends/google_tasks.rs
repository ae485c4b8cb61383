// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A Google-Tasks-shaped backend: `tasklists` and `tasks` resources with
//! only `needsAction`/`completed` statuses, a date-only `due` field, no
//! priorities, no categories. The engine maps `IN-PROGRESS` down to
//! `NEEDS-ACTION` for this backend (§4.A degrade-gracefully contract) —
//! this adapter never sees `IN-PROGRESS` itself.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tsk_core::{Capabilities, Error, TaskStatus};

use crate::port::{Backend, RemoteList, RemoteTask, TaskFields};
use crate::transport::Transport;

/// The real Google Tasks API host; tests substitute a mock server URL.
pub const DEFAULT_API_BASE: &str = "https://tasks.googleapis.com/tasks/v1";

#[derive(Debug, Serialize, Deserialize)]
struct TaskListDto {
    id: String,
    title: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TaskListsPage {
    #[serde(default)]
    items: Vec<TaskListDto>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TaskDto {
    id: String,
    title: String,
    #[serde(default)]
    notes: Option<String>,
    status: GoogleStatus,
    #[serde(default)]
    due: Option<String>,
    etag: String,
    #[serde(default)]
    updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TasksPage {
    #[serde(default)]
    items: Vec<TaskDto>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
enum GoogleStatus {
    NeedsAction,
    Completed,
}

fn due_date_to_rfc3339(due: &Option<DateTime<Utc>>) -> Option<String> {
    due.map(|d| format!("{}T00:00:00.000Z", d.date_naive()))
}

fn parse_due(due: &Option<String>) -> Option<DateTime<Utc>> {
    let text = due.as_deref()?;
    let date = NaiveDate::parse_from_str(&text[..10.min(text.len())], "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

impl From<TaskDto> for RemoteTask {
    fn from(dto: TaskDto) -> Self {
        RemoteTask {
            remote_id: dto.id,
            remote_list_id: String::new(),
            summary: dto.title,
            description: dto.notes,
            status: match dto.status {
                GoogleStatus::NeedsAction => TaskStatus::NeedsAction,
                GoogleStatus::Completed => TaskStatus::Completed,
            },
            priority: 0,
            due_at: parse_due(&dto.due),
            start_at: None,
            categories: Vec::new(),
            etag: dto.etag,
            modified_at: dto.updated,
        }
    }
}

pub struct GoogleTasksBackend {
    id: String,
    api_base: String,
    access_token: String,
    transport: Transport,
}

impl GoogleTasksBackend {
    pub fn new(id: impl Into<String>, access_token: impl Into<String>, transport: Transport) -> Self {
        Self::with_api_base(id, DEFAULT_API_BASE, access_token, transport)
    }

    pub fn with_api_base(
        id: impl Into<String>,
        api_base: impl Into<String>,
        access_token: impl Into<String>,
        transport: Transport,
    ) -> Self {
        Self { id: id.into(), api_base: api_base.into(), access_token: access_token.into(), transport }
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<Option<T>, Error> {
        let url = format!("{}{path}", self.api_base);
        let cancel = CancellationToken::new();
        let response = self
            .transport
            .send(|| self.transport.client().get(&url).bearer_auth(&self.access_token), &cancel)
            .await?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        self.decode(response).await.map(Some)
    }

    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let url = format!("{}{path}", self.api_base);
        let cancel = CancellationToken::new();
        let response = self
            .transport
            .send(
                || self.transport.client().request(method.clone(), &url).bearer_auth(&self.access_token).json(body),
                &cancel,
            )
            .await?;
        self.decode(response).await
    }

    async fn decode<T: for<'de> Deserialize<'de>>(&self, response: reqwest::Response) -> Result<T, Error> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(&self.id, status, body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| Error::validation(format!("malformed response body: {e}")).with_backend(self.id.clone()))
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = format!("{}{path}", self.api_base);
        let cancel = CancellationToken::new();
        let response = self
            .transport
            .send(|| self.transport.client().delete(&url).bearer_auth(&self.access_token), &cancel)
            .await?;
        if response.status().is_success() || response.status().as_u16() == 404 {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(classify_status(&self.id, status, body))
        }
    }
}

fn classify_status(backend_id: &str, status: reqwest::StatusCode, body: String) -> Error {
    let error = match status.as_u16() {
        401 | 403 => Error::auth(format!("{status}: {body}")),
        404 => Error::not_found(format!("{status}: {body}")),
        400..=499 => Error::validation(format!("{status}: {body}")),
        _ => Error::internal(format!("{status}: {body}")),
    };
    error.with_backend(backend_id.to_string())
}

#[derive(Serialize)]
struct TaskBody<'a> {
    title: &'a str,
    notes: &'a Option<String>,
    status: GoogleStatus,
    due: Option<String>,
}

fn to_body(fields: &TaskFields) -> TaskBody<'_> {
    TaskBody {
        title: &fields.summary,
        notes: &fields.description,
        status: if fields.status.is_terminal() { GoogleStatus::Completed } else { GoogleStatus::NeedsAction },
        due: due_date_to_rfc3339(&fields.due_at),
    }
}

#[async_trait]
impl Backend for GoogleTasksBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            subtasks: true,
            soft_delete: false,
            start_dates: false,
            priorities: false,
            custom_statuses: false,
            tags: false,
        }
    }

    async fn list_lists(&self) -> Result<Vec<RemoteList>, Error> {
        let page: Option<TaskListsPage> = self.get("/users/@me/lists").await?;
        Ok(page
            .unwrap_or(TaskListsPage { items: Vec::new() })
            .items
            .into_iter()
            .map(|d| RemoteList { remote_id: d.id, name: d.title })
            .collect())
    }

    async fn get_list(&self, remote_id: &str) -> Result<Option<RemoteList>, Error> {
        let dto: Option<TaskListDto> = self.get(&format!("/users/@me/lists/{remote_id}")).await?;
        Ok(dto.map(|d| RemoteList { remote_id: d.id, name: d.title }))
    }

    async fn create_list(&self, name: &str) -> Result<RemoteList, Error> {
        #[derive(Serialize)]
        struct CreateList<'a> {
            title: &'a str,
        }
        let dto: TaskListDto = self.send(reqwest::Method::POST, "/users/@me/lists", &CreateList { title: name }).await?;
        Ok(RemoteList { remote_id: dto.id, name: dto.title })
    }

    async fn delete_list(&self, remote_id: &str) -> Result<(), Error> {
        self.delete(&format!("/users/@me/lists/{remote_id}")).await
    }

    async fn list_tasks(&self, remote_list_id: &str) -> Result<Vec<RemoteTask>, Error> {
        let page: Option<TasksPage> = self.get(&format!("/lists/{remote_list_id}/tasks")).await?;
        Ok(page
            .unwrap_or(TasksPage { items: Vec::new() })
            .items
            .into_iter()
            .map(|dto| {
                let mut task = RemoteTask::from(dto);
                task.remote_list_id = remote_list_id.to_string();
                task
            })
            .collect())
    }

    async fn get_task(&self, remote_list_id: &str, remote_id: &str) -> Result<Option<RemoteTask>, Error> {
        let dto: Option<TaskDto> = self.get(&format!("/lists/{remote_list_id}/tasks/{remote_id}")).await?;
        Ok(dto.map(|dto| {
            let mut task = RemoteTask::from(dto);
            task.remote_list_id = remote_list_id.to_string();
            task
        }))
    }

    async fn create_task(&self, remote_list_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error> {
        let dto: TaskDto =
            self.send(reqwest::Method::POST, &format!("/lists/{remote_list_id}/tasks"), &to_body(fields)).await?;
        let mut task = RemoteTask::from(dto);
        task.remote_list_id = remote_list_id.to_string();
        Ok(task)
    }

    async fn update_task(&self, remote_list_id: &str, remote_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error> {
        let dto: TaskDto = self
            .send(reqwest::Method::PUT, &format!("/lists/{remote_list_id}/tasks/{remote_id}"), &to_body(fields))
            .await?;
        let mut task = RemoteTask::from(dto);
        task.remote_list_id = remote_list_id.to_string();
        Ok(task)
    }

    async fn delete_task(&self, remote_list_id: &str, remote_id: &str) -> Result<(), Error> {
        self.delete(&format!("/lists/{remote_list_id}/tasks/{remote_id}")).await
    }
}

#[cfg(test)]
#[path = "google_tasks_tests.rs"]
mod tests;
