// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A generic REST to-do API backend: JSON lists/tasks behind a
//! `{base_url}/lists` and `{base_url}/lists/{id}/tasks` resource shape,
//! bearer-token authenticated, going through the shared
//! [`crate::transport::Transport`] so 429s are retried transparently.
//! The fullest-capability remote — every [`tsk_core::Capabilities`] flag
//! is supported, so this is the reference backend other adapters degrade
//! against.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tsk_core::{Capabilities, Error, TaskStatus};

use crate::port::{Backend, RemoteList, RemoteTask, TaskFields};
use crate::transport::Transport;

#[derive(Debug, Serialize, Deserialize)]
struct ListDto {
    id: String,
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TaskDto {
    id: String,
    list_id: String,
    summary: String,
    #[serde(default)]
    description: Option<String>,
    status: StatusDto,
    #[serde(default)]
    priority: u8,
    #[serde(default)]
    due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    categories: Vec<String>,
    etag: String,
    #[serde(default)]
    modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum StatusDto {
    NeedsAction,
    InProgress,
    Completed,
    Cancelled,
}

impl From<StatusDto> for TaskStatus {
    fn from(value: StatusDto) -> Self {
        match value {
            StatusDto::NeedsAction => TaskStatus::NeedsAction,
            StatusDto::InProgress => TaskStatus::InProgress,
            StatusDto::Completed => TaskStatus::Completed,
            StatusDto::Cancelled => TaskStatus::Cancelled,
        }
    }
}

impl From<TaskStatus> for StatusDto {
    fn from(value: TaskStatus) -> Self {
        match value {
            TaskStatus::NeedsAction => StatusDto::NeedsAction,
            TaskStatus::InProgress => StatusDto::InProgress,
            TaskStatus::Completed => StatusDto::Completed,
            TaskStatus::Cancelled => StatusDto::Cancelled,
        }
    }
}

#[derive(Debug, Serialize)]
struct TaskFieldsDto<'a> {
    summary: &'a str,
    description: &'a Option<String>,
    status: StatusDto,
    priority: u8,
    due_at: &'a Option<DateTime<Utc>>,
    start_at: &'a Option<DateTime<Utc>>,
    categories: &'a [String],
}

impl From<TaskDto> for RemoteTask {
    fn from(dto: TaskDto) -> Self {
        RemoteTask {
            remote_id: dto.id,
            remote_list_id: dto.list_id,
            summary: dto.summary,
            description: dto.description,
            status: dto.status.into(),
            priority: dto.priority,
            due_at: dto.due_at,
            start_at: dto.start_at,
            categories: dto.categories,
            etag: dto.etag,
            modified_at: dto.modified_at,
        }
    }
}

pub struct RestTodoBackend {
    id: String,
    base_url: String,
    token: String,
    transport: Transport,
}

impl RestTodoBackend {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>, token: impl Into<String>, transport: Transport) -> Self {
        Self { id: id.into(), base_url: base_url.into(), token: token.into(), transport }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<Option<T>, Error> {
        let url = self.url(path);
        let cancel = CancellationToken::new();
        let response = self
            .transport
            .send(|| self.transport.client().get(&url).bearer_auth(&self.token), &cancel)
            .await?;
        self.decode_optional(response).await
    }

    async fn send_json<T: for<'de> Deserialize<'de>>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let url = self.url(path);
        let cancel = CancellationToken::new();
        let response = self
            .transport
            .send(
                || {
                    self.transport
                        .client()
                        .request(method.clone(), &url)
                        .bearer_auth(&self.token)
                        .json(body)
                },
                &cancel,
            )
            .await?;
        self.decode_required(response).await
    }

    async fn decode_optional<T: for<'de> Deserialize<'de>>(&self, response: reqwest::Response) -> Result<Option<T>, Error> {
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        self.decode_required(response).await.map(Some)
    }

    async fn decode_required<T: for<'de> Deserialize<'de>>(&self, response: reqwest::Response) -> Result<T, Error> {
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

fn to_dto(fields: &TaskFields) -> TaskFieldsDto<'_> {
    TaskFieldsDto {
        summary: &fields.summary,
        description: &fields.description,
        status: fields.status.into(),
        priority: fields.priority,
        due_at: &fields.due_at,
        start_at: &fields.start_at,
        categories: &fields.categories,
    }
}

#[async_trait]
impl Backend for RestTodoBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::full()
    }

    async fn list_lists(&self) -> Result<Vec<RemoteList>, Error> {
        let dtos: Vec<ListDto> = self.get_json("/lists").await?.unwrap_or_default();
        Ok(dtos.into_iter().map(|d| RemoteList { remote_id: d.id, name: d.name }).collect())
    }

    async fn get_list(&self, remote_id: &str) -> Result<Option<RemoteList>, Error> {
        let dto: Option<ListDto> = self.get_json(&format!("/lists/{remote_id}")).await?;
        Ok(dto.map(|d| RemoteList { remote_id: d.id, name: d.name }))
    }

    async fn create_list(&self, name: &str) -> Result<RemoteList, Error> {
        #[derive(Serialize)]
        struct CreateList<'a> {
            name: &'a str,
        }
        let dto: ListDto = self.send_json(reqwest::Method::POST, "/lists", &CreateList { name }).await?;
        Ok(RemoteList { remote_id: dto.id, name: dto.name })
    }

    async fn delete_list(&self, remote_id: &str) -> Result<(), Error> {
        let url = self.url(&format!("/lists/{remote_id}"));
        let cancel = CancellationToken::new();
        let response = self
            .transport
            .send(|| self.transport.client().delete(&url).bearer_auth(&self.token), &cancel)
            .await?;
        if response.status().is_success() || response.status().as_u16() == 404 {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(classify_status(&self.id, status, body))
        }
    }

    async fn list_tasks(&self, remote_list_id: &str) -> Result<Vec<RemoteTask>, Error> {
        let dtos: Vec<TaskDto> = self.get_json(&format!("/lists/{remote_list_id}/tasks")).await?.unwrap_or_default();
        Ok(dtos.into_iter().map(RemoteTask::from).collect())
    }

    async fn get_task(&self, remote_list_id: &str, remote_id: &str) -> Result<Option<RemoteTask>, Error> {
        let dto: Option<TaskDto> = self.get_json(&format!("/lists/{remote_list_id}/tasks/{remote_id}")).await?;
        Ok(dto.map(RemoteTask::from))
    }

    async fn create_task(&self, remote_list_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error> {
        let dto: TaskDto = self
            .send_json(reqwest::Method::POST, &format!("/lists/{remote_list_id}/tasks"), &to_dto(fields))
            .await?;
        Ok(dto.into())
    }

    async fn update_task(&self, remote_list_id: &str, remote_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error> {
        let dto: TaskDto = self
            .send_json(reqwest::Method::PUT, &format!("/lists/{remote_list_id}/tasks/{remote_id}"), &to_dto(fields))
            .await?;
        Ok(dto.into())
    }

    async fn delete_task(&self, remote_list_id: &str, remote_id: &str) -> Result<(), Error> {
        let url = self.url(&format!("/lists/{remote_list_id}/tasks/{remote_id}"));
        let cancel = CancellationToken::new();
        let response = self
            .transport
            .send(|| self.transport.client().delete(&url).bearer_auth(&self.token), &cancel)
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

#[cfg(test)]
#[path = "rest_todo_tests.rs"]
mod tests;
