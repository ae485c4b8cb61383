// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A CalDAV backend: calendar collections hold `VTODO` iCalendar
//! components (RFC 5545 §3.6.2 / RFC 4791). Lists are calendar
//! collections discovered via `PROPFIND`; tasks are individual `.ics`
//! resources fetched and written with plain `GET`/`PUT`, their
//! `calendar-data` multistatus bodies parsed with `quick-xml`. The `ETag`
//! CalDAV already assigns every resource is used directly as
//! [`crate::port::RemoteTask::etag`] — no synthetic hash needed, unlike
//! [`crate::backends::plain_markdown`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tokio_util::sync::CancellationToken;
use tsk_core::{Capabilities, Error, TaskStatus};

use crate::port::{Backend, RemoteList, RemoteTask, TaskFields};
use crate::transport::Transport;

const PROPFIND_CALENDARS: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:propfind xmlns:D="DAV:"><D:prop><D:displayname/><D:resourcetype/></D:prop></D:propfind>"#;

const PROPFIND_TASKS: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<C:calendar-query xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
<D:prop><D:getetag/><C:calendar-data/></D:prop>
<C:filter><C:comp-filter name="VCALENDAR"><C:comp-filter name="VTODO"/></C:comp-filter></C:filter>
</C:calendar-query>"#;

pub struct CalDavBackend {
    id: String,
    base_url: String,
    username: String,
    password: String,
    transport: Transport,
}

impl CalDavBackend {
    pub fn new(
        id: impl Into<String>,
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        transport: Transport,
    ) -> Self {
        Self { id: id.into(), base_url: base_url.into(), username: username.into(), password: password.into(), transport }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn propfind(&self, path: &str, depth: &str, body: &'static str) -> Result<String, Error> {
        let url = self.url(path);
        let cancel = CancellationToken::new();
        let response = self
            .transport
            .send(
                || {
                    self.transport
                        .client()
                        .request(propfind_method(), &url)
                        .basic_auth(&self.username, Some(&self.password))
                        .header("Depth", depth)
                        .header("Content-Type", "application/xml; charset=utf-8")
                        .body(body)
                },
                &cancel,
            )
            .await?;
        let status = response.status();
        if !status.is_success() && status.as_u16() != 207 {
            return Err(classify_status(&self.id, status));
        }
        response
            .text()
            .await
            .map_err(|e| Error::internal(format!("reading multistatus body: {e}")).with_backend(self.id.clone()))
    }
}

/// `PROPFIND` is a WebDAV extension method, not one of `http::Method`'s
/// built-in constants — constructed once from its fixed byte string,
/// which is always valid, so the fallback is unreachable in practice.
fn propfind_method() -> reqwest::Method {
    reqwest::Method::from_bytes(b"PROPFIND").unwrap_or(reqwest::Method::GET)
}

fn classify_status(backend_id: &str, status: reqwest::StatusCode) -> Error {
    let error = match status.as_u16() {
        401 | 403 => Error::auth(format!("caldav server returned {status}")),
        404 => Error::not_found(format!("caldav server returned {status}")),
        400..=499 => Error::validation(format!("caldav server returned {status}")),
        _ => Error::internal(format!("caldav server returned {status}")),
    };
    error.with_backend(backend_id.to_string())
}

/// One `<D:response>` entry from a multistatus body: a resource href, its
/// etag, and (for task queries) the raw `calendar-data` payload.
#[derive(Debug, Default, Clone)]
struct MultistatusEntry {
    href: String,
    etag: Option<String>,
    display_name: Option<String>,
    is_collection: bool,
    calendar_data: Option<String>,
}

/// Parses a CalDAV/WebDAV multistatus response into its per-resource
/// entries. Namespace-agnostic: matches on the local tag name only, since
/// servers vary their namespace prefixes (`D:`, `d:`, `DAV:`...).
fn parse_multistatus(body: &str) -> Vec<MultistatusEntry> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current = MultistatusEntry::default();
    let mut in_response = false;
    let mut tag_stack: Vec<String> = Vec::new();
    let mut text_buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let local = local_name(e.name().as_ref());
                if local == "response" {
                    in_response = true;
                    current = MultistatusEntry::default();
                }
                if local == "collection" {
                    current.is_collection = true;
                }
                tag_stack.push(local);
                text_buf.clear();
            }
            Ok(Event::Text(e)) => {
                if let Ok(text) = e.unescape() {
                    text_buf.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                let local = local_name(e.name().as_ref());
                if in_response {
                    match local.as_str() {
                        "href" => current.href = text_buf.trim().to_string(),
                        "getetag" => current.etag = Some(text_buf.trim().trim_matches('"').to_string()),
                        "displayname" => current.display_name = Some(text_buf.trim().to_string()),
                        "calendar-data" => current.calendar_data = Some(text_buf.clone()),
                        "response" => {
                            entries.push(current.clone());
                            in_response = false;
                        }
                        _ => {}
                    }
                }
                tag_stack.pop();
                text_buf.clear();
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    entries
}

fn local_name(qualified: &[u8]) -> String {
    let text = String::from_utf8_lossy(qualified);
    text.rsplit(':').next().unwrap_or(&text).to_string()
}

/// Builds a single-component `VTODO` iCalendar document (RFC 5545 §3.6.2).
fn format_vtodo(uid: &str, fields: &TaskFields) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//tsk//caldav backend//EN".to_string(),
        "BEGIN:VTODO".to_string(),
        format!("UID:{uid}"),
        format!("SUMMARY:{}", escape_text(&fields.summary)),
        format!("STATUS:{}", vtodo_status(fields.status)),
        format!("PRIORITY:{}", vtodo_priority(fields.priority)),
    ];
    if let Some(description) = &fields.description {
        lines.push(format!("DESCRIPTION:{}", escape_text(description)));
    }
    if let Some(due) = fields.due_at {
        lines.push(format!("DUE:{}", due.format("%Y%m%dT%H%M%SZ")));
    }
    if let Some(start) = fields.start_at {
        lines.push(format!("DTSTART:{}", start.format("%Y%m%dT%H%M%SZ")));
    }
    for category in &fields.categories {
        lines.push(format!("CATEGORIES:{}", escape_text(category)));
    }
    lines.push("END:VTODO".to_string());
    lines.push("END:VCALENDAR".to_string());
    lines.join("\r\n")
}

fn vtodo_status(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::NeedsAction => "NEEDS-ACTION",
        TaskStatus::InProgress => "IN-PROCESS",
        TaskStatus::Completed => "COMPLETED",
        TaskStatus::Cancelled => "CANCELLED",
    }
}

fn parse_vtodo_status(value: &str) -> TaskStatus {
    match value {
        "IN-PROCESS" => TaskStatus::InProgress,
        "COMPLETED" => TaskStatus::Completed,
        "CANCELLED" => TaskStatus::Cancelled,
        _ => TaskStatus::NeedsAction,
    }
}

/// RFC 5545 priority is 0 (undefined) through 9 (lowest); our model's
/// 0..9 with 1 = highest maps directly onto it.
fn vtodo_priority(priority: u8) -> u8 {
    priority.min(9)
}

fn escape_text(value: &str) -> String {
    value.replace('\\', "\\\\").replace(',', "\\,").replace(';', "\\;").replace('\n', "\\n")
}

fn unescape_text(value: &str) -> String {
    value.replace("\\n", "\n").replace("\\;", ";").replace("\\,", ",").replace("\\\\", "\\")
}

/// Extracts the fields this backend round-trips from a raw VTODO
/// document. Deliberately line-oriented rather than a general iCalendar
/// parser — folded lines and unrecognized properties are preserved by
/// virtue of being ignored, not reconstructed.
fn parse_vtodo(remote_list_id: &str, href: &str, etag: &str, ics: &str) -> Option<RemoteTask> {
    let mut remote_id = None;
    let mut summary = String::new();
    let mut description = None;
    let mut status = TaskStatus::NeedsAction;
    let mut priority = 0u8;
    let mut due_at = None;
    let mut start_at = None;
    let mut categories = Vec::new();

    for line in ics.lines() {
        let line = line.trim_end_matches('\r');
        let Some((key, value)) = line.split_once(':') else { continue };
        let key = key.split(';').next().unwrap_or(key);
        match key {
            "UID" => remote_id = Some(value.to_string()),
            "SUMMARY" => summary = unescape_text(value),
            "DESCRIPTION" => description = Some(unescape_text(value)),
            "STATUS" => status = parse_vtodo_status(value),
            "PRIORITY" => priority = value.parse().unwrap_or(0),
            "DUE" => due_at = parse_ical_datetime(value),
            "DTSTART" => start_at = parse_ical_datetime(value),
            "CATEGORIES" => categories.extend(value.split(',').map(unescape_text)),
            _ => {}
        }
    }

    Some(RemoteTask {
        remote_id: remote_id.unwrap_or_else(|| href.to_string()),
        remote_list_id: remote_list_id.to_string(),
        summary,
        description,
        status,
        priority,
        due_at,
        start_at,
        categories,
        etag: etag.to_string(),
        modified_at: None,
    })
}

fn parse_ical_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim_end_matches('Z');
    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
    Some(naive.and_utc())
}

#[async_trait]
impl Backend for CalDavBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { subtasks: false, soft_delete: false, start_dates: true, priorities: true, custom_statuses: true, tags: true }
    }

    async fn list_lists(&self) -> Result<Vec<RemoteList>, Error> {
        let body = self.propfind("/", "1", PROPFIND_CALENDARS).await?;
        Ok(parse_multistatus(&body)
            .into_iter()
            .filter(|e| e.is_collection && !e.href.trim_end_matches('/').is_empty())
            .map(|e| RemoteList { name: e.display_name.unwrap_or_else(|| e.href.clone()), remote_id: e.href })
            .collect())
    }

    async fn get_list(&self, remote_id: &str) -> Result<Option<RemoteList>, Error> {
        Ok(self.list_lists().await?.into_iter().find(|l| l.remote_id == remote_id))
    }

    async fn create_list(&self, _name: &str) -> Result<RemoteList, Error> {
        Err(Error::validation("caldav collection creation is not supported by this adapter").with_backend(self.id.clone()))
    }

    async fn delete_list(&self, remote_id: &str) -> Result<(), Error> {
        let url = self.url(remote_id);
        let cancel = CancellationToken::new();
        let response = self
            .transport
            .send(|| self.transport.client().delete(&url).basic_auth(&self.username, Some(&self.password)), &cancel)
            .await?;
        if response.status().is_success() || response.status().as_u16() == 404 {
            Ok(())
        } else {
            Err(classify_status(&self.id, response.status()))
        }
    }

    async fn list_tasks(&self, remote_list_id: &str) -> Result<Vec<RemoteTask>, Error> {
        let body = self.propfind(remote_list_id, "1", PROPFIND_TASKS).await?;
        Ok(parse_multistatus(&body)
            .into_iter()
            .filter_map(|e| {
                let ics = e.calendar_data.as_deref()?;
                let etag = e.etag.clone().unwrap_or_default();
                parse_vtodo(remote_list_id, &e.href, &etag, ics)
            })
            .collect())
    }

    async fn get_task(&self, remote_list_id: &str, remote_id: &str) -> Result<Option<RemoteTask>, Error> {
        Ok(self.list_tasks(remote_list_id).await?.into_iter().find(|t| t.remote_id == remote_id))
    }

    async fn create_task(&self, remote_list_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error> {
        let uid = nanoid::nanoid!();
        let href = format!("{}/{uid}.ics", remote_list_id.trim_end_matches('/'));
        let ics = format_vtodo(&uid, fields);
        let url = self.url(&href);
        let cancel = CancellationToken::new();
        let response = self
            .transport
            .send(
                || {
                    self.transport
                        .client()
                        .put(&url)
                        .basic_auth(&self.username, Some(&self.password))
                        .header("Content-Type", "text/calendar; charset=utf-8")
                        .header("If-None-Match", "*")
                        .body(ics.clone())
                },
                &cancel,
            )
            .await?;
        if !response.status().is_success() {
            return Err(classify_status(&self.id, response.status()));
        }
        let etag = response.headers().get("etag").and_then(|v| v.to_str().ok()).unwrap_or_default().trim_matches('"');
        parse_vtodo(remote_list_id, &href, etag, &ics).ok_or_else(|| Error::internal("failed to echo created task"))
    }

    async fn update_task(&self, remote_list_id: &str, remote_id: &str, fields: &TaskFields) -> Result<RemoteTask, Error> {
        let existing = self
            .get_task(remote_list_id, remote_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("no task {remote_id}")).with_backend(self.id.clone()))?;
        let ics = format_vtodo(remote_id, fields);
        let url = self.url(&existing.remote_id);
        let cancel = CancellationToken::new();
        let response = self
            .transport
            .send(
                || {
                    self.transport
                        .client()
                        .put(&url)
                        .basic_auth(&self.username, Some(&self.password))
                        .header("Content-Type", "text/calendar; charset=utf-8")
                        .header("If-Match", format!("\"{}\"", existing.etag))
                        .body(ics.clone())
                },
                &cancel,
            )
            .await?;
        if !response.status().is_success() {
            return Err(classify_status(&self.id, response.status()));
        }
        let etag = response.headers().get("etag").and_then(|v| v.to_str().ok()).unwrap_or_default().trim_matches('"');
        parse_vtodo(remote_list_id, &existing.remote_id, etag, &ics).ok_or_else(|| Error::internal("failed to echo updated task"))
    }

    async fn delete_task(&self, remote_list_id: &str, remote_id: &str) -> Result<(), Error> {
        let Some(existing) = self.get_task(remote_list_id, remote_id).await? else { return Ok(()) };
        let url = self.url(&existing.remote_id);
        let cancel = CancellationToken::new();
        let response = self
            .transport
            .send(|| self.transport.client().delete(&url).basic_auth(&self.username, Some(&self.password)), &cancel)
            .await?;
        if response.status().is_success() || response.status().as_u16() == 404 {
            Ok(())
        } else {
            Err(classify_status(&self.id, response.status()))
        }
    }
}

#[cfg(test)]
#[path = "caldav_tests.rs"]
mod tests;
