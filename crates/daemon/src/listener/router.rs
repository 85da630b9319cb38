// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The URL-embedded command form.
//!
//! Suffixes look like `<prefix>batch/<queue>/<method>.<format>[/<verb>]`.
//! The queue may span several path segments; the method segment is the
//! last one carrying a dot. Verbs are validated against the method's
//! idempotence class over the coordinator's queue state, not the jobs,
//! which is why `services_restart` rides on `get`.

use super::ListenCtx;
use crate::adapters::ServiceRuntime;
use crate::engine::CommandError;
use bq_core::{Clock, QueueName, QueueNameError, ServiceConfig, ServiceSpec};
use bq_wire::{json_to_term, term_to_json, Response, Term};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    Queue,
    QueueClear,
    QueueSuspend,
    QueueResume,
    ServicesAdd,
    ServicesRemove,
    ServicesRestart,
}

impl Method {
    fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "queue" => Method::Queue,
            "queue_clear" => Method::QueueClear,
            "queue_suspend" => Method::QueueSuspend,
            "queue_resume" => Method::QueueResume,
            "services_add" => Method::ServicesAdd,
            "services_remove" => Method::ServicesRemove,
            "services_restart" => Method::ServicesRestart,
            _ => return None,
        })
    }

    fn as_str(self) -> &'static str {
        match self {
            Method::Queue => "queue",
            Method::QueueClear => "queue_clear",
            Method::QueueSuspend => "queue_suspend",
            Method::QueueResume => "queue_resume",
            Method::ServicesAdd => "services_add",
            Method::ServicesRemove => "services_remove",
            Method::ServicesRestart => "services_restart",
        }
    }

    /// The one verb each method answers to.
    fn allowed_verb(self) -> Verb {
        match self {
            Method::Queue
            | Method::QueueSuspend
            | Method::QueueResume
            | Method::ServicesRestart => Verb::Get,
            Method::ServicesAdd => Verb::Post,
            Method::QueueClear | Method::ServicesRemove => Verb::Delete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Erl,
    Json,
}

impl Format {
    fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "erl" => Format::Erl,
            "json" => Format::Json,
            _ => return None,
        })
    }

    fn content_type(self) -> &'static str {
        match self {
            Format::Erl => "text/plain",
            Format::Json => "application/json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verb {
    Get,
    Post,
    Delete,
}

impl Verb {
    fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "get" => Verb::Get,
            "post" => Verb::Post,
            "delete" => Verb::Delete,
            _ => return None,
        })
    }

    fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Route {
    pub queue: QueueName,
    pub method: Method,
    pub format: Format,
}

/// Errors from suffix parsing and verb validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum RouteError {
    #[error("unroutable suffix: {0:?}")]
    Unroutable(String),

    #[error("unknown method: {0:?}")]
    UnknownMethod(String),

    #[error("unknown format: {0:?}")]
    UnknownFormat(String),

    #[error("unknown verb: {0:?}")]
    UnknownVerb(String),

    #[error("method {method} does not accept verb {verb}")]
    VerbMismatch { method: &'static str, verb: &'static str },

    #[error(transparent)]
    Queue(#[from] QueueNameError),
}

/// Parse a suffix, folding in a transport-level verb when the suffix
/// itself carries none.
pub(crate) fn parse_suffix(suffix: &str, transport_verb: Option<&str>) -> Result<Route, RouteError> {
    let start = suffix
        .find("batch/")
        .ok_or_else(|| RouteError::Unroutable(suffix.to_string()))?;
    let rest = &suffix[start + "batch/".len()..];

    let mut segments: Vec<&str> = rest.split('/').collect();
    let last = segments.pop().ok_or_else(|| RouteError::Unroutable(suffix.to_string()))?;
    let (method_segment, embedded_verb) = if last.contains('.') {
        (last, None)
    } else {
        let method_segment =
            segments.pop().ok_or_else(|| RouteError::Unroutable(suffix.to_string()))?;
        (method_segment, Some(last))
    };

    let queue_text = segments.join("/");
    if queue_text.is_empty() {
        return Err(RouteError::Unroutable(suffix.to_string()));
    }

    let (method_text, format_text) = method_segment
        .rsplit_once('.')
        .ok_or_else(|| RouteError::Unroutable(suffix.to_string()))?;
    let method = Method::parse(method_text)
        .ok_or_else(|| RouteError::UnknownMethod(method_text.to_string()))?;
    let format = Format::parse(format_text)
        .ok_or_else(|| RouteError::UnknownFormat(format_text.to_string()))?;
    let queue = QueueName::new(queue_text)?;

    for text in [embedded_verb, transport_verb].into_iter().flatten() {
        let verb = Verb::parse(text).ok_or_else(|| RouteError::UnknownVerb(text.to_string()))?;
        if verb != method.allowed_verb() {
            return Err(RouteError::VerbMismatch {
                method: method.as_str(),
                verb: verb.as_str(),
            });
        }
    }

    Ok(Route { queue, method, format })
}

/// What a routed command produced, before encoding.
enum Outcome {
    Done,
    Count(usize),
    Listing(Vec<ServiceSpec>),
}

/// Decode, execute, and encode one routed command.
pub(crate) async fn route<R, C>(
    ctx: &ListenCtx<R, C>,
    suffix: &str,
    verb: Option<&str>,
    body: &str,
) -> Response
where
    R: ServiceRuntime,
    C: Clock,
{
    let route = match parse_suffix(suffix, verb) {
        Ok(route) => route,
        Err(err) => return Response::Error { message: err.to_string() },
    };
    let outcome = execute(ctx, &route, body).await;
    Response::Routed {
        content_type: route.format.content_type().to_string(),
        body: encode_outcome(route.format, outcome),
    }
}

async fn execute<R, C>(
    ctx: &ListenCtx<R, C>,
    route: &Route,
    body: &str,
) -> Result<Outcome, String>
where
    R: ServiceRuntime,
    C: Clock,
{
    let coordinator = &ctx.coordinator;
    let queue = &route.queue;
    let command = |result: Result<(), CommandError>| {
        result.map(|()| Outcome::Done).map_err(|err| err.to_string())
    };
    match route.method {
        Method::Queue => coordinator
            .queue_list(queue)
            .await
            .map(Outcome::Listing)
            .map_err(|err| err.to_string()),
        Method::QueueClear => command(coordinator.queue_clear(queue).await),
        Method::QueueSuspend => command(coordinator.queue_suspend(queue).await),
        Method::QueueResume => command(coordinator.queue_resume(queue).await),
        Method::ServicesAdd => {
            let specs = decode_body(route.format, body)?;
            coordinator
                .services_add(queue, specs)
                .await
                .map(Outcome::Count)
                .map_err(|err| err.to_string())
        }
        Method::ServicesRemove => command(coordinator.services_remove(queue).await),
        Method::ServicesRestart => command(coordinator.services_restart(queue).await),
    }
}

/// Decode a request body into normalized configurations.
fn decode_body(format: Format, body: &str) -> Result<Vec<ServiceSpec>, String> {
    let configs: Vec<ServiceConfig> = match format {
        Format::Json => serde_json::from_str(body).map_err(|err| err.to_string())?,
        Format::Erl => {
            let term = bq_wire::term::parse(body).map_err(|err| err.to_string())?;
            let Term::List(items) = term else {
                return Err("body must be a list of configurations".into());
            };
            let value = serde_json::Value::Array(items.iter().map(term_to_json).collect());
            serde_json::from_value(value).map_err(|err| err.to_string())?
        }
    };
    if configs.is_empty() {
        return Err("empty service list".into());
    }
    configs
        .into_iter()
        .map(|config| config.normalize().map_err(|err| err.to_string()))
        .collect()
}

fn encode_outcome(format: Format, outcome: Result<Outcome, String>) -> String {
    match format {
        Format::Json => {
            let value = match outcome {
                Ok(Outcome::Done) => serde_json::json!({"success": true}),
                Ok(Outcome::Count(count)) => serde_json::json!({"success": true, "count": count}),
                Ok(Outcome::Listing(configs)) => {
                    serde_json::json!({"success": true, "queue": configs})
                }
                Err(reason) => serde_json::json!({"success": false, "error": reason}),
            };
            value.to_string()
        }
        Format::Erl => {
            let term = match outcome {
                Ok(Outcome::Done) => Term::atom("ok"),
                Ok(Outcome::Count(count)) => {
                    Term::tuple([Term::atom("ok"), Term::Int(count as i64)])
                }
                Ok(Outcome::Listing(configs)) => Term::List(
                    configs
                        .iter()
                        .map(|spec| {
                            serde_json::to_value(spec)
                                .map(|value| json_to_term(&value))
                                .unwrap_or_else(|_| Term::atom("undefined"))
                        })
                        .collect(),
                ),
                Err(reason) => Term::tuple([Term::atom("error"), Term::atom(reason)]),
            };
            term.to_string()
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
