use std::error::Error as StdError;

use faultline_core::{ApiError, Detail, ErrorKind, ErrorResponse, RequestContext};
use http::StatusCode;

use crate::{ErrorTranslator, Translation};

const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
const MESSAGE_READ_FAILED: &str = "MESSAGE_READ_FAILED";
const EXTERNAL_REST_CALL_FAILED: &str = "EXTERNAL_REST_CALL_FAILED";

/// One entry of the dispatch table
pub(crate) struct Rule {
    pub name: &'static str,
    matches: fn(&ErrorTranslator, &ApiError) -> bool,
    pub apply: fn(&ErrorTranslator, &ApiError, &RequestContext) -> Translation,
}

/// Ordered most specific first; the first matching rule wins
static RULES: &[Rule] = &[
    Rule {
        name: "validation",
        matches: |_, error| matches!(error.kind(), ErrorKind::Validation(_)),
        apply: validation,
    },
    Rule {
        name: "malformed_body",
        matches: |_, error| matches!(error.kind(), ErrorKind::MalformedBody(_)),
        apply: malformed_body,
    },
    Rule {
        name: "async_timeout",
        matches: |_, error| matches!(error.kind(), ErrorKind::AsyncTimeout(_)),
        apply: async_timeout,
    },
    Rule {
        name: "task_rejected",
        matches: |_, error| matches!(error.kind(), ErrorKind::TaskRejected(_)),
        apply: task_rejected,
    },
    Rule {
        name: "domain",
        matches: |_, error| matches!(error.kind(), ErrorKind::Domain { .. }),
        apply: domain,
    },
    Rule {
        name: "upstream",
        matches: |_, error| matches!(error.kind(), ErrorKind::Upstream(_)),
        apply: upstream,
    },
    Rule {
        name: "access_denied",
        matches: |translator, error| translator.security && matches!(error.kind(), ErrorKind::AccessDenied(_)),
        apply: access_denied,
    },
];

static FALLBACK: Rule = Rule {
    name: "fallback",
    matches: |_, _| true,
    apply: fallback,
};

pub(crate) fn select(translator: &ErrorTranslator, error: &ApiError) -> &'static Rule {
    RULES
        .iter()
        .find(|rule| (rule.matches)(translator, error))
        .unwrap_or(&FALLBACK)
}

fn validation(translator: &ErrorTranslator, error: &ApiError, ctx: &RequestContext) -> Translation {
    translator.warn(error, None, false);

    let ErrorKind::Validation(failure) = error.kind() else {
        return fallback(translator, error, ctx);
    };

    let detail = (!failure.errors().is_empty()).then(|| Detail::Errors(failure.errors().to_vec()));
    let body = ErrorResponse::new(ctx.path(), failure.status(), VALIDATION_FAILED, None).with_detail(detail);

    respond(failure.status(), body)
}

fn malformed_body(translator: &ErrorTranslator, error: &ApiError, ctx: &RequestContext) -> Translation {
    translator.warn(error, None, false);

    let ErrorKind::MalformedBody(body) = error.kind() else {
        return fallback(translator, error, ctx);
    };

    let status = body.status();
    let response = ErrorResponse::new(ctx.path(), status, MESSAGE_READ_FAILED, Some(message_or_reason(error, status)))
        .with_detail(trace_detail(error, None));

    respond(status, response)
}

fn async_timeout(translator: &ErrorTranslator, error: &ApiError, ctx: &RequestContext) -> Translation {
    translator.warn(error, ctx.path().as_deref(), false);

    if ctx.is_committed() {
        return Translation::AlreadyCommitted;
    }

    let status = StatusCode::SERVICE_UNAVAILABLE;
    let body = ErrorResponse::new(ctx.path(), status, error.type_name(), Some(reason(status)));

    respond(status, body)
}

fn task_rejected(translator: &ErrorTranslator, error: &ApiError, ctx: &RequestContext) -> Translation {
    translator.warn(error, ctx.path().as_deref(), false);

    let status = StatusCode::SERVICE_UNAVAILABLE;
    let body = ErrorResponse::new(ctx.path(), status, error.type_name(), Some(message_or_reason(error, status)));

    respond(status, body)
}

fn domain(translator: &ErrorTranslator, error: &ApiError, ctx: &RequestContext) -> Translation {
    translator.warn(error, None, true);

    let ErrorKind::Domain { error: domain, .. } = error.kind() else {
        return fallback(translator, error, ctx);
    };

    let status = domain.declared_status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let code = domain
        .code()
        .filter(|code| !code.is_empty())
        .map_or_else(|| error.type_name().to_owned(), |code| code.into_owned());
    let body = ErrorResponse::new(ctx.path(), status, code, Some(message_or_reason(error, status)));

    respond(status, body)
}

fn upstream(translator: &ErrorTranslator, error: &ApiError, ctx: &RequestContext) -> Translation {
    translator.warn(error, None, true);

    let ErrorKind::Upstream(failure) = error.kind() else {
        return fallback(translator, error, ctx);
    };

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let message = format!(
        "{} | {}",
        message_or_reason(error, status),
        truncate_chars(failure.body(), translator.upstream_body_limit)
    );
    let body = ErrorResponse::new(ctx.path(), status, EXTERNAL_REST_CALL_FAILED, Some(message))
        .with_detail(trace_detail(error, Some(translator.upstream_trace_limit)));

    respond(status, body)
}

fn access_denied(translator: &ErrorTranslator, error: &ApiError, ctx: &RequestContext) -> Translation {
    translator.warn(error, None, true);

    let status = StatusCode::FORBIDDEN;
    let body = ErrorResponse::new(ctx.path(), status, error.type_name(), Some(message_or_reason(error, status)));

    respond(status, body)
}

fn fallback(translator: &ErrorTranslator, error: &ApiError, ctx: &RequestContext) -> Translation {
    translator.warn(error, None, true);

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let body = ErrorResponse::new(ctx.path(), status, error.type_name(), Some(message_or_reason(error, status)))
        .with_detail(trace_detail(error, None));

    respond(status, body)
}

impl ErrorTranslator {
    /// Log `identifier` or `identifier - path` at warning level
    fn warn(&self, error: &ApiError, path: Option<&str>, with_error: bool) {
        if !self.log.warn_enabled() {
            return;
        }

        let message = match path {
            Some(path) => format!("{} - {path}", error.type_name()),
            None => error.type_name().to_owned(),
        };

        let attached: &(dyn StdError + 'static) = error;
        self.log.warn(&message, with_error.then_some(attached));
    }
}

const fn respond(status: StatusCode, body: ErrorResponse) -> Translation {
    Translation::Respond {
        status,
        body: Some(body),
    }
}

fn trace_detail(error: &ApiError, limit: Option<usize>) -> Option<Detail> {
    let frames = error.trace().limited(limit);
    (!frames.is_empty()).then_some(Detail::Trace(frames))
}

fn message_or_reason(error: &ApiError, status: StatusCode) -> String {
    error.message().map_or_else(|| reason(status), |message| message.into_owned())
}

/// Canonical reason phrase, or the numeric code for unregistered statuses
fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or(status.as_str()).to_owned()
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
