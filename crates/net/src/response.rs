//! HTTP status mapping
//!
//! 404 becomes `NotFound`. 409 is always a `Conflict`; 422 is a conflict
//! only when the request created a resource. Everything else outside 2xx
//! is a transport error that keeps the response body for diagnostics.

use provmirror_errors::{Error, NetworkError, RegistryError};
use reqwest::{Response, StatusCode};

/// What kind of call produced the response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Lookup, listing or delete
    Read,
    /// POST that creates a resource
    Create,
    /// PUT to a presigned upload target
    Upload,
}

/// Pass successful responses through and translate the rest
///
/// `resource` names what was requested and appears in `NotFound` and
/// `Conflict` errors.
///
/// # Errors
///
/// Returns the mapped error for any non-2xx status.
pub async fn check_status(
    response: Response,
    resource: &str,
    policy: StatusPolicy,
) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.ok().filter(|b| !b.is_empty());
    Err(map_status(status, &url, resource, body, policy))
}

/// Map a non-success status to the error taxonomy
#[must_use]
pub fn map_status(
    status: StatusCode,
    url: &str,
    resource: &str,
    body: Option<String>,
    policy: StatusPolicy,
) -> Error {
    match status {
        StatusCode::NOT_FOUND if policy != StatusPolicy::Upload => RegistryError::NotFound {
            resource: resource.to_string(),
        }
        .into(),
        StatusCode::CONFLICT => RegistryError::Conflict {
            resource: resource.to_string(),
            body,
        }
        .into(),
        StatusCode::UNPROCESSABLE_ENTITY if policy == StatusPolicy::Create => {
            RegistryError::Conflict {
                resource: resource.to_string(),
                body,
            }
            .into()
        }
        _ => {
            tracing::debug!(status = status.as_u16(), url = %url, "unexpected status");
            NetworkError::HttpError {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            }
            .into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provmirror_errors::ErrorKind;

    fn kind(status: u16, policy: StatusPolicy) -> ErrorKind {
        map_status(
            StatusCode::from_u16(status).unwrap(),
            "https://app.terraform.io/api/v2/x",
            "acme/aws",
            Some("{\"errors\":[]}".into()),
            policy,
        )
        .kind()
    }

    #[test]
    fn not_found_is_not_found() {
        assert_eq!(kind(404, StatusPolicy::Read), ErrorKind::NotFound);
        assert_eq!(kind(404, StatusPolicy::Create), ErrorKind::NotFound);
    }

    #[test]
    fn upload_target_404_is_transport() {
        assert_eq!(kind(404, StatusPolicy::Upload), ErrorKind::Transport);
    }

    #[test]
    fn unprocessable_is_conflict_only_on_create() {
        assert_eq!(kind(422, StatusPolicy::Create), ErrorKind::Conflict);
        assert_eq!(kind(422, StatusPolicy::Read), ErrorKind::Transport);
        assert_eq!(kind(409, StatusPolicy::Read), ErrorKind::Conflict);
    }

    #[test]
    fn other_statuses_keep_the_body() {
        let err = map_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            "https://app.terraform.io/api/v2/x",
            "acme/aws",
            Some("upstream exploded".into()),
            StatusPolicy::Read,
        );
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.remote_body(), Some("upstream exploded"));
    }
}
