//! Structured problem taxonomy shared by the identity core and the review store.
//! Every operation reports failure as a `Problem` value so the HTTP boundary can
//! map it to a stable wire body without inspecting ad hoc strings.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The closed vocabulary of failure kinds. Adding a kind is an API change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    NotFound,
    InvalidCredentials,
    AlreadyExists,
    InvalidRequest,
    InvalidBody,
    MalformedInput,
    UpdateNonExisting,
}

impl ProblemKind {
    const ALL: [ProblemKind; 7] = [
        ProblemKind::NotFound,
        ProblemKind::InvalidCredentials,
        ProblemKind::AlreadyExists,
        ProblemKind::InvalidRequest,
        ProblemKind::InvalidBody,
        ProblemKind::MalformedInput,
        ProblemKind::UpdateNonExisting,
    ];

    /// Stable path-like code for the wire `type` member.
    pub fn type_uri(self) -> &'static str {
        match self {
            ProblemKind::NotFound => "/not-found",
            ProblemKind::InvalidCredentials => "/invalid-credentials",
            ProblemKind::AlreadyExists => "/create-already-exists",
            ProblemKind::InvalidRequest => "/invalid-request",
            ProblemKind::InvalidBody => "/invalid-request-body",
            ProblemKind::MalformedInput => "/failed-to-parse-json",
            ProblemKind::UpdateNonExisting => "/update-non-existing",
        }
    }

    /// Recover a kind from a wire `type`, absolutized or not. No code in the
    /// closed vocabulary is a suffix of another, so `ends_with` is unambiguous.
    pub fn from_type_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| uri.ends_with(k.type_uri()))
    }
}

/// A machine-readable failure descriptor. A `Problem` is a value returned as the
/// error half of a result, never stored and never thrown through a side channel.
/// `detail` is safe to show to a client; `instance` is a path-like locator of the
/// offending resource, empty when not applicable. Serializes straight to the
/// application/problem+json shape (`type`, `title`, `status`, `detail`,
/// `instance`), never to its in-memory fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub kind: ProblemKind,
    pub detail: String,
    pub instance: String,
}

impl Problem {
    fn new(kind: ProblemKind, detail: impl Into<String>, instance: impl Into<String>) -> Self {
        Self { kind, detail: detail.into(), instance: instance.into() }
    }

    pub fn not_found(detail: impl Into<String>, instance: impl Into<String>) -> Self {
        Self::new(ProblemKind::NotFound, detail, instance)
    }
    pub fn invalid_credentials(detail: impl Into<String>, instance: impl Into<String>) -> Self {
        Self::new(ProblemKind::InvalidCredentials, detail, instance)
    }
    pub fn already_exists(detail: impl Into<String>, instance: impl Into<String>) -> Self {
        Self::new(ProblemKind::AlreadyExists, detail, instance)
    }
    pub fn invalid_request(detail: impl Into<String>, instance: impl Into<String>) -> Self {
        Self::new(ProblemKind::InvalidRequest, detail, instance)
    }
    pub fn invalid_body(detail: impl Into<String>, instance: impl Into<String>) -> Self {
        Self::new(ProblemKind::InvalidBody, detail, instance)
    }
    pub fn malformed_input(detail: impl Into<String>, instance: impl Into<String>) -> Self {
        Self::new(ProblemKind::MalformedInput, detail, instance)
    }
    pub fn update_non_existing(detail: impl Into<String>, instance: impl Into<String>) -> Self {
        Self::new(ProblemKind::UpdateNonExisting, detail, instance)
    }

    /// Stable path-like code for the wire `type` member.
    pub fn type_uri(&self) -> &'static str {
        self.kind.type_uri()
    }

    /// Fixed human title per kind.
    pub fn title(&self) -> &'static str {
        match self.kind {
            ProblemKind::NotFound => "Resource not found",
            ProblemKind::InvalidCredentials => "Invalid credentials provided",
            ProblemKind::AlreadyExists => "Failed to create resource, it already exists.",
            ProblemKind::InvalidRequest => "Invalid request",
            ProblemKind::InvalidBody => "Invalid body provided in request",
            ProblemKind::MalformedInput => "Failed to parse the JSON",
            ProblemKind::UpdateNonExisting => {
                "Refusing to update a non-existing resource. Create one first"
            }
        }
    }

    /// Suggested HTTP status. The core does not mandate this mapping; it is the
    /// one the reference boundary uses.
    pub fn http_status(&self) -> u16 {
        match self.kind {
            ProblemKind::NotFound => 404,
            ProblemKind::InvalidCredentials => 403,
            ProblemKind::AlreadyExists => 409,
            ProblemKind::InvalidRequest
            | ProblemKind::InvalidBody
            | ProblemKind::MalformedInput
            | ProblemKind::UpdateNonExisting => 400,
        }
    }

    /// Wire body in the application/problem+json shape.
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.type_uri(),
            "title": self.title(),
            "status": self.http_status(),
            "detail": self.detail,
            "instance": self.instance,
        })
    }

    /// Prefix the relative `type` and `instance` members with the deployment's
    /// base URIs; an empty instance stays empty.
    pub fn absolutize(&self, prob_base: &str, api_base: &str) -> serde_json::Value {
        let mut body = self.body();
        body["type"] = serde_json::Value::String(format!("{}{}", prob_base, self.type_uri()));
        if !self.instance.is_empty() {
            body["instance"] =
                serde_json::Value::String(format!("{}{}", api_base, self.instance));
        }
        body
    }
}

impl Serialize for Problem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // One source of truth for the wire shape.
        self.body().serialize(serializer)
    }
}

// Incoming wire shape; `title` and `status` are derived members and ignored.
#[derive(Deserialize)]
struct ProblemWire {
    #[serde(rename = "type")]
    type_uri: String,
    #[serde(default)]
    detail: String,
    #[serde(default)]
    instance: String,
}

impl<'de> Deserialize<'de> for Problem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = ProblemWire::deserialize(deserializer)?;
        let kind = ProblemKind::from_type_uri(&wire.type_uri).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown problem type: {}", wire.type_uri))
        })?;
        Ok(Problem { kind, detail: wire.detail, instance: wire.instance })
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.instance.is_empty() {
            write!(f, "{}: {}", self.type_uri(), self.detail)
        } else {
            write!(f, "{}: {} ({})", self.type_uri(), self.detail, self.instance)
        }
    }
}

impl std::error::Error for Problem {}

pub type ProblemResult<T> = Result<T, Problem>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(Problem::not_found("missing", "/users/x").http_status(), 404);
        assert_eq!(Problem::invalid_credentials("no", "").http_status(), 403);
        assert_eq!(Problem::already_exists("dup", "/users").http_status(), 409);
        assert_eq!(Problem::invalid_request("bad", "").http_status(), 400);
        assert_eq!(Problem::invalid_body("bad body", "").http_status(), 400);
        assert_eq!(Problem::malformed_input("not json", "").http_status(), 400);
        assert_eq!(Problem::update_non_existing("", "/reviews/x").http_status(), 400);
    }

    #[test]
    fn body_carries_type_title_status() {
        let p = Problem::not_found("User with uuid, abc, does not exist.", "/users/abc");
        let body = p.body();
        assert_eq!(body["type"], "/not-found");
        assert_eq!(body["title"], "Resource not found");
        assert_eq!(body["status"], 404);
        assert_eq!(body["instance"], "/users/abc");
    }

    #[test]
    fn absolutize_prefixes_type_and_instance() {
        let p = Problem::not_found("gone", "/reviews/1");
        let body = p.absolutize("https://errors.example.com", "https://api.example.com/v1");
        assert_eq!(body["type"], "https://errors.example.com/not-found");
        assert_eq!(body["instance"], "https://api.example.com/v1/reviews/1");

        let empty = Problem::invalid_credentials("nope", "");
        let body = empty.absolutize("https://errors.example.com", "https://api.example.com/v1");
        assert_eq!(body["instance"], "");
    }

    #[test]
    fn serializes_to_the_problem_json_shape_not_raw_fields() {
        let p = Problem::not_found("gone", "/users/x");
        let wire = serde_json::to_value(&p).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({
                "type": "/not-found",
                "title": "Resource not found",
                "status": 404,
                "detail": "gone",
                "instance": "/users/x",
            })
        );
        // The in-memory field names never appear on the wire.
        assert!(wire.get("kind").is_none());
    }

    #[test]
    fn deserialize_recovers_kind_from_type() {
        let p: Problem = serde_json::from_str(
            r#"{"type":"/create-already-exists","title":"ignored","status":409,
                "detail":"dup","instance":"/users"}"#,
        )
        .unwrap();
        assert_eq!(p, Problem::already_exists("dup", "/users"));

        // Absolutized types resolve to the same kind.
        let abs: Problem = serde_json::from_str(
            r#"{"type":"https://errors.example.com/invalid-request-body","detail":"bad"}"#,
        )
        .unwrap();
        assert_eq!(abs.kind, ProblemKind::InvalidBody);

        let unknown = serde_json::from_str::<Problem>(r#"{"type":"/no-such-kind"}"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn serde_round_trip_preserves_the_value() {
        for kind_sample in [
            Problem::invalid_credentials("Username or password is invalid", ""),
            Problem::update_non_existing("", "/reviews/9"),
            Problem::malformed_input("not json", ""),
        ] {
            let json = serde_json::to_string(&kind_sample).unwrap();
            let back: Problem = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind_sample);
        }
    }

    #[test]
    fn display_includes_instance_when_present() {
        let p = Problem::update_non_existing("", "/reviews/9");
        assert_eq!(p.to_string(), "/update-non-existing:  (/reviews/9)");
    }
}
