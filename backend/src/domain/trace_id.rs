//! Correlation identifier carried by every HTTP request.
//!
//! The `Trace` middleware installs a `TraceId` in a tokio task-local before
//! the handler runs. Anything awaiting on the request task can then ask for
//! it with [`TraceId::current`], which is how domain errors pick it up.
//!
//! Store work is the exception. `DbPool::run` hands its closure to
//! `spawn_blocking`, and blocking threads see no task-locals, so code inside
//! those closures only produces `CoilRepositoryError`s. `CoilService` turns
//! them into API errors once the closure has returned to the request task,
//! where the identifier is visible again.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use uuid::Uuid;

tokio::task_local! {
    static REQUEST_TRACE: TraceId;
}

/// UUID correlating one request's logs, error body and `trace-id` header.
///
/// # Examples
/// ```
/// use coil_inventory::TraceId;
///
/// async fn handler() -> Option<String> {
///     TraceId::current().map(|id| id.to_string())
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random (v4) identifier for a new request.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Identifier of the request being served, or `None` outside a request
    /// scope (including on blocking threads).
    #[must_use]
    pub fn current() -> Option<Self> {
        REQUEST_TRACE.try_with(|id| *id).ok()
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Drive `fut` to completion with `trace_id` as the current identifier.
    ///
    /// # Examples
    /// ```
    /// use coil_inventory::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
    ///     .parse()
    ///     .expect("valid UUID");
    /// let observed = TraceId::scope(trace_id, async move { TraceId::current() }).await;
    /// assert_eq!(observed, Some(trace_id));
    /// # });
    /// ```
    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        REQUEST_TRACE.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[tokio::test]
    async fn scoped_future_sees_its_identifier() {
        let expected = TraceId::generate();
        let observed = TraceId::scope(expected, async move { TraceId::current() }).await;
        assert_eq!(observed, Some(expected));
    }

    #[tokio::test]
    async fn no_identifier_outside_a_request() {
        assert!(TraceId::current().is_none());
    }

    #[tokio::test]
    async fn blocking_closures_do_not_inherit_the_identifier() {
        let expected = TraceId::generate();
        let (inside, after) = TraceId::scope(expected, async move {
            let inside = tokio::task::spawn_blocking(TraceId::current)
                .await
                .expect("blocking task completes");
            (inside, TraceId::current())
        })
        .await;

        assert_eq!(inside, None);
        assert_eq!(after, Some(expected));
    }

    #[rstest]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    #[case("00000000-0000-0000-0000-000000000000")]
    fn parses_and_displays_hyphenated_uuids(#[case] raw: &str) {
        let trace_id: TraceId = raw.parse().expect("valid uuid");
        assert_eq!(trace_id.to_string(), raw);
    }

    #[rstest]
    fn rejects_non_uuid_text() {
        assert!("not-a-trace".parse::<TraceId>().is_err());
    }
}
