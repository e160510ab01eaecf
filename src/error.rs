use thiserror::Error;

/// Errors returned by the crate's configuration-time entry points.
///
/// Nothing on the span hot path (`start_child`, `add_property`, `finish`)
/// returns a `Result`; failures there degrade to no-ops, see the crate docs.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("trace id must be non-zero")]
    ZeroTraceId,
    #[error("exporter service name must not be empty")]
    EmptyServiceName,
}
