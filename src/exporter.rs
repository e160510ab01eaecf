//! Export surface. This crate stops at producing a flat [`Span`] vector;
//! encoding it onto the wire for a particular backend (Jaeger's
//! Thrift-Compact protocol, Datadog's MsgPack agent format) is left to a
//! downstream crate implementing [`SpanExporter`] against the shapes here.
//!
//! The field set on [`ExportBatch`] mirrors the arguments
//! `MessagePackEncode`/`ThriftCompactEncode` take in the reference
//! implementation this crate's data model was distilled from: a service
//! name, a trace id, an id-prefix used to namespace span ids when several
//! processes contribute to one trace, and the span vector itself.

use std::any::Any;

use crate::error::TraceError;
use crate::span::Span;

/// Everything a wire encoder needs to serialize one collected trace.
pub struct ExportBatch<'a> {
    pub trace_id: u64,
    pub service_name: &'a str,
    pub id_prefix: u32,
    pub spans: &'a [Span],
    pub attachment: Option<&'a (dyn Any + Send + Sync)>,
}

/// Implemented by a wire-format encoder (Jaeger, Datadog, or anything else).
/// Not implemented by this crate.
pub trait SpanExporter {
    type Error;
    fn export(&mut self, batch: &ExportBatch<'_>) -> Result<(), Self::Error>;
}

/// Configuration for a Jaeger Thrift-Compact exporter. This crate validates
/// the configuration; encoding the batch is out of scope.
#[derive(Debug, Clone)]
pub struct JaegerExportConfig {
    pub service_name: String,
    pub agent_addr: String,
}

impl JaegerExportConfig {
    pub fn new(service_name: impl Into<String>, agent_addr: impl Into<String>) -> Result<Self, TraceError> {
        let service_name = service_name.into();
        if service_name.is_empty() {
            return Err(TraceError::EmptyServiceName);
        }
        Ok(JaegerExportConfig {
            service_name,
            agent_addr: agent_addr.into(),
        })
    }
}

/// Configuration for a Datadog MsgPack exporter. As with
/// [`JaegerExportConfig`], only the config shape and its validation live
/// here.
#[derive(Debug, Clone)]
pub struct DatadogExportConfig {
    pub service_name: String,
    pub agent_addr: String,
}

impl DatadogExportConfig {
    pub fn new(service_name: impl Into<String>, agent_addr: impl Into<String>) -> Result<Self, TraceError> {
        let service_name = service_name.into();
        if service_name.is_empty() {
            return Err(TraceError::EmptyServiceName);
        }
        Ok(DatadogExportConfig {
            service_name,
            agent_addr: agent_addr.into(),
        })
    }
}
