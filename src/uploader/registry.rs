// ==========================================
// Asset Ledger - upload service registry
// ==========================================
// Record-kind name -> type-erased upload handler, wired once at
// startup. Submitting for an unregistered kind is a configuration
// error, not a per-row condition. Independent files can be submitted
// concurrently; they share no mutable state beyond what the sequence
// counters and database constraints already protect.
// ==========================================

use crate::config::UploadConfig;
use crate::domain::upload::UploadResult;
use crate::uploader::engine::BulkUploadEngine;
use crate::uploader::error::UploadError;
use crate::uploader::processor::RecordProcessor;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Type-erased upload entry point for one record kind.
#[async_trait]
pub trait UploadHandler: Send + Sync {
    fn record_kind(&self) -> &'static str;
    async fn handle(&self, file_path: &Path) -> Result<UploadResult, UploadError>;
}

/// Binds a processor to an engine instance.
pub struct ProcessorHandler<P: RecordProcessor> {
    engine: BulkUploadEngine,
    processor: P,
}

impl<P: RecordProcessor> ProcessorHandler<P> {
    pub fn new(config: UploadConfig, processor: P) -> Self {
        Self {
            engine: BulkUploadEngine::new(config),
            processor,
        }
    }
}

#[async_trait]
impl<P: RecordProcessor> UploadHandler for ProcessorHandler<P> {
    fn record_kind(&self) -> &'static str {
        self.processor.record_kind()
    }

    async fn handle(&self, file_path: &Path) -> Result<UploadResult, UploadError> {
        self.engine.process(file_path, &self.processor).await
    }
}

// ==========================================
// UploadService
// ==========================================
#[derive(Default)]
pub struct UploadService {
    handlers: HashMap<&'static str, Box<dyn UploadHandler>>,
}

impl UploadService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its record kind. Startup wiring only.
    pub fn register(&mut self, handler: Box<dyn UploadHandler>) {
        self.handlers.insert(handler.record_kind(), handler);
    }

    pub fn registered_kinds(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }

    /// Run one upload for a record kind.
    pub async fn submit(&self, kind: &str, file_path: &Path) -> Result<UploadResult, UploadError> {
        match self.handlers.get(kind) {
            Some(handler) => handler.handle(file_path).await,
            None => Err(UploadError::UnknownRecordKind(kind.to_string())),
        }
    }

    /// Submit several files for the same record kind concurrently.
    /// Each file is an independent batch; one failing never affects
    /// the others.
    pub async fn submit_many(
        &self,
        kind: &str,
        file_paths: Vec<PathBuf>,
    ) -> Result<Vec<Result<UploadResult, String>>, UploadError> {
        let handler = self
            .handlers
            .get(kind)
            .ok_or_else(|| UploadError::UnknownRecordKind(kind.to_string()))?;

        info!(kind, files = file_paths.len(), "multi-file upload started");

        let tasks = file_paths.into_iter().map(|path| async move {
            match handler.handle(&path).await {
                Ok(result) => {
                    info!(file = %path.display(), succeeded = result.succeeded, "file uploaded");
                    Ok(result)
                }
                Err(e) => {
                    error!(file = %path.display(), error = %e, "file upload failed");
                    Err(format!("{}: {}", path.display(), e))
                }
            }
        });

        let results = join_all(tasks).await;

        info!(
            total = results.len(),
            ok = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "multi-file upload complete"
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_kind_is_configuration_error() {
        let service = UploadService::new();
        let err = service
            .submit("expenditure", Path::new("whatever.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::UnknownRecordKind(_)));
    }
}
