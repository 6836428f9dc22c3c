use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use metrotable_core::error::AppError;
use metrotable_core::models::ResultSet;
use metrotable_core::pipeline::TablePipeline;
use metrotable_core::traits::{Fetcher, TableParser};

pub type PipelineFuture = Pin<Box<dyn Future<Output = Result<ResultSet, AppError>> + Send>>;

/// Injected pipeline execution; called once per request.
pub type PipelineFn = Arc<dyn Fn() -> PipelineFuture + Send + Sync>;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub run_pipeline: PipelineFn,
}

impl AppState {
    pub fn new<R, Fut>(run: R) -> Self
    where
        R: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResultSet, AppError>> + Send + 'static,
    {
        Self {
            run_pipeline: Arc::new(move || Box::pin(run())),
        }
    }

    /// Run a fresh traversal of `pipeline` for every request.
    pub fn from_pipeline<F, P>(pipeline: TablePipeline<F, P>) -> Self
    where
        F: Fetcher + 'static,
        P: TableParser + 'static,
    {
        let pipeline = Arc::new(pipeline);
        Self::new(move || {
            let pipeline = Arc::clone(&pipeline);
            async move { pipeline.run().await }
        })
    }
}
