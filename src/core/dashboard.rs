use crate::core::fetcher::ResourceFetcher;
use crate::core::{ConfigProvider, OutputSink, RefreshReport, RenderedOutput, Resource, ResourceOutcome};
use crate::utils::error::{FinanceClientError, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Keeps a set of resources rendered into one sink.
pub struct Dashboard<S: OutputSink + 'static> {
    fetcher: Arc<ResourceFetcher>,
    sink: Arc<S>,
    resources: Vec<Resource>,
    limiter: Arc<Semaphore>,
}

impl<S: OutputSink + 'static> Dashboard<S> {
    pub fn new(fetcher: ResourceFetcher, sink: S, resources: Vec<Resource>) -> Self {
        Self::with_concurrency(fetcher, sink, resources, 5)
    }

    pub fn with_concurrency(
        fetcher: ResourceFetcher,
        sink: S,
        resources: Vec<Resource>,
        concurrent_requests: usize,
    ) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            sink: Arc::new(sink),
            resources,
            limiter: Arc::new(Semaphore::new(concurrent_requests.max(1))),
        }
    }

    /// Uses the configured resources and concurrency with an existing fetcher.
    pub fn from_config<C: ConfigProvider + ?Sized>(
        config: &C,
        fetcher: ResourceFetcher,
        sink: S,
    ) -> Self {
        Self::with_concurrency(
            fetcher,
            sink,
            config.resources(),
            config.concurrent_requests(),
        )
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn resource(&self, name: &str) -> Result<&Resource> {
        self.resources
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| FinanceClientError::UnknownResource {
                name: name.to_string(),
            })
    }

    pub async fn refresh(&self, name: &str) -> Result<RenderedOutput> {
        let resource = self.resource(name)?;
        self.fetcher.fetch_and_render(resource, self.sink.as_ref()).await
    }

    pub async fn refresh_all(&self) -> RefreshReport {
        self.run(self.resources.clone()).await
    }

    /// Refreshes the named resources. Unknown names fail the whole call
    /// before any request is sent.
    pub async fn refresh_selected(&self, names: &[String]) -> Result<RefreshReport> {
        let selected = names
            .iter()
            .map(|name| self.resource(name).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(self.run(selected).await)
    }

    async fn run(&self, resources: Vec<Resource>) -> RefreshReport {
        tracing::debug!("Refreshing {} resources", resources.len());

        let mut tasks = JoinSet::new();
        for (index, resource) in resources.iter().cloned().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let sink = Arc::clone(&self.sink);
            let limiter = Arc::clone(&self.limiter);

            tasks.spawn(async move {
                // The dashboard owns the semaphore and never closes it, so an
                // error here only means the limit could not be applied.
                let _permit = match limiter.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(e) => {
                        tracing::warn!("Refreshing {} without a concurrency permit: {}", resource.name, e);
                        None
                    }
                };
                let result = fetcher.fetch_and_render(&resource, sink.as_ref()).await;
                (index, result)
            });
        }

        let mut results: Vec<Option<Result<RenderedOutput>>> =
            resources.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => tracing::error!("Refresh task aborted: {}", e),
            }
        }

        let outcomes = resources
            .into_iter()
            .zip(results)
            .map(|(resource, result)| {
                let result = result.unwrap_or_else(|| {
                    Err(FinanceClientError::config(format!(
                        "refresh of {} did not complete",
                        resource.name
                    )))
                });
                if let Err(e) = &result {
                    tracing::warn!("Failed to refresh {}: {}", resource.name, e);
                }
                ResourceOutcome {
                    resource: resource.name,
                    target: resource.target,
                    result,
                }
            })
            .collect();

        RefreshReport { outcomes }
    }
}
