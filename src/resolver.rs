use crate::model::PackageRef;
use crate::traits::PackageRegistry;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

/// Outcome of resolving operator-typed references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved packages in input order, failures removed.
    pub resolved: Vec<PackageRef>,
    /// References that could not be resolved, in input order.
    pub unresolved: Vec<String>,
}

pub struct Resolver {
    registry: Arc<dyn PackageRegistry>,
    semaphore: Arc<Semaphore>,
}

impl Resolver {
    pub fn new(registry: Arc<dyn PackageRegistry>, concurrency_limit: usize) -> Self {
        Self {
            registry,
            semaphore: Arc::new(Semaphore::new(concurrency_limit.max(1))),
        }
    }

    /// Resolves every reference concurrently. Each lookup owns its own result
    /// slot; a failed lookup leaves its slot empty and the output closes up.
    ///
    /// Arguments starting with `-` are package-manager flags and are skipped.
    #[instrument(skip(self, refs), fields(count = refs.len()))]
    pub async fn resolve(&self, refs: &[String]) -> Resolution {
        let targets: Vec<&String> = refs.iter().filter(|r| !is_flag(r)).collect();
        let mut slots: Vec<Option<PackageRef>> = vec![None; targets.len()];
        let mut join_set = JoinSet::new();

        for (index, reference) in targets.iter().enumerate() {
            let registry = Arc::clone(&self.registry);
            let semaphore = Arc::clone(&self.semaphore);
            let reference = (*reference).clone();
            join_set.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => registry.resolve(&reference).await.map_err(|e| e.to_string()),
                    Err(e) => Err(format!("Semaphore error: {}", e)),
                };
                (index, reference, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, reference, Ok(package))) => {
                    debug!(%reference, name = %package.name, version = %package.version, "Resolved");
                    slots[index] = Some(package);
                }
                Ok((_, reference, Err(e))) => {
                    warn!(%reference, error = %e, "Could not resolve package");
                }
                Err(e) => warn!(error = %e, "Resolution task failed"),
            }
        }

        let mut resolution = Resolution::default();
        for (reference, slot) in targets.into_iter().zip(slots) {
            match slot {
                Some(package) => resolution.resolved.push(package),
                None => resolution.unresolved.push(reference.clone()),
            }
        }
        resolution
    }
}

pub(crate) fn is_flag(arg: &str) -> bool {
    arg.starts_with('-')
}
