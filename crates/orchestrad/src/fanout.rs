//! Bounded concurrent fan-out across organ services
//!
//! One task per organ on a `JoinSet`, collected against a single deadline.
//! Tasks still running at the deadline are aborted and reported as timed
//! out; siblings that already finished keep their results.

use crate::client::ClientError;
use crate::registry::OrganEndpoint;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};
use vitals_common::Organ;

pub type FanOutResults<T> = BTreeMap<Organ, Result<T, ClientError>>;

/// Run `call` against every endpoint concurrently
///
/// Always returns within `deadline` (plus scheduling slack) with exactly
/// one entry per endpoint.
pub async fn fan_out<'a, T, F, Fut>(
    endpoints: impl IntoIterator<Item = &'a OrganEndpoint>,
    deadline: Duration,
    call: F,
) -> FanOutResults<T>
where
    T: Send + 'static,
    F: Fn(OrganEndpoint) -> Fut,
    Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
{
    let mut join_set = JoinSet::new();
    let mut pending = BTreeSet::new();

    for endpoint in endpoints {
        let organ = endpoint.organ;
        let fut = call(endpoint.clone());
        pending.insert(organ);
        join_set.spawn(async move { (organ, fut.await) });
    }

    let mut results = BTreeMap::new();
    let collect = async {
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((organ, result)) => {
                    results.insert(organ, result);
                }
                Err(e) => error!("Fan-out task failed: {}", e),
            }
        }
    };
    let timed_out = tokio::time::timeout(deadline, collect).await.is_err();

    if timed_out {
        warn!(
            "Fan-out deadline of {} ms reached with {} of {} organs answered",
            deadline.as_millis(),
            results.len(),
            pending.len()
        );
        join_set.abort_all();
    }

    for organ in pending {
        results.entry(organ).or_insert_with(|| {
            if timed_out {
                debug!("Aborted pending call to {}", organ);
                Err(ClientError::Timeout {
                    organ,
                    timeout_ms: deadline.as_millis() as u64,
                })
            } else {
                Err(ClientError::TaskFailed { organ })
            }
        });
    }

    results
}

/// Turn fan-out results into a JSON object keyed by organ name, failures
/// replaced by their error marker
pub fn merge(results: FanOutResults<Value>) -> Map<String, Value> {
    results
        .into_iter()
        .map(|(organ, result)| {
            let value = match result {
                Ok(value) => value,
                Err(e) => {
                    warn!("{}", e);
                    e.marker()
                }
            };
            (organ.to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Instant;
    use tokio::time::sleep;

    fn endpoints() -> Vec<OrganEndpoint> {
        Organ::ALL
            .iter()
            .map(|o| OrganEndpoint::new(*o, "http://unused"))
            .collect()
    }

    #[tokio::test]
    async fn test_collects_every_organ() {
        let eps = endpoints();
        let results = fan_out(&eps, Duration::from_secs(1), |ep| async move {
            Ok::<_, ClientError>(ep.organ.as_str().len())
        })
        .await;

        assert_eq!(results.len(), 3);
        assert_eq!(*results[&Organ::Neural].as_ref().unwrap(), 6);
    }

    #[tokio::test]
    async fn test_runs_concurrently() {
        let eps = endpoints();
        let start = Instant::now();
        let results = fan_out(&eps, Duration::from_secs(5), |_| async {
            sleep(Duration::from_millis(200)).await;
            Ok::<_, ClientError>(())
        })
        .await;

        assert!(results.values().all(|r| r.is_ok()));
        // Sequential would be 600 ms
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_slow_organ_is_aborted_at_deadline() {
        let eps = endpoints();
        let start = Instant::now();
        let results = fan_out(&eps, Duration::from_millis(150), |ep| async move {
            if ep.organ == Organ::Respiratory {
                sleep(Duration::from_secs(30)).await;
            }
            Ok::<_, ClientError>(ep.organ)
        })
        .await;

        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(results[&Organ::Cardiac].is_ok());
        assert!(results[&Organ::Neural].is_ok());
        assert!(matches!(
            results[&Organ::Respiratory],
            Err(ClientError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_panicking_task_is_reported() {
        let eps = endpoints();
        let results = fan_out(&eps, Duration::from_secs(1), |ep| async move {
            if ep.organ == Organ::Cardiac {
                panic!("boom");
            }
            Ok::<_, ClientError>(())
        })
        .await;

        assert!(matches!(
            results[&Organ::Cardiac],
            Err(ClientError::TaskFailed { .. })
        ));
        assert!(results[&Organ::Neural].is_ok());
    }

    #[test]
    fn test_merge_replaces_failures_with_markers() {
        let mut results: FanOutResults<Value> = BTreeMap::new();
        results.insert(Organ::Cardiac, Ok(json!({"heart_rate": 72})));
        results.insert(
            Organ::Neural,
            Err(ClientError::Offline {
                organ: Organ::Neural,
                reason: "connection refused".into(),
            }),
        );

        let merged = merge(results);
        assert_eq!(merged["cardiac"]["heart_rate"], 72);
        assert_eq!(merged["neural"]["kind"], "unreachable");
    }
}
