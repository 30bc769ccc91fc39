use std::sync::mpsc::Sender;

use brutus_azure::{Evaluator, load_hierarchy};
use tokio::runtime::Handle;

use super::task::{Task, TaskDispatcher, TaskHandle, TaskOutcome};

/// Runs tasks on a tokio runtime and reports back over a std channel,
/// so the render loop can drain outcomes with `try_recv` between frames.
pub struct TokioDispatcher {
    runtime: Handle,
    evaluator: Evaluator,
    prefer_discovered: bool,
    tx: Sender<TaskOutcome>,
    next_id: u64,
}

impl TokioDispatcher {
    pub fn new(
        runtime: Handle,
        evaluator: Evaluator,
        prefer_discovered: bool,
        tx: Sender<TaskOutcome>,
    ) -> Self {
        Self {
            runtime,
            evaluator,
            prefer_discovered,
            tx,
            next_id: 0,
        }
    }
}

impl TaskDispatcher for TokioDispatcher {
    fn dispatch(&mut self, task: Task) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle {
            id: self.next_id,
            kind: task.kind(),
        };
        tracing::debug!(id = handle.id, kind = ?handle.kind, "dispatching task");

        let evaluator = self.evaluator.clone();
        let prefer_discovered = self.prefer_discovered;
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let outcome = run_task(&evaluator, task, prefer_discovered).await;
            deliver(&tx, handle, outcome);
        });
        handle
    }
}

/// Send an outcome to the console. Returns false when the console has already
/// shut down and the outcome was dropped.
fn deliver(tx: &Sender<TaskOutcome>, handle: TaskHandle, outcome: TaskOutcome) -> bool {
    match tx.send(outcome) {
        Ok(()) => true,
        Err(_) => {
            tracing::debug!(id = handle.id, kind = ?handle.kind, "console gone, task outcome dropped");
            false
        }
    }
}

pub async fn run_task(evaluator: &Evaluator, task: Task, prefer_discovered: bool) -> TaskOutcome {
    match task {
        Task::Authenticate => {
            TaskOutcome::Authenticated(evaluator.authenticate().await.map_err(|e| e.to_string()))
        }
        Task::ListSubscriptions { session } => TaskOutcome::SubscriptionsListed(
            evaluator
                .list_subscriptions(&session)
                .await
                .map_err(|e| e.to_string()),
        ),
        Task::EvaluatePermissions {
            session,
            subscription_id,
        } => TaskOutcome::PermissionsEvaluated(
            evaluator
                .evaluate_permissions(&session, &subscription_id)
                .await,
        ),
        Task::LoadHierarchy {
            session,
            default_subscription,
        } => TaskOutcome::HierarchyLoaded(
            load_hierarchy(
                evaluator,
                session.as_ref(),
                default_subscription.as_ref(),
                prefer_discovered,
            )
            .await
            .map(Box::new)
            .map_err(|e| e.to_string()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brutus_azure::DemoTenant;
    use crate::console::TaskKind;
    use brutus_types::{HierarchySource, PermissionLevel};
    use std::sync::mpsc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_task_against_demo_tenant() {
        let tenant = DemoTenant::contoso();
        let session = tenant.session();
        let evaluator = tenant.into_evaluator();

        let outcome = run_task(&evaluator, Task::Authenticate, true).await;
        assert!(matches!(outcome, TaskOutcome::Authenticated(Ok(_))));

        let outcome = run_task(
            &evaluator,
            Task::EvaluatePermissions {
                session: session.clone(),
                subscription_id: "sub-prod".to_string(),
            },
            true,
        )
        .await;
        match outcome {
            TaskOutcome::PermissionsEvaluated(report) => {
                assert_eq!(report.level, PermissionLevel::Owner)
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        let outcome = run_task(
            &evaluator,
            Task::LoadHierarchy {
                session: Some(session),
                default_subscription: None,
            },
            true,
        )
        .await;
        match outcome {
            TaskOutcome::HierarchyLoaded(Ok(report)) => {
                assert_eq!(report.source, HierarchySource::Discovered)
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sign_in_failure_becomes_message() {
        let evaluator = DemoTenant::contoso().reject_sign_in().into_evaluator();
        let outcome = run_task(&evaluator, Task::Authenticate, true).await;
        assert!(outcome.error().is_some_and(|e| e.contains("rejected")));
    }

    #[test]
    fn test_dispatch_delivers_outcome() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let (tx, rx) = mpsc::channel();
        let mut dispatcher = TokioDispatcher::new(
            runtime.handle().clone(),
            DemoTenant::contoso().into_evaluator(),
            true,
            tx,
        );

        let first = dispatcher.dispatch(Task::Authenticate);
        let second = dispatcher.dispatch(Task::Authenticate);
        assert_ne!(first.id, second.id);

        for _ in 0..2 {
            let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert!(matches!(outcome, TaskOutcome::Authenticated(Ok(_))));
        }
    }

    #[test]
    fn test_outcome_after_shutdown_is_dropped() {
        let (tx, rx) = mpsc::channel();
        let handle = TaskHandle {
            id: 7,
            kind: TaskKind::ListSubscriptions,
        };

        assert!(deliver(&tx, handle, TaskOutcome::SubscriptionsListed(Ok(Vec::new()))));
        assert!(rx.try_recv().is_ok());

        drop(rx);
        assert!(!deliver(&tx, handle, TaskOutcome::SubscriptionsListed(Ok(Vec::new()))));
    }
}
