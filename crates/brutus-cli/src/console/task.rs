use brutus_azure::{HierarchyReport, Session};
use brutus_types::{PermissionReport, SubscriptionInfo};

/// Background work requested by a state transition
#[derive(Debug, Clone)]
pub enum Task {
    Authenticate,
    ListSubscriptions {
        session: Session,
    },
    EvaluatePermissions {
        session: Session,
        subscription_id: String,
    },
    LoadHierarchy {
        session: Option<Session>,
        default_subscription: Option<SubscriptionInfo>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Authenticate,
    ListSubscriptions,
    EvaluatePermissions,
    LoadHierarchy,
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Authenticate => TaskKind::Authenticate,
            Task::ListSubscriptions { .. } => TaskKind::ListSubscriptions,
            Task::EvaluatePermissions { .. } => TaskKind::EvaluatePermissions,
            Task::LoadHierarchy { .. } => TaskKind::LoadHierarchy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle {
    pub id: u64,
    pub kind: TaskKind,
}

/// Completion of exactly one task. Errors are carried as display strings.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Authenticated(Result<Session, String>),
    SubscriptionsListed(Result<Vec<SubscriptionInfo>, String>),
    PermissionsEvaluated(PermissionReport),
    HierarchyLoaded(Result<Box<HierarchyReport>, String>),
}

impl TaskOutcome {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskOutcome::Authenticated(_) => TaskKind::Authenticate,
            TaskOutcome::SubscriptionsListed(_) => TaskKind::ListSubscriptions,
            TaskOutcome::PermissionsEvaluated(_) => TaskKind::EvaluatePermissions,
            TaskOutcome::HierarchyLoaded(_) => TaskKind::LoadHierarchy,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TaskOutcome::Authenticated(Err(e))
            | TaskOutcome::SubscriptionsListed(Err(e))
            | TaskOutcome::HierarchyLoaded(Err(e)) => Some(e),
            _ => None,
        }
    }
}

/// Starts background work; outcomes arrive later on the console's channel
pub trait TaskDispatcher {
    fn dispatch(&mut self, task: Task) -> TaskHandle;
}
