use super::state::{ConsoleMessage, ConsoleState, KeyAction};
use super::task::{TaskDispatcher, TaskHandle, TaskOutcome};

/// Owns the console state and hands requested work to a dispatcher
pub struct Console<D: TaskDispatcher> {
    state: ConsoleState,
    dispatcher: D,
    pending: Vec<TaskHandle>,
}

impl<D: TaskDispatcher> Console<D> {
    pub fn new(dispatcher: D) -> Self {
        Self {
            state: ConsoleState::new(),
            dispatcher,
            pending: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.apply(ConsoleMessage::Started);
    }

    pub fn handle_key(&mut self, key: KeyAction) {
        self.apply(ConsoleMessage::Key(key));
    }

    pub fn handle_outcome(&mut self, outcome: TaskOutcome) {
        let kind = outcome.kind();
        if let Some(error) = outcome.error() {
            tracing::warn!(kind = ?kind, error, "background task failed");
        } else {
            tracing::debug!(kind = ?kind, "background task finished");
        }
        // Outcomes are not matched to handles; the oldest pending task of the kind retires
        if let Some(pos) = self.pending.iter().position(|h| h.kind == kind) {
            self.pending.remove(pos);
        }
        self.apply(ConsoleMessage::Task(outcome));
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn pending(&self) -> &[TaskHandle] {
        &self.pending
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    fn apply(&mut self, message: ConsoleMessage) {
        let state = std::mem::take(&mut self.state);
        let (next, tasks) = state.update(message);
        self.state = next;
        for task in tasks {
            let handle = self.dispatcher.dispatch(task);
            self.pending.push(handle);
        }
    }
}
