//! Console state and its transition function.
//!
//! `ConsoleState::update` is pure: it consumes the state and one message and
//! returns the next state plus the background tasks to start. Nothing here
//! performs I/O.

use brutus_azure::{HierarchyReport, Session};
use brutus_types::{PermissionReport, StructureTemplate, SubscriptionInventory};

use super::task::{Task, TaskOutcome};

pub const MAIN_MENU_ITEMS: [&str; 5] = [
    "🔧 Azure Environment Setup",
    "🏗️  CAF Management Groups & Landing Zones",
    "📦 Create Bootstrap Resources",
    "📊 View Current State",
    "⚙️  Configuration",
];

pub const HIERARCHY_ACTIONS: [&str; 5] = [
    "📝 Edit Management Group Structure",
    "✏️  Rename Specific Management Group",
    "🏷️  Rename All Management Groups",
    "🏗️  Apply Basic CAF Management Structure",
    "🔄 Refresh Management Groups",
];

pub const COMPARISON_OPTIONS: [&str; 2] = ["✅ Apply Recommended Structure", "❌ Cancel (Go Back)"];

pub const CONFIRMATION_OPTIONS: [&str; 2] = ["✅ Yes, Apply Structure", "❌ No, Go Back"];

const MENU_AZURE_SETUP: usize = 0;
const MENU_HIERARCHY: usize = 1;
const MENU_RESOURCES: usize = 2;

const ACTION_EDIT: usize = 0;
const ACTION_RENAME_ONE: usize = 1;
const ACTION_RENAME_ALL: usize = 2;
const ACTION_APPLY: usize = 3;
const ACTION_REFRESH: usize = 4;

const FEEDBACK_EDIT: &str = "📝 Mock: Opening management group structure editor...";
const FEEDBACK_RENAME_ONE: &str = "✏️ Mock: Select a specific management group to rename...";
const FEEDBACK_RENAME_ALL: &str =
    "🏷️ Mock: Renaming all management groups with CAF conventions...";
const FEEDBACK_APPLY: &str = "🏗️ Mock: Applying recommended CAF structure to tenant...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    AzureSetup,
    HierarchySetup,
    StructureComparison,
    Confirmation,
    ResourceCreation,
}

impl Screen {
    /// Length of the selectable list shown on this screen
    pub fn option_count(self) -> usize {
        match self {
            Screen::MainMenu => MAIN_MENU_ITEMS.len(),
            Screen::HierarchySetup => HIERARCHY_ACTIONS.len(),
            Screen::StructureComparison => COMPARISON_OPTIONS.len(),
            Screen::Confirmation => CONFIRMATION_OPTIONS.len(),
            Screen::AzureSetup | Screen::ResourceCreation => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Back,
    Quit,
}

#[derive(Debug, Clone)]
pub enum ConsoleMessage {
    /// Sent once when the console opens
    Started,
    Key(KeyAction),
    Task(TaskOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    NotStarted,
    Authenticating,
    Connected,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ConsoleState {
    pub screen: Screen,
    pub selection: usize,
    pub template_index: usize,
    pub feedback: Option<String>,
    pub should_quit: bool,

    pub auth: AuthStatus,
    pub session: Option<Session>,
    pub inventory: Option<SubscriptionInventory>,
    pub listing_in_flight: bool,
    pub listing_error: Option<String>,
    pub permissions: Option<PermissionReport>,
    pub permissions_in_flight: bool,

    pub hierarchy: Option<HierarchyReport>,
    pub hierarchy_in_flight: bool,
    pub hierarchy_error: Option<String>,
    /// The cached or in-flight hierarchy was requested before sign-in
    pub hierarchy_unchecked: bool,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self {
            screen: Screen::MainMenu,
            selection: 0,
            template_index: 0,
            feedback: None,
            should_quit: false,
            auth: AuthStatus::NotStarted,
            session: None,
            inventory: None,
            listing_in_flight: false,
            listing_error: None,
            permissions: None,
            permissions_in_flight: false,
            hierarchy: None,
            hierarchy_in_flight: false,
            hierarchy_error: None,
            hierarchy_unchecked: false,
        }
    }
}

impl ConsoleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_template(&self) -> StructureTemplate {
        StructureTemplate::from_index(self.template_index).unwrap_or(StructureTemplate::Basic)
    }

    pub fn is_authenticating(&self) -> bool {
        self.auth == AuthStatus::Authenticating
    }

    pub fn update(mut self, message: ConsoleMessage) -> (Self, Vec<Task>) {
        let mut tasks = Vec::new();
        match message {
            ConsoleMessage::Started => {
                if let Some(task) = self.begin_authentication() {
                    tasks.push(task);
                }
            }
            ConsoleMessage::Key(key) => self.on_key(key, &mut tasks),
            ConsoleMessage::Task(outcome) => self.on_outcome(outcome, &mut tasks),
        }
        (self, tasks)
    }

    fn begin_authentication(&mut self) -> Option<Task> {
        if self.is_authenticating() {
            return None;
        }
        self.auth = AuthStatus::Authenticating;
        Some(Task::Authenticate)
    }

    fn begin_hierarchy_load(&mut self) -> Option<Task> {
        if self.hierarchy_in_flight {
            return None;
        }
        self.hierarchy_in_flight = true;
        self.hierarchy_unchecked = self.session.is_none();
        Some(Task::LoadHierarchy {
            session: self.session.clone(),
            default_subscription: self.inventory.as_ref().and_then(|i| i.default.clone()),
        })
    }

    /// Reload a hierarchy fetched before sign-in once the session and its
    /// default subscription are known
    fn reload_unchecked_hierarchy(&mut self, tasks: &mut Vec<Task>) {
        let loaded = self.hierarchy.is_some() || self.hierarchy_error.is_some();
        if self.hierarchy_unchecked
            && loaded
            && self.session.is_some()
            && !self.listing_in_flight
            && let Some(task) = self.begin_hierarchy_load()
        {
            tasks.push(task);
        }
    }

    fn go_to(&mut self, screen: Screen) {
        self.screen = screen;
        self.selection = 0;
    }

    fn on_key(&mut self, key: KeyAction, tasks: &mut Vec<Task>) {
        match key {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Up => self.selection = self.selection.saturating_sub(1),
            KeyAction::Down => {
                let last = self.screen.option_count().saturating_sub(1);
                self.selection = (self.selection + 1).min(last);
            }
            KeyAction::Left => {
                if self.screen == Screen::StructureComparison {
                    self.template_index = self.template_index.saturating_sub(1);
                }
            }
            KeyAction::Right => {
                if self.screen == Screen::StructureComparison {
                    let last = StructureTemplate::ALL.len() - 1;
                    self.template_index = (self.template_index + 1).min(last);
                }
            }
            KeyAction::Back => self.on_back(),
            KeyAction::Enter => self.on_enter(tasks),
        }
    }

    fn on_back(&mut self) {
        match self.screen {
            Screen::MainMenu => {}
            Screen::AzureSetup | Screen::HierarchySetup | Screen::ResourceCreation => {
                self.go_to(Screen::MainMenu);
                self.feedback = None;
            }
            Screen::StructureComparison => {
                self.go_to(Screen::HierarchySetup);
                self.feedback = None;
            }
            Screen::Confirmation => self.go_to(Screen::StructureComparison),
        }
    }

    fn on_enter(&mut self, tasks: &mut Vec<Task>) {
        match self.screen {
            Screen::MainMenu => match self.selection {
                MENU_AZURE_SETUP => {
                    self.go_to(Screen::AzureSetup);
                    self.feedback = None;
                    if matches!(self.auth, AuthStatus::Failed(_))
                        && let Some(task) = self.begin_authentication()
                    {
                        tasks.push(task);
                    }
                }
                MENU_HIERARCHY => {
                    self.go_to(Screen::HierarchySetup);
                    self.feedback = None;
                    if self.hierarchy.is_none()
                        && let Some(task) = self.begin_hierarchy_load()
                    {
                        tasks.push(task);
                    }
                }
                MENU_RESOURCES => {
                    self.go_to(Screen::ResourceCreation);
                    self.feedback = None;
                }
                _ => {}
            },
            Screen::AzureSetup => self.refresh_environment(tasks),
            Screen::HierarchySetup => match self.selection {
                ACTION_EDIT => self.feedback = Some(FEEDBACK_EDIT.to_string()),
                ACTION_RENAME_ONE => self.feedback = Some(FEEDBACK_RENAME_ONE.to_string()),
                ACTION_RENAME_ALL => self.feedback = Some(FEEDBACK_RENAME_ALL.to_string()),
                ACTION_APPLY => {
                    self.go_to(Screen::StructureComparison);
                    self.feedback = None;
                }
                ACTION_REFRESH => {
                    self.feedback = None;
                    if let Some(task) = self.begin_hierarchy_load() {
                        tasks.push(task);
                    }
                }
                _ => {}
            },
            Screen::StructureComparison => {
                if self.selection == 0 {
                    self.go_to(Screen::Confirmation);
                } else {
                    self.go_to(Screen::HierarchySetup);
                }
            }
            Screen::Confirmation => {
                if self.selection == 0 {
                    self.feedback = Some(FEEDBACK_APPLY.to_string());
                    self.go_to(Screen::HierarchySetup);
                } else {
                    self.go_to(Screen::StructureComparison);
                }
            }
            Screen::ResourceCreation => {}
        }
    }

    /// Re-evaluate permissions when possible, otherwise sign in again
    fn refresh_environment(&mut self, tasks: &mut Vec<Task>) {
        let default_id = self
            .inventory
            .as_ref()
            .and_then(|i| i.default.as_ref())
            .map(|s| s.id.clone());

        match (&self.session, default_id) {
            (Some(session), Some(subscription_id)) => {
                if !self.permissions_in_flight {
                    self.permissions_in_flight = true;
                    tasks.push(Task::EvaluatePermissions {
                        session: session.clone(),
                        subscription_id,
                    });
                }
            }
            _ => {
                if let Some(task) = self.begin_authentication() {
                    tasks.push(task);
                }
            }
        }
    }

    fn on_outcome(&mut self, outcome: TaskOutcome, tasks: &mut Vec<Task>) {
        match outcome {
            TaskOutcome::Authenticated(Ok(session)) => {
                self.auth = AuthStatus::Connected;
                self.listing_error = None;
                self.listing_in_flight = true;
                tasks.push(Task::ListSubscriptions {
                    session: session.clone(),
                });
                self.session = Some(session);
            }
            TaskOutcome::Authenticated(Err(error)) => {
                self.auth = AuthStatus::Failed(error);
            }
            TaskOutcome::SubscriptionsListed(Ok(subscriptions)) => {
                self.listing_in_flight = false;
                self.listing_error = None;
                let inventory = SubscriptionInventory::from_list(subscriptions);
                if let (Some(session), Some(default)) = (&self.session, &inventory.default) {
                    self.permissions_in_flight = true;
                    tasks.push(Task::EvaluatePermissions {
                        session: session.clone(),
                        subscription_id: default.id.clone(),
                    });
                }
                self.inventory = Some(inventory);
                self.reload_unchecked_hierarchy(tasks);
            }
            TaskOutcome::SubscriptionsListed(Err(error)) => {
                self.listing_in_flight = false;
                self.listing_error = Some(error);
                self.reload_unchecked_hierarchy(tasks);
            }
            TaskOutcome::PermissionsEvaluated(report) => {
                self.permissions_in_flight = false;
                self.permissions = Some(report);
            }
            TaskOutcome::HierarchyLoaded(Ok(report)) => {
                self.hierarchy_in_flight = false;
                self.hierarchy_error = None;
                self.hierarchy = Some(*report);
                self.reload_unchecked_hierarchy(tasks);
            }
            TaskOutcome::HierarchyLoaded(Err(error)) => {
                self.hierarchy_in_flight = false;
                self.hierarchy_error = Some(error);
                self.reload_unchecked_hierarchy(tasks);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::task::TaskKind;
    use brutus_azure::{AuthMethod, StaticToken, discover_hierarchy};
    use brutus_types::{HierarchyAccess, PermissionLevel, SubscriptionInfo, SubscriptionState};
    use std::sync::Arc;

    fn session() -> Session {
        Session::new(AuthMethod::Demo, "tester", Arc::new(StaticToken("t".into())))
    }

    fn subscription(id: &str, state: SubscriptionState) -> SubscriptionInfo {
        SubscriptionInfo {
            id: id.to_string(),
            display_name: format!("Sub {}", id),
            tenant_id: "tenant".to_string(),
            state,
        }
    }

    fn mock_report() -> HierarchyReport {
        let access = HierarchyAccess::not_checked();
        let (tree, source) = discover_hierarchy(&access, None, true).unwrap();
        HierarchyReport {
            tree,
            source,
            access,
        }
    }

    fn send(state: ConsoleState, keys: &[KeyAction]) -> (ConsoleState, Vec<Task>) {
        let mut all = Vec::new();
        let mut state = state;
        for key in keys {
            let (next, tasks) = state.update(ConsoleMessage::Key(*key));
            state = next;
            all.extend(tasks);
        }
        (state, all)
    }

    fn kinds(tasks: &[Task]) -> Vec<TaskKind> {
        tasks.iter().map(Task::kind).collect()
    }

    fn at(screen: Screen) -> ConsoleState {
        ConsoleState {
            screen,
            ..ConsoleState::new()
        }
    }

    #[test]
    fn test_start_dispatches_authentication_once() {
        let (state, tasks) = ConsoleState::new().update(ConsoleMessage::Started);
        assert_eq!(kinds(&tasks), vec![TaskKind::Authenticate]);
        assert!(state.is_authenticating());

        let (_, tasks) = state.update(ConsoleMessage::Started);
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_hierarchy_entry_loads_once() {
        let (state, tasks) = send(ConsoleState::new(), &[KeyAction::Down, KeyAction::Enter]);
        assert_eq!(state.screen, Screen::HierarchySetup);
        assert_eq!(state.selection, 0);
        assert_eq!(kinds(&tasks), vec![TaskKind::LoadHierarchy]);
        assert!(state.hierarchy_in_flight);

        // Leaving and re-entering while the load is in flight does not start another
        let (state, tasks) = send(state, &[KeyAction::Back, KeyAction::Down, KeyAction::Enter]);
        assert_eq!(state.screen, Screen::HierarchySetup);
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_cached_hierarchy_is_not_reloaded() {
        let state = ConsoleState {
            hierarchy: Some(mock_report()),
            selection: 1,
            ..ConsoleState::new()
        };
        let (state, tasks) = send(state, &[KeyAction::Enter]);
        assert_eq!(state.screen, Screen::HierarchySetup);
        assert!(tasks.is_empty());

        // Manual refresh always reloads
        let (state, tasks) = send(
            state,
            &[
                KeyAction::Down,
                KeyAction::Down,
                KeyAction::Down,
                KeyAction::Down,
                KeyAction::Enter,
            ],
        );
        assert_eq!(state.selection, 4);
        assert_eq!(kinds(&tasks), vec![TaskKind::LoadHierarchy]);
    }

    #[test]
    fn test_selection_clamps() {
        let (state, _) = send(ConsoleState::new(), &[KeyAction::Up]);
        assert_eq!(state.selection, 0);

        let (state, _) = send(state, &[KeyAction::Down; 10]);
        assert_eq!(state.selection, MAIN_MENU_ITEMS.len() - 1);

        let (state, _) = send(at(Screen::AzureSetup), &[KeyAction::Down]);
        assert_eq!(state.selection, 0);
    }

    #[test]
    fn test_template_index_clamps_without_wrapping() {
        let state = ConsoleState {
            template_index: 2,
            ..at(Screen::StructureComparison)
        };
        let (state, _) = send(state, &[KeyAction::Right]);
        assert_eq!(state.template_index, 2);

        let (state, _) = send(state, &[KeyAction::Left, KeyAction::Right]);
        assert_eq!(state.template_index, 2);

        let (state, _) = send(state, &[KeyAction::Left, KeyAction::Left, KeyAction::Left]);
        assert_eq!(state.template_index, 0);
        assert_eq!(state.selected_template(), StructureTemplate::Basic);
    }

    #[test]
    fn test_left_right_ignored_elsewhere() {
        let (state, _) = send(ConsoleState::new(), &[KeyAction::Right]);
        assert_eq!(state.template_index, 0);
    }

    #[test]
    fn test_apply_flow_through_confirmation() {
        let state = ConsoleState {
            selection: ACTION_APPLY,
            ..at(Screen::HierarchySetup)
        };
        let (state, tasks) = send(state, &[KeyAction::Enter]);
        assert_eq!(state.screen, Screen::StructureComparison);
        assert_eq!(state.selection, 0);
        assert!(state.feedback.is_none());

        let (state, _) = send(state, &[KeyAction::Right, KeyAction::Enter]);
        assert_eq!(state.screen, Screen::Confirmation);
        assert_eq!(state.selected_template(), StructureTemplate::Enterprise);

        let (state, _) = send(state, &[KeyAction::Enter]);
        assert_eq!(state.screen, Screen::HierarchySetup);
        assert_eq!(state.feedback.as_deref(), Some(FEEDBACK_APPLY));
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_confirmation_decline_and_cancel() {
        let (state, _) = send(at(Screen::Confirmation), &[KeyAction::Down, KeyAction::Enter]);
        assert_eq!(state.screen, Screen::StructureComparison);
        assert!(state.feedback.is_none());

        let (state, _) = send(state, &[KeyAction::Down, KeyAction::Enter]);
        assert_eq!(state.screen, Screen::HierarchySetup);

        let (state, _) = send(at(Screen::Confirmation), &[KeyAction::Back]);
        assert_eq!(state.screen, Screen::StructureComparison);
    }

    #[test]
    fn test_back_semantics() {
        for screen in [
            Screen::AzureSetup,
            Screen::HierarchySetup,
            Screen::ResourceCreation,
        ] {
            let state = ConsoleState {
                selection: 1,
                feedback: Some("something".into()),
                ..at(screen)
            };
            let (state, _) = send(state, &[KeyAction::Back]);
            assert_eq!(state.screen, Screen::MainMenu);
            assert_eq!(state.selection, 0);
            assert!(state.feedback.is_none());
        }

        let state = ConsoleState {
            selection: 3,
            ..ConsoleState::new()
        };
        let (state, _) = send(state, &[KeyAction::Back]);
        assert_eq!(state.screen, Screen::MainMenu);
        assert_eq!(state.selection, 3);

        let (state, _) = send(at(Screen::StructureComparison), &[KeyAction::Back]);
        assert_eq!(state.screen, Screen::HierarchySetup);
    }

    #[test]
    fn test_mock_actions_set_feedback() {
        let (state, tasks) = send(at(Screen::HierarchySetup), &[KeyAction::Enter]);
        assert_eq!(state.feedback.as_deref(), Some(FEEDBACK_EDIT));
        assert!(tasks.is_empty());

        let (state, _) = send(state, &[KeyAction::Down, KeyAction::Down, KeyAction::Enter]);
        assert_eq!(state.feedback.as_deref(), Some(FEEDBACK_RENAME_ALL));
    }

    #[test]
    fn test_inert_menu_items() {
        for index in [3, 4] {
            let state = ConsoleState {
                selection: index,
                ..ConsoleState::new()
            };
            let (state, tasks) = send(state, &[KeyAction::Enter]);
            assert_eq!(state.screen, Screen::MainMenu);
            assert!(tasks.is_empty());
        }
    }

    #[test]
    fn test_quit_from_any_screen() {
        for screen in [
            Screen::MainMenu,
            Screen::AzureSetup,
            Screen::Confirmation,
            Screen::ResourceCreation,
        ] {
            let (state, _) = send(at(screen), &[KeyAction::Quit]);
            assert!(state.should_quit);
        }
    }

    #[test]
    fn test_authentication_chain() {
        let (state, _) = ConsoleState::new().update(ConsoleMessage::Started);

        let (state, tasks) =
            state.update(ConsoleMessage::Task(TaskOutcome::Authenticated(Ok(session()))));
        assert_eq!(state.auth, AuthStatus::Connected);
        assert_eq!(kinds(&tasks), vec![TaskKind::ListSubscriptions]);

        let listing = vec![
            subscription("disabled", SubscriptionState::Disabled),
            subscription("sub-1", SubscriptionState::Enabled),
        ];
        let (state, tasks) = state.update(ConsoleMessage::Task(
            TaskOutcome::SubscriptionsListed(Ok(listing)),
        ));
        match tasks.as_slice() {
            [Task::EvaluatePermissions {
                subscription_id, ..
            }] => assert_eq!(subscription_id, "sub-1"),
            other => panic!("unexpected tasks {:?}", other),
        }
        assert!(state.permissions_in_flight);

        let report = PermissionReport::unknown("sub-1");
        let (state, tasks) = state.update(ConsoleMessage::Task(
            TaskOutcome::PermissionsEvaluated(report.clone()),
        ));
        assert!(tasks.is_empty());
        assert_eq!(state.permissions, Some(report));
        assert_eq!(
            state.permissions.as_ref().map(|p| p.level),
            Some(PermissionLevel::Unknown)
        );
    }

    #[test]
    fn test_no_enabled_subscription_skips_permissions() {
        let state = ConsoleState {
            session: Some(session()),
            auth: AuthStatus::Connected,
            ..ConsoleState::new()
        };
        let listing = vec![subscription("old", SubscriptionState::Disabled)];
        let (state, tasks) = state.update(ConsoleMessage::Task(
            TaskOutcome::SubscriptionsListed(Ok(listing)),
        ));
        assert!(tasks.is_empty());
        assert!(
            state
                .inventory
                .as_ref()
                .is_some_and(|i| i.no_deployable_subscription)
        );
    }

    #[test]
    fn test_auth_failure_is_persistent_and_recoverable() {
        let (state, _) = ConsoleState::new().update(ConsoleMessage::Started);
        let (state, tasks) = state.update(ConsoleMessage::Task(TaskOutcome::Authenticated(Err(
            "no usable credential".into(),
        ))));
        assert!(tasks.is_empty());
        assert_eq!(state.auth, AuthStatus::Failed("no usable credential".into()));

        // Navigation still works
        let (state, _) = send(state, &[KeyAction::Down, KeyAction::Down, KeyAction::Enter]);
        assert_eq!(state.screen, Screen::ResourceCreation);

        // Re-entering Azure setup retries
        let (state, tasks) = send(state, &[KeyAction::Back, KeyAction::Enter]);
        assert_eq!(state.screen, Screen::AzureSetup);
        assert_eq!(kinds(&tasks), vec![TaskKind::Authenticate]);
        assert!(state.is_authenticating());
    }

    #[test]
    fn test_listing_failure_sets_status() {
        let state = ConsoleState {
            session: Some(session()),
            auth: AuthStatus::Connected,
            listing_in_flight: true,
            ..ConsoleState::new()
        };
        let (state, _) = state.update(ConsoleMessage::Task(TaskOutcome::SubscriptionsListed(
            Err("Network error: reset".into()),
        )));
        assert!(!state.listing_in_flight);
        assert_eq!(state.listing_error.as_deref(), Some("Network error: reset"));
    }

    #[test]
    fn test_azure_setup_enter_refreshes() {
        // Without a session: sign in again
        let (state, tasks) = send(at(Screen::AzureSetup), &[KeyAction::Enter]);
        assert_eq!(kinds(&tasks), vec![TaskKind::Authenticate]);

        // Already signing in: nothing new
        let (_, tasks) = send(state, &[KeyAction::Enter]);
        assert!(tasks.is_empty());

        // With a session and a default subscription: re-evaluate permissions
        let state = ConsoleState {
            session: Some(session()),
            auth: AuthStatus::Connected,
            inventory: Some(SubscriptionInventory::from_list(vec![subscription(
                "sub-1",
                SubscriptionState::Enabled,
            )])),
            ..at(Screen::AzureSetup)
        };
        let (_, tasks) = send(state, &[KeyAction::Enter]);
        assert_eq!(kinds(&tasks), vec![TaskKind::EvaluatePermissions]);
    }

    #[test]
    fn test_hierarchy_failure_keeps_cached_tree() {
        let cached = mock_report();
        let state = ConsoleState {
            hierarchy: Some(cached.clone()),
            hierarchy_in_flight: true,
            ..at(Screen::HierarchySetup)
        };
        let (state, _) = state.update(ConsoleMessage::Task(TaskOutcome::HierarchyLoaded(Err(
            "Discovery error: cycle".into(),
        ))));
        assert!(!state.hierarchy_in_flight);
        assert_eq!(state.hierarchy, Some(cached));
        assert_eq!(state.hierarchy_error.as_deref(), Some("Discovery error: cycle"));
    }

    #[test]
    fn test_load_hierarchy_carries_session_and_default() {
        let state = ConsoleState {
            session: Some(session()),
            inventory: Some(SubscriptionInventory::from_list(vec![subscription(
                "sub-1",
                SubscriptionState::Enabled,
            )])),
            selection: 1,
            ..ConsoleState::new()
        };
        let (_, tasks) = send(state, &[KeyAction::Enter]);
        match tasks.as_slice() {
            [Task::LoadHierarchy {
                session: Some(_),
                default_subscription: Some(sub),
            }] => assert_eq!(sub.id, "sub-1"),
            other => panic!("unexpected tasks {:?}", other),
        }
    }

    fn outcome(state: ConsoleState, outcome: TaskOutcome) -> (ConsoleState, Vec<Task>) {
        state.update(ConsoleMessage::Task(outcome))
    }

    #[test]
    fn test_hierarchy_opened_before_sign_in_reloads_after() {
        let (state, _) = ConsoleState::new().update(ConsoleMessage::Started);
        let (state, tasks) = send(state, &[KeyAction::Down, KeyAction::Enter]);
        assert!(matches!(
            tasks.as_slice(),
            [Task::LoadHierarchy { session: None, .. }]
        ));

        let (state, _) = outcome(state, TaskOutcome::HierarchyLoaded(Ok(Box::new(mock_report()))));
        let (state, tasks) = outcome(state, TaskOutcome::Authenticated(Ok(session())));
        assert_eq!(kinds(&tasks), vec![TaskKind::ListSubscriptions]);

        let listing = vec![subscription("sub-1", SubscriptionState::Enabled)];
        let (state, tasks) = outcome(state, TaskOutcome::SubscriptionsListed(Ok(listing)));
        assert_eq!(
            kinds(&tasks),
            vec![TaskKind::EvaluatePermissions, TaskKind::LoadHierarchy]
        );
        match &tasks[1] {
            Task::LoadHierarchy {
                session: Some(_),
                default_subscription: Some(sub),
            } => assert_eq!(sub.id, "sub-1"),
            other => panic!("unexpected task {:?}", other),
        }
        assert!(state.hierarchy_in_flight);
        assert!(!state.hierarchy_unchecked);

        // The signed-in result is final
        let checked = HierarchyReport {
            access: HierarchyAccess {
                has_read_access: true,
                status: "✅ Read access - No existing management groups".into(),
                ..HierarchyAccess::default()
            },
            ..mock_report()
        };
        let (state, tasks) = outcome(state, TaskOutcome::HierarchyLoaded(Ok(Box::new(checked))));
        assert!(tasks.is_empty());
        let (_, tasks) = send(state, &[KeyAction::Back, KeyAction::Down, KeyAction::Enter]);
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_unchecked_load_in_flight_at_sign_in_reloads_on_arrival() {
        let (state, _) = send(ConsoleState::new(), &[KeyAction::Down, KeyAction::Enter]);
        let (state, _) = outcome(state, TaskOutcome::Authenticated(Ok(session())));
        let (state, tasks) = outcome(state, TaskOutcome::SubscriptionsListed(Ok(Vec::new())));
        assert!(tasks.is_empty());

        let (state, tasks) = outcome(state, TaskOutcome::HierarchyLoaded(Ok(Box::new(mock_report()))));
        assert!(matches!(
            tasks.as_slice(),
            [Task::LoadHierarchy { session: Some(_), .. }]
        ));
        assert!(state.hierarchy_in_flight);
    }

    #[test]
    fn test_sign_in_without_visiting_hierarchy_loads_nothing() {
        let (state, _) = ConsoleState::new().update(ConsoleMessage::Started);
        let (state, _) = outcome(state, TaskOutcome::Authenticated(Ok(session())));
        let (state, tasks) = outcome(state, TaskOutcome::SubscriptionsListed(Ok(Vec::new())));
        assert!(tasks.is_empty());
        assert!(state.hierarchy.is_none());
    }
}
