//! Azure side of brutus: who is signed in, what they may do, and which
//! management groups already exist.

pub mod api;
pub mod client;
pub mod credential;
pub mod demo;
pub mod discovery;
pub mod evaluator;
pub mod session;
pub mod settings;

pub use api::{Page, ResourceManager, RoleAssignment};
pub use client::ArmClient;
pub use credential::{CredentialChain, CredentialProvider, CredentialStrategy};
pub use demo::DemoTenant;
pub use discovery::{HierarchyReport, assemble_tree, discover_hierarchy, load_hierarchy};
pub use evaluator::{
    Evaluator, classify_assignments, classify_failure, evaluate_hierarchy_access,
    evaluate_permissions, list_subscriptions, role_name_from_id,
};
pub use session::{AccessToken, AuthMethod, Session, StaticToken, TokenSource};
pub use settings::AzureSettings;
