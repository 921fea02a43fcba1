pub mod assessments;
pub mod credentials;
pub mod domain;
pub mod form;
pub mod ports;
pub mod recommendations;
pub mod session;
pub mod storage;
pub mod workspace;

pub use assessments::AssessmentStore;
pub use credentials::{AuthError, CredentialStore};
pub use domain::{
    Assessment, AssessmentStatus, AssessmentSummary, Measurement, PropertyInfo, RoomRecord,
    Session, User,
};
pub use form::{AssessmentForm, DraftRoom, FormError, PropertyField, RoomField, RoomId};
pub use ports::{KeyValueStore, PhotoAnalysisService, PortError, PortResult};
pub use recommendations::{generate_recommendations, ALL_CLEAR};
pub use session::SessionStore;
pub use storage::{MemoryStore, StorageKeys};
pub use workspace::{Workspace, WorkspaceError};
