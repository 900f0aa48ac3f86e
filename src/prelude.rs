//! Common imports.

pub use crate::activation::{ActivationFlow, ActivationPhase, ActivationSession};
pub use crate::bot::{BotControl, BotOverview, BotState};
pub use crate::config::{ClientConfig, EndpointPaths};
pub use crate::error::{ClientError, ErrorCode, Result};
pub use crate::gateway::{ActivationCredentials, Gateway, HttpGateway, NewResource, ToggleAction};
pub use crate::profile::{OpenAiKeyInput, OpenAiMode, ProfileService};
pub use crate::resources::{Resource, ResourceStatus, ResourceStore};
pub use crate::session::{AuthService, FileSessionStore, MemorySessionStore, SessionStore};
pub use crate::zoom::ZoomService;
