pub mod dispatch;
pub mod picker;
pub mod prompt;
pub mod registry;

pub use dispatch::{ChatReply, DispatchOutcome, Dispatcher};
pub use picker::{AgentPicker, ThreadRngPicker};
pub use registry::{Personality, PersonalityRegistry, RegistryError};
