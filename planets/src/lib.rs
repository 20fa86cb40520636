pub mod body;
pub mod codec;
pub mod config;
pub mod constants;
pub mod frame;
pub mod presets;
pub mod scenario;
pub mod session;
pub mod sim;
pub mod world;

pub use body::{Body, Color};
pub use codec::{CodecError, decode, encode};
pub use scenario::{Scenario, ScenarioError};
pub use session::{Role, Session, SessionConfig, SessionState};
pub use sim::{CollisionModel, PhysicsParams};
pub use world::{Controls, World};
