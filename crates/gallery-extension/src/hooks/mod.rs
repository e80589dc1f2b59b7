//! Hook system — hook point definitions, handler registry, and event bus.

pub mod bus;
pub mod definitions;
pub mod registry;

pub use bus::EventBus;
pub use definitions::{AfterData, BeforeOutcome, HookPhase, HookPoint};
pub use registry::{
    AfterHandler, BeforeHandler, ClosureAfterHandler, ClosureBeforeHandler, HookRegistration,
    HookRegistry,
};
