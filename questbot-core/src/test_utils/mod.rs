// questbot-core/src/test_utils/mod.rs
//
// In-memory repositories and scripted platform clients for tests.
// One `InMemoryStore` implements every repository trait over a single
// mutex-guarded state, so an `Arc<InMemoryStore>` can be handed out as
// each `Arc<dyn ...Repository>` a service wants.

pub mod memory;
pub mod scripted;

pub use memory::InMemoryStore;
pub use scripted::{ScriptedTelegram, ScriptedTwitter};
