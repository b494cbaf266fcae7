// Markshelf services
// Drop intent geometry, move planning, ancestry walks, search ordering and settings.

pub mod ancestry_checker;
pub mod intent_resolver;
pub mod move_planner;
pub mod search;
pub mod settings_engine;
