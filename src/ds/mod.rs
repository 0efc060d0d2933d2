pub mod sieve_list;
pub mod slot_arena;

pub use sieve_list::{Node, SieveList};
pub use slot_arena::{SlotArena, SlotId, SlotPool};
