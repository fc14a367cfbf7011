mod packed_state;
mod state;

pub use packed_state::{PackedState, StatePacker};
pub use state::State;
