mod double_buffered;
mod reservoir_arena;

pub use self::double_buffered::*;
pub use self::reservoir_arena::*;
