/// Level loading, the tick step and the session that owns a level.

pub mod event;
pub mod level;
pub mod step;
pub mod world;
