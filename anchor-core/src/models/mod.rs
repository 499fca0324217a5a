mod audio;
mod favorite;
mod preset;
mod theme;
mod verse;

pub use audio::*;
pub use favorite::*;
pub use preset::*;
pub use theme::*;
pub use verse::*;
