pub mod app;
pub mod fonts;
pub mod io;
pub mod logger;
pub mod ops;
pub mod params;
pub mod preview;
