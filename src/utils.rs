pub mod cleanup;
pub mod hook;
pub mod io;
pub mod logging;
pub mod paths;
pub mod signals;
