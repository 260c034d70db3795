mod fail;
mod not_found;

pub use fail::fail_handler;
pub use not_found::not_found_handler;
