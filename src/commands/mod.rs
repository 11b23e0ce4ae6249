mod list;
mod serve;

pub use list::run_list;
pub use serve::run_serve;
