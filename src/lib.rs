pub mod api;
pub mod errors;
pub mod ext;
pub mod invoke;
pub mod store;
pub mod utils;
