pub mod auth;
pub mod db;
pub mod db_types;
pub mod emissions;
pub mod error;
pub mod mines;
pub mod operations;
#[allow(unused_imports)]
pub mod schema;
pub mod store;
pub mod users;
pub mod validate;

pub use error::{CoreError, CoreResult};
