mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    pub mod migrations;
    pub mod schema;
}
mod authentication {
    pub mod session;
}
mod export {
    pub mod document;
}
mod constants;

pub use authentication::*;
pub use constants::*;
pub use database::*;
pub use export::*;
