//! Sea-ORM entities for the two record tables.

pub mod department;
pub mod employee;
pub mod status;

pub use status::Status;
