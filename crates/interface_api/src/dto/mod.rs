//! Request and response bodies

pub mod customer;
pub mod invoice;
pub mod report;
