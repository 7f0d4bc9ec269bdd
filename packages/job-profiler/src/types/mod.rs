pub mod company;
pub mod job;
pub mod link;
pub mod observation;
pub mod profile;
