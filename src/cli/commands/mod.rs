pub mod auth;
pub mod feedback;
pub mod opportunities;
pub mod visits;
