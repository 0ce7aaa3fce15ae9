pub mod entities;
pub mod serve;
pub mod token;
