pub mod company;
pub mod niche;

pub use company::*;
pub use niche::*;
