pub mod corpus;
pub mod quote;
pub mod report;

pub use corpus::*;
pub use quote::*;
pub use report::*;
