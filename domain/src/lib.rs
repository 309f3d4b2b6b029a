pub mod cli;
pub mod environment;
pub mod layered;
pub mod root;

pub use environment::{BaseEnvironment, BrokerSource};
pub use layered::LayeredEnvironment;
pub use root::RootEnvironment;
