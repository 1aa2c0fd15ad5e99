pub mod fetch;
pub mod info;
pub mod latest;
pub mod paths;
pub mod resolve;
pub mod store;
