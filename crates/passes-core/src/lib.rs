pub mod builder_type;
pub mod config;
pub mod device;
pub mod errors;
pub mod executor;
pub mod generator;
pub mod querier;
pub mod result;
pub mod suite;
pub mod templates;

pub use builder_type::BuilderType;
pub use errors::QueryError;
pub use executor::{BqExecutor, QueryExecutor, QueryParameters};
pub use querier::Querier;
pub use result::{ResultStatus, TestResult};
pub use suite::SuiteKind;
