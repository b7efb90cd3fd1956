pub mod response;

pub use response::{ApiResult, SaveResponse, SaveSummary};
