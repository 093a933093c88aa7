pub mod aggregate;
pub mod filter;

pub use aggregate::{FieldError, MonthlySalesDto, SalesRecord, SalesRecordId, SalesRecordRow};
pub use filter::{FilterOptions, SalesFilter, SalesTableResponse};
