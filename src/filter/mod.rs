pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod pagination;
pub mod error;

pub use types::*;
pub use error::FilterError;
pub use filter::FilterService;
pub use filter_order::FilterOrder;
pub use filter_where::FilterWhere;
pub use pagination::Pagination;

/// Everything a store needs to produce one page of an entity listing
#[derive(Debug, Clone)]
pub struct EntityQuery {
    pub filter: ResolvedFilter,
    pub sort: Option<SortSpec>,
    pub pagination: Pagination,
}
