// Submodules for separation of concerns
pub mod cursor;
pub mod filter;
pub mod project;
pub mod sort;
pub mod update;

mod types;

// Public API re-exports
pub use cursor::Cursor;
pub use filter::{CompiledFilter, FilterExpr, RangeOp};
pub use types::{
    DeleteReport, FindOneAndUpdateOptions, FindOneOptions, ReturnDocument, UpdateReport,
};
pub use update::UpdateSpec;
