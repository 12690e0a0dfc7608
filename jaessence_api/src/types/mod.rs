mod category;
pub use self::category::{Category, UnknownCategory};

mod record;
pub use self::record::{CatalogRecord, Review};

mod page;
pub use self::page::Page;
