pub mod date_range;
pub mod fetcher;
pub mod page;
pub mod reshaper;
