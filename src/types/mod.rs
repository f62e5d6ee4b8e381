pub mod credentials;
pub mod dataset;
pub mod date_interval;
pub mod metadata;
pub mod observation;
pub mod series_table;
pub mod traits;
