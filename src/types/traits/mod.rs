pub mod any_datetime;
