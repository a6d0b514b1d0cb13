//! Price history providers.

pub mod csv_file;
pub mod yahoo;

pub use csv_file::CsvFileSource;
pub use yahoo::YahooAdapter;
