pub mod analytics;
pub mod bucketizer;
pub mod csv_parser;
pub mod report;
