pub mod replay;
pub mod scrape;
