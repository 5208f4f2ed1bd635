// Scrape orchestration and metric translation
pub mod scrape;
