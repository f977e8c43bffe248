pub mod journal;
pub mod trade;
