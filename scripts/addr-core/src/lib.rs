pub mod address;
pub mod config;
pub mod matching;
pub mod normalize;
pub mod score;
pub mod table;
pub mod transfer;
