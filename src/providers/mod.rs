pub mod base;
pub mod alpha_vantage;
