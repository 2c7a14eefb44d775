pub mod pnr;
pub mod times;
