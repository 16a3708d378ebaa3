mod receipts;

pub use receipts::*;
