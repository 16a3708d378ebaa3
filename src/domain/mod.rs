mod dispenser;
mod fuel;
mod money;
mod quote;
mod sale;

pub use dispenser::*;
pub use fuel::*;
pub use money::*;
pub use quote::*;
pub use sale::*;
