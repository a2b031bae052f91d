pub mod environments;
pub mod settings;
pub mod storage;
pub mod validation;

pub use environments::*;
pub use settings::*;
pub use storage::*;
pub use validation::*;
