mod barcode;
mod barcode_event;
mod clock;
mod directory;
mod email;
mod random_check;
mod recipient;
mod result;

pub use barcode::*;
pub use barcode_event::*;
pub use clock::*;
pub use directory::*;
pub use email::*;
pub use random_check::*;
pub use recipient::*;
pub use result::*;
