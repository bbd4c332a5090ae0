#[cfg(feature = "chardev")]
mod libgpiod;
mod mock;
mod sysfs;

#[cfg(feature = "chardev")]
pub use libgpiod::{LibgpiodBackend, LibgpiodWatch};
pub use mock::{MockGpioBackend, MockWake, MockWatch};
pub use sysfs::{SysfsBackend, SysfsWatch, read_value_file};
