#[cfg(all(target_arch = "x86_64", target_os = "linux"))]
mod std_items {
    pub use std::collections::HashMap;
    pub use std::fmt;
    pub use std::fmt::Debug;
    pub use std::format;
    pub use std::string::{String, ToString};
    pub use std::vec;
    pub use std::vec::Vec;
}

#[cfg(all(target_arch = "x86_64", target_os = "linux"))]
pub use std_items::*;

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod no_std_items {
    pub use alloc::fmt;
    pub use alloc::fmt::Debug;
    pub use alloc::format;
    pub use alloc::string::{String, ToString};
    pub use alloc::vec;
    pub use alloc::vec::Vec;
    pub use hashbrown::HashMap;
}

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub use no_std_items::*;

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        let value_str = alloc::format!($($arg)*);
        #[cfg(all(target_arch = "x86_64", target_os = "linux"))]
        {
            log::info!("[motor] {}", value_str);
        }
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        {
            defmt::info!("[motor] {}", defmt::Debug2Format(&value_str));
        }
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        let value_str = alloc::format!($($arg)*);
        #[cfg(all(target_arch = "x86_64", target_os = "linux"))]
        {
            log::debug!("[motor] {}", value_str);
        }
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        {
            defmt::debug!("[motor] {}", defmt::Debug2Format(&value_str));
        }
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        let value_str = alloc::format!($($arg)*);
        #[cfg(all(target_arch = "x86_64", target_os = "linux"))]
        {
            log::warn!("[motor] {}", value_str);
        }
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        {
            defmt::warn!("[motor] {}", defmt::Debug2Format(&value_str));
        }
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        let value_str = alloc::format!($($arg)*);
        #[cfg(all(target_arch = "x86_64", target_os = "linux"))]
        {
            log::error!("[motor] {}", value_str);
        }
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        {
            defmt::error!("[motor] {}", defmt::Debug2Format(&value_str));
        }
    };
}
