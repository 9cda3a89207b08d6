//! # Device Catalog
//!
//! Screen resolutions of common phones, used to size the [`DeviceCanvas`].
//!
//! | Device | Width (px) | Height (px) |
//! |--------|------------|-------------|
//! | iPhone 15 Pro Max | 1290 | 2796 |
//! | iPhone 15 | 1179 | 2556 |
//! | iPhone SE | 750 | 1334 |
//! | Pixel 8 Pro | 1344 | 2992 |
//! | Pixel 8 | 1080 | 2400 |
//! | Galaxy S24 Ultra | 1440 | 3120 |
//!
//! ## Usage
//!
//! ```
//! use qrwall::device::DeviceProfile;
//!
//! let profile = DeviceProfile::find("iphone 15 pro max").unwrap();
//! let canvas = profile.canvas();
//! assert_eq!((canvas.pixel_width, canvas.pixel_height), (1290, 2796));
//! ```

use serde::Serialize;

use crate::design::DeviceCanvas;

/// A named device screen resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceProfile {
    /// Marketing name
    pub name: &'static str,

    /// Native screen width in pixels (portrait)
    pub pixel_width: u32,

    /// Native screen height in pixels (portrait)
    pub pixel_height: u32,
}

impl DeviceProfile {
    pub const IPHONE_15_PRO_MAX: Self = Self {
        name: "iPhone 15 Pro Max",
        pixel_width: 1290,
        pixel_height: 2796,
    };

    pub const IPHONE_15: Self = Self {
        name: "iPhone 15",
        pixel_width: 1179,
        pixel_height: 2556,
    };

    pub const IPHONE_SE: Self = Self {
        name: "iPhone SE",
        pixel_width: 750,
        pixel_height: 1334,
    };

    pub const PIXEL_8_PRO: Self = Self {
        name: "Pixel 8 Pro",
        pixel_width: 1344,
        pixel_height: 2992,
    };

    pub const PIXEL_8: Self = Self {
        name: "Pixel 8",
        pixel_width: 1080,
        pixel_height: 2400,
    };

    pub const GALAXY_S24_ULTRA: Self = Self {
        name: "Galaxy S24 Ultra",
        pixel_width: 1440,
        pixel_height: 3120,
    };

    /// All built-in profiles, in display order.
    pub const ALL: &'static [DeviceProfile] = &[
        Self::IPHONE_15_PRO_MAX,
        Self::IPHONE_15,
        Self::IPHONE_SE,
        Self::PIXEL_8_PRO,
        Self::PIXEL_8,
        Self::GALAXY_S24_ULTRA,
    ];

    /// Look up a profile by name, ignoring case and surrounding whitespace.
    pub fn find(name: &str) -> Option<DeviceProfile> {
        let wanted = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name.eq_ignore_ascii_case(wanted))
    }

    /// The drawing surface for this device.
    pub fn canvas(&self) -> DeviceCanvas {
        DeviceCanvas::new(self.pixel_width, self.pixel_height)
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::IPHONE_15_PRO_MAX
    }
}
