//! Bluetooth UUIDs used by the LED controller.

use uuid::{Uuid, uuid};

/// GATT characteristic that accepts command writes.
pub const LIGHT_WRITE_CHARACTERISTIC: Uuid = uuid!("0000ee01-0000-1000-8000-00805f9b34fb");
