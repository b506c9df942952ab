mod device_registry;

pub use device_registry::DeviceRegistry;
