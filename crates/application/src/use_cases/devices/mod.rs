pub mod resolve_device;

pub use resolve_device::ResolveDeviceUseCase;
