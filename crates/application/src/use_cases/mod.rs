pub mod devices;

pub use devices::ResolveDeviceUseCase;
