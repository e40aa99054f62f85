pub mod mock;
pub mod speechkit;

pub use mock::MockProvider;
pub use speechkit::SpeechKitProvider;
