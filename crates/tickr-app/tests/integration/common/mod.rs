pub mod fake_provider;
pub mod mock_ws;
pub mod recording_surface;
